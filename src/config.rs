//! Scenario configuration
//!
//! Reads the scenario matrix from `ecverify.toml`. Fixture paths are
//! relative to the config file's directory.

use crate::fixture::{FixtureDescriptor, StderrPolicy, DEFAULT_OUT_DIR};
use crate::scenario::{Check, Scenario};
use crate::validate::{HtmlPattern, PatternKind, SiteConfig, ValidationError, SINGLE_BLOCK_MARKERS};
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Config file looked up in the current directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "ecverify.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Scenario '{0}' has no build command (set `command` on it or in [defaults])")]
    MissingCommand(String),

    #[error("Scenario '{0}' is declared more than once")]
    DuplicateScenario(String),

    #[error("Scenario '{scenario}': {source}")]
    InvalidCheck {
        scenario: String,
        source: ValidationError,
    },
}

/// Top-level config file
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default, rename = "scenario")]
    pub scenarios: Vec<ScenarioConfig>,
}

/// Settings shared by every scenario unless overridden
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub out_dir: Option<String>,
    pub timeout_secs: Option<u64>,
    pub stderr: Option<StderrPolicy>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub name: String,
    /// Fixture directory, relative to the config file
    pub fixture: PathBuf,
    pub command: Option<String>,
    pub args: Option<Vec<String>>,
    pub out_dir: Option<String>,
    pub timeout_secs: Option<u64>,
    pub stderr: Option<StderrPolicy>,

    #[serde(default = "default_true")]
    pub emit_external_stylesheet: bool,

    #[serde(default)]
    pub site: SiteConfig,

    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default, rename = "check")]
    pub checks: Vec<CheckConfig>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum CheckConfig {
    Page {
        path: String,
        #[serde(default)]
        pattern: PatternKind,
        /// Custom pattern; overrides `pattern`
        regex: Option<String>,
        code_blocks: Option<usize>,
    },
    Assets {
        dir: Option<String>,
        stylesheets: Option<usize>,
        scripts: Option<usize>,
        logos: Option<usize>,
    },
    FirstBlockOnly {
        path: String,
        components: usize,
    },
    Content {
        path: String,
        /// Defaults to the single-block markers
        #[serde(default)]
        patterns: Vec<String>,
    },
}

impl CheckConfig {
    fn into_check(self) -> Result<Check, ValidationError> {
        Ok(match self {
            CheckConfig::Page {
                path,
                pattern,
                regex,
                code_blocks,
            } => Check::Page {
                path,
                pattern: match regex {
                    Some(regex) => HtmlPattern::custom(&regex)?,
                    None => HtmlPattern::from_kind(pattern),
                },
                code_blocks: code_blocks.unwrap_or(1),
            },
            CheckConfig::Assets {
                dir,
                stylesheets,
                scripts,
                logos,
            } => Check::Assets {
                dir,
                stylesheets,
                scripts,
                logos,
            },
            CheckConfig::FirstBlockOnly { path, components } => {
                Check::FirstBlockOnly { path, components }
            }
            CheckConfig::Content { path, patterns } => {
                let sources: Vec<String> = if patterns.is_empty() {
                    SINGLE_BLOCK_MARKERS.iter().map(|p| p.to_string()).collect()
                } else {
                    patterns
                };
                let patterns = sources
                    .iter()
                    .map(|source| {
                        Regex::new(source).map_err(|e| ValidationError::InvalidPattern {
                            pattern: source.clone(),
                            reason: e.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Check::Content { path, patterns }
            }
        })
    }
}

impl Config {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve every scenario, with fixture paths joined onto `base_dir`
    pub fn scenarios(self, base_dir: &Path) -> Result<Vec<Scenario>, ConfigError> {
        let mut seen = HashSet::new();
        let mut scenarios = Vec::with_capacity(self.scenarios.len());

        for entry in self.scenarios {
            if !seen.insert(entry.name.clone()) {
                return Err(ConfigError::DuplicateScenario(entry.name));
            }
            scenarios.push(resolve(&self.defaults, entry, base_dir)?);
        }

        Ok(scenarios)
    }
}

fn resolve(
    defaults: &Defaults,
    entry: ScenarioConfig,
    base_dir: &Path,
) -> Result<Scenario, ConfigError> {
    let command = entry
        .command
        .or_else(|| defaults.command.clone())
        .ok_or_else(|| ConfigError::MissingCommand(entry.name.clone()))?;
    let args = entry
        .args
        .or_else(|| defaults.args.clone())
        .unwrap_or_default();
    let out_dir = entry
        .out_dir
        .or_else(|| defaults.out_dir.clone())
        .unwrap_or_else(|| DEFAULT_OUT_DIR.to_string());

    let mut fixture = FixtureDescriptor::new(base_dir.join(&entry.fixture), &command, args)
        .with_out_dir(&out_dir)
        .with_stderr_policy(entry.stderr.or(defaults.stderr).unwrap_or_default());

    if let Some(secs) = entry.timeout_secs.or(defaults.timeout_secs) {
        fixture = fixture.with_timeout(Duration::from_secs(secs));
    }
    for (key, value) in &entry.env {
        fixture = fixture.with_env(key, value);
    }

    let checks = entry
        .checks
        .into_iter()
        .map(CheckConfig::into_check)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ConfigError::InvalidCheck {
            scenario: entry.name.clone(),
            source,
        })?;

    Ok(Scenario {
        name: entry.name,
        fixture,
        emit_external_stylesheet: entry.emit_external_stylesheet,
        site: entry.site,
        checks,
    })
}

/// Load and resolve scenarios from a config file
pub fn load_scenarios(path: &Path) -> Result<Vec<Scenario>, ConfigError> {
    let config = Config::load(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    config.scenarios(base_dir)
}
