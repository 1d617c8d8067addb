//! Scenarios: one fixture build shared by an ordered list of checks

use crate::assets::{self, AssetCounts};
use crate::fixture::{self, BuiltSite, FixtureDescriptor, SiteError};
use crate::report::{BuildReport, CheckReport, ScenarioReport};
use crate::validate::{self, HtmlPattern, SiteConfig, ValidationError, ValidationOptions};
use regex::Regex;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Site(#[from] SiteError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// A check run against a built site
#[derive(Debug, Clone)]
pub enum Check {
    /// Validate a page's structure, injected assets and code block count
    Page {
        path: String,
        pattern: HtmlPattern,
        code_blocks: usize,
    },
    /// Exact counts of hashed assets; `None` means derive from the scenario
    /// (`ec.*.css` follows stylesheet emission, `ec.*.js` is always 1) or,
    /// for logos, skip
    Assets {
        dir: Option<String>,
        stylesheets: Option<usize>,
        scripts: Option<usize>,
        logos: Option<usize>,
    },
    /// `components` code blocks, and only the first carries injected markup
    FirstBlockOnly { path: String, components: usize },
    /// Each pattern must match somewhere in the page
    Content { path: String, patterns: Vec<Regex> },
}

impl Check {
    /// A single-block page check
    pub fn page(path: &str) -> Self {
        Check::Page {
            path: path.to_string(),
            pattern: HtmlPattern::single_block(),
            code_blocks: 1,
        }
    }

    /// Asset counts derived from the scenario
    pub fn assets() -> Self {
        Check::Assets {
            dir: None,
            stylesheets: None,
            scripts: None,
            logos: None,
        }
    }

    /// Short description used in reports
    pub fn label(&self) -> String {
        match self {
            Check::Page { path, .. } => format!("page {}", path),
            Check::Assets { dir, .. } => match dir {
                Some(dir) => format!("assets in {}", dir),
                None => "assets".to_string(),
            },
            Check::FirstBlockOnly { path, components } => {
                format!("{} components in {}, injected once", components, path)
            }
            Check::Content { path, .. } => format!("content of {}", path),
        }
    }

    /// Run this check against a built site
    pub fn run(&self, scenario: &Scenario, site: &BuiltSite) -> Result<(), CheckError> {
        match self {
            Check::Page {
                path,
                pattern,
                code_blocks,
            } => {
                let html = site.read_file(path)?;
                let options = scenario.validation_options(pattern.clone(), *code_blocks);
                validate::validate_html(&html, &options)?;
            }
            Check::Assets {
                dir,
                stylesheets,
                scripts,
                logos,
            } => {
                let dir = dir.as_deref().unwrap_or(scenario.site.assets_dir());
                let entries = site.read_dir(dir)?;
                let counts = AssetCounts::from_entries(&entries);

                let expected_css =
                    stylesheets.unwrap_or(usize::from(scenario.emit_external_stylesheet));
                expect_count("ec.*.css", expected_css, counts.stylesheets, || {
                    owned(assets::ec_assets(&entries, "css"))
                })?;

                expect_count("ec.*.js", scripts.unwrap_or(1), counts.scripts, || {
                    owned(assets::ec_assets(&entries, "js"))
                })?;

                if let Some(expected) = logos {
                    expect_count("logo.*", *expected, counts.logos, || entries.clone())?;
                }
            }
            Check::FirstBlockOnly { path, components } => {
                let html = site.read_file(path)?;
                validate::check_first_block_only(&html, *components)?;
            }
            Check::Content { path, patterns } => {
                let html = site.read_file(path)?;
                validate::check_content(&html, patterns)?;
            }
        }
        Ok(())
    }
}

fn expect_count(
    kind: &str,
    expected: usize,
    actual: usize,
    entries: impl FnOnce() -> Vec<String>,
) -> Result<(), ValidationError> {
    if expected == actual {
        return Ok(());
    }
    Err(ValidationError::AssetCount {
        kind: kind.to_string(),
        expected,
        actual,
        entries: entries(),
    })
}

fn owned(names: Vec<&str>) -> Vec<String> {
    names.into_iter().map(String::from).collect()
}

/// One fixture build plus the checks run against its output
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    pub fixture: FixtureDescriptor,
    pub emit_external_stylesheet: bool,
    pub site: SiteConfig,
    pub checks: Vec<Check>,
}

impl Scenario {
    pub fn new(name: &str, fixture: FixtureDescriptor) -> Self {
        Self {
            name: name.to_string(),
            fixture,
            emit_external_stylesheet: true,
            site: SiteConfig::default(),
            checks: Vec::new(),
        }
    }

    pub fn with_inline_styles(mut self) -> Self {
        self.emit_external_stylesheet = false;
        self
    }

    pub fn with_site(mut self, site: SiteConfig) -> Self {
        self.site = site;
        self
    }

    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Validation options for a page of this scenario
    pub fn validation_options(&self, pattern: HtmlPattern, code_blocks: usize) -> ValidationOptions {
        ValidationOptions {
            emit_external_stylesheet: self.emit_external_stylesheet,
            site: self.site.clone(),
            pattern,
            expected_code_blocks: code_blocks,
        }
    }

    /// Run every check against an already built site
    pub fn check_site(&self, site: &BuiltSite) -> Vec<CheckReport> {
        self.checks
            .iter()
            .map(|check| match check.run(self, site) {
                Ok(()) => CheckReport::pass(check.label()),
                Err(e) => CheckReport::fail(check.label(), e.to_string()),
            })
            .collect()
    }
}

/// Build the scenario's fixture once, then run all of its checks
pub fn run(scenario: &Scenario) -> ScenarioReport {
    run_with_cancel(scenario, None)
}

/// Like [`run`], killing the build if `cancel` is raised
pub fn run_with_cancel(scenario: &Scenario, cancel: Option<Arc<AtomicBool>>) -> ScenarioReport {
    debug!(scenario = %scenario.name, checks = scenario.checks.len(), "running scenario");

    let (build, checks) = match fixture::build_with_cancel(&scenario.fixture, cancel) {
        Ok(site) => (
            BuildReport {
                ok: true,
                elapsed_ms: site.elapsed().as_millis() as u64,
                error: None,
            },
            scenario.check_site(&site),
        ),
        Err(e) => {
            // No retries: every check fails with the build error
            let message = format!("build failed: {}", e);
            let checks = scenario
                .checks
                .iter()
                .map(|check| CheckReport::fail(check.label(), message.clone()))
                .collect();
            (
                BuildReport {
                    ok: false,
                    elapsed_ms: 0,
                    error: Some(e.to_string()),
                },
                checks,
            )
        }
    };

    ScenarioReport {
        name: scenario.name.clone(),
        fixture: scenario.fixture.dir.clone(),
        command: scenario.fixture.command_line(),
        build,
        checks,
    }
}
