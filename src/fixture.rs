//! Fixture building
//!
//! A fixture is a small sample site. Building one clears its output
//! directory, runs the external build command inside the fixture and hands
//! back a [`BuiltSite`] for reading the result.

use crate::util::process::{self, Limits, Outcome};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Upper bound on a single fixture build
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Output directory used when a fixture doesn't name one
pub const DEFAULT_OUT_DIR: &str = "dist";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Fixture directory not found: {}", .0.display())]
    FixtureMissing(PathBuf),

    #[error("Build command not found: {command}")]
    CommandNotFound { command: String },

    #[error("Failed to clear previous output {}: {source}", .path.display())]
    Cleanup { path: PathBuf, source: io::Error },

    #[error("Failed to execute: {command}: {source}")]
    Spawn { command: String, source: io::Error },

    #[error("Build `{command}` exited with {status}\nstdout: {stdout}\nstderr: {stderr}")]
    Failed {
        command: String,
        status: String,
        stdout: String,
        stderr: String,
    },

    #[error("Build `{command}` wrote to stderr:\n{stderr}")]
    Stderr { command: String, stderr: String },

    #[error("Build `{command}` timed out after {}s", .timeout.as_secs_f32())]
    TimedOut { command: String, timeout: Duration },

    #[error("Build `{command}` was cancelled")]
    Cancelled { command: String },
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to list {}: {source}", .path.display())]
    List { path: PathBuf, source: io::Error },
}

/// What to do when a build succeeds but writes to stderr
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StderrPolicy {
    /// Any stderr output fails the build
    #[default]
    Strict,
    /// Stderr output is logged and ignored
    Allow,
}

/// A buildable sample project
#[derive(Debug, Clone)]
pub struct FixtureDescriptor {
    /// Fixture directory; the build runs here
    pub dir: PathBuf,
    pub command: String,
    pub args: Vec<String>,
    /// Output directory, relative to `dir`
    pub out_dir: String,
    pub timeout: Duration,
    pub stderr_policy: StderrPolicy,
    /// Extra environment variables for the build
    pub env: Vec<(String, String)>,
}

impl FixtureDescriptor {
    pub fn new<I, S>(dir: impl Into<PathBuf>, command: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: dir.into(),
            command: command.to_string(),
            args: args.into_iter().map(Into::into).collect(),
            out_dir: DEFAULT_OUT_DIR.to_string(),
            timeout: DEFAULT_TIMEOUT,
            stderr_policy: StderrPolicy::default(),
            env: Vec::new(),
        }
    }

    pub fn with_out_dir(mut self, out_dir: &str) -> Self {
        self.out_dir = out_dir.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_stderr_policy(mut self, policy: StderrPolicy) -> Self {
        self.stderr_policy = policy;
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    /// Path to the output directory
    pub fn out_path(&self) -> PathBuf {
        self.dir.join(&self.out_dir)
    }

    /// The command line as it would be typed
    pub fn command_line(&self) -> String {
        process::format_command(&self.command, &self.args)
    }

    /// Resolve the build program against PATH, relative to the fixture dir.
    /// A PATH override in the fixture's env takes precedence.
    fn resolve_program(&self, dir: &Path) -> Result<PathBuf, BuildError> {
        let path_var = self
            .env
            .iter()
            .rev()
            .find(|(key, _)| key == "PATH")
            .map(|(_, value)| OsString::from(value))
            .or_else(|| std::env::var_os("PATH"));

        which::which_in(&self.command, path_var, dir).map_err(|_| BuildError::CommandNotFound {
            command: self.command.clone(),
        })
    }
}

/// Handle to a built fixture's output directory
#[derive(Debug, Clone)]
pub struct BuiltSite {
    root: PathBuf,
    elapsed: Duration,
}

impl BuiltSite {
    /// Wrap an existing output directory without building anything
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            elapsed: Duration::ZERO,
        }
    }

    /// Absolute path to the output directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// How long the build took
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Read a file's text by path relative to the output directory
    pub fn read_file(&self, rel: impl AsRef<Path>) -> Result<String, SiteError> {
        let path = self.root.join(rel);
        fs::read_to_string(&path).map_err(|source| SiteError::Read { path, source })
    }

    /// List entry names of a subdirectory, sorted
    pub fn read_dir(&self, rel: impl AsRef<Path>) -> Result<Vec<String>, SiteError> {
        let path = self.root.join(rel);
        let entries = fs::read_dir(&path).map_err(|source| SiteError::List {
            path: path.clone(),
            source,
        })?;

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| SiteError::List {
                path: path.clone(),
                source,
            })?;
            names.push(entry.file_name().to_string_lossy().to_string());
        }
        names.sort();
        Ok(names)
    }
}

/// Build a fixture from a clean output directory
pub fn build(fixture: &FixtureDescriptor) -> Result<BuiltSite, BuildError> {
    build_with_cancel(fixture, None)
}

/// Build a fixture, killing the build if `cancel` is raised
pub fn build_with_cancel(
    fixture: &FixtureDescriptor,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<BuiltSite, BuildError> {
    let dir = fixture
        .dir
        .canonicalize()
        .map_err(|_| BuildError::FixtureMissing(fixture.dir.clone()))?;
    if !dir.is_dir() {
        return Err(BuildError::FixtureMissing(fixture.dir.clone()));
    }

    let out_path = dir.join(&fixture.out_dir);
    clear_output(&out_path)?;

    let program = fixture.resolve_program(&dir)?;
    let command = fixture.command_line();
    debug!(fixture = %dir.display(), %command, "building fixture");

    let mut limits = Limits::new(fixture.timeout);
    if let Some(flag) = cancel {
        limits = limits.with_cancel(flag);
    }

    let outcome = process::run_captured(&program, &fixture.args, &dir, &fixture.env, &limits)
        .map_err(|source| BuildError::Spawn {
            command: command.clone(),
            source,
        })?;

    let captured = match outcome {
        Outcome::Finished(captured) => captured,
        Outcome::TimedOut { .. } => {
            return Err(BuildError::TimedOut {
                command,
                timeout: fixture.timeout,
            })
        }
        Outcome::Cancelled => return Err(BuildError::Cancelled { command }),
    };

    if !captured.status.success() {
        return Err(BuildError::Failed {
            command,
            status: captured.status.to_string(),
            stdout: captured.stdout,
            stderr: captured.stderr,
        });
    }

    if !captured.stderr.is_empty() {
        match fixture.stderr_policy {
            StderrPolicy::Strict => {
                return Err(BuildError::Stderr {
                    command,
                    stderr: captured.stderr,
                })
            }
            StderrPolicy::Allow => {
                warn!(%command, stderr = %captured.stderr.trim(), "build wrote to stderr");
            }
        }
    }

    debug!(%command, elapsed_ms = captured.elapsed.as_millis() as u64, "fixture built");

    Ok(BuiltSite {
        root: out_path,
        elapsed: captured.elapsed,
    })
}

/// Remove a previous build so stale files can't satisfy later checks
fn clear_output(out_path: &Path) -> Result<(), BuildError> {
    if !out_path.exists() {
        return Ok(());
    }

    debug!(path = %out_path.display(), "removing previous output");
    fs::remove_dir_all(out_path).map_err(|source| BuildError::Cleanup {
        path: out_path.to_path_buf(),
        source,
    })
}
