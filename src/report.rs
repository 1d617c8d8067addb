//! Serializable results of a scenario run

use serde::Serialize;
use std::path::PathBuf;

/// Result of one scenario: its build and each check
#[derive(Debug, Serialize)]
pub struct ScenarioReport {
    pub name: String,
    pub fixture: PathBuf,
    pub command: String,
    pub build: BuildReport,
    pub checks: Vec<CheckReport>,
}

/// Outcome of the fixture build
#[derive(Debug, Serialize)]
pub struct BuildReport {
    pub ok: bool,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// Outcome of a single check
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub label: String,
    pub passed: bool,
    pub message: Option<String>,
}

impl CheckReport {
    pub fn pass(label: String) -> Self {
        Self {
            label,
            passed: true,
            message: None,
        }
    }

    pub fn fail(label: String, message: String) -> Self {
        Self {
            label,
            passed: false,
            message: Some(message),
        }
    }
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.build.ok && self.checks.iter().all(|c| c.passed)
    }

    pub fn failed_checks(&self) -> usize {
        self.checks.iter().filter(|c| !c.passed).count()
    }
}

/// All scenarios of a run
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub scenarios: Vec<ScenarioReport>,
    pub passed: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(scenarios: Vec<ScenarioReport>) -> Self {
        let passed = scenarios.iter().filter(|s| s.passed()).count();
        let failed = scenarios.len() - passed;
        Self {
            scenarios,
            passed,
            failed,
        }
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}
