//! Binary execution for integration tests

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Result of running the ecverify binary
#[derive(Debug)]
pub struct RunResult {
    /// Exit code (0 = success)
    pub exit_code: i32,
    /// Standard output as string
    pub stdout: String,
    /// Standard error as string
    pub stderr: String,
}

impl RunResult {
    /// Check if command succeeded (exit code 0)
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Check if stdout contains a substring
    pub fn stdout_contains(&self, needle: &str) -> bool {
        self.stdout.contains(needle)
    }

    /// Combined output (stdout + stderr)
    pub fn output(&self) -> String {
        format!("{}\n{}", self.stdout, self.stderr)
    }

    /// Check if combined output contains a substring
    pub fn output_contains(&self, needle: &str) -> bool {
        self.output().contains(needle)
    }

    /// Parse stdout as JSON (for `run --json`)
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.stdout)
            .unwrap_or_else(|e| panic!("stdout is not JSON ({}):\n{}", e, self.stdout))
    }
}

impl From<Output> for RunResult {
    fn from(output: Output) -> Self {
        Self {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        }
    }
}

/// Run the ecverify binary in a directory
pub fn ecverify(dir: &Path, args: &[&str]) -> RunResult {
    let binary = PathBuf::from(env!("CARGO_BIN_EXE_ecverify"));

    let mut cmd = Command::new(&binary);
    cmd.current_dir(dir);
    cmd.args(args);

    // Keep diagnostics quiet regardless of the caller's environment
    cmd.env_remove("RUST_LOG");

    let output = cmd.output().expect("Failed to execute ecverify");
    RunResult::from(output)
}
