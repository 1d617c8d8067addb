//! Run command - build fixtures and check their output
//!
//! ecverify run [--config PATH] [--scenario NAME]... [--json] [--fail-fast]

use anyhow::{bail, Context, Result};
use ecverify::config::{self, DEFAULT_CONFIG_FILE};
use ecverify::report::{RunReport, ScenarioReport};
use ecverify::scenario::{self, Scenario};
use ecverify::util::ui;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Run the selected scenarios. Returns whether all of them passed.
pub fn run(config: Option<&Path>, names: &[String], json: bool, fail_fast: bool) -> Result<bool> {
    let config_path = config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let scenarios = config::load_scenarios(&config_path)
        .with_context(|| format!("Failed to load scenarios from {}", config_path.display()))?;
    let selected = select(scenarios, names)?;

    if selected.is_empty() {
        bail!("No scenarios configured in {}", config_path.display());
    }

    // Ctrl+C kills the running build instead of leaving it orphaned
    let cancel = Arc::new(AtomicBool::new(false));
    let flag = cancel.clone();
    ctrlc::set_handler(move || {
        flag.store(true, Ordering::SeqCst);
    })
    .ok();

    let show_spinner = !json && std::io::stdout().is_terminal();
    let mut reports = Vec::with_capacity(selected.len());

    for scenario in &selected {
        let spinner = show_spinner.then(|| spinner(&scenario.name));
        let report = scenario::run_with_cancel(scenario, Some(cancel.clone()));
        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        if !json {
            print_scenario(&report);
        }

        let failed = !report.passed();
        reports.push(report);

        if cancel.load(Ordering::SeqCst) {
            if !json {
                ui::warn("Interrupted");
            }
            break;
        }
        if failed && fail_fast {
            break;
        }
    }

    let run = RunReport::new(reports);
    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else {
        print_summary(&run, selected.len());
    }

    Ok(run.success() && !cancel.load(Ordering::SeqCst))
}

/// Keep the requested scenarios in config order; all of them when none are named
fn select(scenarios: Vec<Scenario>, names: &[String]) -> Result<Vec<Scenario>> {
    if names.is_empty() {
        return Ok(scenarios);
    }

    for name in names {
        if !scenarios.iter().any(|s| &s.name == name) {
            let available: Vec<&str> = scenarios.iter().map(|s| s.name.as_str()).collect();
            bail!(
                "Unknown scenario: {}\nAvailable: {}",
                name,
                available.join(", ")
            );
        }
    }

    Ok(scenarios
        .into_iter()
        .filter(|s| names.contains(&s.name))
        .collect())
}

fn spinner(name: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(format!("Building {}", name));
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_scenario(report: &ScenarioReport) {
    println!();
    println!("{} ({})", report.name, report.command);

    match &report.build.error {
        Some(error) => {
            ui::failure("build");
            ui::dim(error);
            ui::dim(&format!("skipped {} check(s)", report.checks.len()));
            return;
        }
        None => ui::success(&format!(
            "build ({:.1}s)",
            report.build.elapsed_ms as f64 / 1000.0
        )),
    }

    for check in &report.checks {
        if check.passed {
            ui::success(&check.label);
        } else {
            ui::failure(&check.label);
            if let Some(message) = &check.message {
                ui::dim(message);
            }
        }
    }
}

fn print_summary(run: &RunReport, selected: usize) {
    println!();
    println!("{}", "═".repeat(50));
    let skipped = selected - run.scenarios.len();
    if skipped > 0 {
        ui::info(&format!(
            "{} passed, {} failed, {} not run",
            run.passed, run.failed, skipped
        ));
    } else {
        ui::info(&format!("{} passed, {} failed", run.passed, run.failed));
    }
}
