//! List command - show configured scenarios
//!
//! ecverify list [--config PATH]

use anyhow::{Context, Result};
use ecverify::config::{self, DEFAULT_CONFIG_FILE};
use ecverify::util::ui;
use std::path::{Path, PathBuf};

pub fn run(config: Option<&Path>) -> Result<()> {
    let config_path = config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let scenarios = config::load_scenarios(&config_path)
        .with_context(|| format!("Failed to load scenarios from {}", config_path.display()))?;

    if scenarios.is_empty() {
        ui::warn(&format!("No scenarios in {}", config_path.display()));
        return Ok(());
    }

    let width = scenarios.iter().map(|s| s.name.len()).max().unwrap_or(0);
    for scenario in &scenarios {
        let styles = if scenario.emit_external_stylesheet {
            "external"
        } else {
            "inline"
        };
        ui::info(&format!(
            "{:<width$}  {}  ({} check(s), {} styles)",
            scenario.name,
            scenario.fixture.dir.display(),
            scenario.checks.len(),
            styles,
            width = width
        ));
    }

    Ok(())
}
