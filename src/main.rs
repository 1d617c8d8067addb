mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use ecverify::util::ui;

fn main() {
    // Diagnostics go to stderr so `run --json` output stays parseable
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    match run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            ui::error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

/// Returns whether every check passed
fn run() -> Result<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            scenarios,
            json,
            fail_fast,
        } => cli::run::run(config.as_deref(), &scenarios, json, fail_fast),
        Commands::Check { file, site, opts } => cli::check::run(&file, site.into(), opts),
        Commands::List { config } => cli::list::run(config.as_deref()).map(|_| true),
        Commands::BasePath { site } => {
            cli::base_path::run(site.into());
            Ok(true)
        }
    }
}
