use clap::{Args, Parser, Subcommand};
use ecverify::validate::{PatternKind, SiteConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecverify")]
#[command(about = "Build fixture sites and verify code-block highlighting output")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build fixtures and run every scenario's checks
    Run {
        /// Scenario config file (default: ./ecverify.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Only run the named scenario (repeatable)
        #[arg(short, long = "scenario")]
        scenarios: Vec<String>,

        /// Output the report as JSON
        #[arg(long)]
        json: bool,

        /// Stop after the first failing scenario
        #[arg(long)]
        fail_fast: bool,
    },

    /// Validate an already built HTML page
    Check {
        /// HTML file to validate
        file: PathBuf,

        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        opts: CheckOpts,
    },

    /// List configured scenarios
    List {
        /// Scenario config file (default: ./ecverify.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the asset base path for a site configuration
    BasePath {
        #[command(flatten)]
        site: SiteArgs,
    },
}

/// Site base path and asset settings
#[derive(Args, Debug, Default)]
pub struct SiteArgs {
    /// Site base path
    #[arg(long)]
    pub base: Option<String>,

    /// Asset URL prefix (wins over --base)
    #[arg(long)]
    pub assets_prefix: Option<String>,

    /// Build assets directory name
    #[arg(long)]
    pub assets_dir: Option<String>,
}

impl From<SiteArgs> for SiteConfig {
    fn from(args: SiteArgs) -> Self {
        SiteConfig {
            base: args.base,
            assets_prefix: args.assets_prefix,
            assets_dir: args.assets_dir,
        }
    }
}

#[derive(Args, Debug)]
pub struct CheckOpts {
    /// Expect an inline <style> block instead of an external stylesheet
    #[arg(long)]
    pub inline_styles: bool,

    /// Expected page shape (single-block, many-blocks)
    #[arg(long, default_value = "single-block")]
    pub pattern: PatternKind,

    /// Custom page pattern with `styles` and `scripts` groups
    #[arg(long, conflicts_with = "pattern")]
    pub regex: Option<String>,

    /// Expected number of code blocks
    #[arg(long, default_value = "1")]
    pub code_blocks: usize,

    /// Also require that only the first code block carries injected markup
    #[arg(long)]
    pub first_block_only: bool,
}

pub mod base_path;
pub mod check;
pub mod list;
pub mod run;
