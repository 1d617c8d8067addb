//! Check command - validate one already built page
//!
//! ecverify check <HTML_FILE> [--inline-styles] [--base P] [--assets-dir D] ...

use super::CheckOpts;
use anyhow::{Context, Result};
use ecverify::util::ui;
use ecverify::validate::{self, HtmlPattern, SiteConfig, ValidationOptions};
use std::fs;
use std::path::Path;

/// Validate `file`. Returns whether it passed.
pub fn run(file: &Path, site: SiteConfig, opts: CheckOpts) -> Result<bool> {
    let html = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let pattern = match &opts.regex {
        Some(regex) => HtmlPattern::custom(regex)?,
        None => HtmlPattern::from_kind(opts.pattern),
    };

    let options = ValidationOptions {
        emit_external_stylesheet: !opts.inline_styles,
        site,
        pattern,
        expected_code_blocks: opts.code_blocks,
    };

    let mut passed = true;

    match validate::validate_html(&html, &options) {
        Ok(page) => {
            ui::success(&format!("{}", file.display()));
            ui::dim(&format!("styles:      {}", summarize(&page.styles)));
            ui::dim(&format!("scripts:     {}", page.scripts));
            ui::dim(&format!("code blocks: {}", page.code_blocks));
            ui::dim(&format!("asset base:  {}", page.asset_base));
        }
        Err(e) => {
            ui::failure(&format!("{}", file.display()));
            ui::dim(&e.to_string());
            passed = false;
        }
    }

    if opts.first_block_only {
        match validate::check_first_block_only(&html, opts.code_blocks) {
            Ok(()) => ui::success("only the first code block carries styles and scripts"),
            Err(e) => {
                ui::failure("injected markup");
                ui::dim(&e.to_string());
                passed = false;
            }
        }
    }

    Ok(passed)
}

/// Inline style blocks can be large; show only their start
fn summarize(markup: &str) -> String {
    const MAX: usize = 80;
    match markup.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}…", &markup[..idx]),
        None => markup.to_string(),
    }
}
