//! HTML validation for built pages
//!
//! Checks that the highlighter's styles and scripts were injected where the
//! site configuration says they should be served from, and that the page
//! has the expected number of code blocks.

mod pattern;

pub use pattern::{HtmlPattern, PatternKind};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use thiserror::Error;

/// Assets directory the framework uses when none is configured
pub const DEFAULT_ASSETS_DIR: &str = "_astro";

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Page did not match expected structure ({detail}):\n{pattern}")]
    StructureMismatch { pattern: String, detail: String },

    #[error("Unexpected styles markup\n  expected: {expected}\n  actual:   {actual}")]
    StylesMismatch { expected: String, actual: String },

    #[error("Unexpected scripts markup\n  expected: {expected}\n  actual:   {actual}")]
    ScriptsMismatch { expected: String, actual: String },

    #[error("Expected {expected} code block(s), found {actual}")]
    CodeBlockCount { expected: usize, actual: usize },

    #[error("Expected {expected} {kind} asset(s), found {actual}: {entries:?}")]
    AssetCount {
        kind: String,
        expected: usize,
        actual: usize,
        entries: Vec<String>,
    },

    #[error("Code block {index} should carry no injected markup, found: {markup}")]
    UnexpectedInjection { index: usize, markup: String },

    #[error("First code block is missing injected styles and scripts")]
    MissingInjection,

    #[error("Page is missing content matching {pattern}")]
    MissingContent { pattern: String },

    #[error("Invalid pattern {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// The site's base path and asset settings the fixture was built with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Site base path (e.g. `/subpath`)
    pub base: Option<String>,
    /// Prefix for asset URLs; wins over `base` when set
    pub assets_prefix: Option<String>,
    /// Build assets directory name (defaults to `_astro`)
    pub assets_dir: Option<String>,
}

impl SiteConfig {
    pub fn assets_dir(&self) -> &str {
        self.assets_dir.as_deref().unwrap_or(DEFAULT_ASSETS_DIR)
    }
}

/// Options for [`validate_html`]
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    pub emit_external_stylesheet: bool,
    pub site: SiteConfig,
    pub pattern: HtmlPattern,
    pub expected_code_blocks: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            emit_external_stylesheet: true,
            site: SiteConfig::default(),
            pattern: HtmlPattern::default(),
            expected_code_blocks: 1,
        }
    }
}

/// What a successful validation matched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageMatch {
    pub styles: String,
    pub scripts: String,
    pub code_blocks: usize,
    pub asset_base: String,
}

/// URL prefix the hashed assets are served from
///
/// `assets_prefix` (or else `base`) joined with the assets directory,
/// with runs of `/` collapsed. A scheme's `//` is left intact.
pub fn asset_base_path(site: &SiteConfig) -> String {
    let prefix = site
        .assets_prefix
        .as_deref()
        .or(site.base.as_deref())
        .unwrap_or("");
    let joined = format!("{}/{}/", prefix, site.assets_dir());

    match joined.split_once("://") {
        Some((scheme, rest)) if !scheme.is_empty() && !scheme.contains('/') => {
            format!("{}://{}", scheme, collapse_slashes(rest))
        }
        _ => collapse_slashes(&joined),
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Validate a rendered page against `options`
pub fn validate_html(html: &str, options: &ValidationOptions) -> Result<PageMatch, ValidationError> {
    let (styles, scripts) = options.pattern.captures(html)?;
    let asset_base = asset_base_path(&options.site);

    let expected_styles = if options.emit_external_stylesheet {
        external_stylesheet_regex(&asset_base)
    } else {
        inline_style_regex().clone()
    };
    if !expected_styles.is_match(styles) {
        return Err(ValidationError::StylesMismatch {
            expected: expected_styles.as_str().to_string(),
            actual: styles.to_string(),
        });
    }

    let expected_scripts = external_script_regex(&asset_base);
    if !expected_scripts.is_match(scripts) {
        return Err(ValidationError::ScriptsMismatch {
            expected: expected_scripts.as_str().to_string(),
            actual: scripts.to_string(),
        });
    }

    let code_blocks = count_code_blocks(html);
    if code_blocks != options.expected_code_blocks {
        return Err(ValidationError::CodeBlockCount {
            expected: options.expected_code_blocks,
            actual: code_blocks,
        });
    }

    Ok(PageMatch {
        styles: styles.to_string(),
        scripts: scripts.to_string(),
        code_blocks,
        asset_base,
    })
}

/// Number of code block wrappers on a page
pub fn count_code_blocks(html: &str) -> usize {
    wrapper_regex().find_iter(html).count()
}

/// Markup between each wrapper's opening tag and its first `<figure`.
///
/// The highlighter injects styles and scripts there, and only into the
/// first block of a page.
pub fn injected_markup(html: &str) -> Vec<&str> {
    let starts: Vec<usize> = wrapper_regex().find_iter(html).map(|m| m.end()).collect();

    starts
        .iter()
        .map(|&start| {
            let rest = &html[start..];
            let end = rest.find("<figure").unwrap_or(rest.len());
            &rest[..end]
        })
        .collect()
}

/// Only the first code block may carry injected markup
pub fn check_first_block_only(html: &str, components: usize) -> Result<(), ValidationError> {
    let slices = injected_markup(html);
    if slices.len() != components {
        return Err(ValidationError::CodeBlockCount {
            expected: components,
            actual: slices.len(),
        });
    }

    if slices.first().is_some_and(|s| s.trim().is_empty()) {
        return Err(ValidationError::MissingInjection);
    }

    for (index, markup) in slices.iter().enumerate().skip(1) {
        if !markup.trim().is_empty() {
            return Err(ValidationError::UnexpectedInjection {
                index,
                markup: markup.to_string(),
            });
        }
    }

    Ok(())
}

/// Content markers of a single-block fixture page: a collapsible section,
/// an inserted line and a theme color custom property
pub const SINGLE_BLOCK_MARKERS: [&str; 3] = [
    r"<details[^>]*>",
    r#"<div class="ec-line ins">"#,
    r"--\d+:#[0-9a-fA-F]{3,8}",
];

/// Every pattern must match somewhere in the page
pub fn check_content(html: &str, patterns: &[Regex]) -> Result<(), ValidationError> {
    for pattern in patterns {
        if !pattern.is_match(html) {
            return Err(ValidationError::MissingContent {
                pattern: pattern.as_str().to_string(),
            });
        }
    }
    Ok(())
}

fn external_stylesheet_regex(asset_base: &str) -> Regex {
    compile(&format!(
        r#"^<link rel="stylesheet" href="{}ec\.[^"/]+\.css"\s*/?>$"#,
        regex::escape(asset_base)
    ))
}

fn external_script_regex(asset_base: &str) -> Regex {
    compile(&format!(
        r#"^<script type="module" src="{}ec\.[^"/]+\.js"\s*></script>$"#,
        regex::escape(asset_base)
    ))
}

fn inline_style_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r"(?s)^<style>.*</style>$"))
}

fn wrapper_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| compile(r#"<div class="expressive-code(?: [^"]*)?">"#))
}

/// Only used with escaped input, so compilation cannot fail.
fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid validation pattern")
}
