//! Expected page structure
//!
//! Every pattern declares a `styles` and a `scripts` capture group around
//! the markup the highlighter injects into the first code block of a page.

use super::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};

const STYLES_GROUP: &str = "styles";
const SCRIPTS_GROUP: &str = "scripts";

/// Opening tag of a code block wrapper, up to where injected markup starts
const WRAPPER: &str = r#"<div class="expressive-code(?: [^"]*)?">"#;

/// Injected styles then the module script, directly before the first frame
const INJECTED: &str =
    r#"(?P<styles>.*?)(?P<scripts><script type="module"[^>]*></script>)<figure class="frame[^"]*">"#;

/// A code block with a collapsed section, an inserted line and theme colors
const SINGLE_BLOCK_BODY: &str =
    r#".*?--\d+:#[0-9a-fA-F]{3,8}.*?<div class="ec-line ins">.*?<details[^>]*>.*?</details>.*?</figure>"#;

/// Titled frames followed by a marked line somewhere on the page
const MANY_BLOCKS_BODY: &str =
    r#".*?<span class="title">[^<]+</span>.*?<div class="ec-line mark">"#;

/// Built-in page shapes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    /// One code block with a collapsible section and inserted lines
    #[default]
    SingleBlock,
    /// Several labeled code blocks with exactly one marked line
    ManyBlocks,
}

impl std::str::FromStr for PatternKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-block" => Ok(Self::SingleBlock),
            "many-blocks" => Ok(Self::ManyBlocks),
            other => Err(format!(
                "unknown pattern '{}' (expected single-block or many-blocks)",
                other
            )),
        }
    }
}

/// A compiled page pattern plus literal occurrence counts it requires
#[derive(Debug, Clone)]
pub struct HtmlPattern {
    regex: Regex,
    exact_counts: Vec<(String, usize)>,
}

impl HtmlPattern {
    pub fn single_block() -> Self {
        Self {
            regex: compile_builtin(SINGLE_BLOCK_BODY),
            exact_counts: Vec::new(),
        }
    }

    pub fn many_blocks() -> Self {
        Self {
            regex: compile_builtin(MANY_BLOCKS_BODY),
            // regex has no lookaround, so "exactly one" is counted separately
            exact_counts: vec![(r#"<div class="ec-line mark">"#.to_string(), 1)],
        }
    }

    pub fn from_kind(kind: PatternKind) -> Self {
        match kind {
            PatternKind::SingleBlock => Self::single_block(),
            PatternKind::ManyBlocks => Self::many_blocks(),
        }
    }

    /// Compile a caller-supplied pattern. It must declare both the
    /// `styles` and `scripts` capture groups.
    pub fn custom(pattern: &str) -> Result<Self, ValidationError> {
        let regex = Regex::new(pattern).map_err(|e| ValidationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;

        for group in [STYLES_GROUP, SCRIPTS_GROUP] {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(ValidationError::InvalidPattern {
                    pattern: pattern.to_string(),
                    reason: format!("missing named group '{}'", group),
                });
            }
        }

        Ok(Self {
            regex,
            exact_counts: Vec::new(),
        })
    }

    /// Require `needle` to occur exactly `count` times in matching pages
    pub fn with_exact_count(mut self, needle: &str, count: usize) -> Self {
        self.exact_counts.push((needle.to_string(), count));
        self
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Match a page, returning its `(styles, scripts)` captures
    pub(super) fn captures<'h>(&self, html: &'h str) -> Result<(&'h str, &'h str), ValidationError> {
        let caps = self
            .regex
            .captures(html)
            .ok_or_else(|| ValidationError::StructureMismatch {
                pattern: self.as_str().to_string(),
                detail: "no match".to_string(),
            })?;

        for (needle, expected) in &self.exact_counts {
            let actual = html.matches(needle.as_str()).count();
            if actual != *expected {
                return Err(ValidationError::StructureMismatch {
                    pattern: self.as_str().to_string(),
                    detail: format!(
                        "expected {} occurrence(s) of {}, found {}",
                        expected, needle, actual
                    ),
                });
            }
        }

        let group = |name: &str| caps.name(name).map(|m| m.as_str()).unwrap_or("");
        Ok((group(STYLES_GROUP), group(SCRIPTS_GROUP)))
    }
}

impl Default for HtmlPattern {
    fn default() -> Self {
        Self::single_block()
    }
}

/// Built-in pattern sources are constants; a failure here is a programming error.
fn compile_builtin(body: &str) -> Regex {
    Regex::new(&format!("(?s){}{}{}", WRAPPER, INJECTED, body)).expect("Invalid built-in pattern")
}
