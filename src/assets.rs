//! Asset directory listings
//!
//! The highlighter emits `ec.<hash>.css` and `ec.<hash>.js` next to the
//! framework's own hashed assets (e.g. `logo.<hash>.svg`).

use serde::Serialize;

/// Counts of recognised files in an asset directory
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AssetCounts {
    pub stylesheets: usize,
    pub scripts: usize,
    pub logos: usize,
}

impl AssetCounts {
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Self {
        let mut counts = Self::default();
        for name in entries.iter().map(|s| s.as_ref()) {
            if is_ec_asset(name, "css") {
                counts.stylesheets += 1;
            } else if is_ec_asset(name, "js") {
                counts.scripts += 1;
            } else if is_logo(name) {
                counts.logos += 1;
            }
        }
        counts
    }
}

/// `ec.<hash>.<ext>` with a non-empty hash
pub fn is_ec_asset(name: &str, ext: &str) -> bool {
    name.strip_prefix("ec.")
        .and_then(|rest| rest.strip_suffix(ext))
        .and_then(|rest| rest.strip_suffix('.'))
        .is_some_and(|hash| !hash.is_empty())
}

fn is_logo(name: &str) -> bool {
    name.strip_prefix("logo.").is_some_and(|rest| !rest.is_empty())
}

/// Entries matching `ec.*.<ext>`, for error messages
pub fn ec_assets<'a, S: AsRef<str>>(entries: &'a [S], ext: &'a str) -> Vec<&'a str> {
    entries
        .iter()
        .map(|s| s.as_ref())
        .filter(|name| is_ec_asset(name, ext))
        .collect()
}
