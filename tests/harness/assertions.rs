//! Custom assertions for ecverify integration tests

use super::RunResult;
use ecverify::assets::AssetCounts;
use ecverify::validate::{self, PageMatch, ValidationOptions};
use ecverify::BuiltSite;

/// Assertions on a built fixture
pub trait SiteAssertions {
    /// Assert a page validates, returning what it matched
    fn assert_valid_page(&self, path: &str, options: &ValidationOptions) -> PageMatch;

    /// Assert exact `ec.*.css` / `ec.*.js` counts in an asset directory
    fn assert_ec_assets(&self, dir: &str, stylesheets: usize, scripts: usize);

    /// Assert a page has `components` code blocks and only the first
    /// carries injected markup
    fn assert_injected_once(&self, path: &str, components: usize);
}

impl SiteAssertions for BuiltSite {
    fn assert_valid_page(&self, path: &str, options: &ValidationOptions) -> PageMatch {
        let html = self
            .read_file(path)
            .unwrap_or_else(|e| panic!("Could not read {}: {}", path, e));

        validate::validate_html(&html, options)
            .unwrap_or_else(|e| panic!("{} failed validation: {}\nHTML:\n{}", path, e, html))
    }

    fn assert_ec_assets(&self, dir: &str, stylesheets: usize, scripts: usize) {
        let entries = self
            .read_dir(dir)
            .unwrap_or_else(|e| panic!("Could not list {}: {}", dir, e));
        let counts = AssetCounts::from_entries(&entries);

        assert_eq!(
            (counts.stylesheets, counts.scripts),
            (stylesheets, scripts),
            "Expected {} ec.*.css and {} ec.*.js in {}, got: {:?}",
            stylesheets,
            scripts,
            dir,
            entries
        );
    }

    fn assert_injected_once(&self, path: &str, components: usize) {
        let html = self
            .read_file(path)
            .unwrap_or_else(|e| panic!("Could not read {}: {}", path, e));

        if let Err(e) = validate::check_first_block_only(&html, components) {
            panic!("{} injected markup check failed: {}\nHTML:\n{}", path, e, html);
        }
    }
}

/// Assertions on an ecverify CLI run
pub trait RunAssertions {
    /// Assert command succeeded
    fn assert_success(&self);

    /// Assert command failed
    fn assert_failure(&self);

    /// Assert that the command failed and its output contains a message
    fn assert_error_contains(&self, message: &str);
}

impl RunAssertions for RunResult {
    fn assert_success(&self) {
        assert!(
            self.success(),
            "Expected success (exit 0), got exit {}:\nstdout: {}\nstderr: {}",
            self.exit_code,
            self.stdout,
            self.stderr
        );
    }

    fn assert_failure(&self) {
        assert!(
            !self.success(),
            "Expected failure (non-zero exit), got exit 0:\nstdout: {}\nstderr: {}",
            self.stdout,
            self.stderr
        );
    }

    fn assert_error_contains(&self, message: &str) {
        assert!(
            !self.success() && self.output_contains(message),
            "Expected error containing '{}', got:\nexit: {}\nstdout: {}\nstderr: {}",
            message,
            self.exit_code,
            self.stdout,
            self.stderr
        );
    }
}
