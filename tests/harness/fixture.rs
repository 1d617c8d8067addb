//! Fixture copies for integration tests

use ecverify::FixtureDescriptor;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A private copy of tests/fixtures, so builds never race on a shared
/// output directory or dirty the source tree
pub struct Fixtures {
    root: PathBuf,
    _temp_dir: Option<TempDir>,
}

impl Fixtures {
    /// Copy every fixture into a fresh temp directory
    pub fn copy() -> Self {
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        assert!(source.exists(), "Fixtures not found: {}", source.display());

        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        copy_dir_recursive(&source, temp_dir.path()).expect("Failed to copy fixtures");

        Self {
            root: temp_dir.path().to_path_buf(),
            _temp_dir: Some(temp_dir),
        }
    }

    /// Copy every fixture into a fixed per-group directory under cargo's
    /// target tmpdir.
    ///
    /// For copies held in a `static`, which is never dropped. The previous
    /// run's copy is replaced, so nothing accumulates in the system temp dir.
    pub fn shared(group: &str) -> Self {
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures");
        let root = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join(format!("fixtures-{}", group));

        if root.exists() {
            fs::remove_dir_all(&root).expect("Failed to remove previous fixture copy");
        }
        copy_dir_recursive(&source, &root).expect("Failed to copy fixtures");

        Self {
            root,
            _temp_dir: None,
        }
    }

    /// Path to a fixture (or any file) inside the copy
    pub fn path(&self, name: &str) -> PathBuf {
        let path = self.root.join(name);
        assert!(path.exists(), "Fixture not found: {}", name);
        path
    }

    /// Descriptor building a fixture with its `build.sh`
    pub fn descriptor(&self, name: &str) -> FixtureDescriptor {
        FixtureDescriptor::new(self.path(name), "sh", ["build.sh"])
    }
}

/// Recursively copy a directory, leaving out previous build output
fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            if entry.file_name() == "dist" {
                continue;
            }
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }

    Ok(())
}
