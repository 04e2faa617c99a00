//! Test harness utilities.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing_subscriber::EnvFilter;

/// Initialize a test-writer tracing subscriber. Safe to call from every
/// test; only the first call installs it.
///
/// # Example
///
/// ```rust,ignore
/// use vitrine_test::setup_test_logging;
///
/// #[test]
/// fn my_test() {
///     setup_test_logging("vitrine_modules=debug");
///     // ... test code
/// }
/// ```
pub fn setup_test_logging(filter: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_test_writer()
        .try_init();
}

/// Set up test logging with default filter (warn level).
pub fn setup_test_logging_default() {
    setup_test_logging("warn");
}

/// A temporary directory for config files and translation catalogs.
#[derive(Debug)]
pub struct TestContext {
    /// Temporary directory for the test.
    pub dir: TempDir,
}

impl TestContext {
    /// Create a new test context.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Create a file in the test directory.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Write `vitrine.toml` into the directory, which then serves as a user
    /// config directory.
    pub fn write_config(&self, content: &str) -> PathBuf {
        self.create_file(vitrine_config::CONFIG_FILE_NAME, content)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
