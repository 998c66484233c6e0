//! Shared test utilities for integration and E2E tests.
//!
//! ## Usage
//!
//! Add `mod common;` to your test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file_store();
//!     fixture.command().arg("list").assert().success();
//! }
//! ```

use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::{Path, PathBuf};

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::chambers;
    pub use super::TestFixture;
}

/// Chamber documents used across tests.
#[allow(dead_code)]
pub mod chambers {
    /// Directory chamber enabling a flag for everything below it.
    pub const TEAMS: &str = r#"{
  "name": "teams",
  "rules": {
    "enabled": {"type": "boolean", "value": true},
    "timeout": {"type": "number", "value": 30}
  }
}"#;

    /// Leaf chamber with a version-scoped override.
    pub const SEARCH: &str = r#"{
  "name": "search",
  "rules": {
    "ranking": {
      "type": "string",
      "value": "classic",
      "overrides": [
        {"minimumVersion": "v2.0.0", "maximumVersion": "", "value": "neural"}
      ]
    }
  }
}"#;

    /// Overrides that overlap, rejected on decode.
    pub const OVERLAPPING: &str = r#"{
  "name": "broken",
  "rules": {
    "flag": {
      "type": "boolean",
      "value": false,
      "overrides": [
        {"minimumVersion": "1.0.0", "maximumVersion": "2.0.0", "value": true},
        {"minimumVersion": "1.5.0", "maximumVersion": "3.0.0", "value": true}
      ]
    }
  }
}"#;
}

/// A temporary directory holding a store configuration and its data.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `realm.yaml` with the given content.
    pub fn with_config(self, content: &str) -> Self {
        self.temp_dir
            .child("realm.yaml")
            .write_str(content)
            .expect("Failed to write config file");
        self
    }

    /// Configure an inheritable file store rooted at `data/`.
    pub fn with_file_store(self) -> Self {
        let config = format!(
            "storage: file\ninheritable: true\noptions:\n  path: {}\n",
            self.data_dir().display()
        );
        self.with_config(&config)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Root directory of the file store.
    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("realm.yaml")
    }

    /// Create a child path in the temp directory.
    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A `realm` command pointed at this fixture's configuration.
    pub fn command(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("realm");
        cmd.current_dir(self.path())
            .env_remove("RUST_LOG")
            .env("REALM_CONFIG", self.config_path());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
