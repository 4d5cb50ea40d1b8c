//! Common test utilities for sprintly integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't pollute
//! the user's real data directory.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage.
///
/// Each `TestEnv` creates a temporary data directory and passes it to the
/// binary via `SPRY_DATA_DIR` per-invocation, making tests parallel-safe.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    /// Create a new test environment with an isolated data directory.
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Create a new test environment and initialize sprintly.
    pub fn init() -> Self {
        let env = Self::new();
        env.spry().args(["system", "init"]).assert().success();
        env
    }

    /// Get a Command for the spry binary with an isolated data directory.
    pub fn spry(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_spry"));
        cmd.env("SPRY_DATA_DIR", self.data_dir.path());
        cmd
    }

    /// Get the path to the data directory.
    pub fn data_path(&self) -> &std::path::Path {
        self.data_dir.path()
    }

    /// Write a file into the data directory and return its path.
    pub fn write_file(&self, name: &str, contents: &str) -> std::path::PathBuf {
        let path = self.data_path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Extract a field like `"id":"meta-..."` from a JSON output line.
    pub fn json_field(output: &[u8], field: &str) -> String {
        let text = String::from_utf8_lossy(output);
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        value[field]
            .as_str()
            .unwrap_or_else(|| panic!("field {} missing in {}", field, text))
            .to_string()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
