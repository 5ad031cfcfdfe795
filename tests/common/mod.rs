//! Common test utilities for tf integration tests.
//!
//! Provides `TestEnv` for isolated environments that don't touch the user's
//! `~/.trackflow/` directory.

#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with its own data directory.
///
/// The `tf()` method returns a `Command` that sets `TRACKFLOW_DIR` per
/// invocation and clears the other TrackFlow variables, so tests can run in
/// parallel.
pub struct TestEnv {
    pub data_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data_dir: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the tf binary acting as an admin named "Tester".
    pub fn tf(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_tf"));
        cmd.env("TRACKFLOW_DIR", self.data_dir.path());
        cmd.env("TRACKFLOW_USER", "Tester");
        cmd.env_remove("TRACKFLOW_BOARD");
        cmd.env_remove("TRACKFLOW_ROLE");
        cmd.env_remove("TRACKFLOW_LOG");
        cmd
    }

    pub fn data_path(&self) -> &Path {
        self.data_dir.path()
    }

    /// Contents of the saved board document.
    pub fn boards_json(&self) -> String {
        std::fs::read_to_string(self.data_path().join("boards.json")).unwrap()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
