//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Scratch workspace with the two-skill, two-modality schema config
/// (`Notfall`, `Gyn` × `ct`, `mr`) copied in.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::copy(fixture_path("schema.toml"), dir.path().join("roster-tool.toml")).unwrap();
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Copy a fixture into the workspace under `name`
    pub fn add_fixture(&self, fixture: &str, name: &str) -> PathBuf {
        let target = self.path(name);
        fs::copy(fixture_path(fixture), &target).unwrap();
        target
    }

    pub fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let target = self.path(name);
        fs::write(&target, content).unwrap();
        target
    }

    pub fn read(&self, name: &str) -> String {
        fs::read_to_string(self.path(name)).unwrap()
    }

    /// The binary, run inside the workspace with a clean environment
    pub fn cmd(&self) -> Command {
        roster_cmd(self.dir.path())
    }
}

/// Get a command for the roster-tool binary running in `dir`
pub fn roster_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("roster-tool").unwrap();
    cmd.current_dir(dir)
        .env_remove("ROSTER_CONFIG")
        .env_remove("ROSTER_FILE")
        .env_remove("ROSTER_SCHEMA_SOURCE")
        .env_remove("ROSTER_LOG_LEVEL")
        .env_remove("ROSTER_LOG_FILE")
        .env_remove("ROSTER_LOG_JSON")
        .env_remove("RUST_LOG");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixtures_dir_exists() {
        assert!(fixtures_dir().exists(), "Fixtures directory should exist");
    }

    #[test]
    fn test_roster_fixture_exists() {
        assert!(fixture_path("roster.json").exists(), "Roster fixture should exist");
    }
}
