//! Test harness utilities for backstop integration tests.
//!
//! Provides an isolated store document per test and a command builder
//! scrubbed of ambient configuration.

use std::path::PathBuf;
use std::process::Output;

use assert_cmd::Command;
use tempfile::TempDir;

/// Test environment with an isolated store document.
pub struct TestEnv {
    /// Temporary directory holding the store document
    pub dir: TempDir,
    project: String,
    environment: String,
}

impl TestEnv {
    /// Create a new test environment scoped to (PJT, ENV).
    pub fn new() -> Self {
        Self::scoped("PJT", "ENV")
    }

    /// Create a new test environment with an explicit scope.
    pub fn scoped(project: &str, environment: &str) -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        Self {
            dir,
            project: project.to_string(),
            environment: environment.to_string(),
        }
    }

    /// Path of the store document inside the temp directory.
    pub fn store_path(&self) -> PathBuf {
        self.dir.path().join("store.json")
    }

    /// Create a backstop command with ambient config scrubbed.
    ///
    /// Returns a Command configured with:
    /// - NO_COLOR for deterministic output
    /// - BACKSTOP_*/ENVIRONMENT cleared so host settings cannot leak
    /// - the default project/environment/store flags applied
    pub fn cmd(&self) -> Command {
        self.cmd_scoped(&self.project, &self.environment)
    }

    /// Like [`cmd`](Self::cmd) with a different scope for this call.
    pub fn cmd_scoped(&self, project: &str, environment: &str) -> Command {
        let mut cmd = Command::cargo_bin("backstop").expect("failed to find backstop binary");
        cmd.env("NO_COLOR", "1");
        cmd.env_remove("BACKSTOP_PROJECT");
        cmd.env_remove("BACKSTOP_STORE");
        cmd.env_remove("BACKSTOP_LOG");
        cmd.env_remove("ENVIRONMENT");
        cmd.current_dir(self.dir.path());
        cmd.args([
            "--project",
            project,
            "--environment",
            environment,
            "--store",
        ]);
        cmd.arg(self.store_path());
        cmd
    }

    /// Shortcut for `backstop set [-t KIND] KEY VALUE`.
    pub fn set(&self, key: &str, value: &str, kind: Option<&str>) -> Output {
        let mut cmd = self.cmd();
        if let Some(kind) = kind {
            cmd.args(["set", "-t", kind, key, value]);
        } else {
            cmd.args(["set", key, value]);
        }
        cmd.output().expect("failed to run backstop set")
    }
}
