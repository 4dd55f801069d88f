//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Get the path to a test fixture.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Read a fixture file as a string.
pub fn read_fixture(name: &str) -> String {
    let path = fixture(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to read fixture {:?}: {}", path, e))
}

/// A throwaway git repository driven through the git CLI.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Self { dir };
        repo.git(&["init", "--quiet"]);
        repo.git(&["config", "user.name", "Test User"]);
        repo.git(&["config", "user.email", "test@example.com"]);
        repo.git(&["config", "commit.gpgsign", "false"]);
        repo
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Run git in the repository and return stdout, panicking on failure.
    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    /// Write a file relative to the repository root.
    pub fn write(&self, name: &str, contents: &str) {
        fs::write(self.path().join(name), contents).expect("Failed to write file");
    }

    /// Write and stage a file.
    pub fn stage(&self, name: &str, contents: &str) {
        self.write(name, contents);
        self.git(&["add", name]);
    }

    /// Stage a file and commit it with `message`.
    pub fn commit_file(&self, name: &str, contents: &str, message: &str) {
        self.stage(name, contents);
        self.git(&["commit", "--quiet", "-m", message]);
    }

    /// Raw message of HEAD, exactly as stored in the commit object.
    pub fn head_message(&self) -> String {
        let raw = self.git(&["cat-file", "commit", "HEAD"]);
        let (_headers, message) = raw
            .split_once("\n\n")
            .expect("commit object has no message");
        message.to_string()
    }

    /// Number of commits reachable from HEAD (0 for an unborn branch).
    pub fn commit_count(&self) -> usize {
        let output = Command::new("git")
            .args(["rev-list", "--count", "HEAD"])
            .current_dir(self.path())
            .output()
            .expect("Failed to run git");
        if !output.status.success() {
            return 0;
        }
        String::from_utf8_lossy(&output.stdout).trim().parse().unwrap_or(0)
    }
}
