// Git helpers for staged changes and commits.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use tracing::debug;

use crate::error::GitError;

/// Runs git in a fixed working directory.
#[derive(Debug, Clone)]
pub struct Git {
    workdir: PathBuf,
}

impl Git {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn ensure_repository(&self) -> Result<(), GitError> {
        let inside = self
            .command()
            .args(["rev-parse", "--is-inside-work-tree"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false);

        if inside {
            Ok(())
        } else {
            Err(GitError::NotARepository)
        }
    }

    pub fn staged_diff(&self) -> Result<String, GitError> {
        let output = self.run(&["diff", "--cached"], "diff --cached")?;
        let diff = String::from_utf8_lossy(&output.stdout).to_string();
        debug!(bytes = diff.len(), "read staged diff");
        Ok(diff)
    }

    /// Full message of HEAD, trimmed. Fails when the repository has no commits.
    pub fn last_commit_message(&self) -> Result<String, GitError> {
        let output = self.run(&["log", "-1", "--pretty=%B"], "log")?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Commits the staged changes with `message` exactly as given.
    pub fn commit(&self, message: &str) -> Result<(), GitError> {
        debug!(len = message.len(), "creating commit");

        let mut child = self
            .command()
            .args(["commit", "--cleanup=verbatim", "-F", "-"])
            .stdin(Stdio::piped())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|source| GitError::Spawn {
                operation: "commit",
                source,
            })?;

        let written = match child.stdin.take() {
            Some(mut stdin) => stdin.write_all(message.as_bytes()),
            None => Err(std::io::Error::other("failed to open git commit stdin")),
        };

        // Reap git before reporting a failed write; stdin is closed by now.
        let status = child.wait().map_err(|source| GitError::Spawn {
            operation: "commit",
            source,
        })?;
        written.map_err(GitError::Stdin)?;
        if !status.success() {
            return Err(GitError::CommitFailed(status));
        }

        Ok(())
    }

    fn command(&self) -> Command {
        let mut command = Command::new("git");
        command.current_dir(&self.workdir);
        command
    }

    fn run(&self, args: &[&str], operation: &'static str) -> Result<Output, GitError> {
        let output = self
            .command()
            .args(args)
            .output()
            .map_err(|source| GitError::Spawn { operation, source })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GitError::CommandFailed { operation, stderr });
        }

        Ok(output)
    }
}
