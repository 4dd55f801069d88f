// Staged diff to candidate messages, independent of git and the network.

use tracing::{debug, warn};

use crate::error::{Error, GitError, LlmError};
use crate::git::Git;
use crate::llm::Client;

/// Where the staged diff and previous commit message come from.
#[cfg_attr(test, mockall::automock)]
pub trait DiffSource {
    fn staged_diff(&self) -> Result<String, GitError>;
    fn last_commit_message(&self) -> Result<String, GitError>;
}

/// Produces candidate commit messages for a diff.
#[cfg_attr(test, mockall::automock)]
pub trait CandidateGenerator {
    fn generate(&self, diff: &str, last_message: &str) -> Result<Vec<String>, LlmError>;
}

impl DiffSource for Git {
    fn staged_diff(&self) -> Result<String, GitError> {
        Git::staged_diff(self)
    }

    fn last_commit_message(&self) -> Result<String, GitError> {
        Git::last_commit_message(self)
    }
}

impl CandidateGenerator for Client {
    fn generate(&self, diff: &str, last_message: &str) -> Result<Vec<String>, LlmError> {
        self.generate_candidates(diff, last_message)
    }
}

/// Reads the staged diff and asks `generator` for candidates.
///
/// An empty diff stops here, before any request is made.
pub fn collect_candidates(
    source: &impl DiffSource,
    generator: &impl CandidateGenerator,
) -> Result<Vec<String>, Error> {
    let diff = source.staged_diff()?;
    if diff.trim().is_empty() {
        return Err(Error::NoStagedChanges);
    }

    let last_message = source.last_commit_message().unwrap_or_else(|err| {
        warn!("Could not get last commit message: {err}");
        String::new()
    });

    let candidates = generator.generate(&diff, &last_message)?;
    debug!(count = candidates.len(), "generated candidates");
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn three() -> Vec<String> {
        vec!["feat: a".into(), "fix: b".into(), "docs: c".into()]
    }

    #[test]
    fn test_empty_diff_skips_generator() {
        let mut source = MockDiffSource::new();
        source
            .expect_staged_diff()
            .times(1)
            .returning(|| Ok(String::new()));
        source.expect_last_commit_message().never();

        let mut generator = MockCandidateGenerator::new();
        generator.expect_generate().never();

        let err = collect_candidates(&source, &generator).unwrap_err();
        assert!(matches!(err, Error::NoStagedChanges));
    }

    #[test]
    fn test_whitespace_diff_counts_as_empty() {
        let mut source = MockDiffSource::new();
        source
            .expect_staged_diff()
            .returning(|| Ok("\n  \n".to_string()));

        let mut generator = MockCandidateGenerator::new();
        generator.expect_generate().never();

        assert!(matches!(
            collect_candidates(&source, &generator),
            Err(Error::NoStagedChanges)
        ));
    }

    #[test]
    fn test_diff_and_last_message_are_passed_through() {
        let mut source = MockDiffSource::new();
        source
            .expect_staged_diff()
            .returning(|| Ok("+fn main() {}\n".to_string()));
        source
            .expect_last_commit_message()
            .returning(|| Ok("chore: init".to_string()));

        let mut generator = MockCandidateGenerator::new();
        generator
            .expect_generate()
            .with(eq("+fn main() {}\n"), eq("chore: init"))
            .times(1)
            .returning(|_, _| Ok(three()));

        assert_eq!(collect_candidates(&source, &generator).unwrap(), three());
    }

    #[test]
    fn test_missing_history_falls_back_to_empty_message() {
        let mut source = MockDiffSource::new();
        source
            .expect_staged_diff()
            .returning(|| Ok("+x\n".to_string()));
        source.expect_last_commit_message().returning(|| {
            Err(GitError::CommandFailed {
                operation: "log",
                stderr: "fatal: your current branch 'main' does not have any commits yet".into(),
            })
        });

        let mut generator = MockCandidateGenerator::new();
        generator
            .expect_generate()
            .with(eq("+x\n"), eq(""))
            .times(1)
            .returning(|_, _| Ok(three()));

        assert!(collect_candidates(&source, &generator).is_ok());
    }

    #[test]
    fn test_diff_failure_is_fatal() {
        let mut source = MockDiffSource::new();
        source.expect_staged_diff().returning(|| {
            Err(GitError::CommandFailed {
                operation: "diff --cached",
                stderr: "boom".into(),
            })
        });

        let mut generator = MockCandidateGenerator::new();
        generator.expect_generate().never();

        assert!(matches!(
            collect_candidates(&source, &generator),
            Err(Error::Git(_))
        ));
    }

    #[test]
    fn test_generator_error_propagates() {
        let mut source = MockDiffSource::new();
        source
            .expect_staged_diff()
            .returning(|| Ok("+x\n".to_string()));
        source
            .expect_last_commit_message()
            .returning(|| Ok(String::new()));

        let mut generator = MockCandidateGenerator::new();
        generator.expect_generate().returning(|_, _| {
            Err(LlmError::TooFewCandidates {
                expected: 3,
                actual: 1,
            })
        });

        assert!(matches!(
            collect_candidates(&source, &generator),
            Err(Error::Llm(LlmError::TooFewCandidates { .. }))
        ));
    }
}
