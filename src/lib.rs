// gemcommit - generate commit messages for staged changes with Google Gemini.
//
// Reads `git diff --cached`, asks Gemini for a few conventional-commit
// style candidates, lets the operator pick or edit one in the terminal, and
// commits with exactly that text.

pub mod config;
pub mod editor;
pub mod error;
pub mod git;
pub mod llm;
pub mod picker;
pub mod prompt;
pub mod ui;
pub mod workflow;

pub use error::{ConfigError, Error, GitError, LlmError, PromptError, UiError};
