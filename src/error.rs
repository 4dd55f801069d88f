// Error types for gemcommit modules using thiserror.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from reading, writing or validating the stored credential.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the home directory")]
    NoHomeDirectory,

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("API key cannot be empty")]
    EmptyKey,

    #[error(
        "Invalid API key format. Google AI API keys should start with 'AIza' and be 39 characters long."
    )]
    InvalidKeyFormat,

    #[error("API key not configured. Please run 'gemcommit --config' to set your API key")]
    MissingKey,
}

/// Errors from shelling out to git.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("current directory is not a git repository")]
    NotARepository,

    #[error("failed to run git {operation}: {source}")]
    Spawn {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    CommandFailed {
        operation: &'static str,
        stderr: String,
    },

    #[error("failed to pass commit message to git: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("git commit failed with {0}")]
    CommitFailed(std::process::ExitStatus),
}

/// Errors from the embedded prompt definition.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("Failed to parse prompt definition: {0}")]
    Parse(#[source] serde_yaml::Error),

    #[error("Invalid prompt definition: {0}")]
    Invalid(String),
}

/// Errors from the Gemini API call and response parsing.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to generate content: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Gemini returned an unreadable response: {0}")]
    InvalidResponse(#[source] reqwest::Error),

    #[error("no content generated")]
    EmptyResponse,

    #[error("expected {expected} messages, got {actual}")]
    TooFewCandidates { expected: usize, actual: usize },
}

/// Errors from the interactive picker and editor.
#[derive(Error, Debug)]
pub enum UiError {
    #[error("an interactive terminal is required to pick a commit message (use --dry-run to only print candidates)")]
    NotATerminal,

    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),

    #[error("selection cancelled")]
    Cancelled,

    #[error("commit message is empty")]
    EmptyMessage,
}

/// Top-level error for a gemcommit run.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Ui(#[from] UiError),

    #[error("No staged changes found. Please stage your changes using 'git add' first.")]
    NoStagedChanges,

    #[error("failed to read input: {0}")]
    Input(#[source] std::io::Error),
}
