//! CLI error type.

use std::io;

use afetch::FetchError;
use thiserror::Error;

/// Errors that end the process with a non-zero exit code.
#[derive(Debug, Error)]
pub enum CliError {
    /// Missing or unusable settings.
    #[error("{0}")]
    Config(String),

    /// The release listing request was answered with an error status.
    #[error("GitHub API error: {0}")]
    GitHubApi(u16),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Terminal setup, drawing, or input failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),

    /// Async runtime could not be created.
    #[error("runtime error: {0}")]
    Runtime(String),
}

impl CliError {
    /// Classify an error from the release listing step.
    pub fn from_listing(err: FetchError) -> Self {
        match err {
            FetchError::HttpStatus { code, .. } => CliError::GitHubApi(code),
            other => CliError::Fetch(other),
        }
    }
}
