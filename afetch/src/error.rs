//! Error types for afetch.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for afetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur while listing releases or downloading assets.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No configuration file exists in any search location.
    #[error("configuration file not found in {}", join_paths(.searched))]
    ConfigNotFound { searched: Vec<PathBuf> },

    /// Configuration is unreadable, malformed, or incomplete.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport-level failure talking to a remote host.
    #[error("network error for {url}: {reason}")]
    Network { url: String, reason: String },

    /// Request exceeded the client timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// Server answered with a non-success status.
    #[error("HTTP error: {code}")]
    HttpStatus { url: String, code: u16 },

    /// Response body could not be decoded.
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Local file operation failed.
    #[error("file system error at {}: {source}", .path.display())]
    FileSystem { path: PathBuf, source: io::Error },

    /// Transfer aborted by the user.
    #[error("download cancelled by user")]
    Cancelled,

    /// Downloaded bytes do not hash to the published digest.
    #[error("checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        filename: String,
        expected: String,
        actual: String,
    },

    /// Digest is not `<algorithm>:<hex>` with a supported algorithm.
    #[error("invalid digest format: {0}")]
    InvalidDigestFormat(String),

    /// Mask filtering left nothing to download.
    #[error("artifacts not found (mask: {mask})")]
    NoAssetsMatched { mask: String },

    /// Asset name is not a plain file name.
    #[error("refusing to write unsafe file name: {0:?}")]
    UnsafeFileName(String),

    /// GitHub releases URL could not be understood.
    #[error("invalid releases URL: {0}")]
    InvalidUrl(String),

    /// Tracing subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}

impl FetchError {
    /// Returns true if this error represents a user interrupt rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, FetchError::Cancelled)
    }

    pub(crate) fn file_system(path: impl Into<PathBuf>, source: io::Error) -> Self {
        FetchError::FileSystem {
            path: path.into(),
            source,
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" or ")
}
