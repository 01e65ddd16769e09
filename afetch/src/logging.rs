//! Log file setup.
//!
//! The terminal belongs to the UI, so logs go to `afetch.log` through a
//! non-blocking writer. Filtering follows `AFETCH_LOG` (an `EnvFilter`
//! directive string) and defaults to `afetch=info`.

use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::error::{FetchError, FetchResult};

/// Environment variable holding filter directives.
pub const LOG_ENV_VAR: &str = "AFETCH_LOG";

/// Log file name inside the log directory.
pub const LOG_FILE_NAME: &str = "afetch.log";

/// Flushes buffered log lines when dropped; keep it alive until exit.
pub type LogGuard = WorkerGuard;

/// Logging options.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Directory for `afetch.log`; defaults to [`default_log_dir`].
    pub log_dir: Option<PathBuf>,
    /// Raise the default level to debug.
    pub verbose: bool,
}

impl LoggingConfig {
    fn default_directive(&self) -> &'static str {
        if self.verbose {
            "afetch=debug"
        } else {
            "afetch=info"
        }
    }
}

/// Per-user cache directory for logs, falling back to the current directory.
pub fn default_log_dir() -> PathBuf {
    dirs::cache_dir()
        .map(|d| d.join("afetch"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a subscriber is already set.
pub fn init_logging(config: LoggingConfig) -> FetchResult<LogGuard> {
    let log_dir = config.log_dir.clone().unwrap_or_else(default_log_dir);
    fs::create_dir_all(&log_dir).map_err(|e| FetchError::file_system(&log_dir, e))?;

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.default_directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_timer(LocalTime::rfc_3339())
                .with_target(true),
        )
        .try_init()
        .map_err(|e| FetchError::Logging(e.to_string()))?;

    tracing::debug!(dir = %log_dir.display(), "Logging initialised");
    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(LoggingConfig::default().default_directive(), "afetch=info");
        let verbose = LoggingConfig {
            verbose: true,
            ..Default::default()
        };
        assert_eq!(verbose.default_directive(), "afetch=debug");
    }

    #[test]
    fn test_default_log_dir_ends_with_afetch() {
        let dir = default_log_dir();
        assert!(dir.ends_with("afetch") || dir == PathBuf::from("."));
    }
}
