//! Sequential asset downloads.
//!
//! This module provides:
//! - Streaming single-asset transfers with cancellation (`transfer`)
//! - SHA-256/SHA-512 digest verification (`checksum`)
//! - The forward-only download queue (`queue`)
//! - Progress snapshots and the poll ticker (`progress`)
//!
//! # Architecture
//!
//! ```text
//! Session
//!    │
//!    ├── DownloadQueue (assets + progress, one cursor)
//!    │
//!    ├── ProgressWatcher ◄── watch ── ProgressReporter
//!    │                                      │
//!    └── TransferEngine::transfer(asset, cancel, reporter)
//!                │
//!                └── verify_checksum (after the file is written)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use afetch::download::{progress_channel, TransferEngine};
//! use tokio_util::sync::CancellationToken;
//!
//! let engine = TransferEngine::new(None)?;
//! let (reporter, watcher) = progress_channel();
//! let report = engine.transfer(asset, CancellationToken::new(), reporter).await?;
//! println!("{} bytes at {}", report.size, report.path.display());
//! ```

mod checksum;
mod progress;
mod queue;
mod transfer;

pub use checksum::{calculate_file_checksum, verify_checksum, DigestAlgorithm, ExpectedDigest};
pub use progress::{
    progress_channel, ProgressReporter, ProgressTicker, ProgressWatcher, TransferProgress,
    DEFAULT_POLL_INTERVAL,
};
pub use queue::{DownloadProgress, DownloadQueue};
pub use transfer::{TransferEngine, TransferReport};
