//! afetch - browse and download GitHub release assets.
//!
//! This library provides the pieces behind the `afetch` command:
//!
//! - [`github`]: release listing over the REST API and releases URL parsing
//! - [`catalog`]: display-ready asset descriptors and mask filtering
//! - [`download`]: streaming transfers, digest verification and the download queue
//! - [`session`]: the state machine driving release choice, asset choice and downloads
//! - [`config`]: `afetch.conf` loading
//! - [`logging`]: log file setup
//!
//! # Example
//!
//! ```ignore
//! use afetch::github::ReleaseClient;
//! use afetch::session::{run_transfers, Intent, Session};
//! use afetch::download::TransferEngine;
//! use tokio_util::sync::CancellationToken;
//!
//! let client = ReleaseClient::new(None)?;
//! let release = client.release_by_tag("octo", "tool", "v1.0").await?;
//! let mut session = Session::from_release(&release);
//! session.list_mut().select_all();
//! let first = session.handle(Intent::Select);
//!
//! let engine = TransferEngine::new(None)?;
//! run_transfers(&mut session, &engine, first, CancellationToken::new(), |_| {}).await;
//! println!("{}", session.result().unwrap().summary);
//! ```

pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod format;
pub mod github;
pub mod logging;
pub mod session;

pub use error::{FetchError, FetchResult};

/// Crate version, as reported by `afetch --version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
