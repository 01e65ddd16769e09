//! GitHub REST plumbing: release listing, URL parsing and shared HTTP setup.
//!
//! - `model`: serde records for releases and assets
//! - `client`: release listing over the REST API
//! - `url`: `https://github.com/<owner>/<repo>/releases[/tag/<tag>]` parsing

mod client;
mod model;
mod url;

use std::time::Duration;

use reqwest::Client;

use crate::error::{FetchError, FetchResult};

pub use client::ReleaseClient;
pub use model::{Asset, Release};
pub use url::ReleaseUrl;

/// Value of the `X-GitHub-Api-Version` header sent with every request.
pub const API_VERSION: &str = "2022-11-28";

/// Header name for the pinned REST API version.
pub const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";

/// Default REST API endpoint.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Build the async HTTP client shared by listing and transfers.
///
/// GitHub rejects requests without a user agent, so one is always set.
pub(crate) fn build_http_client(timeout: Option<Duration>) -> FetchResult<Client> {
    let mut builder = Client::builder().user_agent(concat!("afetch/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(|e| FetchError::Network {
        url: String::new(),
        reason: format!("failed to create HTTP client: {}", e),
    })
}

/// Classify a reqwest failure as a timeout or a generic network error.
pub(crate) fn request_error(url: &str, timeout: Option<Duration>, err: reqwest::Error) -> FetchError {
    match timeout {
        Some(t) if err.is_timeout() => FetchError::Timeout {
            url: url.to_string(),
            timeout_secs: t.as_secs(),
        },
        _ => FetchError::Network {
            url: url.to_string(),
            reason: err.to_string(),
        },
    }
}
