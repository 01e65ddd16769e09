//! Release listing over the GitHub REST API.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use super::model::Release;
use super::{build_http_client, request_error, API_VERSION, API_VERSION_HEADER, DEFAULT_API_BASE};
use crate::error::{FetchError, FetchResult};

/// Default timeout for metadata requests in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Media type for JSON metadata calls.
const GITHUB_JSON: &str = "application/vnd.github+json";

/// Client for listing a repository's releases.
#[derive(Debug, Clone)]
pub struct ReleaseClient {
    client: Client,
    token: Option<String>,
    base_url: String,
    pub(crate) timeout: Duration,
}

impl ReleaseClient {
    /// Create a client, authenticating with `token` when present.
    pub fn new(token: Option<String>) -> FetchResult<Self> {
        Self::with_timeout(token, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(token: Option<String>, timeout: Duration) -> FetchResult<Self> {
        Ok(Self {
            client: build_http_client(Some(timeout))?,
            token: token.filter(|t| !t.is_empty()),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout,
        })
    }

    /// Point the client at a different API root (used against mock servers).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// List all releases of `owner/repo`, newest first as GitHub orders them.
    pub async fn list_releases(&self, owner: &str, repo: &str) -> FetchResult<Vec<Release>> {
        let url = format!("{}/repos/{}/{}/releases", self.base_url, owner, repo);
        let releases: Vec<Release> = self.get_json(&url).await?;
        info!(owner, repo, count = releases.len(), "Fetched releases");
        Ok(releases)
    }

    /// Fetch the single release tagged `tag`.
    pub async fn release_by_tag(&self, owner: &str, repo: &str, tag: &str) -> FetchResult<Release> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.base_url, owner, repo, tag
        );
        let release: Release = self.get_json(&url).await?;
        info!(owner, repo, tag, assets = release.assets.len(), "Fetched release");
        Ok(release)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> FetchResult<T> {
        debug!(url, authenticated = self.token.is_some(), "GET");

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, GITHUB_JSON)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| request_error(url, Some(self.timeout), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| request_error(url, Some(self.timeout), e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}
