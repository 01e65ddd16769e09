//! Single-asset HTTP transfer with cancellation and digest verification.
//!
//! The engine never keeps state between calls: it receives an
//! [`AssetDescriptor`] by value, streams the body to `<output_dir>/<name>`,
//! publishes cumulative byte counts through a [`ProgressReporter`], and returns
//! the on-disk size. Any failure after the file was created removes it.

use std::io;
use std::path::{Component, Path, PathBuf};

use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::checksum::{verify_checksum, ExpectedDigest};
use super::progress::ProgressReporter;
use crate::catalog::AssetDescriptor;
use crate::error::{FetchError, FetchResult};
use crate::github::{build_http_client, request_error, API_VERSION, API_VERSION_HEADER};

/// Buffer size for writing downloaded bytes (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Media type requesting the raw asset bytes instead of JSON metadata.
const OCTET_STREAM: &str = "application/octet-stream";

/// Result of a completed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReport {
    /// Where the asset was written.
    pub path: PathBuf,
    /// Size on disk, from a filesystem stat.
    pub size: u64,
}

/// Streams release assets to local files.
#[derive(Debug, Clone)]
pub struct TransferEngine {
    client: Client,
    token: Option<String>,
    output_dir: PathBuf,
}

impl TransferEngine {
    /// Create an engine writing to the current directory. Transfers have no
    /// overall deadline.
    pub fn new(token: Option<String>) -> FetchResult<Self> {
        Ok(Self {
            client: build_http_client(None)?,
            token: token.filter(|t| !t.is_empty()),
            output_dir: PathBuf::from("."),
        })
    }

    /// Write downloaded files into `dir` instead of the current directory.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download one asset.
    ///
    /// # Errors
    ///
    /// - `UnsafeFileName` if the asset name is not a plain file name
    /// - `InvalidDigestFormat` if the published digest cannot be parsed
    /// - `Cancelled` if `cancel` fires before or during the transfer
    /// - `HttpStatus`, `Network` or `Timeout` for request failures
    /// - `FileSystem` for local write failures
    /// - `ChecksumMismatch` if the written bytes do not match the digest
    ///
    /// No file is left behind on error.
    pub async fn transfer(
        &self,
        asset: AssetDescriptor,
        cancel: CancellationToken,
        progress: ProgressReporter,
    ) -> FetchResult<TransferReport> {
        let file_name = safe_file_name(&asset.name)?;
        let expected = asset
            .digest
            .as_deref()
            .map(str::parse::<ExpectedDigest>)
            .transpose()?;

        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let dest = self.output_dir.join(file_name);
        info!(asset = %asset.name, url = %asset.url, dest = %dest.display(), "Starting transfer");

        let response = self.send(&asset, &cancel).await?;
        let total = if asset.size > 0 {
            asset.size
        } else {
            response.content_length().unwrap_or(0)
        };
        progress.report(0, total);

        if let Err(e) = self
            .stream_to_file(response, &asset.url, &dest, total, &cancel, &progress)
            .await
        {
            remove_partial(&dest).await;
            return Err(e);
        }

        if let Some(expected) = expected {
            if let Err(e) = verify_in_background(&dest, expected).await {
                remove_partial(&dest).await;
                return Err(e);
            }
            debug!(dest = %dest.display(), "Checksum verified");
        }

        let size = fs::metadata(&dest)
            .await
            .map_err(|e| FetchError::file_system(&dest, e))?
            .len();

        info!(asset = %asset.name, size, "Transfer complete");
        Ok(TransferReport { path: dest, size })
    }

    /// Issue the GET request, racing it against cancellation.
    async fn send(&self, asset: &AssetDescriptor, cancel: &CancellationToken) -> FetchResult<Response> {
        let mut request = self
            .client
            .get(&asset.url)
            .header(ACCEPT, OCTET_STREAM)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(ref token) = self.token {
            request = request.bearer_auth(token);
        }

        let response = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            result = request.send() => {
                result.map_err(|e| request_error(&asset.url, None, e))?
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                url: asset.url.clone(),
                code: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// Copy the response body into `dest`, reporting progress after every chunk.
    async fn stream_to_file(
        &self,
        response: Response,
        url: &str,
        dest: &Path,
        total: u64,
        cancel: &CancellationToken,
        progress: &ProgressReporter,
    ) -> FetchResult<()> {
        let file = File::create(dest)
            .await
            .map_err(|e| FetchError::file_system(dest, e))?;
        let mut writer = BufWriter::with_capacity(BUFFER_SIZE, file);
        let mut stream = response.bytes_stream();
        let mut downloaded: u64 = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(FetchError::Cancelled),
                next = stream.next() => next,
            };
            let Some(chunk) = next else {
                break;
            };
            let chunk = chunk.map_err(|e| request_error(url, None, e))?;

            writer
                .write_all(&chunk)
                .await
                .map_err(|e| FetchError::file_system(dest, e))?;
            downloaded += chunk.len() as u64;
            progress.report(downloaded, total);
        }

        writer
            .flush()
            .await
            .map_err(|e| FetchError::file_system(dest, e))?;
        Ok(())
    }
}

/// Accept `name` only if it is a single normal path component.
fn safe_file_name(name: &str) -> FetchResult<&str> {
    let unsafe_name = || FetchError::UnsafeFileName(name.to_string());

    if name.is_empty() || name.contains(['/', '\\', '\0']) {
        return Err(unsafe_name());
    }
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(unsafe_name()),
    }
}

async fn verify_in_background(dest: &Path, expected: ExpectedDigest) -> FetchResult<()> {
    let path = dest.to_path_buf();
    tokio::task::spawn_blocking(move || verify_checksum(&path, &expected))
        .await
        .map_err(|e| FetchError::file_system(dest, io::Error::other(e.to_string())))?
}

/// Best-effort removal of a partial or rejected file.
async fn remove_partial(dest: &Path) {
    match fs::remove_file(dest).await {
        Ok(()) => debug!(dest = %dest.display(), "Removed partial file"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(dest = %dest.display(), error = %e, "Failed to remove partial file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::progress_channel;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    const HELLO_SHA256: &str = "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824";

    fn asset(name: &str, url: String, size: u64, digest: Option<&str>) -> AssetDescriptor {
        AssetDescriptor {
            id: 7,
            name: name.to_string(),
            url,
            browser_download_url: String::new(),
            size,
            release_tag: "v1".to_string(),
            release_name: "v1".to_string(),
            created_at: String::new(),
            formatted_date: String::new(),
            size_label: String::new(),
            digest: digest.map(str::to_string),
            label: name.to_string(),
        }
    }

    fn engine(temp: &TempDir, token: Option<&str>) -> TransferEngine {
        TransferEngine::new(token.map(str::to_string))
            .unwrap()
            .with_output_dir(temp.path())
    }

    #[test]
    fn test_safe_file_name() {
        assert!(safe_file_name("tool-1.0.tar.gz").is_ok());
        assert!(safe_file_name(".hidden").is_ok());
        for bad in ["", ".", "..", "../x", "a/b", "a\\b", "/etc/passwd", "nul\0"] {
            assert!(
                matches!(safe_file_name(bad), Err(FetchError::UnsafeFileName(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[tokio::test]
    async fn test_transfer_writes_file_with_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/assets/7")
            .match_header("accept", OCTET_STREAM)
            .match_header("authorization", "Bearer secret")
            .match_header("x-github-api-version", API_VERSION)
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let (reporter, watcher) = progress_channel();
        let report = engine(&temp, Some("secret"))
            .transfer(
                asset("hello.txt", format!("{}/assets/7", server.url()), 0, None),
                CancellationToken::new(),
                reporter,
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(report.size, 5);
        assert_eq!(report.path, temp.path().join("hello.txt"));
        assert_eq!(std::fs::read(&report.path).unwrap(), b"hello");
        assert_eq!(watcher.snapshot().downloaded, 5);
        assert_eq!(watcher.snapshot().total, 5);
    }

    #[tokio::test]
    async fn test_transfer_without_token_sends_no_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/assets/7")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("x")
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        engine(&temp, None)
            .transfer(
                asset("x.bin", format!("{}/assets/7", server.url()), 1, None),
                CancellationToken::new(),
                reporter,
            )
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transfer_http_error_creates_no_file() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/assets/7")
            .with_status(404)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        let result = engine(&temp, None)
            .transfer(
                asset("missing.zip", format!("{}/assets/7", server.url()), 10, None),
                CancellationToken::new(),
                reporter,
            )
            .await;

        assert!(matches!(result, Err(FetchError::HttpStatus { code: 404, .. })));
        assert!(!temp.path().join("missing.zip").exists());
    }

    #[tokio::test]
    async fn test_transfer_verifies_digest() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/assets/7")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        let digest = format!("sha256:{}", HELLO_SHA256);
        let report = engine(&temp, None)
            .transfer(
                asset("hello.txt", format!("{}/assets/7", server.url()), 5, Some(&digest)),
                CancellationToken::new(),
                reporter,
            )
            .await
            .unwrap();

        assert_eq!(report.size, 5);
    }

    #[tokio::test]
    async fn test_transfer_checksum_mismatch_removes_file() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/assets/7")
            .with_status(200)
            .with_body("hellp")
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        let digest = format!("sha256:{}", HELLO_SHA256);
        let result = engine(&temp, None)
            .transfer(
                asset("hello.txt", format!("{}/assets/7", server.url()), 5, Some(&digest)),
                CancellationToken::new(),
                reporter,
            )
            .await;

        match result {
            Err(FetchError::ChecksumMismatch { expected, .. }) => assert_eq!(expected, HELLO_SHA256),
            other => panic!("Expected ChecksumMismatch, got {:?}", other),
        }
        assert!(!temp.path().join("hello.txt").exists());
    }

    #[tokio::test]
    async fn test_invalid_digest_fails_before_request() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/assets/7")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;

        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        let result = engine(&temp, None)
            .transfer(
                asset("a.bin", format!("{}/assets/7", server.url()), 1, Some("md5:abcd")),
                CancellationToken::new(),
                reporter,
            )
            .await;

        assert!(matches!(result, Err(FetchError::InvalidDigestFormat(_))));
        assert!(!temp.path().join("a.bin").exists());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unsafe_name_is_rejected() {
        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        let result = engine(&temp, None)
            .transfer(
                asset("../escape.sh", "http://127.0.0.1:1/a".to_string(), 1, None),
                CancellationToken::new(),
                reporter,
            )
            .await;

        assert!(matches!(result, Err(FetchError::UnsafeFileName(_))));
    }

    #[tokio::test]
    async fn test_already_cancelled_token_short_circuits() {
        let temp = TempDir::new().unwrap();
        let (reporter, _watcher) = progress_channel();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = engine(&temp, None)
            .transfer(
                asset("a.bin", "http://127.0.0.1:1/a".to_string(), 1, None),
                cancel,
                reporter,
            )
            .await;

        assert!(matches!(result, Err(FetchError::Cancelled)));
        assert!(!temp.path().join("a.bin").exists());
    }
}
