//! Startup resolution: which repository, which mask, which entry state.

use std::path::Path;
use std::time::Duration;

use afetch::catalog::AssetMask;
use afetch::config::FetchConfig;
use afetch::github::{ReleaseClient, ReleaseUrl};
use afetch::session::Session;
use afetch::FetchError;

use crate::error::CliError;

/// Repository and listing options resolved from arguments and configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub owner: String,
    pub repo: String,
    /// Release to open directly.
    pub tag: Option<String>,
    pub token: Option<String>,
    /// `None` shows the release list first.
    pub mask: Option<AssetMask>,
}

/// Load configuration for this run.
///
/// An explicit path must load. Otherwise a missing file is tolerated when a
/// releases URL supplies the repository.
pub fn load_config(path: Option<&Path>, have_url: bool) -> Result<FetchConfig, CliError> {
    match path {
        Some(path) => Ok(FetchConfig::load_from(path)?),
        None => match FetchConfig::load() {
            Ok(config) => Ok(config),
            Err(FetchError::ConfigNotFound { .. }) if have_url => {
                tracing::info!("No configuration file; using URL only");
                Ok(FetchConfig::default())
            }
            Err(e) => Err(e.into()),
        },
    }
}

/// Combine the URL argument, the `--mask` flag and the configuration.
///
/// A URL without a tag shows the release list unless `--mask` is given,
/// so a configured mask does not hide the URL's other releases.
pub fn resolve_target(
    url: Option<&str>,
    cli_mask: Option<&str>,
    config: &FetchConfig,
) -> Result<Target, CliError> {
    let cli_mask = cli_mask.filter(|m| !m.is_empty());

    let (owner, repo, tag, mask) = match url {
        Some(url) => {
            let parsed = ReleaseUrl::parse(url)?;
            let mask = match (&parsed.tag, cli_mask) {
                (None, Some(mask)) => Some(mask.to_string()),
                _ => None,
            };
            (parsed.owner, parsed.repo, parsed.tag, mask)
        }
        None => {
            let (owner, repo) = config.repository().ok_or_else(|| {
                CliError::Config(
                    "REPO_OWNER and REPO_NAME must be set in afetch.conf, or pass a releases URL"
                        .to_string(),
                )
            })?;
            let mask = cli_mask
                .map(str::to_string)
                .or_else(|| config.asset_mask.clone());
            (owner.to_string(), repo.to_string(), None, mask)
        }
    };

    Ok(Target {
        owner,
        repo,
        tag,
        token: config.token.clone(),
        mask: mask.map(AssetMask::new),
    })
}

/// Fetch the listing and build the session in its entry state.
pub async fn open_session(target: &Target, timeout: Option<Duration>) -> Result<Session, CliError> {
    let client = match timeout {
        Some(timeout) => ReleaseClient::with_timeout(target.token.clone(), timeout)?,
        None => ReleaseClient::new(target.token.clone())?,
    };

    if let Some(ref tag) = target.tag {
        let release = client
            .release_by_tag(&target.owner, &target.repo, tag)
            .await
            .map_err(CliError::from_listing)?;
        return Ok(Session::from_release(&release));
    }

    let releases = client
        .list_releases(&target.owner, &target.repo)
        .await
        .map_err(CliError::from_listing)?;
    Ok(Session::from_listing(releases, target.mask.as_ref())?)
}
