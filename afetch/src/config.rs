//! Configuration file loading.
//!
//! The configuration file `afetch.conf` is a flat list of `KEY=value` lines:
//!
//! ```text
//! # Personal access token (optional)
//! GITHUB_TOKEN="ghp_..."
//! REPO_OWNER=octo
//! REPO_NAME=tool
//! ASSET_MASK=tool-*-linux.tar.gz
//! ```
//!
//! It is looked up next to the executable first, then in the per-user
//! configuration directory.

use std::fs;
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};
use tracing::debug;

use crate::error::{FetchError, FetchResult};

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "afetch.conf";

/// Settings read from `afetch.conf`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchConfig {
    /// GitHub token; absent means unauthenticated access.
    pub token: Option<String>,
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    /// Asset mask; absent means no filtering.
    pub asset_mask: Option<String>,
}

impl FetchConfig {
    /// Load from the first existing file in [`config_search_paths`].
    pub fn load() -> FetchResult<Self> {
        let searched = config_search_paths();
        match searched.iter().find(|p| p.is_file()) {
            Some(path) => Self::load_from(path),
            None => Err(FetchError::ConfigNotFound { searched }),
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> FetchResult<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let content =
            fs::read_to_string(path).map_err(|e| FetchError::file_system(path, e))?;
        Self::parse(&content)
            .map_err(|e| FetchError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse configuration text.
    pub fn parse(content: &str) -> FetchResult<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..Default::default()
        };
        let ini = Ini::load_from_str_opt(content, options)
            .map_err(|e| FetchError::Config(e.to_string()))?;
        let section = ini.general_section();
        let value = |key: &str| {
            section
                .get(key)
                .map(unquote)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            token: value("GITHUB_TOKEN"),
            repo_owner: value("REPO_OWNER"),
            repo_name: value("REPO_NAME"),
            asset_mask: value("ASSET_MASK"),
        })
    }

    /// Owner and repository, when both are configured.
    pub fn repository(&self) -> Option<(&str, &str)> {
        match (&self.repo_owner, &self.repo_name) {
            (Some(owner), Some(name)) => Some((owner.as_str(), name.as_str())),
            _ => None,
        }
    }
}

/// Candidate configuration files in lookup order.
pub fn config_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        paths.push(dir.join(CONFIG_FILE_NAME));
    }
    if let Some(path) = user_config_path() {
        paths.push(path);
    }
    paths
}

#[cfg(windows)]
fn user_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("afetch").join(CONFIG_FILE_NAME))
}

#[cfg(not(windows))]
fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|d| d.join(".config").join(CONFIG_FILE_NAME))
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
