//! Asset catalog: display-ready asset descriptors and mask filtering.
//!
//! The catalog turns raw release records into [`AssetDescriptor`]s, which are
//! immutable once built and passed by value into the transfer engine.
//!
//! Mask matching is deliberately simple: a mask with exactly one `*` matches
//! names that start with the text before it and end with the text after it.
//! Any other mask is a literal prefix. This is not glob matching.

use crate::format::{format_created_at, format_size};
use crate::github::{Asset, Release};

/// Display-ready description of one downloadable asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    pub id: u64,
    /// File name, also used verbatim as the local file name.
    pub name: String,
    /// API URL streamed by the transfer engine.
    pub url: String,
    pub browser_download_url: String,
    /// Declared size in bytes; 0 when GitHub does not know it.
    pub size: u64,
    pub release_tag: String,
    pub release_name: String,
    pub created_at: String,
    /// `created_at` rendered as `YYYY-MM-DD HH:MM`.
    pub formatted_date: String,
    pub size_label: String,
    /// Algorithm-prefixed digest, e.g. `sha256:<hex>`.
    pub digest: Option<String>,
    /// List row text.
    pub label: String,
}

impl AssetDescriptor {
    /// Describe `asset` of `release`, labelling the row with the release tag.
    pub fn from_release(asset: &Asset, release: &Release) -> Self {
        let formatted_date = format_created_at(&asset.created_at);
        let size_label = format_size(asset.size);
        let label = if release.tag_name.is_empty() {
            format!("{} ({}, {})", asset.name, size_label, formatted_date)
        } else {
            format!(
                "[{}] {} ({}, {})",
                release.tag_name, asset.name, size_label, formatted_date
            )
        };

        Self {
            id: asset.id,
            name: asset.name.clone(),
            url: asset.url.clone(),
            browser_download_url: asset.browser_download_url.clone(),
            size: asset.size,
            release_tag: release.tag_name.clone(),
            release_name: release.name.clone(),
            created_at: asset.created_at.clone(),
            formatted_date,
            size_label,
            digest: asset.digest.clone().filter(|d| !d.is_empty()),
            label,
        }
    }

    /// Drop the `[tag]` prefix from the label, for lists within one release.
    pub fn without_tag_label(mut self) -> Self {
        self.label = format!("{} ({}, {})", self.name, self.size_label, self.formatted_date);
        self
    }
}

/// Simplified name filter: prefix/suffix around a single `*`, else a literal prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetMask {
    raw: String,
    prefix: String,
    suffix: String,
}

impl AssetMask {
    /// Build a mask from its textual form.
    pub fn new(mask: impl Into<String>) -> Self {
        let raw = mask.into();
        let parts: Vec<&str> = raw.split('*').collect();
        let (prefix, suffix) = match parts.as_slice() {
            [prefix, suffix] => (prefix.to_string(), suffix.to_string()),
            _ => (raw.clone(), String::new()),
        };
        Self {
            raw,
            prefix,
            suffix,
        }
    }

    /// The mask as given.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns true if `name` passes the mask. An empty mask matches nothing.
    pub fn matches(&self, name: &str) -> bool {
        if self.raw.is_empty() {
            return false;
        }
        name.starts_with(&self.prefix) && name.ends_with(&self.suffix)
    }
}

/// Flatten all releases into descriptors, keeping only mask matches.
///
/// `None` skips filtering entirely.
pub fn build_catalog(releases: &[Release], mask: Option<&AssetMask>) -> Vec<AssetDescriptor> {
    releases
        .iter()
        .flat_map(|release| {
            release
                .assets
                .iter()
                .filter(move |asset| mask.map_or(true, |m| m.matches(&asset.name)))
                .map(move |asset| AssetDescriptor::from_release(asset, release))
        })
        .collect()
}

/// Descriptors for one chosen release, labelled without the tag.
pub fn release_assets(release: &Release) -> Vec<AssetDescriptor> {
    release
        .assets
        .iter()
        .map(|asset| AssetDescriptor::from_release(asset, release).without_tag_label())
        .collect()
}
