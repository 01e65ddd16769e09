//! Release and asset records as returned by the GitHub REST API.

use serde::Deserialize;

/// A tagged, named collection of assets.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Release {
    pub tag_name: String,
    /// Display name; GitHub returns `null` for releases created without one.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A single downloadable file attached to a release.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Asset {
    pub id: u64,
    pub name: String,
    /// API URL; requesting it with `Accept: application/octet-stream` yields the bytes.
    pub url: String,
    #[serde(default)]
    pub browser_download_url: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub created_at: String,
    /// Algorithm-prefixed content hash, e.g. `sha256:<hex>`.
    #[serde(default)]
    pub digest: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
