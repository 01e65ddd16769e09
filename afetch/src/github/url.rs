//! Parsing of `https://github.com/<owner>/<repo>/releases[/tag/<tag>]` URLs.

use std::str::FromStr;

use reqwest::Url;

use crate::error::{FetchError, FetchResult};

/// Repository (and optionally a release tag) named by a GitHub web URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseUrl {
    pub owner: String,
    pub repo: String,
    pub tag: Option<String>,
}

impl ReleaseUrl {
    /// Parse a github.com repository or releases URL.
    pub fn parse(input: &str) -> FetchResult<Self> {
        let invalid = || FetchError::InvalidUrl(input.to_string());

        let url = Url::parse(input.trim()).map_err(|_| invalid())?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid());
        }
        match url.host_str() {
            Some("github.com") | Some("www.github.com") => {}
            _ => return Err(invalid()),
        }

        let segments: Vec<&str> = url
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        let tag = match segments.as_slice() {
            [_, _] | [_, _, "releases"] => None,
            [_, _, "releases", "tag", tag] => Some(tag.to_string()),
            _ => return Err(invalid()),
        };

        Ok(Self {
            owner: segments[0].to_string(),
            repo: segments[1].trim_end_matches(".git").to_string(),
            tag,
        })
    }
}

impl FromStr for ReleaseUrl {
    type Err = FetchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_releases_url() {
        let parsed = ReleaseUrl::parse("https://github.com/octo/tool/releases").unwrap();
        assert_eq!(parsed.owner, "octo");
        assert_eq!(parsed.repo, "tool");
        assert_eq!(parsed.tag, None);
    }

    #[test]
    fn test_parse_tag_url() {
        let parsed = ReleaseUrl::parse("https://github.com/octo/tool/releases/tag/v1.4.2/").unwrap();
        assert_eq!(parsed.tag.as_deref(), Some("v1.4.2"));
    }

    #[test]
    fn test_parse_repo_url() {
        let parsed: ReleaseUrl = "https://github.com/octo/tool.git".parse().unwrap();
        assert_eq!(parsed.repo, "tool");
        assert_eq!(parsed.tag, None);
    }

    #[test]
    fn test_reject_other_hosts_and_paths() {
        assert!(ReleaseUrl::parse("https://gitlab.com/octo/tool/releases").is_err());
        assert!(ReleaseUrl::parse("https://github.com/octo").is_err());
        assert!(ReleaseUrl::parse("https://github.com/octo/tool/issues/3").is_err());
        assert!(ReleaseUrl::parse("not a url").is_err());
    }
}
