//! Repository locator parsing.
//!
//! Normalizes user-supplied GitHub URLs and extracts the owner/name pair.
//! Accepted forms after normalization: `https://github.com/<owner>/<name>`.

use crate::error::{GithubError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// A parsed repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoLocator {
    /// Repository owner (user or organization).
    pub owner: String,
    /// Repository name.
    pub name: String,
}

fn locator_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^https://github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)$")
            .expect("locator pattern is valid")
    })
}

fn subpath_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"/(tree|blob)/.*$").expect("subpath pattern is valid"))
}

impl RepoLocator {
    /// Parse a repository URL into a locator.
    ///
    /// Normalizes the URL first: trims whitespace, strips a trailing
    /// `.git`, trailing slashes, and any `/tree/...` or `/blob/...`
    /// suffix pointing inside the repository.
    pub fn parse(url: &str) -> Result<Self> {
        let normalized = Self::normalize(url);

        let captures = locator_pattern().captures(&normalized).ok_or_else(|| {
            GithubError::InvalidLocator(format!(
                "expected https://github.com/<owner>/<name>, got {:?}",
                url.trim()
            ))
        })?;

        Ok(Self {
            owner: captures[1].to_string(),
            name: captures[2].to_string(),
        })
    }

    /// Normalize a GitHub repository URL.
    fn normalize(url: &str) -> String {
        let mut url = url.trim().to_string();

        // Strip a subpath into the repository first, then the suffixes
        url = subpath_pattern().replace(&url, "").into_owned();

        if let Some(stripped) = url.strip_suffix(".git") {
            url = stripped.to_string();
        }

        url.trim_end_matches('/').to_string()
    }

    /// The `owner/name` slug used in API paths.
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl fmt::Display for RepoLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_url() {
        let locator = RepoLocator::parse("https://github.com/acme/widget").unwrap();
        assert_eq!(locator.owner, "acme");
        assert_eq!(locator.name, "widget");
        assert_eq!(locator.slug(), "acme/widget");
    }

    #[test]
    fn test_parse_strips_git_suffix() {
        let locator = RepoLocator::parse("https://github.com/acme/widget.git").unwrap();
        assert_eq!(locator.name, "widget");
    }

    #[test]
    fn test_parse_strips_trailing_slash() {
        let locator = RepoLocator::parse("https://github.com/acme/widget/").unwrap();
        assert_eq!(locator.name, "widget");
    }

    #[test]
    fn test_parse_strips_tree_and_blob_paths() {
        let locator =
            RepoLocator::parse("https://github.com/acme/widget/tree/main/src").unwrap();
        assert_eq!(locator.slug(), "acme/widget");

        let locator =
            RepoLocator::parse("https://github.com/acme/widget/blob/main/README.md").unwrap();
        assert_eq!(locator.slug(), "acme/widget");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let locator = RepoLocator::parse("  https://github.com/acme/widget  ").unwrap();
        assert_eq!(locator.slug(), "acme/widget");
    }

    #[test]
    fn test_parse_rejects_non_github() {
        assert!(RepoLocator::parse("https://gitlab.com/acme/widget").is_err());
        assert!(RepoLocator::parse("not a url").is_err());
        assert!(RepoLocator::parse("https://github.com/acme").is_err());
        assert!(RepoLocator::parse("").is_err());
    }

    #[test]
    fn test_display() {
        let locator = RepoLocator::parse("https://github.com/acme/widget").unwrap();
        assert_eq!(locator.to_string(), "acme/widget");
    }
}
