//! Error types for the GitHub content provider.

use thiserror::Error;

/// Result type for content provider operations.
pub type Result<T> = std::result::Result<T, GithubError>;

/// Errors that can occur while fetching repository content.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Repository URL could not be parsed into an owner/name pair.
    #[error("Invalid repository locator: {0}")]
    InvalidLocator(String),

    /// Repository does not exist or is not accessible.
    #[error("Repository not found: {0}")]
    NotFound(String),

    /// GitHub API rate limit hit.
    #[error("Rate limited by GitHub: {0}")]
    RateLimited(String),

    /// Request exceeded its upper-bound wait.
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Authentication failed (bad or missing token).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// HTTP transport failure.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// GitHub returned a response the client could not interpret.
    #[error("Invalid response from GitHub: {0}")]
    InvalidResponse(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl GithubError {
    /// Check if this error is a timeout.
    pub fn is_timeout(&self) -> bool {
        match self {
            GithubError::Timeout(_) => true,
            GithubError::HttpError(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Check if this error means the repository cannot be read at all.
    pub fn is_not_found(&self) -> bool {
        matches!(self, GithubError::NotFound(_) | GithubError::InvalidLocator(_))
    }
}
