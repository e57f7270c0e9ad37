//! GitHub repository content provider for repolens.
//!
//! Given a repository locator, this crate produces a bounded, immutable
//! snapshot of the repository's text content. It is a pure data source;
//! no analysis logic lives here.

pub mod client;
pub mod error;
pub mod locator;
pub mod snapshot;

use async_trait::async_trait;

pub use client::{GithubClient, GithubConfig};
pub use error::{GithubError, Result};
pub use locator::RepoLocator;
pub use snapshot::{RepositorySnapshot, SnapshotFile};

/// Trait for repository content providers.
///
/// The analysis pipeline depends on this trait rather than a concrete
/// client so tests can substitute scripted providers.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Fetch a bounded snapshot of the repository's text content.
    ///
    /// # Errors
    ///
    /// Returns `GithubError::NotFound` for invalid or inaccessible
    /// repositories, `GithubError::RateLimited` when throttled, and
    /// `GithubError::Timeout` when the upper-bound wait is exceeded.
    async fn fetch_snapshot(&self, locator: &RepoLocator) -> Result<RepositorySnapshot>;
}
