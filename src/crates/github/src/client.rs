//! GitHub API client.
//!
//! Fetches repository metadata and a bounded snapshot of text content
//! through the GitHub REST API: repo lookup, recursive tree listing,
//! then per-file raw content up to configured budgets.

use crate::error::{GithubError, Result};
use crate::locator::RepoLocator;
use crate::snapshot::{is_text_path, RepositorySnapshot, SnapshotFile};
use crate::ContentProvider;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Configuration for the GitHub client.
#[derive(Debug, Clone)]
pub struct GithubConfig {
    /// GitHub API base URL.
    pub api_base: String,

    /// Personal access token, if available. Unauthenticated requests
    /// work but hit much lower rate limits.
    pub token: Option<String>,

    /// Per-request timeout. Exceeding it surfaces as `GithubError::Timeout`.
    pub timeout: Duration,

    /// Maximum number of files captured in a snapshot.
    pub max_files: usize,

    /// Maximum size of a single captured file, in bytes. Larger files
    /// are skipped and mark the snapshot truncated.
    pub max_file_bytes: u64,

    /// Total content budget for a snapshot, in bytes.
    pub max_total_bytes: usize,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token: None,
            timeout: Duration::from_secs(30),
            max_files: 200,
            max_file_bytes: 128 * 1024,
            max_total_bytes: 1024 * 1024,
        }
    }
}

impl GithubConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the access token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the snapshot file-count budget.
    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }
}

/// GitHub REST API client implementing `ContentProvider`.
#[derive(Clone)]
pub struct GithubClient {
    config: GithubConfig,
    client: Client,
}

impl GithubClient {
    /// Create a new GitHub client.
    pub fn new(config: GithubConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("repolens-analyzer"));
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GithubError::ConfigError("Invalid GitHub token".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| GithubError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    async fn get(&self, url: &str, context: &str) -> Result<Response> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GithubError::Timeout(format!("{} exceeded {:?}", context, self.config.timeout))
            } else {
                GithubError::HttpError(e)
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(match status {
            StatusCode::NOT_FOUND => GithubError::NotFound(context.to_string()),
            StatusCode::UNAUTHORIZED => GithubError::AuthenticationFailed(body),
            StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                // GitHub reports primary rate limiting as 403
                GithubError::RateLimited(body)
            }
            _ => GithubError::InvalidResponse(format!("{} -> {}: {}", context, status, body)),
        })
    }

    async fn fetch_metadata(&self, locator: &RepoLocator) -> Result<RepoMetadata> {
        let url = format!("{}/repos/{}", self.config.api_base, locator.slug());
        let response = self.get(&url, &format!("repository {}", locator)).await?;

        let metadata: RepoMetadata = response
            .json()
            .await
            .map_err(|e| GithubError::InvalidResponse(e.to_string()))?;

        if metadata.private {
            return Err(GithubError::NotFound(format!(
                "{} is a private repository",
                locator
            )));
        }

        Ok(metadata)
    }

    async fn fetch_tree(&self, locator: &RepoLocator, branch: &str) -> Result<TreeListing> {
        let url = format!(
            "{}/repos/{}/git/trees/{}?recursive=1",
            self.config.api_base,
            locator.slug(),
            branch
        );
        let response = self.get(&url, &format!("tree of {}", locator)).await?;

        response
            .json()
            .await
            .map_err(|e| GithubError::InvalidResponse(e.to_string()))
    }

    async fn fetch_file(&self, locator: &RepoLocator, branch: &str, path: &str) -> Result<String> {
        let url = format!(
            "{}/repos/{}/contents/{}?ref={}",
            self.config.api_base,
            locator.slug(),
            path,
            branch
        );

        // The raw media type returns file bytes directly, skipping the
        // base64 JSON envelope.
        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github.raw+json")
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GithubError::Timeout(format!("content fetch of {} timed out", path))
                } else {
                    GithubError::HttpError(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::NOT_FOUND => GithubError::NotFound(path.to_string()),
                StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS => {
                    GithubError::RateLimited(body)
                }
                _ => GithubError::InvalidResponse(format!("{} -> {}: {}", path, status, body)),
            });
        }

        response
            .text()
            .await
            .map_err(|e| GithubError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl ContentProvider for GithubClient {
    async fn fetch_snapshot(&self, locator: &RepoLocator) -> Result<RepositorySnapshot> {
        tracing::info!(repo = %locator, "Fetching repository snapshot");

        let metadata = self.fetch_metadata(locator).await?;
        let branch = metadata.default_branch;
        let listing = self.fetch_tree(locator, &branch).await?;

        let mut truncated = listing.truncated;
        let mut files = Vec::new();
        let mut total_bytes = 0usize;

        for entry in &listing.tree {
            if entry.kind != "blob" || !is_text_path(&entry.path) {
                continue;
            }

            if entry.size.unwrap_or(0) > self.config.max_file_bytes {
                truncated = true;
                continue;
            }

            if files.len() >= self.config.max_files {
                truncated = true;
                break;
            }

            let content = self.fetch_file(locator, &branch, &entry.path).await?;

            total_bytes += content.len();
            files.push(SnapshotFile::new(entry.path.clone(), content));

            if total_bytes >= self.config.max_total_bytes {
                truncated = true;
                break;
            }
        }

        tracing::info!(
            repo = %locator,
            files = files.len(),
            bytes = total_bytes,
            truncated,
            "Snapshot captured"
        );

        Ok(RepositorySnapshot::new(files, truncated))
    }
}

#[derive(Debug, Deserialize)]
struct RepoMetadata {
    private: bool,
    default_branch: String,
}

#[derive(Debug, Deserialize)]
struct TreeListing {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Debug, Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
    size: Option<u64>,
}
