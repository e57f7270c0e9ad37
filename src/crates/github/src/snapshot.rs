//! Repository snapshot types.
//!
//! A snapshot is an immutable, bounded capture of a repository's text
//! content at fetch time. Downstream stages never mutate it; when
//! `truncated` is set the capture was size-capped and coverage is partial.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Extensions treated as analyzable text content.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "py", "js", "ts", "java", "cpp", "c", "h", "cs", "php", "rb", "go", "rs", "swift", "kt",
    "md", "txt", "json", "yml", "yaml", "toml", "ini", "cfg", "html", "css", "scss", "sass",
    "less", "sql", "sh", "bash", "zsh", "fish", "env", "ipynb",
];

/// Check whether a repository path looks like analyzable text.
pub fn is_text_path(path: &str) -> bool {
    path.rsplit('.')
        .next()
        .map(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// A single file captured in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotFile {
    /// Path relative to the repository root.
    pub path: String,
    /// File content.
    pub content: String,
}

impl SnapshotFile {
    /// Create a new snapshot file.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
        }
    }

    /// File extension, lowercased, if any.
    pub fn extension(&self) -> Option<String> {
        let name = self.path.rsplit('/').next()?;
        let (stem, ext) = name.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

/// An immutable, bounded capture of repository text content.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositorySnapshot {
    /// Captured files, in repository tree order.
    pub files: Vec<SnapshotFile>,
    /// True when the capture was size-capped; downstream stages must
    /// treat coverage as partial.
    pub truncated: bool,
}

impl RepositorySnapshot {
    /// Create a new snapshot.
    pub fn new(files: Vec<SnapshotFile>, truncated: bool) -> Self {
        Self { files, truncated }
    }

    /// True when no files were captured.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Total bytes of captured content.
    pub fn total_bytes(&self) -> usize {
        self.files.iter().map(|f| f.content.len()).sum()
    }

    /// The repository README, if captured.
    ///
    /// Matches `README.md`, `README`, or `README.txt` at any depth,
    /// preferring the shallowest path.
    pub fn readme(&self) -> Option<&SnapshotFile> {
        self.files
            .iter()
            .filter(|f| {
                let base = f.path.rsplit('/').next().unwrap_or(&f.path);
                matches!(
                    base.to_ascii_lowercase().as_str(),
                    "readme.md" | "readme" | "readme.txt"
                )
            })
            .min_by_key(|f| f.path.matches('/').count())
    }

    /// Distinct lowercased file extensions present in the snapshot.
    pub fn extensions(&self) -> BTreeSet<String> {
        self.files.iter().filter_map(|f| f.extension()).collect()
    }
}
