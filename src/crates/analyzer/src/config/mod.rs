//! Server configuration.
//!
//! Loaded from a TOML file with environment overrides for deployment
//! settings and secrets. Secrets (API key, GitHub token) never live in
//! the file; they are read from the environment variables the file
//! names.

use github::GithubConfig;
use llm::RemoteLlmConfig;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Default config file path, overridable via `CONFIG_PATH`.
pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer-server.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub github: GithubSection,
    pub llm: LlmSection,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: ServerSection::default(),
            github: GithubSection::default(),
            llm: LlmSection::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// GitHub content provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GithubSection {
    pub api_base: String,
    /// Environment variable holding the access token, if any.
    pub token_env: String,
    pub timeout_secs: u64,
    pub max_files: usize,
    pub max_file_kb: u64,
    pub max_total_kb: usize,
}

impl Default for GithubSection {
    fn default() -> Self {
        Self {
            api_base: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
            timeout_secs: 30,
            max_files: 200,
            max_file_kb: 128,
            max_total_kb: 1024,
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-pro".to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ServerConfig {
    /// Load configuration.
    ///
    /// Reads the file at `CONFIG_PATH` (or the default path); a missing
    /// file falls back to defaults with a warning. `HOST` and `PORT`
    /// environment variables override the listener settings.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = if Path::new(&path).exists() {
            Self::from_path(&path)?
        } else {
            warn!(path = %path, "Config file not found, using defaults");
            Self::default()
        };

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn from_path(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;

        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT is not a port number: {}", port)))?;
        }
        Ok(())
    }

    /// The socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Build the GitHub client configuration. The token is optional;
    /// without one the client runs unauthenticated.
    pub fn github_config(&self) -> GithubConfig {
        let mut config = GithubConfig::new()
            .with_timeout(Duration::from_secs(self.github.timeout_secs))
            .with_max_files(self.github.max_files);
        config.api_base = self.github.api_base.clone();
        config.max_file_bytes = self.github.max_file_kb * 1024;
        config.max_total_bytes = self.github.max_total_kb * 1024;

        if let Ok(token) = std::env::var(&self.github.token_env) {
            if !token.is_empty() {
                config = config.with_token(token);
            }
        }

        config
    }

    /// Build the completion provider configuration. The API key is
    /// required; a missing key is a startup error, not a per-request one.
    pub fn llm_config(&self) -> Result<RemoteLlmConfig, ConfigError> {
        let config =
            RemoteLlmConfig::from_env(&self.llm.api_key_env, &self.llm.base_url, &self.llm.model)
                .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(config.with_timeout(Duration::from_secs(self.llm.timeout_secs)))
    }
}
