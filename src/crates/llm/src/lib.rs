//! Text completion provider clients for repolens.
//!
//! This crate defines the `CompletionModel` trait used by the analysis
//! pipeline and provides a concrete client for Google's Gemini API.
//!
//! # Example
//!
//! ```rust,ignore
//! use llm::{CompletionModel, CompletionRequest, GeminiClient, Message, RemoteLlmConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = RemoteLlmConfig::from_env(
//!         "GEMINI_API_KEY",
//!         "https://generativelanguage.googleapis.com/v1beta",
//!         "gemini-1.5-pro",
//!     )?;
//!     let client = GeminiClient::new(config)?;
//!
//!     let request = CompletionRequest::new(vec![Message::user("What is Rust?")])
//!         .with_temperature(0.7);
//!
//!     let response = client.complete(request).await?;
//!     println!("Response: {}", response.text);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gemini;
pub mod model;

// Re-export commonly used types
pub use config::RemoteLlmConfig;
pub use error::{LlmError, Result};
pub use gemini::GeminiClient;
pub use model::{
    CompletionModel, CompletionRequest, CompletionResponse, Message, Role, Usage,
};
