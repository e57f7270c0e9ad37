//! Core types and trait for completion providers.
//!
//! The pipeline treats the completion provider as an opaque capability:
//! a prompt goes in, text comes out. Implementations handle the specifics
//! of converting messages, making API calls, and parsing responses for
//! their particular provider.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Role of a message in a completion conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction framing the task.
    System,
    /// Content authored by the caller.
    User,
    /// Content previously produced by the model.
    Assistant,
}

/// A single message in a completion conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role.
    pub role: Role,
    /// Message text content.
    pub content: String,
}

impl Message {
    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request: messages plus generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Conversation messages, in order.
    pub messages: Vec<Message>,

    /// Sampling temperature (0.0 to 1.0).
    pub temperature: Option<f32>,

    /// Maximum tokens to generate.
    pub max_tokens: Option<usize>,

    /// Request structured JSON output from the provider. Providers that
    /// support a JSON response mode should enable it; others may ignore
    /// this hint, in which case the caller's parser handles fenced output.
    pub json_output: bool,
}

impl CompletionRequest {
    /// Create a new completion request from messages.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
            json_output: false,
        }
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 1.0));
        self
    }

    /// Set the maximum number of tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Request structured JSON output.
    pub fn with_json_output(mut self, enabled: bool) -> Self {
        self.json_output = enabled;
        self
    }

    /// Append a message to the conversation.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}

/// Token usage statistics reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt.
    pub prompt_tokens: usize,
    /// Tokens generated in the completion.
    pub completion_tokens: usize,
}

impl Usage {
    /// Create a new usage record.
    pub fn new(prompt_tokens: usize, completion_tokens: usize) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
        }
    }

    /// Total tokens used.
    pub fn total(&self) -> usize {
        self.prompt_tokens + self.completion_tokens
    }
}

/// A completed response from a provider.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    /// Generated text.
    pub text: String,

    /// Token usage, when the provider reports it.
    pub usage: Option<Usage>,

    /// Provider-specific metadata (model name, finish reason, etc.).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl CompletionResponse {
    /// Create a response carrying only text.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            usage: None,
            metadata: HashMap::new(),
        }
    }
}

/// Core trait for completion providers.
///
/// Implementations must be `Send + Sync`; share them across request
/// handlers with `Arc<dyn CompletionModel>`.
#[async_trait]
pub trait CompletionModel: Send + Sync {
    /// Generate a completion for the given request.
    ///
    /// # Errors
    ///
    /// Implementations return `LlmError` for network failures,
    /// authentication errors, rate limiting, timeouts, and responses
    /// the client cannot interpret.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Clone this model into a boxed trait object.
    fn clone_box(&self) -> Box<dyn CompletionModel>;
}

/// Enable cloning for boxed CompletionModel trait objects.
impl Clone for Box<dyn CompletionModel> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
