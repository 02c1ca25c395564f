//! Adapter interfaces for external systems.
//!
//! Adapters isolate the two outside collaborators of the bot:
//! - `TextService`: the text-understanding service used for field extraction
//! - `ChatTransport`: the chat network messages arrive from and replies go to

pub mod gemini;
pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::core::errors::ServiceError;

// Re-export the concrete adapters
pub use gemini::{GeminiAdapter, GeminiConfig};
pub use telegram::{TelegramConfig, TelegramTransport};

/// Output from a text-service call
#[derive(Debug, Clone)]
pub struct AdapterOutput {
    /// The text returned by the service
    pub content: String,

    /// Tokens used (if available)
    pub tokens_used: Option<u64>,
}

impl AdapterOutput {
    /// Create a new adapter output with just content
    pub fn new(content: String) -> Self {
        Self {
            content,
            tokens_used: None,
        }
    }
}

/// Black-box text understanding: prompt in, reply text out
#[async_trait]
pub trait TextService: Send + Sync {
    /// Human-readable adapter name
    fn name(&self) -> &str;

    /// Send one prompt and return the raw reply text
    async fn generate(&self, prompt: &str) -> Result<AdapterOutput, ServiceError>;
}

/// A plain-text message received from the chat network
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Opaque sender address replies are sent back to
    pub sender: String,

    /// Message body
    pub text: String,

    /// When the transport saw the message
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// Message source and sink
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Human-readable transport name
    fn name(&self) -> &str;

    /// Wait for the next batch of inbound messages (may be empty)
    async fn poll(&self) -> Result<Vec<InboundMessage>>;

    /// Send a plain-text reply
    async fn send(&self, to: &str, text: &str) -> Result<()>;
}
