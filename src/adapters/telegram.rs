//! Telegram Bot API transport.
//!
//! Long-polls `getUpdates` for text messages and answers through
//! `sendMessage` to the originating chat.

use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::{ChatTransport, InboundMessage};

/// Default Bot API root
pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Configuration for the Telegram transport
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_poll_timeout() -> u64 {
    30
}

/// Response envelope from the Bot API
#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    chat: Chat,
    #[serde(default)]
    date: i64,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Telegram Bot API client used as a chat transport
pub struct TelegramTransport {
    bot_token: String,
    api_base: String,
    poll_timeout: Duration,
    /// Next update id to request
    offset: AtomicI64,
    client: reqwest::Client,
}

impl TelegramTransport {
    /// Create a new transport
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let poll_timeout = Duration::from_secs(config.poll_timeout_seconds);
        // Request timeout must outlive the server-side long poll
        let client = reqwest::Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .context("Failed to build Telegram HTTP client")?;

        Ok(Self {
            bot_token: config.bot_token,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            poll_timeout,
            offset: AtomicI64::new(0),
            client,
        })
    }

    /// Build API URL
    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, self.bot_token, method)
    }

    async fn call<T: for<'de> Deserialize<'de>>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<Option<T>> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())
            .with_context(|| format!("Telegram {} request failed", method))?;

        let result: TelegramResponse<T> = response
            .json()
            .await
            .map_err(|e| e.without_url())
            .context("Failed to parse Telegram response")?;

        if !result.ok {
            anyhow::bail!(
                "Telegram API error: {}",
                result.description.unwrap_or_default()
            );
        }

        Ok(result.result)
    }
}

/// Keep only text messages and compute the next offset
fn collect_messages(updates: Vec<Update>, current_offset: i64) -> (Vec<InboundMessage>, i64) {
    let mut next_offset = current_offset;
    let mut messages = Vec::new();

    for update in updates {
        next_offset = next_offset.max(update.update_id + 1);

        let Some(message) = update.message else {
            continue;
        };
        let Some(text) = message.text else {
            continue;
        };

        let received_at = Utc
            .timestamp_opt(message.date, 0)
            .single()
            .unwrap_or_else(Utc::now);

        messages.push(InboundMessage {
            sender: message.chat.id.to_string(),
            text,
            received_at,
        });
    }

    (messages, next_offset)
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn poll(&self) -> Result<Vec<InboundMessage>> {
        let offset = self.offset.load(Ordering::SeqCst);
        let updates: Vec<Update> = self
            .call(
                "getUpdates",
                serde_json::json!({
                    "offset": offset,
                    "timeout": self.poll_timeout.as_secs(),
                    "allowed_updates": ["message"],
                }),
            )
            .await?
            .unwrap_or_default();

        let (messages, next_offset) = collect_messages(updates, offset);
        self.offset.store(next_offset, Ordering::SeqCst);

        Ok(messages)
    }

    async fn send(&self, to: &str, text: &str) -> Result<()> {
        self.call::<serde_json::Value>(
            "sendMessage",
            serde_json::json!({
                "chat_id": to,
                "text": text,
            }),
        )
        .await?;
        Ok(())
    }
}
