//! Telegram Transport Implementation
//!
//! Creates and edits messages through the Telegram Bot API
//! (`sendMessage` / `editMessageText`).

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::traits::DraftTransport;
use super::types::{MessageHandle, SendOptions};
use crate::error::{TransportError, is_not_modified_description};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

fn default_api_base() -> String {
    TELEGRAM_API_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

/// Telegram transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub bot_token: String,
    /// API base URL (override for self-hosted Bot API servers)
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Timeout for a single API call in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl TelegramConfig {
    /// Create a new config with just the bot token
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: default_api_base(),
            request_timeout_secs: default_request_timeout(),
        }
    }

    /// Set API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout
    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

/// Telegram transport implementation
pub struct TelegramTransport {
    config: TelegramConfig,
    client: Client,
}

impl TelegramTransport {
    /// Create a new Telegram transport
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Create with just bot token
    pub fn with_token(bot_token: impl Into<String>) -> Self {
        Self::new(TelegramConfig::new(bot_token))
    }

    /// Parse chat_id into (chat_id, thread_id)
    /// Format: "chat_id" or "chat_id:thread_id"
    fn split_chat_id(chat_id: &str) -> (&str, Option<i64>) {
        match chat_id.split_once(':') {
            Some((chat, thread)) => (chat, thread.parse::<i64>().ok()),
            None => (chat_id, None),
        }
    }

    /// Accept both raw numeric ids and the `tg_` prefixed form
    fn numeric_message_id(message_id: &str) -> Option<i64> {
        message_id
            .strip_prefix("tg_")
            .unwrap_or(message_id)
            .parse::<i64>()
            .ok()
    }

    /// Get the API URL for a method
    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    /// Build `sendMessage` parameters
    fn send_params(chat_id: &str, text: &str, options: &SendOptions) -> serde_json::Value {
        let (chat, parsed_thread_id) = Self::split_chat_id(chat_id);
        let mut params = serde_json::json!({
            "chat_id": chat,
            "text": text,
        });
        Self::apply_common(&mut params, options);

        if let Some(reply_id) = options.reply_to.as_deref().and_then(Self::numeric_message_id) {
            params["reply_to_message_id"] = serde_json::Value::Number(reply_id.into());
        }

        // Add message_thread_id for Telegram forum/supergroup topics
        if let Some(thread_id) = options.message_thread_id.or(parsed_thread_id) {
            params["message_thread_id"] = serde_json::Value::Number(thread_id.into());
        }

        params
    }

    /// Build `editMessageText` parameters
    fn edit_params(
        chat_id: &str,
        message_id: i64,
        text: &str,
        options: &SendOptions,
    ) -> serde_json::Value {
        let (chat, _) = Self::split_chat_id(chat_id);
        let mut params = serde_json::json!({
            "chat_id": chat,
            "message_id": message_id,
            "text": text,
        });
        Self::apply_common(&mut params, options);
        params
    }

    fn apply_common(params: &mut serde_json::Value, options: &SendOptions) {
        if let Some(mode) = options.parse_mode {
            params["parse_mode"] = serde_json::Value::String(mode.as_str().to_string());
        }
        if let Some(disable) = options.disable_web_page_preview {
            params["disable_web_page_preview"] = serde_json::Value::Bool(disable);
        }
        if let Some(markup) = &options.reply_markup {
            params["reply_markup"] = markup.clone();
        }
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &serde_json::Value,
    ) -> Result<T, TransportError> {
        let response = self
            .client
            .post(self.api_url(method))
            .json(params)
            .timeout(Duration::from_secs(self.config.request_timeout_secs))
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!(method, status, "Telegram API call finished");
        parse_response(status, &body)
    }
}

/// Decode a Bot API response body into its `result`.
fn parse_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, TransportError> {
    let api_response: TelegramResponse<T> = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) if is_not_modified_description(body) => return Err(TransportError::NotModified),
        Err(_) if !(200..300).contains(&status) => {
            return Err(TransportError::Status {
                status,
                body: body.to_string(),
            });
        }
        Err(e) => return Err(e.into()),
    };

    if !api_response.ok {
        let description = api_response.description.unwrap_or_default();
        if is_not_modified_description(&description) {
            return Err(TransportError::NotModified);
        }
        return Err(TransportError::Api {
            code: api_response.error_code.unwrap_or(i64::from(status)),
            description,
        });
    }

    api_response
        .result
        .ok_or_else(|| TransportError::InvalidResponse("Telegram returned ok but no result".into()))
}

#[async_trait]
impl DraftTransport for TelegramTransport {
    async fn create_message(
        &self,
        chat_id: &str,
        content: &str,
        options: &SendOptions,
    ) -> Result<MessageHandle, TransportError> {
        let params = Self::send_params(chat_id, content, options);
        let message: TelegramMessage = self.call("sendMessage", &params).await?;
        Ok(message.into_handle(content))
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: &str,
        content: &str,
        options: &SendOptions,
    ) -> Result<MessageHandle, TransportError> {
        let numeric_id = Self::numeric_message_id(message_id).ok_or_else(|| {
            TransportError::InvalidResponse(format!("invalid Telegram message id: {}", message_id))
        })?;
        let params = Self::edit_params(chat_id, numeric_id, content, options);

        // Inline messages come back as `true` instead of a message object.
        let result: EditResult = self.call("editMessageText", &params).await?;
        result.into_handle(message_id, content)
    }
}

// ============================================================================
// Telegram API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TelegramMessage {
    message_id: i64,
    /// Unix time in seconds
    date: i64,
    edit_date: Option<i64>,
}

impl TelegramMessage {
    fn into_handle(self, sent_text: &str) -> MessageHandle {
        let seconds = self.edit_date.unwrap_or(self.date);
        MessageHandle::new(self.message_id.to_string(), sent_text).with_timestamp(seconds * 1000)
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EditResult {
    Message(TelegramMessage),
    Flag(bool),
}

impl EditResult {
    fn into_handle(self, message_id: &str, sent_text: &str) -> Result<MessageHandle, TransportError> {
        match self {
            Self::Message(message) => Ok(message.into_handle(sent_text)),
            Self::Flag(true) => Ok(MessageHandle::new(message_id, sent_text)),
            Self::Flag(false) => Err(TransportError::InvalidResponse(
                "editMessageText reported no change applied".to_string(),
            )),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
