//! Channel Types
//!
//! Core types exchanged between the draft engine and chat transports.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Markup dialect the transport should use to render message text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParseMode {
    #[default]
    #[serde(rename = "HTML", alias = "html")]
    Html,
    #[serde(alias = "markdownv2", alias = "markdown_v2")]
    MarkdownV2,
    #[serde(alias = "markdown")]
    Markdown,
}

impl ParseMode {
    /// Wire name used by the Telegram Bot API
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "HTML",
            Self::MarkdownV2 => "MarkdownV2",
            Self::Markdown => "Markdown",
        }
    }
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParseMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "markdownv2" | "markdown_v2" | "mdv2" => Ok(Self::MarkdownV2),
            "markdown" | "md" => Ok(Self::Markdown),
            other => Err(format!("unknown parse mode: {}", other)),
        }
    }
}

/// A message as acknowledged by the transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageHandle {
    /// Transport-assigned message identifier
    pub id: String,
    /// Text the message currently carries
    pub text: String,
    /// Timestamp (milliseconds since epoch)
    pub timestamp: i64,
}

impl MessageHandle {
    /// Create a handle stamped with the current time
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Set timestamp
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Per-call transport options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SendOptions {
    /// Markup dialect for the content
    pub parse_mode: Option<ParseMode>,
    /// Reply to specific message (create only)
    pub reply_to: Option<String>,
    /// Forum topic thread (create only)
    pub message_thread_id: Option<i64>,
    /// Suppress link previews
    pub disable_web_page_preview: Option<bool>,
    /// Opaque keyboard/markup payload forwarded to the transport
    pub reply_markup: Option<serde_json::Value>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set parse mode
    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    /// Set reply_to
    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    /// Set message_thread_id
    pub fn with_message_thread_id(mut self, thread_id: i64) -> Self {
        self.message_thread_id = Some(thread_id);
        self
    }

    /// Set disable_web_page_preview
    pub fn with_disable_web_page_preview(mut self, disable: bool) -> Self {
        self.disable_web_page_preview = Some(disable);
        self
    }

    /// Set reply_markup
    pub fn with_reply_markup(mut self, markup: serde_json::Value) -> Self {
        self.reply_markup = Some(markup);
        self
    }

    /// Overlay `extra` on top of these options; fields set in `extra` win.
    pub fn merged(&self, extra: &SendOptions) -> SendOptions {
        SendOptions {
            parse_mode: extra.parse_mode.or(self.parse_mode),
            reply_to: extra.reply_to.clone().or_else(|| self.reply_to.clone()),
            message_thread_id: extra.message_thread_id.or(self.message_thread_id),
            disable_web_page_preview: extra
                .disable_web_page_preview
                .or(self.disable_web_page_preview),
            reply_markup: extra
                .reply_markup
                .clone()
                .or_else(|| self.reply_markup.clone()),
        }
    }
}
