use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::channel::{ParseMode, SendOptions};

/// Default minimum spacing between draft edits.
pub const DEFAULT_EDIT_INTERVAL_MS: u64 = 2000;

/// Default cursor glyph appended while streaming.
pub const DEFAULT_CURSOR: &str = "\u{258C}";

fn default_edit_interval_ms() -> u64 {
    DEFAULT_EDIT_INTERVAL_MS
}

fn default_cursor() -> String {
    DEFAULT_CURSOR.to_string()
}

/// Draft streamer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftConfig {
    /// Minimum milliseconds between two flushes of the draft.
    #[serde(default = "default_edit_interval_ms")]
    pub edit_interval_ms: u64,
    /// Glyph appended on "on" blink phases.
    #[serde(default = "default_cursor")]
    pub cursor: String,
    /// Content of the draft when it has to exist before any text does.
    /// Falls back to the cursor glyph.
    #[serde(default)]
    pub placeholder: Option<String>,
    /// Markup dialect of the chunks.
    #[serde(default)]
    pub parse_mode: ParseMode,
    /// Message the draft replies to.
    #[serde(default)]
    pub reply_to: Option<String>,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            edit_interval_ms: DEFAULT_EDIT_INTERVAL_MS,
            cursor: default_cursor(),
            placeholder: None,
            parse_mode: ParseMode::default(),
            reply_to: None,
        }
    }
}

impl DraftConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_edit_interval(mut self, interval: Duration) -> Self {
        self.edit_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn with_cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = cursor.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = mode;
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn edit_interval(&self) -> Duration {
        Duration::from_millis(self.edit_interval_ms)
    }

    pub fn placeholder_text(&self) -> &str {
        self.placeholder.as_deref().unwrap_or(&self.cursor)
    }

    /// Options for edits of the draft.
    pub(crate) fn edit_options(&self) -> SendOptions {
        SendOptions::new().with_parse_mode(self.parse_mode)
    }

    /// Options for the message that becomes the draft.
    pub(crate) fn draft_create_options(&self) -> SendOptions {
        let options = self.edit_options();
        match &self.reply_to {
            Some(reply_to) => options.with_reply_to(reply_to.clone()),
            None => options,
        }
    }
}
