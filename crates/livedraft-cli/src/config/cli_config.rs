//! CLI configuration file support
//!
//! Loads configuration from ~/.config/livedraft/config.toml

use livedraft_core::DraftConfig;
use livedraft_core::channel::TelegramConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Telegram credentials and target
    #[serde(default)]
    pub telegram: TelegramSection,
    /// Draft streaming behavior
    #[serde(default)]
    pub draft: DraftConfig,
    /// Log file settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Telegram configuration values
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramSection {
    pub bot_token: Option<String>,
    /// Default chat id (`chat` or `chat:thread`)
    pub chat_id: Option<String>,
    /// Bot API base URL override
    pub api_base: Option<String>,
}

/// Logging configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for daily log files; logs go to stderr only when unset
    pub dir: Option<PathBuf>,
}

impl CliConfig {
    /// Load configuration from an explicit path or the default location
    pub fn load(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_from_path(Some(path.to_path_buf())),
            None => Self::load_from_path(Self::default_path()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_default(),
            Err(_) => Self::default(),
        }
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("livedraft").join("config.toml"))
    }

    /// Telegram transport settings, with `token` taking precedence over the file
    pub fn telegram_config(&self, token: Option<String>) -> Option<TelegramConfig> {
        let token = token.or_else(|| self.telegram.bot_token.clone())?;
        let config = TelegramConfig::new(token);
        Some(match &self.telegram.api_base {
            Some(base) => config.with_api_base(base.clone()),
            None => config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use livedraft_core::ParseMode;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::load_from_path(Some(dir.path().join("absent.toml")));

        assert!(config.telegram.bot_token.is_none());
        assert_eq!(config.draft, DraftConfig::default());
        assert!(config.logging.dir.is_none());
    }

    #[test]
    fn test_load_sections() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[telegram]
bot_token = "123:abc"
chat_id = "-10042"

[draft]
edit_interval_ms = 1500
parse_mode = "MarkdownV2"
reply_to = "9"

[logging]
dir = "/tmp/livedraft-logs"
"#,
        )
        .unwrap();

        let config = CliConfig::load(Some(&path));
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.telegram.chat_id.as_deref(), Some("-10042"));
        assert_eq!(config.draft.edit_interval(), Duration::from_millis(1500));
        assert_eq!(config.draft.parse_mode, ParseMode::MarkdownV2);
        assert_eq!(config.draft.reply_to.as_deref(), Some("9"));
        assert_eq!(config.draft.cursor, livedraft_core::draft::DEFAULT_CURSOR);
        assert_eq!(
            config.logging.dir,
            Some(PathBuf::from("/tmp/livedraft-logs"))
        );
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[draft\nedit_interval_ms = ").unwrap();

        let config = CliConfig::load(Some(&path));
        assert_eq!(config.draft, DraftConfig::default());
    }

    #[test]
    fn test_token_flag_overrides_file() {
        let mut config = CliConfig::default();
        assert!(config.telegram_config(None).is_none());

        config.telegram.bot_token = Some("from-file".to_string());
        config.telegram.api_base = Some("http://localhost:8081".to_string());

        let telegram = config.telegram_config(None).unwrap();
        assert_eq!(telegram.bot_token, "from-file");
        assert_eq!(telegram.api_base, "http://localhost:8081");

        let telegram = config.telegram_config(Some("from-flag".to_string())).unwrap();
        assert_eq!(telegram.bot_token, "from-flag");
    }
}
