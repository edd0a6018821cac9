mod cli_config;

pub use cli_config::{CliConfig, LoggingConfig, TelegramSection};
