use anyhow::{Context, Result, bail};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::cli::StreamArgs;
use crate::commands::read_input;
use crate::config::CliConfig;
use crate::output::{OutputFormat, json::print_json};
use livedraft_core::channel::chunk::DEFAULT_MAX_LEN;
use livedraft_core::channel::{ConsoleTransport, MarkdownChunker, TelegramTransport};
use livedraft_core::simulate::simulate_sentence_stream;
use livedraft_core::{DraftConfig, DraftStreamer, DraftTransport, SendOptions};

/// Chat id used by the console transport when none is given.
const CONSOLE_CHAT_ID: &str = "console";

pub async fn run(args: StreamArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let text = read_input(args.file.as_deref())?;
    let draft_config = draft_config(&args, config);

    let chat_id = args
        .chat_id
        .clone()
        .or_else(|| config.telegram.chat_id.clone());

    let (transport, chat_id) = if args.dry_run {
        // Keep stdout clean for the JSON report.
        let console = if format.is_json() {
            ConsoleTransport::new(Box::new(std::io::stderr()))
        } else {
            ConsoleTransport::stdout()
        };
        let transport: Arc<dyn DraftTransport> = Arc::new(console);
        (
            transport,
            chat_id.unwrap_or_else(|| CONSOLE_CHAT_ID.to_string()),
        )
    } else {
        let telegram = config.telegram_config(args.token.clone()).context(
            "Telegram bot token not found: pass --token or set TELEGRAM_BOT_TOKEN",
        )?;
        let Some(chat_id) = chat_id else {
            bail!("Chat id not set: pass --chat-id or set LIVEDRAFT_CHAT_ID");
        };
        let transport: Arc<dyn DraftTransport> = Arc::new(TelegramTransport::new(telegram));
        (transport, chat_id)
    };

    let chunker = Arc::new(MarkdownChunker::new(
        args.max_chunk.unwrap_or(DEFAULT_MAX_LEN),
    ));
    let streamer = DraftStreamer::with_chunker(&chat_id, transport, chunker, draft_config);

    info!(chat_id = %chat_id, chars = text.chars().count(), "Streaming input");
    let snapshots = simulate_sentence_stream(
        &text,
        |snapshot| streamer.update(snapshot),
        Some(Duration::from_millis(args.delay_ms)),
    )
    .await;

    let messages = streamer
        .finalize(text.as_str(), SendOptions::default())
        .await
        .context("Failed to publish final message")?;

    if format.is_json() {
        return print_json(&json!({
            "chat_id": chat_id,
            "snapshots": snapshots,
            "messages": messages,
        }));
    }

    println!(
        "Streamed {} snapshots into {} message(s):",
        snapshots,
        messages.len()
    );
    for message in &messages {
        println!("  {}", message.id);
    }

    Ok(())
}

/// File settings overlaid with command-line flags.
fn draft_config(args: &StreamArgs, config: &CliConfig) -> DraftConfig {
    let mut draft = config.draft.clone();
    if let Some(interval_ms) = args.interval_ms {
        draft = draft.with_edit_interval(Duration::from_millis(interval_ms));
    }
    if let Some(cursor) = &args.cursor {
        draft = draft.with_cursor(cursor.clone());
    }
    if let Some(parse_mode) = args.parse_mode {
        draft = draft.with_parse_mode(parse_mode);
    }
    if let Some(reply_to) = &args.reply_to {
        draft = draft.with_reply_to(reply_to.clone());
    }
    draft
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use livedraft_core::ParseMode;

    fn stream_args(extra: &[&str]) -> StreamArgs {
        let mut argv = vec!["livedraft", "stream"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Stream(args) => args,
            _ => panic!("expected stream command"),
        }
    }

    #[test]
    fn test_flags_override_file_settings() {
        let mut config = CliConfig::default();
        config.draft = DraftConfig::new()
            .with_edit_interval(Duration::from_millis(3000))
            .with_parse_mode(ParseMode::Markdown);

        let args = stream_args(&["--interval-ms", "250", "--cursor", "_"]);
        let draft = draft_config(&args, &config);

        assert_eq!(draft.edit_interval(), Duration::from_millis(250));
        assert_eq!(draft.cursor, "_");
        assert_eq!(draft.parse_mode, ParseMode::Markdown);
    }

    #[test]
    fn test_file_settings_kept_without_flags() {
        let mut config = CliConfig::default();
        config.draft = DraftConfig::new().with_reply_to("77");

        let draft = draft_config(&stream_args(&[]), &config);
        assert_eq!(draft.reply_to.as_deref(), Some("77"));
    }
}
