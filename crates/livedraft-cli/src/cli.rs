use clap::{Args, Parser, Subcommand};
use livedraft_core::ParseMode;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "livedraft")]
#[command(version, about = "LiveDraft - stream text into a live-edited chat message")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/livedraft/config.toml)
    #[arg(long, global = true, env = "LIVEDRAFT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay a text sentence by sentence into a live draft message
    Stream(StreamArgs),

    /// Print the sentence pieces a text is streamed in
    Split(SplitArgs),
}

#[derive(Args)]
pub struct StreamArgs {
    /// Input file (reads stdin when omitted)
    pub file: Option<PathBuf>,

    /// Target chat id (`chat` or `chat:thread`)
    #[arg(long, env = "LIVEDRAFT_CHAT_ID")]
    pub chat_id: Option<String>,

    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Minimum milliseconds between draft edits
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Cursor glyph shown while streaming
    #[arg(long)]
    pub cursor: Option<String>,

    /// Markup dialect (html, markdownv2, markdown)
    #[arg(long)]
    pub parse_mode: Option<ParseMode>,

    /// Message id the draft replies to
    #[arg(long)]
    pub reply_to: Option<String>,

    /// Maximum characters per message
    #[arg(long)]
    pub max_chunk: Option<usize>,

    /// Pause between simulated sentences in milliseconds
    #[arg(long, default_value = "400")]
    pub delay_ms: u64,

    /// Print transport calls instead of contacting Telegram
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct SplitArgs {
    /// Input file (reads stdin when omitted)
    pub file: Option<PathBuf>,
}
