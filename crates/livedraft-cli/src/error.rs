use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = format!("{:#}", err).to_lowercase();

    if msg.contains("bot token not found") || msg.contains("unauthorized") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Provide a bot token with:");
        eprintln!("  {} export TELEGRAM_BOT_TOKEN=<token>", "$".dimmed());
        eprintln!("  or try the stream locally with --dry-run");
    }

    if msg.contains("chat id not set") || msg.contains("chat not found") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Pick the target chat with:");
        eprintln!("  {} livedraft stream --chat-id <id> <file>", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("network") || msg.contains("http error")
    {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check your internet connection and try again.");
    }

    std::process::exit(1);
}
