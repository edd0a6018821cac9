mod cli;
mod commands;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::CliConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = CliConfig::load(cli.config.as_deref());

    let _guard = match init_logging(cli.verbose, &config) {
        Ok(guard) => guard,
        Err(err) => error::handle_error(err),
    };

    if let Err(err) = run(cli, config).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli, config: CliConfig) -> Result<()> {
    match cli.command {
        Commands::Stream(args) => commands::stream::run(args, &config, cli.format).await,
        Commands::Split(args) => commands::split::run(args, cli.format),
    }
}

/// Log to stderr, or to a daily file when a log directory is configured.
fn init_logging(verbose: bool, config: &CliConfig) -> Result<Option<WorkerGuard>> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let Some(log_dir) = &config.logging.dir else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
        return Ok(None);
    };

    std::fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "livedraft.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .init();

    Ok(Some(guard))
}
