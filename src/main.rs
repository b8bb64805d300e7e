//! Fragcache - file-backed TTL fragment cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use fragcache::cli::{Cli, Commands, LogFormat};
use fragcache::config::ConfigManager;
use fragcache::error::{CacheError, CacheResult};
use std::process::ExitCode;
use tracing::{debug, Subscriber};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> CacheResult<()> {
    let cli = Cli::parse();

    // Logging from the CLI flags covers config loading; the configured
    // format replaces it once the file has been read
    let early_logging = tracing::subscriber::set_default(subscriber(
        cli.verbose,
        cli.log_format.unwrap_or_default(),
    ));

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Using config {}", config_manager.path().display());

    // Config command loads lazily so `path` and `init` work on a broken file
    if let Commands::Config(args) = cli.command {
        return fragcache::cli::commands::config(args, &config_manager).await;
    }

    let config = config_manager.load().await?;

    drop(early_logging);
    let format = cli.log_format.unwrap_or(config.general.log_format);
    tracing::subscriber::set_global_default(subscriber(cli.verbose, format))
        .map_err(|e| CacheError::User(format!("Failed to initialize logging: {}", e)))?;

    let cache = fragcache::open_cache(&config)?;

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Get(args) => fragcache::cli::commands::get(args, &cache).await,
        Commands::Set(args) => fragcache::cli::commands::set(args, &cache).await,
        Commands::Invalidate(args) => fragcache::cli::commands::invalidate(args, &cache).await,
        Commands::Event(args) => fragcache::cli::commands::event(args, &cache).await,
        Commands::Status(args) => fragcache::cli::commands::status(args, &cache).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn subscriber(verbose: u8, format: LogFormat) -> Box<dyn Subscriber + Send + Sync> {
    let filter = match verbose {
        0 => EnvFilter::new("fragcache=warn"),
        1 => EnvFilter::new("fragcache=info"),
        _ => EnvFilter::new("fragcache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    match format {
        LogFormat::Json => Box::new(builder.json().finish()),
        LogFormat::Text => Box::new(builder.without_time().finish()),
    }
}
