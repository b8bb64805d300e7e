//! CLI argument definitions using clap derive

use crate::cache::ContentEvent;
pub use crate::config::LogFormat;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Fragcache - file-backed TTL fragment cache
///
/// Reads, writes and invalidates cached page fragments from the shell.
#[derive(Parser, Debug)]
#[command(name = "fragcache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "FRAGCACHE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (overrides general.log_format)
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a cached fragment if it is still fresh
    Get(GetArgs),

    /// Store a fragment read from a file or stdin
    Set(SetArgs),

    /// Invalidate a region or the whole cache
    Invalidate(InvalidateArgs),

    /// Fire a content event
    Event(EventArgs),

    /// List tracked entries with their state
    Status(StatusArgs),

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the get command
#[derive(Parser, Debug)]
pub struct GetArgs {
    /// Region name
    pub region: String,

    /// Sub-key within the region
    #[arg(short, long)]
    pub sub: Option<String>,
}

/// Arguments for the set command
#[derive(Parser, Debug)]
pub struct SetArgs {
    /// Region name
    pub region: String,

    /// Sub-key within the region
    #[arg(short, long)]
    pub sub: Option<String>,

    /// Read content from this file instead of stdin
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the invalidate command
#[derive(Parser, Debug)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["region", "all"])))]
pub struct InvalidateArgs {
    /// Region to invalidate
    pub region: Option<String>,

    /// Invalidate every region
    #[arg(long, conflicts_with = "region")]
    pub all: bool,
}

/// Arguments for the event command
#[derive(Parser, Debug)]
pub struct EventArgs {
    /// published, updated, deleted, comment-posted or comment-deleted
    pub event: ContentEvent,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for the status command
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// One key per line
    Plain,
}
