//! Command-line interface for the fragcache binary

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, LogFormat, OutputFormat};
