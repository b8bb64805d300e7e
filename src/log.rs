//! Diagnostic log for cache operations
//!
//! Appends JSON lines to `cache.log`. Off by default; `basic` records
//! lookups, hits and invalidations, `verbose` records every step.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// How much the diagnostic log records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Record nothing
    #[default]
    Off,
    /// Lookups, hits and invalidations
    Basic,
    /// Everything, including stores, reads and refreshes
    Verbose,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => write!(f, "off"),
            Self::Basic => write!(f, "basic"),
            Self::Verbose => write!(f, "verbose"),
        }
    }
}

/// File-based diagnostic logger that appends JSON lines
#[derive(Debug, Clone)]
pub struct CacheLog {
    level: LogLevel,
    path: PathBuf,
}

impl CacheLog {
    /// Create a logger writing to `path` at `level`
    pub fn new(path: impl Into<PathBuf>, level: LogLevel) -> Self {
        Self {
            level,
            path: path.into(),
        }
    }

    /// Configured level
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Log file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether an event at `level` would be written
    pub fn records(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && self.level >= level
    }

    /// Log an event as a JSON line if `level` is enabled
    ///
    /// IO failures are dropped with a warning; the log never affects
    /// cache behavior.
    pub async fn log(&self, level: LogLevel, event: &str, data: &serde_json::Value) {
        if !self.records(level) {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize cache log event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write cache log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}
