//! Error types for fragcache
//!
//! All modules use `CacheResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fragcache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// All errors that can occur in fragcache
#[derive(Error, Debug)]
pub enum CacheError {
    // Key policy errors
    #[error("Unconfigured cache region: {0}")]
    UnconfiguredKey(String),

    #[error("Invalid cache key policy: {0}")]
    PolicyInvalid(String),

    // Storage errors
    #[error("Failed to write cache content for {key}: {source}")]
    StorageWrite {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read cache content for {key}: {reason}")]
    StorageRead { key: String, reason: String },

    #[error("Metadata store error while {context}: {reason}")]
    Metadata { context: String, reason: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // CLI errors
    #[error("Cache miss: {0}")]
    CacheMiss(String),

    #[error("{0}")]
    User(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a storage write error for a cache key
    pub fn storage_write(key: impl Into<String>, source: std::io::Error) -> Self {
        Self::StorageWrite {
            key: key.into(),
            source,
        }
    }

    /// Create a storage read error for a cache key
    pub fn storage_read(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::StorageRead {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a metadata store error
    pub fn metadata(context: impl Into<String>, reason: impl ToString) -> Self {
        Self::Metadata {
            context: context.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a read path should treat this error as a plain cache miss
    pub fn degrades_to_miss(&self) -> bool {
        matches!(
            self,
            Self::StorageWrite { .. }
                | Self::StorageRead { .. }
                | Self::Metadata { .. }
                | Self::Io { .. }
                | Self::Json(_)
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::UnconfiguredKey(_) => Some("Add the region under [[regions]] in config.toml"),
            Self::StorageWrite { .. } => Some("Check that storage.blob_dir exists and is writable"),
            Self::ConfigInvalid { .. } | Self::PolicyInvalid(_) => {
                Some("Fix the file shown by: fragcache config path")
            }
            Self::CacheMiss(_) => Some("Regenerate the fragment and run: fragcache set"),
            _ => None,
        }
    }
}
