//! Storage backends consumed by the cache
//!
//! The cache owns neither store. Freshness metadata lives in a
//! [`MetadataStore`] (one record per fully-qualified key) and payloads live
//! in a [`BlobStore`] (one blob per fully-qualified key).
//!
//! | Backend | Trait | Persistence |
//! |---------|-------|-------------|
//! | `MemoryMetadataStore` | metadata | process lifetime |
//! | `JsonMetadataStore` | metadata | single JSON file |
//! | `MemoryBlobStore` | blob | process lifetime |
//! | `FsBlobStore` | blob | one file per key |

pub mod fs;
pub mod json;
pub mod memory;

pub use fs::FsBlobStore;
pub use json::JsonMetadataStore;
pub use memory::{MemoryBlobStore, MemoryMetadataStore};

use crate::error::CacheResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Freshness metadata for one fully-qualified key
///
/// Persists as a bare integer (unix seconds) or `false`, so a metadata file
/// reads `{"pages_1": 1700000000, "sidebar": false}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRecord", into = "RawRecord")]
pub enum FreshnessRecord {
    /// Last refreshed at this unix timestamp
    Refreshed(i64),
    /// Invalidated; the row is kept, only its value is cleared
    Cleared,
}

impl FreshnessRecord {
    /// Timestamp of the last refresh, if the record has not been cleared
    pub fn refreshed_at(&self) -> Option<i64> {
        match self {
            Self::Refreshed(ts) => Some(*ts),
            Self::Cleared => None,
        }
    }
}

impl fmt::Display for FreshnessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Refreshed(ts) => write!(f, "{}", ts),
            Self::Cleared => write!(f, "false"),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Timestamp(i64),
    Flag(bool),
}

impl From<RawRecord> for FreshnessRecord {
    fn from(raw: RawRecord) -> Self {
        match raw {
            RawRecord::Timestamp(ts) => Self::Refreshed(ts),
            RawRecord::Flag(_) => Self::Cleared,
        }
    }
}

impl From<FreshnessRecord> for RawRecord {
    fn from(record: FreshnessRecord) -> Self {
        match record {
            FreshnessRecord::Refreshed(ts) => RawRecord::Timestamp(ts),
            FreshnessRecord::Cleared => RawRecord::Flag(false),
        }
    }
}

/// Key/value store holding freshness records
///
/// Implementations must support exact-key access and a bulk update over
/// every key sharing a prefix.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Read the record stored under `key`
    async fn get_value(&self, key: &str) -> CacheResult<Option<FreshnessRecord>>;

    /// Insert or overwrite the record under `key`
    async fn set_value(&self, key: &str, record: FreshnessRecord) -> CacheResult<()>;

    /// Overwrite every existing record whose key starts with `prefix`,
    /// returning the number of affected rows
    async fn update_prefix(&self, prefix: &str, record: FreshnessRecord) -> CacheResult<u64>;

    /// List every record whose key starts with `prefix`, sorted by key
    async fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<(String, FreshnessRecord)>>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Byte store holding cached payloads
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read the full blob under `key`, `None` if it does not exist
    async fn read_all(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Replace the blob under `key` with `bytes`
    async fn write_all(&self, key: &str, bytes: &[u8]) -> CacheResult<()>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}
