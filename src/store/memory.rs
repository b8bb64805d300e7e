//! In-process stores
//!
//! Useful for embedding the cache in tests or in short-lived processes
//! where nothing has to survive a restart.

use crate::error::{CacheError, CacheResult};
use crate::store::{BlobStore, FreshnessRecord, MetadataStore};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

fn poisoned(context: &str) -> CacheError {
    CacheError::metadata(context, "lock poisoned")
}

/// Metadata store backed by an in-memory ordered map
#[derive(Debug, Default)]
pub struct MemoryMetadataStore {
    rows: RwLock<BTreeMap<String, FreshnessRecord>>,
}

impl MemoryMetadataStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows, including cleared ones
    pub fn len(&self) -> usize {
        self.rows.read().map(|rows| rows.len()).unwrap_or(0)
    }

    /// Whether the store holds no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get_value(&self, key: &str) -> CacheResult<Option<FreshnessRecord>> {
        let rows = self.rows.read().map_err(|_| poisoned("reading metadata"))?;
        Ok(rows.get(key).copied())
    }

    async fn set_value(&self, key: &str, record: FreshnessRecord) -> CacheResult<()> {
        let mut rows = self.rows.write().map_err(|_| poisoned("writing metadata"))?;
        rows.insert(key.to_string(), record);
        Ok(())
    }

    async fn update_prefix(&self, prefix: &str, record: FreshnessRecord) -> CacheResult<u64> {
        let mut rows = self
            .rows
            .write()
            .map_err(|_| poisoned("updating metadata by prefix"))?;

        let mut affected = 0;
        for (_, value) in rows
            .range_mut(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
        {
            *value = record;
            affected += 1;
        }
        Ok(affected)
    }

    async fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<(String, FreshnessRecord)>> {
        let rows = self
            .rows
            .read()
            .map_err(|_| poisoned("scanning metadata"))?;
        Ok(rows
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, value)| (key.clone(), *value))
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

/// Blob store backed by an in-memory map
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a blob, simulating content lost behind the cache's back
    pub fn remove(&self, key: &str) -> bool {
        self.blobs
            .write()
            .map(|mut blobs| blobs.remove(key).is_some())
            .unwrap_or(false)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn read_all(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let blobs = self
            .blobs
            .read()
            .map_err(|_| CacheError::storage_read(key, "lock poisoned"))?;
        Ok(blobs.get(key).cloned())
    }

    async fn write_all(&self, key: &str, bytes: &[u8]) -> CacheResult<()> {
        let mut blobs = self.blobs.write().map_err(|_| {
            CacheError::storage_write(key, std::io::Error::other("lock poisoned"))
        })?;
        blobs.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
