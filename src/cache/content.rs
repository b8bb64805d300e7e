//! Content store adapter over the blob store

use crate::error::{CacheError, CacheResult};
use crate::store::BlobStore;
use std::sync::Arc;
use tracing::debug;

/// Reads and writes cached payloads by fully-qualified key
pub struct ContentStore {
    blobs: Arc<dyn BlobStore>,
}

impl ContentStore {
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }

    /// Replace the payload stored under `full_key`
    pub async fn write(&self, full_key: &str, content: &str) -> CacheResult<()> {
        debug!(
            "Storing {} bytes under {} ({})",
            content.len(),
            full_key,
            self.blobs.backend_name()
        );
        self.blobs.write_all(full_key, content.as_bytes()).await
    }

    /// Full payload stored under `full_key`, `None` if there is none
    pub async fn read(&self, full_key: &str) -> CacheResult<Option<String>> {
        let Some(bytes) = self.blobs.read_all(full_key).await? else {
            return Ok(None);
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| CacheError::storage_read(full_key, e))
    }

    /// Name of the underlying blob backend
    pub fn backend_name(&self) -> &'static str {
        self.blobs.backend_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBlobStore;

    #[tokio::test]
    async fn write_replaces_content() {
        let content = ContentStore::new(Arc::new(MemoryBlobStore::new()));

        content.write("homepage", "<h1>Old</h1>").await.unwrap();
        content.write("homepage", "<h1>New</h1>").await.unwrap();

        assert_eq!(
            content.read("homepage").await.unwrap().as_deref(),
            Some("<h1>New</h1>")
        );
    }

    #[tokio::test]
    async fn read_missing_is_none() {
        let content = ContentStore::new(Arc::new(MemoryBlobStore::new()));
        assert_eq!(content.read("sidebar").await.unwrap(), None);
    }

    #[tokio::test]
    async fn invalid_utf8_is_read_error() {
        let blobs = Arc::new(MemoryBlobStore::new());
        blobs.write_all("sidebar", &[0xff, 0xfe]).await.unwrap();

        let content = ContentStore::new(blobs);
        let err = content.read("sidebar").await.unwrap_err();
        assert!(matches!(err, CacheError::StorageRead { .. }));
    }
}
