//! Filesystem blob store
//!
//! One file per fully-qualified key, directly under a single directory.
//! Keys are percent-encoded into file names so sub-keys may carry
//! characters that are unsafe in paths.

use crate::error::{CacheError, CacheResult};
use crate::store::BlobStore;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Blob store writing each entry to its own file
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
    file_prefix: String,
}

impl FsBlobStore {
    /// Create a store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            file_prefix: String::new(),
        }
    }

    /// Namespace every file name with `prefix`
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    /// Directory holding the blob files
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`
    pub fn blob_path(&self, key: &str) -> PathBuf {
        self.root.join(file_name(&self.file_prefix, key))
    }
}

/// Encode a key as a file name. Everything outside `[A-Za-z0-9._~-]` is
/// percent-encoded, and a leading dot is escaped so no key can map to a
/// hidden file, `.` or `..`.
fn file_name(prefix: &str, key: &str) -> String {
    let encoded = urlencoding::encode(key);
    let name = format!("{}{}", prefix, encoded);
    match name.strip_prefix('.') {
        Some(rest) => format!("%2E{}", rest),
        None => name,
    }
}

fn reject_empty(key: &str) -> std::io::Result<()> {
    if key.is_empty() {
        return Err(std::io::Error::new(
            ErrorKind::InvalidInput,
            "empty cache key",
        ));
    }
    Ok(())
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn read_all(&self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        reject_empty(key).map_err(|e| CacheError::storage_read(key, e))?;

        match fs::read(self.blob_path(key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::storage_read(key, e)),
        }
    }

    async fn write_all(&self, key: &str, bytes: &[u8]) -> CacheResult<()> {
        reject_empty(key).map_err(|e| CacheError::storage_write(key, e))?;

        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| CacheError::storage_write(key, e))?;

        // Write atomically via temp file so readers never see a partial blob
        let path = self.blob_path(key);
        let temp_path = self.root.join(format!(".{}.tmp", Uuid::new_v4()));
        let write = async {
            let mut file = fs::File::create(&temp_path).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            fs::rename(&temp_path, &path).await
        };

        if let Err(e) = write.await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(CacheError::storage_write(key, e));
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
