//! JSON file metadata store
//!
//! Keeps every freshness row in one JSON object on disk, playing the role
//! of an options table. Each mutation is a read-modify-write of the whole
//! file under an exclusive advisory lock on a sidecar `<file>.lock`, so
//! handles in different processes (or several handles in one process)
//! never write back each other's stale rows. Reads take the shared side of
//! the same lock. The data file itself is replaced via temp file + rename.

use crate::error::{CacheError, CacheResult};
use crate::store::{FreshnessRecord, MetadataStore};
use async_trait::async_trait;
use fd_lock::RwLock;
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

type Rows = BTreeMap<String, FreshnessRecord>;

#[derive(Debug, Clone, Copy)]
enum Access {
    Shared,
    Exclusive,
}

/// Metadata store persisted as a single JSON document
pub struct JsonMetadataStore {
    path: PathBuf,
}

impl JsonMetadataStore {
    /// Create a store backed by the file at `path`
    ///
    /// The file, its lock file and its parent directory are created on
    /// first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `op` on the blocking pool while holding the file lock
    async fn locked<T, F>(&self, access: Access, op: F) -> CacheResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> CacheResult<T> + Send + 'static,
    {
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || {
            // Nothing to race with until the first write creates the file
            if matches!(access, Access::Shared) && !path.exists() {
                return op(&path);
            }

            let lock_path = lock_path(&path);
            let mut lock = RwLock::new(open_lock_file(&lock_path)?);
            let locking = |e: std::io::Error| {
                CacheError::metadata(format!("locking {}", lock_path.display()), e)
            };

            match access {
                Access::Shared => {
                    let _guard = lock.read().map_err(locking)?;
                    op(&path)
                }
                Access::Exclusive => {
                    let _guard = lock.write().map_err(locking)?;
                    op(&path)
                }
            }
        })
        .await
        .map_err(|e| CacheError::metadata("running metadata task", e))?
    }
}

/// Sidecar lock file next to the data file. The data file is replaced on
/// every write, so it cannot carry the lock itself.
fn lock_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".lock");
    path.with_file_name(name)
}

fn open_lock_file(lock_path: &Path) -> CacheResult<File> {
    if let Some(parent) = lock_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CacheError::metadata(format!("creating {}", parent.display()), e))?;
    }

    OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(lock_path)
        .map_err(|e| CacheError::metadata(format!("opening {}", lock_path.display()), e))
}

fn load_rows(path: &Path) -> CacheResult<Rows> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Rows::new()),
        Err(e) => {
            return Err(CacheError::metadata(
                format!("reading {}", path.display()),
                e,
            ))
        }
    };

    if content.trim().is_empty() {
        return Ok(Rows::new());
    }

    serde_json::from_str(&content)
        .map_err(|e| CacheError::metadata(format!("parsing {}", path.display()), e))
}

fn persist_rows(path: &Path, rows: &Rows) -> CacheResult<()> {
    let json = serde_json::to_string_pretty(rows)?;

    // Write atomically via temp file
    let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
    let write = || -> std::io::Result<()> {
        let mut file = File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)
    };

    if let Err(e) = write() {
        let _ = fs::remove_file(&temp_path);
        return Err(CacheError::metadata(format!("writing {}", path.display()), e));
    }

    Ok(())
}

#[async_trait]
impl MetadataStore for JsonMetadataStore {
    async fn get_value(&self, key: &str) -> CacheResult<Option<FreshnessRecord>> {
        let key = key.to_string();
        self.locked(Access::Shared, move |path| {
            Ok(load_rows(path)?.get(&key).copied())
        })
        .await
    }

    async fn set_value(&self, key: &str, record: FreshnessRecord) -> CacheResult<()> {
        let key = key.to_string();
        self.locked(Access::Exclusive, move |path| {
            let mut rows = load_rows(path)?;
            rows.insert(key, record);
            persist_rows(path, &rows)
        })
        .await
    }

    async fn update_prefix(&self, prefix: &str, record: FreshnessRecord) -> CacheResult<u64> {
        let prefix = prefix.to_string();
        self.locked(Access::Exclusive, move |path| {
            let mut rows = load_rows(path)?;

            let mut affected = 0;
            for (_, value) in rows.iter_mut().filter(|(key, _)| key.starts_with(&prefix)) {
                *value = record;
                affected += 1;
            }

            if affected > 0 {
                persist_rows(path, &rows)?;
            }

            debug!("Updated {} metadata rows matching '{}'", affected, prefix);
            Ok(affected)
        })
        .await
    }

    async fn scan_prefix(&self, prefix: &str) -> CacheResult<Vec<(String, FreshnessRecord)>> {
        let prefix = prefix.to_string();
        self.locked(Access::Shared, move |path| {
            Ok(load_rows(path)?
                .into_iter()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect())
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}
