//! Cache factory
//!
//! Wires the on-disk stores, the diagnostic log and the key policy from a
//! loaded configuration into a ready-to-use cache.

use crate::cache::TtlCache;
use crate::config::{Config, ConfigManager};
use crate::error::CacheResult;
use crate::log::{CacheLog, LogLevel};
use crate::store::{FsBlobStore, JsonMetadataStore};
use std::sync::Arc;
use tracing::debug;

/// Create a cache backed by a JSON metadata file and a blob directory
///
/// # Arguments
/// * `config` - The application configuration
///
/// # Returns
/// * `Ok(TtlCache)` - The configured cache
/// * `Err` - If the region table or event wiring is invalid
pub fn open_cache(config: &Config) -> CacheResult<TtlCache> {
    config.validate()?;
    let policy = config.key_policy()?;

    let blobs = FsBlobStore::new(ConfigManager::blob_dir(config))
        .with_file_prefix(config.storage.file_prefix.clone());
    let metadata = JsonMetadataStore::new(ConfigManager::metadata_path(config));
    debug!(
        "Opening cache: blobs in {}, metadata in {}",
        blobs.root().display(),
        metadata.path().display()
    );

    let mut cache = TtlCache::new(policy, Arc::new(metadata), Arc::new(blobs))
        .with_enabled(config.cache.enabled)
        .with_comment_region(config.events.comment_region.clone());

    if config.cache.log_level != LogLevel::Off {
        let log = CacheLog::new(ConfigManager::log_path(config), config.cache.log_level);
        debug!("Cache log at {} ({})", log.path().display(), log.level());
        cache = cache.with_log(log);
    }

    Ok(cache)
}
