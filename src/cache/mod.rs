//! TTL cache for rendered fragments
//!
//! Payloads live in a blob store, one blob per fully-qualified key. Freshness
//! lives in a separate metadata store as a last-refreshed timestamp. A lookup
//! only reads the blob when the timestamp is within the region TTL.
//!
//! # Entry States
//!
//! | State | Metadata | Lookup |
//! |-------|----------|--------|
//! | Absent | missing or `false` | miss |
//! | Fresh | `now - ts <= ttl` | hit |
//! | Stale | `now - ts > ttl` | miss |
//!
//! `set` moves any state to Fresh, time moves Fresh to Stale (evaluated
//! lazily on lookup), and `invalidate` moves everything under a region
//! prefix to Absent. Blobs are never deleted; only their freshness is.
//!
//! # Concurrency
//!
//! The cache holds no locks. A `set` racing an `invalidate` on the same
//! region ends in whichever metadata write lands last.

pub mod clock;
pub mod content;
pub mod events;
pub mod freshness;
pub mod keys;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use content::ContentStore;
pub use events::ContentEvent;
pub use freshness::FreshnessTracker;
pub use keys::{KeyPolicy, Region, DEFAULT_SEPARATOR};
pub use state::{EntryState, EntryStatus};

use crate::error::{CacheError, CacheResult};
use crate::log::{CacheLog, LogLevel};
use crate::store::{BlobStore, MetadataStore};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Region invalidated by comment events unless configured otherwise
pub const DEFAULT_COMMENT_REGION: &str = "pages";

/// Why a lookup did not return content
#[derive(Debug)]
pub enum MissReason {
    /// The cache is switched off
    Disabled,
    /// Never set, or invalidated
    Absent,
    /// Set, but the TTL has elapsed
    Stale,
    /// Metadata says fresh but the blob is gone
    ContentMissing,
    /// A store failed; the failure is reported but never served
    Failed(CacheError),
}

/// Outcome of a cache lookup
#[derive(Debug)]
pub enum Lookup {
    Hit(String),
    Miss(MissReason),
}

impl Lookup {
    /// The cached content on a hit
    pub fn into_content(self) -> Option<String> {
        match self {
            Self::Hit(content) => Some(content),
            Self::Miss(_) => None,
        }
    }
}

/// Fragment cache combining key policy, freshness tracking and content storage
pub struct TtlCache {
    policy: KeyPolicy,
    metadata: Arc<dyn MetadataStore>,
    freshness: FreshnessTracker,
    content: ContentStore,
    enabled: bool,
    log: Option<CacheLog>,
    comment_region: Option<String>,
}

impl TtlCache {
    /// Create an enabled cache over the given stores, using the wall clock
    pub fn new(
        policy: KeyPolicy,
        metadata: Arc<dyn MetadataStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let comment_region = policy
            .region(DEFAULT_COMMENT_REGION)
            .ok()
            .map(|r| r.name.clone());

        Self {
            freshness: FreshnessTracker::new(metadata.clone(), Arc::new(SystemClock)),
            content: ContentStore::new(blobs),
            metadata,
            policy,
            enabled: true,
            log: None,
            comment_region,
        }
    }

    /// Replace the time source
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.freshness = FreshnessTracker::new(self.metadata.clone(), clock);
        self
    }

    /// Switch the whole cache on or off
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Attach a diagnostic log
    pub fn with_log(mut self, log: CacheLog) -> Self {
        self.log = Some(log);
        self
    }

    /// Region invalidated by comment events, `None` to ignore them
    pub fn with_comment_region(mut self, region: Option<String>) -> Self {
        self.comment_region = region;
        self
    }

    pub fn policy(&self) -> &KeyPolicy {
        &self.policy
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn comment_region(&self) -> Option<&str> {
        self.comment_region.as_deref()
    }

    /// Backend names as (metadata, blob)
    pub fn backends(&self) -> (&'static str, &'static str) {
        (self.metadata.backend_name(), self.content.backend_name())
    }

    /// Cached content for `base`/`sub`, `None` on any kind of miss
    ///
    /// Storage and metadata failures degrade to a miss (see
    /// [`CacheError::degrades_to_miss`]); an unconfigured region is an error.
    pub async fn get(&self, base: &str, sub: Option<&str>) -> CacheResult<Option<String>> {
        Ok(self.lookup(base, sub).await?.into_content())
    }

    /// Like [`TtlCache::get`], but reports why a lookup missed
    pub async fn lookup(&self, base: &str, sub: Option<&str>) -> CacheResult<Lookup> {
        let full_key = self.policy.build_key(base, sub)?;

        if !self.enabled {
            return Ok(Lookup::Miss(MissReason::Disabled));
        }

        self.note(LogLevel::Basic, "get", json!({ "key": full_key }))
            .await;

        let state = match self.freshness.state(&self.policy, base, &full_key).await {
            Ok(state) => state,
            Err(e) if e.degrades_to_miss() => {
                warn!("Freshness check failed for {}: {}", full_key, e);
                return Ok(Lookup::Miss(MissReason::Failed(e)));
            }
            Err(e) => return Err(e),
        };

        if !state.is_servable() {
            debug!("Miss ({}): {}", state, full_key);
            let reason = match state {
                EntryState::Stale => MissReason::Stale,
                _ => MissReason::Absent,
            };
            return Ok(Lookup::Miss(reason));
        }

        self.note(LogLevel::Verbose, "read", json!({ "key": full_key }))
            .await;

        match self.content.read(&full_key).await {
            Ok(Some(content)) => {
                debug!("Hit: {}", full_key);
                self.note(LogLevel::Basic, "get.hit", json!({ "key": full_key }))
                    .await;
                Ok(Lookup::Hit(content))
            }
            Ok(None) => {
                warn!("Fresh metadata but no content for {}", full_key);
                Ok(Lookup::Miss(MissReason::ContentMissing))
            }
            Err(e) if e.degrades_to_miss() => {
                warn!("Failed to read cached content for {}: {}", full_key, e);
                Ok(Lookup::Miss(MissReason::Failed(e)))
            }
            Err(e) => Err(e),
        }
    }

    /// Store `content` under `base`/`sub` and mark it fresh
    ///
    /// Freshness is only stamped after the content was persisted, so a
    /// failed write leaves the entry in whatever state it was before.
    pub async fn set(&self, base: &str, content: &str, sub: Option<&str>) -> CacheResult<()> {
        let full_key = self.policy.build_key(base, sub)?;

        if !self.enabled {
            return Ok(());
        }

        self.note(
            LogLevel::Verbose,
            "set",
            json!({ "key": full_key, "bytes": content.len() }),
        )
        .await;

        if let Err(e) = self.content.write(&full_key, content).await {
            warn!("Skipping refresh of {}: {}", full_key, e);
            return Err(e);
        }

        self.note(
            LogLevel::Verbose,
            "store",
            json!({ "key": full_key, "backend": self.content.backend_name() }),
        )
        .await;

        self.refresh_key(&full_key).await
    }

    /// Mark `base`/`sub` fresh without touching its content
    pub async fn refresh(&self, base: &str, sub: Option<&str>) -> CacheResult<()> {
        let full_key = self.policy.build_key(base, sub)?;

        if !self.enabled {
            return Ok(());
        }

        self.refresh_key(&full_key).await
    }

    async fn refresh_key(&self, full_key: &str) -> CacheResult<()> {
        self.note(LogLevel::Verbose, "refresh", json!({ "key": full_key }))
            .await;

        self.freshness.refresh(full_key).await.map_err(|e| {
            warn!("Failed to refresh {}: {}", full_key, e);
            e
        })
    }

    /// Invalidate a region and every sub-key under it, returning the
    /// number of metadata rows cleared
    pub async fn invalidate(&self, base: &str) -> CacheResult<u64> {
        let region = self.policy.region(base)?;

        if !self.enabled {
            return Ok(0);
        }

        self.note(LogLevel::Basic, "invalidate", json!({ "region": base }))
            .await;

        let cleared = self.freshness.clear_prefix(&region.name).await?;
        info!("Invalidated {} entries in region {}", cleared, base);
        Ok(cleared)
    }

    /// Invalidate every configured region in configuration order
    pub async fn invalidate_all(&self) -> CacheResult<u64> {
        if !self.enabled {
            return Ok(0);
        }

        self.note(LogLevel::Verbose, "invalidate_all", json!({})).await;

        let mut cleared = 0;
        for region in self.policy.regions() {
            cleared += self.invalidate(&region.name).await?;
        }
        Ok(cleared)
    }

    /// Current state of `base`/`sub`
    pub async fn state(&self, base: &str, sub: Option<&str>) -> CacheResult<EntryState> {
        let full_key = self.policy.build_key(base, sub)?;
        self.freshness.state(&self.policy, base, &full_key).await
    }

    /// Every tracked key across all regions
    pub async fn entries(&self) -> CacheResult<Vec<EntryStatus>> {
        let now = self.freshness.now();
        let mut entries = Vec::new();

        for region in self.policy.regions() {
            for (key, record) in self.metadata.scan_prefix(&region.name).await? {
                let Some((base, sub)) = self.policy.split_key(&key) else {
                    continue;
                };
                if base != region.name {
                    continue;
                }

                let refreshed_at = record.refreshed_at();
                entries.push(EntryStatus {
                    region: region.name.clone(),
                    sub_key: sub.map(str::to_string),
                    state: EntryState::evaluate(Some(record), region.ttl, now),
                    refreshed_at,
                    age_secs: refreshed_at.map(|ts| now.saturating_sub(ts)),
                    key,
                });
            }
        }

        Ok(entries)
    }

    async fn note(&self, level: LogLevel, event: &str, data: serde_json::Value) {
        if let Some(log) = &self.log {
            log.log(level, event, &data).await;
        }
    }
}
