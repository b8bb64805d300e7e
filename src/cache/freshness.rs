//! Freshness tracking over the metadata store

use crate::cache::clock::Clock;
use crate::cache::keys::KeyPolicy;
use crate::cache::state::EntryState;
use crate::error::CacheResult;
use crate::store::{FreshnessRecord, MetadataStore};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Reads and writes last-refreshed timestamps per fully-qualified key
pub struct FreshnessTracker {
    store: Arc<dyn MetadataStore>,
    clock: Arc<dyn Clock>,
}

impl FreshnessTracker {
    pub fn new(store: Arc<dyn MetadataStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Stamp `full_key` as refreshed now, overwriting any prior value
    pub async fn refresh(&self, full_key: &str) -> CacheResult<()> {
        let now = self.clock.now();
        debug!("Refreshing {} at {}", full_key, now);
        self.store
            .set_value(full_key, FreshnessRecord::Refreshed(now))
            .await
    }

    /// Raw stored record for `full_key`
    pub async fn record(&self, full_key: &str) -> CacheResult<Option<FreshnessRecord>> {
        self.store.get_value(full_key).await
    }

    /// Whether `full_key` was refreshed within the TTL of region `base`
    pub async fn is_fresh(
        &self,
        policy: &KeyPolicy,
        base: &str,
        full_key: &str,
    ) -> CacheResult<bool> {
        let ttl = policy.ttl(base)?;
        let record = self.record(full_key).await?;
        Ok(within_ttl(record, ttl, self.clock.now()))
    }

    /// Absent, fresh or stale, by the TTL of region `base`
    pub async fn state(
        &self,
        policy: &KeyPolicy,
        base: &str,
        full_key: &str,
    ) -> CacheResult<EntryState> {
        let ttl = policy.ttl(base)?;
        let record = self.record(full_key).await?;
        Ok(EntryState::evaluate(record, ttl, self.clock.now()))
    }

    /// Clear every record whose key starts with `prefix`
    pub async fn clear_prefix(&self, prefix: &str) -> CacheResult<u64> {
        self.store
            .update_prefix(prefix, FreshnessRecord::Cleared)
            .await
    }

    /// Current time according to the tracker's clock
    pub fn now(&self) -> i64 {
        self.clock.now()
    }
}

/// Inclusive TTL check. A timestamp in the future counts as fresh: only the
/// upper bound on elapsed time is checked, never that it is non-negative.
pub fn within_ttl(record: Option<FreshnessRecord>, ttl: Duration, now: i64) -> bool {
    match record.and_then(|r| r.refreshed_at()) {
        Some(ts) => {
            let ttl = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
            now.saturating_sub(ts) <= ttl
        }
        None => false,
    }
}
