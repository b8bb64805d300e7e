//! Logical entry state
//!
//! Staleness is never stored. It is derived from the freshness record, the
//! region TTL and the current time whenever someone asks.

use crate::cache::freshness::within_ttl;
use crate::store::FreshnessRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// State of one fully-qualified key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryState {
    /// Never set, or invalidated
    Absent,
    /// Written within the region TTL
    Fresh,
    /// Written, but the TTL has elapsed
    Stale,
}

impl EntryState {
    /// Derive the state from a stored record
    pub fn evaluate(record: Option<FreshnessRecord>, ttl: Duration, now: i64) -> Self {
        match record {
            None | Some(FreshnessRecord::Cleared) => Self::Absent,
            Some(_) if within_ttl(record, ttl, now) => Self::Fresh,
            Some(_) => Self::Stale,
        }
    }

    /// Whether a lookup in this state would be served from cache
    pub fn is_servable(&self) -> bool {
        matches!(self, Self::Fresh)
    }
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "absent"),
            Self::Fresh => write!(f, "fresh"),
            Self::Stale => write!(f, "stale"),
        }
    }
}

/// Snapshot of one tracked key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryStatus {
    /// Fully-qualified key
    pub key: String,
    /// Region the key belongs to
    pub region: String,
    /// Sub-key, if any
    pub sub_key: Option<String>,
    /// Derived state
    pub state: EntryState,
    /// Last refresh (unix seconds), if not cleared
    pub refreshed_at: Option<i64>,
    /// Seconds since the last refresh, if not cleared
    pub age_secs: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_states() {
        let ttl = Duration::from_secs(60);

        assert_eq!(EntryState::evaluate(None, ttl, 0), EntryState::Absent);
        assert_eq!(
            EntryState::evaluate(Some(FreshnessRecord::Cleared), ttl, 0),
            EntryState::Absent
        );
        assert_eq!(
            EntryState::evaluate(Some(FreshnessRecord::Refreshed(0)), ttl, 60),
            EntryState::Fresh
        );
        assert_eq!(
            EntryState::evaluate(Some(FreshnessRecord::Refreshed(0)), ttl, 61),
            EntryState::Stale
        );
    }

    #[test]
    fn only_fresh_is_servable() {
        assert!(EntryState::Fresh.is_servable());
        assert!(!EntryState::Stale.is_servable());
        assert!(!EntryState::Absent.is_servable());
    }

    #[test]
    fn state_display() {
        assert_eq!(EntryState::Fresh.to_string(), "fresh");
        assert_eq!(EntryState::Stale.to_string(), "stale");
        assert_eq!(EntryState::Absent.to_string(), "absent");
    }
}
