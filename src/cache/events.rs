//! Content-change events
//!
//! A publishing layer calls these hooks when posts or comments change.
//! Post events invalidate every region; comment events only invalidate the
//! region that renders comments.

use crate::cache::TtlCache;
use crate::error::{CacheError, CacheResult};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Notification from the content-management layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentEvent {
    /// A post was published
    Published,
    /// A post was edited
    Updated,
    /// A post was deleted
    Deleted,
    /// A comment was posted
    CommentPosted,
    /// A comment was deleted
    CommentDeleted,
}

impl ContentEvent {
    /// All events in declaration order
    pub fn all() -> &'static [Self] {
        &[
            Self::Published,
            Self::Updated,
            Self::Deleted,
            Self::CommentPosted,
            Self::CommentDeleted,
        ]
    }

    /// Whether the event only affects the comment region
    pub fn is_comment(&self) -> bool {
        matches!(self, Self::CommentPosted | Self::CommentDeleted)
    }
}

impl fmt::Display for ContentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Published => "published",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::CommentPosted => "comment-posted",
            Self::CommentDeleted => "comment-deleted",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ContentEvent {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|event| event.to_string() == s)
            .ok_or_else(|| {
                let names: Vec<String> = Self::all().iter().map(|e| e.to_string()).collect();
                CacheError::User(format!(
                    "Unknown event '{}'. Expected one of: {}",
                    s,
                    names.join(", ")
                ))
            })
    }
}

impl TtlCache {
    /// Apply the invalidation an event calls for, returning affected rows
    pub async fn on_event(&self, event: ContentEvent) -> CacheResult<u64> {
        info!("Content event: {}", event);

        if !event.is_comment() {
            return self.invalidate_all().await;
        }

        match self.comment_region() {
            Some(region) => self.invalidate(region).await,
            None => Ok(0),
        }
    }

    pub async fn on_content_published(&self) -> CacheResult<u64> {
        self.on_event(ContentEvent::Published).await
    }

    pub async fn on_content_updated(&self) -> CacheResult<u64> {
        self.on_event(ContentEvent::Updated).await
    }

    pub async fn on_content_deleted(&self) -> CacheResult<u64> {
        self.on_event(ContentEvent::Deleted).await
    }

    pub async fn on_comment_posted(&self) -> CacheResult<u64> {
        self.on_event(ContentEvent::CommentPosted).await
    }

    pub async fn on_comment_deleted(&self) -> CacheResult<u64> {
        self.on_event(ContentEvent::CommentDeleted).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::clock::ManualClock;
    use crate::cache::keys::{KeyPolicy, Region};
    use crate::store::{MemoryBlobStore, MemoryMetadataStore};
    use std::sync::Arc;

    fn cache(comment_region: Option<&str>) -> TtlCache {
        let policy = KeyPolicy::new(
            '_',
            [
                Region::new("sidebar", 1000),
                Region::new("pages", 1000),
                Region::new("homepage", 1000),
            ],
        )
        .unwrap();

        TtlCache::new(
            policy,
            Arc::new(MemoryMetadataStore::new()),
            Arc::new(MemoryBlobStore::new()),
        )
        .with_clock(Arc::new(ManualClock::new(0)))
        .with_comment_region(comment_region.map(str::to_string))
    }

    async fn fill(cache: &TtlCache) {
        cache.set("sidebar", "recent posts", None).await.unwrap();
        cache.set("pages", "page one", Some("1")).await.unwrap();
        cache.set("homepage", "home", None).await.unwrap();
    }

    #[test]
    fn event_names_roundtrip() {
        for event in ContentEvent::all() {
            assert_eq!(event.to_string().parse::<ContentEvent>().unwrap(), *event);
        }
        assert!("post_updated".parse::<ContentEvent>().is_err());
    }

    #[tokio::test]
    async fn post_events_invalidate_everything() {
        for event in [
            ContentEvent::Published,
            ContentEvent::Updated,
            ContentEvent::Deleted,
        ] {
            let cache = cache(Some("pages"));
            fill(&cache).await;

            assert_eq!(cache.on_event(event).await.unwrap(), 3);
            assert_eq!(cache.get("sidebar", None).await.unwrap(), None);
            assert_eq!(cache.get("pages", Some("1")).await.unwrap(), None);
            assert_eq!(cache.get("homepage", None).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn comment_events_only_touch_pages() {
        let cache = cache(Some("pages"));
        fill(&cache).await;

        assert_eq!(cache.on_comment_posted().await.unwrap(), 1);
        assert_eq!(cache.get("pages", Some("1")).await.unwrap(), None);
        assert_eq!(
            cache.get("sidebar", None).await.unwrap().as_deref(),
            Some("recent posts")
        );

        cache.set("pages", "page one", Some("1")).await.unwrap();
        assert_eq!(cache.on_comment_deleted().await.unwrap(), 1);
        assert_eq!(cache.get("pages", Some("1")).await.unwrap(), None);
    }

    #[tokio::test]
    async fn comment_events_without_region_do_nothing() {
        let cache = cache(None);
        fill(&cache).await;

        assert_eq!(cache.on_comment_posted().await.unwrap(), 0);
        assert!(cache.get("pages", Some("1")).await.unwrap().is_some());
    }
}
