use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use lru::LruCache;

use super::types::FeedResult;

/// How long a fetched feed is served without a new request (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default number of distinct feed URLs kept.
pub const DEFAULT_CAPACITY: usize = 16;

/// A successfully extracted feed and when it was fetched.
#[derive(Debug, Clone)]
pub struct CachedFeed {
    pub feed: Arc<FeedResult>,
    /// Wall-clock fetch time, shown to the user
    pub fetched_at: DateTime<Utc>,
    stored: Instant,
}

impl CachedFeed {
    pub fn new(feed: Arc<FeedResult>) -> Self {
        Self {
            feed,
            fetched_at: Utc::now(),
            stored: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored.elapsed() < ttl
    }
}

/// Per-session cache of extracted feeds keyed by URL.
///
/// Bounded by an LRU; entries older than the TTL are dropped on lookup.
/// Only non-empty, successfully extracted feeds are inserted, so a failed
/// fetch never masks a later success.
pub struct FeedCache {
    entries: LruCache<String, CachedFeed>,
    ttl: Duration,
}

impl FeedCache {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached feed for `url` if it is younger than the TTL.
    pub fn get(&mut self, url: &str) -> Option<CachedFeed> {
        match self.entries.get(url) {
            Some(entry) if entry.is_fresh(self.ttl) => {
                tracing::debug!(feed = %url, fetched_at = %entry.fetched_at, "Feed cache hit");
                return Some(entry.clone());
            }
            Some(_) => {}
            None => return None,
        }

        tracing::debug!(feed = %url, "Feed cache entry expired");
        self.entries.pop(url);
        None
    }

    pub fn insert(&mut self, url: &str, feed: Arc<FeedResult>) -> CachedFeed {
        let entry = CachedFeed::new(feed);
        self.entries.put(url.to_string(), entry.clone());
        entry
    }

    /// Drops the entry for `url`. Returns whether one existed.
    pub fn invalidate(&mut self, url: &str) -> bool {
        self.entries.pop(url).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_TTL)
    }
}
