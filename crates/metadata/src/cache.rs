//! Process-wide read-through cache for repository lookups.
//!
//! Both lookup paths (by id and by url) share one physical key space,
//! namespaced by string prefix. Because entries are stored under the key
//! derived from the lookup argument rather than the entity itself, the same
//! repository may be cached under two independent keys that drift apart
//! after a later write.

use moka::sync::Cache;
use quarry_core::CacheConfig;
use std::time::Duration;

use crate::models::RepoRow;

/// Key namespace shared by the id and url lookup paths.
const CACHE_PREFIX: &str = "d.m.";

/// Cache key for an identity lookup.
pub fn repo_id_key(repo_id: i64) -> String {
    format!("{CACHE_PREFIX}{repo_id}")
}

/// Cache key for a url lookup.
pub fn repo_url_key(repo_url: &str) -> String {
    format!("{CACHE_PREFIX}{repo_url}")
}

/// A value stored in the cache.
///
/// `Absent` records a confirmed not-found; the store's read paths only ever
/// write `Present`, so absence is re-queried on every call until it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEntry {
    Present(RepoRow),
    Absent,
}

/// Outcome of a cache lookup.
///
/// Distinguishes "never cached" (`Miss`) from "cached as confirmed absent"
/// (`HitAbsent`) so callers never see a nested optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    Hit(RepoRow),
    HitAbsent,
    Miss,
}

/// In-memory repository cache using Moka (TinyLFU admission).
///
/// Cheap to clone; clones share the underlying cache. Constructed once at
/// startup and injected into the store.
#[derive(Clone)]
pub struct RepoCache {
    inner: Cache<String, CacheEntry>,
}

impl RepoCache {
    /// Create a cache holding up to `max_entries` entries.
    pub fn new(max_entries: u64) -> Self {
        Self {
            inner: Cache::new(max_entries),
        }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.max_entries);
        if let Some(ttl_secs) = config.ttl_secs {
            builder = builder.time_to_live(Duration::from_secs(ttl_secs));
        }
        Self {
            inner: builder.build(),
        }
    }

    /// Look up a key.
    pub fn peek(&self, key: &str) -> CacheLookup {
        match self.inner.get(key) {
            Some(CacheEntry::Present(repo)) => CacheLookup::Hit(repo),
            Some(CacheEntry::Absent) => CacheLookup::HitAbsent,
            None => CacheLookup::Miss,
        }
    }

    /// Store an entry under a key.
    pub fn put(&self, key: String, entry: CacheEntry) {
        self.inner.insert(key, entry);
    }

    /// Drop an entry, if cached.
    pub fn invalidate(&self, key: &str) {
        self.inner.invalidate(key);
    }

    /// Number of cached entries (approximate until pending tasks drain).
    pub fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl Default for RepoCache {
    fn default() -> Self {
        Self::from_config(&CacheConfig::default())
    }
}
