//! Bounded cache store.
//!
//! Keyed storage for resolution outcomes with LRU eviction. The store has
//! no TTL logic of its own; freshness lives in the entries and is the
//! lookup controller's responsibility.

use crate::lookup::entry::{CacheEntry, CacheKey};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default maximum number of cached entries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Trait for the bounded keyed store the controller caches into.
///
/// `get` and `set` must each be individually thread-safe; the controller
/// never relies on compound atomicity from the store.
pub trait CacheStore: Send + Sync {
    /// Fetch the entry for `key`, if present (fresh or stale).
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>>;

    /// Insert or overwrite the entry for `key`.
    fn set(&self, key: CacheKey, entry: Arc<CacheEntry>);

    /// Snapshot of all current entries, for persistence.
    fn entries(&self) -> Vec<(CacheKey, Arc<CacheEntry>)>;
}

/// LRU-bounded store.
pub struct LruStore {
    inner: Mutex<LruCache<CacheKey, Arc<CacheEntry>>>,
}

impl LruStore {
    /// Store with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Store bounded to `capacity` entries (at least 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl Default for LruStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CacheStore for LruStore {
    fn get(&self, key: &CacheKey) -> Option<Arc<CacheEntry>> {
        self.inner.lock().get(key).cloned()
    }

    fn set(&self, key: CacheKey, entry: Arc<CacheEntry>) {
        self.inner.lock().put(key, entry);
    }

    fn entries(&self) -> Vec<(CacheKey, Arc<CacheEntry>)> {
        self.inner
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::entry::RecordFamily;
    use crate::resolver::ResolvedAddress;
    use tokio::time::Instant;

    fn entry(ip: &str) -> Arc<CacheEntry> {
        Arc::new(CacheEntry::success(
            vec![ResolvedAddress::new(ip.parse().unwrap(), 60)],
            Instant::now(),
        ))
    }

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let store = LruStore::new();
        let key = CacheKey::new("example.com", RecordFamily::V4);

        assert!(store.get(&key).is_none());
        store.set(key.clone(), entry("1.2.3.4"));
        assert!(store.get(&key).is_some());

        let replacement = entry("5.6.7.8");
        store.set(key.clone(), replacement.clone());
        assert!(Arc::ptr_eq(&store.get(&key).unwrap(), &replacement));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_lru_eviction_at_capacity() {
        let store = LruStore::with_capacity(2);
        let a = CacheKey::new("a.test", RecordFamily::V4);
        let b = CacheKey::new("b.test", RecordFamily::V4);
        let c = CacheKey::new("c.test", RecordFamily::V4);

        store.set(a.clone(), entry("1.0.0.1"));
        store.set(b.clone(), entry("1.0.0.2"));
        // Touch `a` so `b` is the eviction candidate.
        store.get(&a);
        store.set(c.clone(), entry("1.0.0.3"));

        assert!(store.get(&a).is_some());
        assert!(store.get(&b).is_none());
        assert!(store.get(&c).is_some());
    }

    #[tokio::test]
    async fn test_entries_snapshot() {
        let store = LruStore::new();
        store.set(CacheKey::new("a.test", RecordFamily::V4), entry("1.0.0.1"));
        store.set(CacheKey::new("a.test", RecordFamily::V6), entry("::1"));

        let entries = store.entries();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|(k, _)| k.host() == "a.test"));
    }
}
