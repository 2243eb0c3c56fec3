//! In-memory TTL caching for rate lookups.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<String, CacheEntry<V>>,
    default_ttl: Duration,
}

impl<V: Clone> CacheInner<V> {
    fn new(default_ttl: Duration) -> Self {
        Self {
            map: HashMap::new(),
            default_ttl,
        }
    }

    fn get(&self, key: &str) -> Option<V> {
        self.map.get(key).and_then(|entry| {
            if Instant::now() <= entry.expires_at {
                Some(entry.value.clone())
            } else {
                None
            }
        })
    }

    fn put(&mut self, key: String, value: V, ttl_override: Option<Duration>) {
        let ttl = ttl_override.unwrap_or(self.default_ttl);
        let expires_at = Instant::now() + ttl;
        self.map.insert(key, CacheEntry { value, expires_at });
    }

    fn clear_expired(&mut self) {
        let now = Instant::now();
        self.map.retain(|_, entry| entry.expires_at > now);
    }

    fn len(&self) -> usize {
        self.map.len()
    }
}

/// Thread-safe keyed store with per-entry expiry.
///
/// A read past an entry's deadline behaves as a miss; entries are never
/// deleted eagerly, only overwritten on re-fetch or dropped by
/// [`clear_expired`](TtlCache::clear_expired). Keys are expected to be a
/// deterministic function of the operation and its parameters so distinct
/// queries never collide.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new(default_ttl))),
        }
    }

    /// A cache that never stores anything, for tests that must always miss.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Get a cached value for `key` if present and not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.inner.read().await;
        store.get(key)
    }

    /// Store `value` under `key`, overwriting any previous entry.
    ///
    /// Uses the cache default TTL unless `ttl_override` is given.
    pub async fn put(&self, key: String, value: V, ttl_override: Option<Duration>) {
        let mut store = self.inner.write().await;

        if store.default_ttl == Duration::ZERO && ttl_override.is_none() {
            return;
        }

        store.put(key, value, ttl_override);
    }

    /// Drop entries whose deadline has passed.
    pub async fn clear_expired(&self) {
        let mut store = self.inner.write().await;
        store.clear_expired();
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
