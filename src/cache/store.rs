//! Policy-bounded LRU storage.

use std::hash::Hash;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use lru::LruCache;
use metrics::counter;
use serde::Serialize;

use super::lock::{read_or_recover, write_or_recover};
use super::policy::CachePolicy;
use super::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS};

/// Which of the controller's caches a store backs. Used as the `kind`
/// metric label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheKind {
    Selection,
    ResultSet,
}

impl CacheKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Selection => "selection",
            Self::ResultSet => "result_set",
        }
    }
}

/// Counters and size of a single store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub kind: CacheKind,
    pub entries: usize,
    pub limit: Option<usize>,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// A key/value cache whose size is bounded by a [`CachePolicy`].
///
/// The underlying LRU is unbounded; after every insert the least recently
/// used entries are dropped until the policy is satisfied. Insert and
/// eviction happen under one write lock, so readers never observe the
/// store above its limit.
pub struct BoundedCache<K, V> {
    kind: CacheKind,
    policy: CachePolicy,
    entries: RwLock<LruCache<K, V>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl<K: Hash + Eq, V: Clone> BoundedCache<K, V> {
    pub fn new(kind: CacheKind, policy: CachePolicy) -> Self {
        Self {
            kind,
            policy,
            entries: RwLock::new(LruCache::unbounded()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn kind(&self) -> CacheKind {
        self.kind
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Look up `key`, marking it most recently used on a hit.
    pub fn get(&self, key: &K) -> Option<V> {
        let found = write_or_recover(&self.entries, "bounded_cache.get")
            .get(key)
            .cloned();
        if found.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!(METRIC_CACHE_HIT, "kind" => self.kind.as_str()).increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            counter!(METRIC_CACHE_MISS, "kind" => self.kind.as_str()).increment(1);
        }
        found
    }

    /// Store `value` under `key`, replacing any previous value, then evict
    /// until the policy holds. Returns the number of entries evicted.
    pub fn insert(&self, key: K, value: V) -> usize {
        let mut entries = write_or_recover(&self.entries, "bounded_cache.insert");
        entries.put(key, value);

        let mut evicted = 0;
        while self.policy.exceeds_limit(entries.len()) {
            if entries.pop_lru().is_none() {
                break;
            }
            evicted += 1;
        }
        drop(entries);

        if evicted > 0 {
            self.evictions.fetch_add(evicted as u64, Ordering::Relaxed);
            counter!(METRIC_CACHE_EVICT, "kind" => self.kind.as_str()).increment(evicted as u64);
        }
        evicted
    }

    /// Membership test that does not touch recency or counters.
    pub fn contains(&self, key: &K) -> bool {
        read_or_recover(&self.entries, "bounded_cache.contains").contains(key)
    }

    pub fn len(&self) -> usize {
        read_or_recover(&self.entries, "bounded_cache.len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        write_or_recover(&self.entries, "bounded_cache.clear").clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            kind: self.kind,
            entries: self.len(),
            limit: self.policy.limit(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
