use std::sync::{Arc, RwLock};

use metrics::counter;
use serde::Serialize;
use tracing::{debug, info};

use crate::domain::results::{ResultSet, Selection};

use super::METRIC_CACHE_RECONFIGURE;
use super::keys::Fingerprint;
use super::lock::{read_or_recover, write_or_recover};
use super::policy::{CachePolicy, CachePolicyError};
use super::store::{BoundedCache, CacheKind, CacheStats};

/// The caches that are live under one policy.
struct ActiveCaches {
    policy: CachePolicy,
    selections: BoundedCache<Fingerprint, Selection>,
    result_sets: BoundedCache<Fingerprint, Arc<ResultSet>>,
}

impl ActiveCaches {
    fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            selections: BoundedCache::new(CacheKind::Selection, policy),
            result_sets: BoundedCache::new(CacheKind::ResultSet, policy),
        }
    }
}

/// Snapshot of the controller for operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheSummary {
    pub policy: String,
    pub selections: CacheStats,
    pub result_sets: CacheStats,
}

/// Owns one selection cache and one result-set cache, both bounded by the
/// same policy.
///
/// [`reconfigure`](Self::reconfigure) swaps in fresh, empty caches. Callers
/// that grabbed the previous caches before the swap finish against them and
/// their writes are dropped with them.
pub struct CacheController {
    active: RwLock<Arc<ActiveCaches>>,
}

impl Default for CacheController {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

impl CacheController {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            active: RwLock::new(Arc::new(ActiveCaches::new(policy))),
        }
    }

    /// Build a controller from a `name[:descriptor]` policy string.
    pub fn from_descriptor(descriptor: &str) -> Result<Self, CachePolicyError> {
        Ok(Self::new(descriptor.parse()?))
    }

    fn active(&self) -> Arc<ActiveCaches> {
        Arc::clone(&read_or_recover(&self.active, "cache_controller.active"))
    }

    pub fn policy(&self) -> CachePolicy {
        self.active().policy
    }

    pub fn get_selection(&self, key: &Fingerprint) -> Option<Selection> {
        let found = self.active().selections.get(key);
        debug!(
            op = "get_selection",
            key_digest = key.digest(),
            hit = found.is_some(),
            "Selection cache lookup"
        );
        found
    }

    pub fn cache_selection(&self, key: Fingerprint, selection: Selection) {
        let evicted = self.active().selections.insert(key, selection);
        if evicted > 0 {
            debug!(op = "cache_selection", evicted, "Selection cache trimmed");
        }
    }

    pub fn get_result_set(&self, key: &Fingerprint) -> Option<Arc<ResultSet>> {
        let found = self.active().result_sets.get(key);
        debug!(
            op = "get_result_set",
            key_digest = key.digest(),
            hit = found.is_some(),
            "Result-set cache lookup"
        );
        found
    }

    pub fn cache_result_set(&self, key: Fingerprint, result_set: Arc<ResultSet>) {
        let evicted = self.active().result_sets.insert(key, result_set);
        if evicted > 0 {
            debug!(op = "cache_result_set", evicted, "Result-set cache trimmed");
        }
    }

    /// Replace both caches with empty ones bounded by `policy`.
    pub fn reconfigure(&self, policy: CachePolicy) {
        let fresh = Arc::new(ActiveCaches::new(policy));
        let previous = std::mem::replace(
            &mut *write_or_recover(&self.active, "cache_controller.reconfigure"),
            fresh,
        );
        counter!(METRIC_CACHE_RECONFIGURE).increment(1);
        info!(
            op = "reconfigure",
            from = %previous.policy,
            to = %policy,
            dropped_selections = previous.selections.len(),
            dropped_result_sets = previous.result_sets.len(),
            "Cache policy replaced"
        );
    }

    /// Parse `descriptor` and [`reconfigure`](Self::reconfigure). On error
    /// the current caches stay in place.
    pub fn reconfigure_from(&self, descriptor: &str) -> Result<(), CachePolicyError> {
        self.reconfigure(descriptor.parse()?);
        Ok(())
    }

    /// Drop every cached entry while keeping the policy and counters.
    pub fn clear(&self) {
        let active = self.active();
        active.selections.clear();
        active.result_sets.clear();
        info!(op = "clear", policy = %active.policy, "Caches cleared");
    }

    pub fn summary(&self) -> CacheSummary {
        let active = self.active();
        CacheSummary {
            policy: active.policy.to_string(),
            selections: active.selections.stats(),
            result_sets: active.result_sets.stats(),
        }
    }
}
