//! Query and result caching.
//!
//! Two caches sit in front of the data source:
//!
//! - **selection cache**: normalised query text to the ordered resource
//!   identifiers it selected, before pagination;
//! - **result-set cache**: endpoint request to the finished result page.
//!
//! Both are bounded by a [`CachePolicy`] chosen in configuration:
//!
//! ```toml
//! [cache]
//! enabled = true
//! policy = "limit-entries:250"   # or "default", "perma-cache"
//! ```

mod controller;
mod keys;
mod lock;
mod policy;
mod store;

pub use controller::{CacheController, CacheSummary};
pub use keys::Fingerprint;
pub use policy::{CachePolicy, CachePolicyError, DEFAULT_ENTRY_LIMIT};
pub use store::{BoundedCache, CacheKind, CacheStats};

pub const METRIC_CACHE_HIT: &str = "lda_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "lda_cache_miss_total";
pub const METRIC_CACHE_EVICT: &str = "lda_cache_evict_total";
pub const METRIC_CACHE_RECONFIGURE: &str = "lda_cache_reconfigure_total";
