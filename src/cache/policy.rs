//! Cache bounding policies.
//!
//! A policy is named in configuration and optionally carries a descriptor,
//! written `name` or `name:descriptor` (for example `limit-entries:250`).

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Capacity used by `limit-entries` when its descriptor is empty.
pub const DEFAULT_ENTRY_LIMIT: usize = 100;

const LIMIT_ENTRIES: &str = "limit-entries";
const DEFAULT_ALIAS: &str = "default";
const PERMA_CACHE: &str = "perma-cache";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CachePolicyError {
    #[error("unknown cache policy `{name}`")]
    UnknownPolicy { name: String },
    #[error("invalid entry limit `{descriptor}` for cache policy `{policy}`: {reason}")]
    InvalidLimit {
        policy: &'static str,
        descriptor: String,
        reason: String,
    },
    #[error("cache policy `{policy}` takes no descriptor, got `{descriptor}`")]
    UnexpectedDescriptor {
        policy: &'static str,
        descriptor: String,
    },
}

/// How a cache decides that it holds too much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Evict least-recently-used entries once the entry count exceeds `limit`.
    LimitEntries { limit: usize },
    /// Never evict.
    PermaCache,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self::LimitEntries {
            limit: DEFAULT_ENTRY_LIMIT,
        }
    }
}

impl CachePolicy {
    /// Build the `limit-entries` policy from its descriptor: empty means the
    /// default capacity, otherwise a decimal entry count.
    pub fn limit_entries(descriptor: &str) -> Result<Self, CachePolicyError> {
        let descriptor = descriptor.trim();
        if descriptor.is_empty() {
            return Ok(Self::default());
        }
        let limit = descriptor
            .parse::<usize>()
            .map_err(|err| CachePolicyError::InvalidLimit {
                policy: LIMIT_ENTRIES,
                descriptor: descriptor.to_string(),
                reason: err.to_string(),
            })?;
        Ok(Self::LimitEntries { limit })
    }

    /// Build a policy from its configured name and descriptor.
    pub fn from_parts(name: &str, descriptor: &str) -> Result<Self, CachePolicyError> {
        match name.trim() {
            "" | LIMIT_ENTRIES | DEFAULT_ALIAS => Self::limit_entries(descriptor),
            PERMA_CACHE if descriptor.trim().is_empty() => Ok(Self::PermaCache),
            PERMA_CACHE => Err(CachePolicyError::UnexpectedDescriptor {
                policy: PERMA_CACHE,
                descriptor: descriptor.trim().to_string(),
            }),
            other => Err(CachePolicyError::UnknownPolicy {
                name: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::LimitEntries { .. } => LIMIT_ENTRIES,
            Self::PermaCache => PERMA_CACHE,
        }
    }

    /// The capacity, or `None` when the policy never evicts.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Self::LimitEntries { limit } => Some(*limit),
            Self::PermaCache => None,
        }
    }

    /// True when a cache holding `entries` items is over its bound.
    pub fn exceeds_limit(&self, entries: usize) -> bool {
        self.limit().is_some_and(|limit| entries > limit)
    }
}

impl FromStr for CachePolicy {
    type Err = CachePolicyError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let (name, descriptor) = spec.split_once(':').unwrap_or((spec, ""));
        Self::from_parts(name, descriptor)
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.limit() {
            Some(limit) => write!(f, "{}:{limit}", self.name()),
            None => f.write_str(self.name()),
        }
    }
}
