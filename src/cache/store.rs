//! Resolved target storage.

use dashmap::DashMap;
use metrics::counter;
use tracing::trace;

use crate::domain::paths::{ResolutionKey, ResolvedTarget};

pub(crate) const METRIC_TARGET_CACHE_HIT: &str = "viewroute_target_cache_hit_total";
pub(crate) const METRIC_TARGET_CACHE_MISS: &str = "viewroute_target_cache_miss_total";
pub(crate) const METRIC_TARGET_CACHE_STORE: &str = "viewroute_target_cache_store_total";

const DEFAULT_CAPACITY: usize = 256;

/// Process-lifetime map from resolution inputs to verified targets.
///
/// Entries are never evicted: templates are immutable once deployed and the
/// number of distinct (action, result) pairs in an application is finite.
/// Reads are lock-free across shards; concurrent writers for the same key
/// store equal values, so the last write simply wins.
#[derive(Debug)]
pub struct TargetCache {
    entries: DashMap<ResolutionKey, ResolvedTarget>,
}

impl Default for TargetCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TargetCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: DashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &ResolutionKey) -> Option<ResolvedTarget> {
        match self.entries.get(key) {
            Some(entry) => {
                counter!(METRIC_TARGET_CACHE_HIT).increment(1);
                Some(entry.value().clone())
            }
            None => {
                counter!(METRIC_TARGET_CACHE_MISS).increment(1);
                None
            }
        }
    }

    /// Remember a target that was just confirmed to exist.
    pub fn insert(&self, key: ResolutionKey, target: ResolvedTarget) {
        trace!(key = %key, target = %target, "caching resolved target");
        counter!(METRIC_TARGET_CACHE_STORE).increment(1);
        self.entries.insert(key, target);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
