//! Memoization of template resolutions.
//!
//! A resolution is cached only after the content store confirmed the target,
//! keyed by the (action, result) pair the caller supplied. The cache lives for
//! the whole process and is handed to resolvers explicitly:
//!
//! ```
//! use std::sync::Arc;
//! use viewroute::cache::TargetCache;
//!
//! let cache = Arc::new(TargetCache::new());
//! assert!(cache.is_empty());
//! ```

mod store;

pub use store::TargetCache;

pub(crate) use store::{
    METRIC_TARGET_CACHE_HIT, METRIC_TARGET_CACHE_MISS, METRIC_TARGET_CACHE_STORE,
};
