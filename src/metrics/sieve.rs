//! SIEVE Cache Metrics
//!
//! Metrics specific to the SIEVE eviction strategy.

extern crate alloc;

use super::{CacheMetrics, CoreCacheMetrics};
use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};

/// SIEVE-specific metrics (extends CoreCacheMetrics)
///
/// Beyond the core counters, SIEVE tracks how often the sweep spares a
/// visited entry and how often the hand wraps back to the queue front. A
/// high `second_chances`-to-`evictions` ratio means the working set is being
/// touched between sweeps; frequent `hand_wraps` with few evictions means
/// the sweep keeps passing over a mostly-visited queue.
#[derive(Debug, Clone)]
pub struct SieveCacheMetrics {
    /// Core metrics common to all cache strategies
    pub core: CoreCacheMetrics,
    /// Visited entries demoted to unvisited by a sweep instead of evicted
    pub second_chances: u64,
    /// Times the sweep hand reached the wrap sentinel and reset to the front
    pub hand_wraps: u64,
}

impl SieveCacheMetrics {
    /// Creates a new SieveCacheMetrics instance with the specified maximum cache size
    pub fn new(max_cache_size_bytes: u64) -> Self {
        Self {
            core: CoreCacheMetrics::new(max_cache_size_bytes),
            second_chances: 0,
            hand_wraps: 0,
        }
    }

    /// Converts SIEVE metrics to a BTreeMap for reporting
    ///
    /// Includes all core metrics plus the SIEVE-specific sweep counters.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = self.core.to_btreemap();
        metrics.insert("second_chances".to_string(), self.second_chances as f64);
        metrics.insert("hand_wraps".to_string(), self.hand_wraps as f64);
        metrics
    }
}

impl CacheMetrics for SieveCacheMetrics {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "SIEVE"
    }
}
