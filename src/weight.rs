//! Weight Strategies
//!
//! Every cached value carries a weight: an approximate byte cost computed once
//! at insertion or update time. The cache treats stored values as immutable
//! cost-wise, so the weight of a value never changes while it sits in the cache.
//!
//! The [`WeightFn`] trait is the pluggable strategy that maps a value to its
//! weight. The default, [`EqualWeight`], charges every value a weight of 1,
//! which turns the byte budget into a plain entry budget. Any closure of type
//! `Fn(&V) -> u64` also works via a blanket implementation:
//!
//! ```
//! use sieve_rs::config::SieveCacheConfig;
//! use sieve_rs::SieveCache;
//! use std::sync::Arc;
//!
//! let config = SieveCacheConfig {
//!     max_size_in_bytes: 1024,
//!     max_count: 0,
//! };
//!
//! // Weigh strings by their length.
//! let mut cache: SieveCache<&str, String, _> =
//!     SieveCache::with_weigher(config, |v: &String| v.len() as u64);
//! cache.set("greeting", Arc::new(String::from("hello")));
//! assert_eq!(cache.size_in_bytes(), 5);
//! ```

extern crate alloc;

use alloc::boxed::Box;

/// Strategy mapping a cached value to its approximate byte cost.
///
/// Implementations must be pure with respect to the value: the same value
/// must always produce the same weight, since the cache computes the weight
/// exactly once per insertion or update.
pub trait WeightFn<V> {
    /// Returns the weight, in bytes, of `value`.
    fn weight(&self, value: &V) -> u64;
}

/// The default weight strategy: every value costs 1.
///
/// With this weigher the byte budget degenerates into an entry-count budget,
/// which is the useful default when values are uniform or when only the
/// `max_count` limit matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct EqualWeight;

impl<V> WeightFn<V> for EqualWeight {
    #[inline]
    fn weight(&self, _value: &V) -> u64 {
        1
    }
}

impl<V, F> WeightFn<V> for F
where
    F: Fn(&V) -> u64,
{
    #[inline]
    fn weight(&self, value: &V) -> u64 {
        self(value)
    }
}

/// Callback invoked once per `set` or limit-mutation call with the total
/// weight evicted during that call's sweep.
///
/// The callback fires even when the sweep evicted nothing (with a total of 0),
/// so a consumer can account for every pass.
pub type WeightLossCallback = Box<dyn FnMut(u64) + Send>;
