//! Concurrent SIEVE Cache Implementation
//!
//! A thread-safe wrapper around the SIEVE engine. The engine itself has no
//! internal synchronization and assumes exclusive access for the full
//! duration of every call; this wrapper provides exactly that guarantee by
//! holding one `parking_lot::Mutex` across each operation.
//!
//! # Why one lock and not lock striping?
//!
//! Segmented (striped) caches shard the key space to cut contention, but a
//! SIEVE sweep hand is *global* engine state: sharding would split it into
//! per-segment hands and change which entries a sweep visits. This wrapper
//! keeps the engine's semantics exactly and trades peak throughput for them.
//! If your workload is read-mostly and contention matters more than strict
//! sweep order, run several independent caches and shard keys yourself.
//!
//! # Thread Safety
//!
//! `ConcurrentSieveCache` is `Send + Sync` (given `Send` key/value types and
//! a `Sync` value type for the shared `Arc` handles) and is shared via
//! `Arc`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sieve_rs::concurrent::ConcurrentSieveCache;
//! use sieve_rs::config::SieveCacheConfig;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let config = SieveCacheConfig {
//!     max_size_in_bytes: 10_000,
//!     max_count: 0,
//! };
//! let cache = Arc::new(ConcurrentSieveCache::init(config, None));
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|i| {
//!         let cache = Arc::clone(&cache);
//!         thread::spawn(move || {
//!             for j in 0..1000 {
//!                 cache.set(format!("key-{}-{}", i, j), Arc::new(j));
//!             }
//!         })
//!     })
//!     .collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//! ```

extern crate alloc;

use crate::config::SieveCacheConfig;
use crate::metrics::{CacheMetrics, SieveCacheMetrics};
use crate::sieve::SieveSegment;
use crate::weight::{EqualWeight, WeightFn, WeightLossCallback};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use parking_lot::Mutex;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

/// A thread-safe SIEVE cache.
///
/// Every call acquires an exclusive lock before entering the engine and
/// releases it after the engine returns, including any eviction sweep the
/// call triggered. Values are shared `Arc` handles, so a handle obtained
/// from `get` stays valid after the entry is evicted by another thread.
///
/// # Type Parameters
///
/// - `K`: Key type. Must implement `Hash + Eq + Clone`.
/// - `V`: Value type, stored behind `Arc`.
/// - `W`: Weight strategy. Defaults to [`EqualWeight`].
/// - `S`: Hash builder type. Defaults to `DefaultHashBuilder`.
pub struct ConcurrentSieveCache<K, V, W = EqualWeight, S = DefaultHashBuilder> {
    segment: Mutex<SieveSegment<K, V, W, S>>,
}

impl<K, V> ConcurrentSieveCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a concurrent SIEVE cache with unit weights and an optional
    /// custom hasher.
    pub fn init(config: SieveCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self {
            segment: Mutex::new(SieveSegment::with_weigher_and_hasher(
                config,
                EqualWeight,
                hasher.unwrap_or_default(),
            )),
        }
    }
}

impl<K, V, W> ConcurrentSieveCache<K, V, W>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
{
    /// Creates a concurrent SIEVE cache with a custom weight strategy.
    pub fn with_weigher(config: SieveCacheConfig, weigher: W) -> Self {
        Self {
            segment: Mutex::new(SieveSegment::with_weigher_and_hasher(
                config,
                weigher,
                DefaultHashBuilder::default(),
            )),
        }
    }
}

impl<K, V, W, S> ConcurrentSieveCache<K, V, W, S>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
    S: BuildHasher,
{
    /// Creates a concurrent SIEVE cache with a custom weight strategy and
    /// hash builder.
    pub fn with_weigher_and_hasher(config: SieveCacheConfig, weigher: W, hash_builder: S) -> Self {
        Self {
            segment: Mutex::new(SieveSegment::with_weigher_and_hasher(
                config,
                weigher,
                hash_builder,
            )),
        }
    }

    /// Installs the weight-loss callback. The callback runs inside the
    /// engine lock, so it must not call back into this cache.
    pub fn set_weight_loss_callback(&self, callback: WeightLossCallback) {
        self.segment.lock().set_weight_loss_callback(callback);
    }

    /// Returns the stored value and marks the entry visited.
    pub fn get<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().get(key)
    }

    /// Like [`get`](ConcurrentSieveCache::get), but also returns the stored
    /// key.
    pub fn get_with_key<Q>(&self, key: &Q) -> Option<(K, Arc<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().get_with_key(key)
    }

    /// Records a cache miss of `object_size` bytes in the metrics.
    pub fn record_miss(&self, object_size: u64) {
        self.segment.lock().record_miss(object_size);
    }

    /// Inserts or updates `key`, then runs an eviction pass, all under the
    /// lock.
    pub fn set(&self, key: K, value: Arc<V>) {
        self.segment.lock().set(key, value);
    }

    /// Deletes the entry if present and returns its value.
    pub fn remove<Q>(&self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().remove(key)
    }

    /// Removes all entries and resets the engine state.
    pub fn clear(&self) {
        self.segment.lock().clear();
    }

    /// A snapshot of all current entries, in no particular order.
    pub fn dump(&self) -> Vec<(K, Arc<V>)> {
        self.segment.lock().dump()
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// `true` when the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.segment.lock().is_empty()
    }

    /// Total weight of all stored values, in bytes.
    pub fn size_in_bytes(&self) -> u64 {
        self.segment.lock().size_in_bytes()
    }

    /// The configured byte budget.
    pub fn max_size_in_bytes(&self) -> u64 {
        self.segment.lock().max_size_in_bytes()
    }

    /// The configured entry-count budget; 0 means no count restriction.
    pub fn max_count(&self) -> usize {
        self.segment.lock().max_count()
    }

    /// Updates the byte budget and sweeps before releasing the lock.
    pub fn set_max_size_in_bytes(&self, max_size_in_bytes: u64) {
        self.segment.lock().set_max_size_in_bytes(max_size_in_bytes);
    }

    /// Updates the entry-count budget and sweeps before releasing the lock.
    pub fn set_max_count(&self, max_count: usize) {
        self.segment.lock().set_max_count(max_count);
    }
}

impl<K, V, W, S> CacheMetrics for ConcurrentSieveCache<K, V, W, S>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.lock().metrics().algorithm_name()
    }
}

impl<K, V, W, S> fmt::Debug for ConcurrentSieveCache<K, V, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.segment.try_lock() {
            Some(segment) => f
                .debug_struct("ConcurrentSieveCache")
                .field("segment", &*segment)
                .finish(),
            None => f
                .debug_struct("ConcurrentSieveCache")
                .field("segment", &"<locked>")
                .finish(),
        }
    }
}
