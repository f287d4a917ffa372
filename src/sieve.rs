//! SIEVE Cache Implementation
//!
//! This module provides a memory-efficient, weight-aware SIEVE cache with
//! O(1)-amortized eviction decisions. SIEVE keeps entries in insertion order
//! and gives each entry a single visited bit; a persistent sweep hand walks
//! that order evicting unvisited entries and demoting visited ones. See the
//! NSDI'24 SIEVE paper for the full analysis.
//!
//! # Algorithm
//!
//! - `get` marks the entry visited. It never reorders anything: insertion
//!   order, not recency, is the traversal order.
//! - `set` inserts at the queue tail (or updates in place, marking visited),
//!   then sweeps while either the byte budget or the entry-count budget is
//!   exceeded.
//! - The sweep inspects the entry under the hand: unvisited entries are
//!   evicted on first encounter; visited entries are demoted to unvisited and
//!   spared once per sweep cycle (second-chance / CLOCK-style behavior). The
//!   hand persists across calls and wraps from the queue tail back to the
//!   front.
//!
//! # Performance Characteristics
//!
//! - **Time Complexity**:
//!   - Get: O(1)
//!   - Set: O(1) amortized; a sweep costs one step per entry it evicts or
//!     demotes, never a function of total entry count
//!   - Remove: O(1)
//!
//! - **Space Complexity**: O(n) with roughly 40 bytes of overhead per entry
//!   beyond the key copies and the shared value handle
//!
//! # Value sharing
//!
//! Values are stored and returned as `Arc<V>`. Eviction only drops the
//! cache's own claim, so a caller holding a previously returned handle is
//! never invalidated.
//!
//! # Thread Safety
//!
//! This implementation is not thread-safe and never blocks or suspends: every
//! sweep runs to completion inside the call that triggered it. For concurrent
//! access wrap it in a lock, or use
//! [`ConcurrentSieveCache`](crate::concurrent::ConcurrentSieveCache) which
//! serializes every call under one mutex (requires the `concurrent` feature).

extern crate alloc;

use crate::config::SieveCacheConfig;
use crate::metrics::{CacheMetrics, SieveCacheMetrics};
use crate::policy::CachePolicy;
use crate::queue::{SieveQueue, SlotId};
use crate::weight::{EqualWeight, WeightFn, WeightLossCallback};
use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};

#[cfg(feature = "hashbrown")]
use hashbrown::hash_map::Entry as MapEntry;
#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::{Entry as MapEntry, RandomState as DefaultHashBuilder};
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

const UNDERFLOW: &str = "sieve size accounting underflowed; queue and index are inconsistent";
const MISSING_CELL: &str = "sieve queue key missing from index; queue and index are inconsistent";

/// One live cache entry: the shared value handle, its weight as computed at
/// insertion/update time, the visited bit, and the stable id of its queue node.
struct Cell<V> {
    value: Arc<V>,
    weight: u64,
    visited: bool,
    node: SlotId,
}

/// Internal SIEVE segment containing the actual cache algorithm.
///
/// This is shared between `SieveCache` (single-threaded) and
/// `ConcurrentSieveCache` (multi-threaded). All algorithm logic is
/// implemented here to avoid code duplication.
///
/// Invariants, held before and after every public operation:
/// 1. Keys in `map` and nodes in `queue` are in bijection.
/// 2. `current_size_in_bytes` equals the sum of all cell weights.
/// 3. `hand`, when not `None`, names a node currently in `queue`.
///
/// A detected violation is a bug in the engine, never caller input, and
/// panics rather than surfacing as a recoverable error.
pub(crate) struct SieveSegment<K, V, W = EqualWeight, S = DefaultHashBuilder> {
    config: SieveCacheConfig,
    queue: SieveQueue<K>,
    map: HashMap<K, Cell<V>, S>,
    hand: Option<SlotId>,
    current_size_in_bytes: u64,
    weigher: W,
    on_weight_loss: Option<WeightLossCallback>,
    metrics: SieveCacheMetrics,
}

impl<K, V, W, S> SieveSegment<K, V, W, S>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
    S: BuildHasher,
{
    pub(crate) fn with_weigher_and_hasher(
        config: SieveCacheConfig,
        weigher: W,
        hash_builder: S,
    ) -> Self {
        let (map, queue) = if config.max_count > 0 {
            let map_capacity = config.max_count.next_power_of_two();
            (
                HashMap::with_capacity_and_hasher(map_capacity, hash_builder),
                SieveQueue::with_capacity(config.max_count),
            )
        } else {
            (
                HashMap::with_hasher(hash_builder),
                SieveQueue::new(),
            )
        };
        SieveSegment {
            config,
            queue,
            map,
            hand: None,
            current_size_in_bytes: 0,
            weigher,
            on_weight_loss: None,
            metrics: SieveCacheMetrics::new(config.max_size_in_bytes),
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub(crate) fn size_in_bytes(&self) -> u64 {
        self.current_size_in_bytes
    }

    #[inline]
    pub(crate) fn max_size_in_bytes(&self) -> u64 {
        self.config.max_size_in_bytes
    }

    #[inline]
    pub(crate) fn max_count(&self) -> usize {
        self.config.max_count
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &SieveCacheMetrics {
        &self.metrics
    }

    pub(crate) fn set_weight_loss_callback(&mut self, callback: WeightLossCallback) {
        self.on_weight_loss = Some(callback);
    }

    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get_mut(key) {
            Some(cell) => {
                cell.visited = true;
                let weight = cell.weight;
                let value = Arc::clone(&cell.value);
                self.metrics.core.record_hit(weight);
                Some(value)
            }
            None => None,
        }
    }

    pub(crate) fn get_with_key<Q>(&mut self, key: &Q) -> Option<(K, Arc<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let stored_key = {
            let (stored, _) = self.map.get_key_value(key)?;
            stored.clone()
        };
        let cell = self.map.get_mut(key)?;
        cell.visited = true;
        let weight = cell.weight;
        let value = Arc::clone(&cell.value);
        self.metrics.core.record_hit(weight);
        Some((stored_key, value))
    }

    #[inline]
    pub(crate) fn record_miss(&mut self, object_size: u64) {
        self.metrics.core.record_miss(object_size);
    }

    pub(crate) fn set(&mut self, key: K, value: Arc<V>) {
        let weight = self.weigher.weight(&value);
        match self.map.entry(key) {
            MapEntry::Occupied(mut occupied) => {
                let cell = occupied.get_mut();
                let old_weight = cell.weight;
                self.current_size_in_bytes = self
                    .current_size_in_bytes
                    .checked_sub(old_weight)
                    .expect(UNDERFLOW);
                cell.visited = true;
                cell.value = value;
                cell.weight = weight;
                self.current_size_in_bytes += weight;
                self.metrics.core.record_size_change(old_weight, weight);
            }
            MapEntry::Vacant(vacant) => {
                // The queue node and the index entry are created in one flow
                // with no fallible step between them, so a failed insertion
                // can never leave a dangling index entry.
                let node = self.queue.push_back(vacant.key().clone());
                vacant.insert(Cell {
                    value,
                    weight,
                    visited: false,
                    node,
                });
                self.current_size_in_bytes += weight;
                self.metrics.core.record_insertion(weight);
            }
        }
        self.remove_overflow();
    }

    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let cell = self.map.remove(key)?;
        self.current_size_in_bytes = self
            .current_size_in_bytes
            .checked_sub(cell.weight)
            .expect(UNDERFLOW);

        // Step the hand off the doomed node before unlinking it, wrapping to
        // the post-removal front when the node was the last queue position.
        let hand_was_here = self.hand == Some(cell.node);
        if hand_was_here {
            self.hand = self.queue.next(cell.node);
        }
        let _ = self.queue.remove(cell.node);
        if hand_was_here && self.hand.is_none() {
            self.hand = self.queue.front();
        }

        self.metrics.core.record_removal(cell.weight);
        Some(cell.value)
    }

    pub(crate) fn clear(&mut self) {
        self.queue.clear();
        self.map.clear();
        self.current_size_in_bytes = 0;
        self.hand = None;
        self.metrics.core.cache_size_bytes = 0;
    }

    pub(crate) fn dump(&self) -> Vec<(K, Arc<V>)> {
        self.map
            .iter()
            .map(|(key, cell)| (key.clone(), Arc::clone(&cell.value)))
            .collect()
    }

    pub(crate) fn set_max_size_in_bytes(&mut self, max_size_in_bytes: u64) {
        self.config.max_size_in_bytes = max_size_in_bytes;
        self.metrics.core.record_limit_change(max_size_in_bytes);
        self.remove_overflow();
    }

    pub(crate) fn set_max_count(&mut self, max_count: usize) {
        self.config.max_count = max_count;
        self.remove_overflow();
    }

    /// The eviction sweep. Runs while either budget is exceeded and at least
    /// one entry remains: unvisited entries under the hand are evicted,
    /// visited ones are demoted and the hand advances. Reports the total
    /// weight evicted to the weight-loss callback, including 0.
    fn remove_overflow(&mut self) {
        let mut current_weight_lost = 0u64;
        let max_size_in_bytes = self.config.max_size_in_bytes;
        let max_count = self.config.max_count;

        while (self.current_size_in_bytes > max_size_in_bytes
            || (max_count != 0 && self.queue.len() > max_count))
            && !self.queue.is_empty()
        {
            let cursor = match self.hand {
                Some(id) => id,
                None => {
                    // Hand reached the wrap sentinel; restart at the front.
                    self.metrics.hand_wraps += 1;
                    let front = self
                        .queue
                        .front()
                        .expect("sieve queue empty while entries remain");
                    self.hand = Some(front);
                    front
                }
            };

            let evict = {
                let key = self.queue.key(cursor).expect(MISSING_CELL);
                let cell = self.map.get_mut(key).expect(MISSING_CELL);
                if cell.visited {
                    cell.visited = false;
                    false
                } else {
                    true
                }
            };

            if evict {
                let next = self.queue.next(cursor);
                let key = self.queue.remove(cursor);
                let cell = self.map.remove(&key).expect(MISSING_CELL);
                self.current_size_in_bytes = self
                    .current_size_in_bytes
                    .checked_sub(cell.weight)
                    .expect(UNDERFLOW);
                current_weight_lost += cell.weight;
                self.metrics.core.record_eviction(cell.weight);
                self.hand = next;
            } else {
                self.metrics.second_chances += 1;
                self.hand = self.queue.next(cursor);
            }
        }

        if let Some(on_weight_loss) = self.on_weight_loss.as_mut() {
            on_weight_loss(current_weight_lost);
        }

        // Sanity bound, not load-bearing: a total weight past half the u64
        // range can only mean the accounting or bijection is broken.
        assert!(
            self.current_size_in_bytes <= u64::MAX / 2,
            "sieve size accounting exceeded the sane range; queue and index are inconsistent"
        );
    }
}

impl<K, V, W, S> fmt::Debug for SieveSegment<K, V, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveSegment")
            .field("max_size_in_bytes", &self.config.max_size_in_bytes)
            .field("max_count", &self.config.max_count)
            .field("size_in_bytes", &self.current_size_in_bytes)
            .field("len", &self.map.len())
            .finish()
    }
}

/// An implementation of a SIEVE cache.
///
/// SIEVE evicts entries which have not been used for a long time while
/// staying under a hard byte budget and an optional entry-count budget. The
/// traversal order is insertion order; accessing an entry only sets its
/// visited bit, giving recently-touched items one reprieve per sweep cycle
/// before they become eligible for eviction again.
///
/// Values are stored behind `Arc`, so handles returned from `get` remain
/// valid after the entry is evicted.
///
/// # Examples
///
/// ```
/// use sieve_rs::config::SieveCacheConfig;
/// use sieve_rs::SieveCache;
/// use std::sync::Arc;
///
/// let config = SieveCacheConfig {
///     max_size_in_bytes: 2, // unit weights: room for two entries
///     max_count: 0,
/// };
/// let mut cache = SieveCache::init(config, None);
///
/// cache.set("apple", Arc::new(1));
/// cache.set("banana", Arc::new(2));
///
/// // Touching "apple" sets its visited bit.
/// assert_eq!(cache.get(&"apple").as_deref(), Some(&1));
///
/// // "banana" is unvisited, so the sweep evicts it first.
/// cache.set("cherry", Arc::new(3));
/// assert!(cache.get(&"banana").is_none());
/// assert_eq!(cache.get(&"apple").as_deref(), Some(&1));
/// assert_eq!(cache.get(&"cherry").as_deref(), Some(&3));
/// ```
pub struct SieveCache<K, V, W = EqualWeight, S = DefaultHashBuilder> {
    segment: SieveSegment<K, V, W, S>,
}

impl<K, V> SieveCache<K, V>
where
    K: Hash + Eq + Clone,
{
    /// Creates a SIEVE cache with unit weights and an optional custom hasher.
    ///
    /// This is the `init(config, None)` entry point used throughout the
    /// tests and benches; pass `Some(hasher)` for deterministic hashing.
    pub fn init(config: SieveCacheConfig, hasher: Option<DefaultHashBuilder>) -> Self {
        Self {
            segment: SieveSegment::with_weigher_and_hasher(
                config,
                EqualWeight,
                hasher.unwrap_or_default(),
            ),
        }
    }
}

impl<K, V, W> SieveCache<K, V, W>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
{
    /// Creates a SIEVE cache with a custom weight strategy.
    ///
    /// # Examples
    ///
    /// ```
    /// use sieve_rs::config::SieveCacheConfig;
    /// use sieve_rs::SieveCache;
    /// use std::sync::Arc;
    ///
    /// let config = SieveCacheConfig {
    ///     max_size_in_bytes: 10,
    ///     max_count: 0,
    /// };
    /// let mut cache = SieveCache::with_weigher(config, |v: &String| v.len() as u64);
    /// cache.set("a", Arc::new(String::from("12345")));
    /// assert_eq!(cache.size_in_bytes(), 5);
    /// ```
    pub fn with_weigher(config: SieveCacheConfig, weigher: W) -> Self {
        Self {
            segment: SieveSegment::with_weigher_and_hasher(
                config,
                weigher,
                DefaultHashBuilder::default(),
            ),
        }
    }
}

impl<K, V, W, S> SieveCache<K, V, W, S>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
    S: BuildHasher,
{
    /// Creates a SIEVE cache with a custom weight strategy and hash builder.
    pub fn with_weigher_and_hasher(config: SieveCacheConfig, weigher: W, hash_builder: S) -> Self {
        Self {
            segment: SieveSegment::with_weigher_and_hasher(config, weigher, hash_builder),
        }
    }

    /// Installs the weight-loss callback, invoked once per `set` or limit
    /// mutation with the total weight evicted by that call's sweep (0 if
    /// none).
    pub fn set_weight_loss_callback(&mut self, callback: WeightLossCallback) {
        self.segment.set_weight_loss_callback(callback);
    }

    /// Number of live entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.segment.len()
    }

    /// `true` when the cache holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segment.is_empty()
    }

    /// Total weight of all stored values, in bytes.
    #[inline]
    pub fn size_in_bytes(&self) -> u64 {
        self.segment.size_in_bytes()
    }

    /// The configured byte budget.
    #[inline]
    pub fn max_size_in_bytes(&self) -> u64 {
        self.segment.max_size_in_bytes()
    }

    /// The configured entry-count budget; 0 means no count restriction.
    #[inline]
    pub fn max_count(&self) -> usize {
        self.segment.max_count()
    }

    /// Returns the stored value and marks the entry visited.
    ///
    /// A miss has no side effect on the cache.
    #[inline]
    pub fn get<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get(key)
    }

    /// Like [`get`](SieveCache::get), but also returns the stored key.
    #[inline]
    pub fn get_with_key<Q>(&mut self, key: &Q) -> Option<(K, Arc<V>)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.get_with_key(key)
    }

    /// Records a cache miss of `object_size` bytes in the metrics.
    ///
    /// `get` itself has no side effect on absence, so miss accounting is the
    /// caller's choice.
    #[inline]
    pub fn record_miss(&mut self, object_size: u64) {
        self.segment.record_miss(object_size);
    }

    /// Inserts or updates `key`, then runs an eviction pass.
    ///
    /// On update the entry is re-weighed and marked visited. With a byte
    /// budget of 0 the entry is inserted and immediately swept back out.
    #[inline]
    pub fn set(&mut self, key: K, value: Arc<V>) {
        self.segment.set(key, value)
    }

    /// Deletes the entry if present and returns its value; no-op on absence.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Arc<V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.remove(key)
    }

    /// Removes all entries, zeroes the weight accumulator, and resets the
    /// hand to the sequence start.
    #[inline]
    pub fn clear(&mut self) {
        self.segment.clear()
    }

    /// A snapshot of all current entries, in no particular order.
    #[inline]
    pub fn dump(&self) -> Vec<(K, Arc<V>)> {
        self.segment.dump()
    }

    /// Updates the byte budget and immediately sweeps; narrowing the budget
    /// can evict live entries synchronously.
    #[inline]
    pub fn set_max_size_in_bytes(&mut self, max_size_in_bytes: u64) {
        self.segment.set_max_size_in_bytes(max_size_in_bytes)
    }

    /// Updates the entry-count budget and immediately sweeps.
    #[inline]
    pub fn set_max_count(&mut self, max_count: usize) {
        self.segment.set_max_count(max_count)
    }
}

impl<K, V, W, S> CachePolicy<K, V> for SieveCache<K, V, W, S>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
    S: BuildHasher,
{
    fn get(&mut self, key: &K) -> Option<Arc<V>> {
        self.segment.get(key)
    }

    fn get_with_key(&mut self, key: &K) -> Option<(K, Arc<V>)> {
        self.segment.get_with_key(key)
    }

    fn set(&mut self, key: K, value: Arc<V>) {
        self.segment.set(key, value)
    }

    fn remove(&mut self, key: &K) -> Option<Arc<V>> {
        self.segment.remove(key)
    }

    fn clear(&mut self) {
        self.segment.clear()
    }

    fn dump(&self) -> Vec<(K, Arc<V>)> {
        self.segment.dump()
    }

    fn size_in_bytes(&self) -> u64 {
        self.segment.size_in_bytes()
    }

    fn count(&self) -> usize {
        self.segment.len()
    }

    fn max_size_in_bytes(&self) -> u64 {
        self.segment.max_size_in_bytes()
    }

    fn max_count(&self) -> usize {
        self.segment.max_count()
    }

    fn set_max_size_in_bytes(&mut self, max_size_in_bytes: u64) {
        self.segment.set_max_size_in_bytes(max_size_in_bytes)
    }

    fn set_max_count(&mut self, max_count: usize) {
        self.segment.set_max_count(max_count)
    }
}

impl<K, V, W, S> CacheMetrics for SieveCache<K, V, W, S>
where
    K: Hash + Eq + Clone,
    W: WeightFn<V>,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        self.segment.metrics().algorithm_name()
    }
}

impl<K, V, W, S> fmt::Debug for SieveCache<K, V, W, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SieveCache")
            .field("segment", &self.segment)
            .finish()
    }
}
