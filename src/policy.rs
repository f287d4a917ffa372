//! Cache Policy Contract
//!
//! The abstract operation set that any eviction strategy must implement so
//! that callers stay agnostic to which strategy is installed. The crate ships
//! one concrete strategy, [`SieveCache`](crate::SieveCache); an LRU or
//! segmented-LRU strategy implementing this same trait would be a drop-in
//! replacement with identical external semantics.
//!
//! # Contract guarantees
//!
//! - `get` / `get_with_key` mark the entry visited on a hit and have no side
//!   effect on a miss. Absence is `None`, never an error.
//! - `set` inserts or updates in place, then always runs an eviction pass.
//!   It never fails: with a byte limit of 0 the entry is inserted and then
//!   immediately evicted by the pass that follows.
//! - `remove` is a no-op on absence and must leave the strategy's internal
//!   cursors valid when it deletes the entry they reference.
//! - `set_max_size_in_bytes` / `set_max_count` apply the new limit and sweep
//!   immediately; narrowing a limit can evict live entries synchronously.
//! - Values are handed out as reference-counted handles, so eviction only
//!   drops the cache's own claim and never invalidates a value a caller is
//!   still holding.

extern crate alloc;

use alloc::sync::Arc;
use alloc::vec::Vec;

/// The operation set shared by all eviction strategies.
///
/// See the [module documentation](self) for the behavioral guarantees each
/// operation must uphold.
pub trait CachePolicy<K, V> {
    /// Returns the value stored under `key` and marks the entry visited.
    fn get(&mut self, key: &K) -> Option<Arc<V>>;

    /// Like [`get`](CachePolicy::get), but also returns the *stored* key.
    ///
    /// Useful when key equality is value-insensitive and the caller wants
    /// the canonical key the cache holds rather than the probe it supplied.
    fn get_with_key(&mut self, key: &K) -> Option<(K, Arc<V>)>;

    /// Inserts a new entry or updates an existing one, then runs an
    /// eviction pass.
    fn set(&mut self, key: K, value: Arc<V>);

    /// Deletes the entry if present and returns its value; no-op on absence.
    fn remove(&mut self, key: &K) -> Option<Arc<V>>;

    /// Removes all entries and resets the strategy's internal state.
    fn clear(&mut self);

    /// A snapshot of all current entries, in no particular order.
    fn dump(&self) -> Vec<(K, Arc<V>)>;

    /// Total weight of all stored values, in bytes.
    fn size_in_bytes(&self) -> u64;

    /// Number of live entries.
    fn count(&self) -> usize;

    /// The configured byte budget.
    fn max_size_in_bytes(&self) -> u64;

    /// The configured entry-count budget; 0 means no count restriction.
    fn max_count(&self) -> usize;

    /// Updates the byte budget and immediately runs an eviction pass.
    fn set_max_size_in_bytes(&mut self, max_size_in_bytes: u64);

    /// Updates the entry-count budget and immediately runs an eviction pass.
    fn set_max_count(&mut self, max_count: usize);
}
