#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## How SIEVE Decides
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │              Insertion-ordered queue, oldest on the left         │
//! │                                                                  │
//! │   front ──▶ [A*] ── [B ] ── [C*] ── [D ] ◀── new inserts         │
//! │                       ▲                                          │
//! │                      hand          (* = visited bit set)         │
//! │                                                                  │
//! │   On overflow, the hand inspects its entry:                      │
//! │     visited?   clear the bit, advance      (second chance)       │
//! │     unvisited? evict, advance                                    │
//! │   Past the tail the hand wraps back to the front.                │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A hit never moves an entry; it only sets the visited bit. That keeps hits
//! at a single hash-map probe with no list surgery, which is where SIEVE's
//! simplicity win over LRU comes from.
//!
//! ## Quick Reference
//!
//! | Type | Description |
//! |------|-------------|
//! | [`SieveCache`] | Single-threaded weight-aware SIEVE cache |
//! | [`ConcurrentSieveCache`] | Mutex-wrapped variant (`concurrent` feature) |
//! | [`CachePolicy`] | Object-safe trait over the cache operations |
//! | [`WeightFn`] / [`EqualWeight`] | Value-weighing strategies |
//!
//! ## Code Examples
//!
//! ### Counting entries
//!
//! With the default [`EqualWeight`] weigher every entry weighs 1, so
//! `max_size_in_bytes` acts as a plain entry limit:
//!
//! ```rust
//! use sieve_rs::SieveCache;
//! use sieve_rs::config::SieveCacheConfig;
//! use std::sync::Arc;
//!
//! let config = SieveCacheConfig { max_size_in_bytes: 2, max_count: 0 };
//! let mut cache = SieveCache::init(config, None);
//! cache.set("a", Arc::new(1));
//! cache.set("b", Arc::new(2));
//! cache.get(&"a");                // "a" is now visited
//! cache.set("c", Arc::new(3));    // "b" evicted, "a" spared
//! assert!(cache.get(&"b").is_none());
//! ```
//!
//! ### Weighing by size
//!
//! ```rust
//! use sieve_rs::SieveCache;
//! use sieve_rs::config::SieveCacheConfig;
//! use std::sync::Arc;
//!
//! let config = SieveCacheConfig { max_size_in_bytes: 1024, max_count: 0 };
//! let mut cache = SieveCache::with_weigher(config, |v: &Vec<u8>| v.len() as u64);
//! cache.set("blob", Arc::new(vec![0u8; 600]));
//! assert_eq!(cache.size_in_bytes(), 600);
//! ```
//!
//! ### Dual limits
//!
//! Both budgets are enforced together; `max_count: 0` disables the count
//! limit while `max_size_in_bytes: 0` rejects everything:
//!
//! ```rust
//! use sieve_rs::SieveCache;
//! use sieve_rs::config::SieveCacheConfig;
//! use std::sync::Arc;
//!
//! let config = SieveCacheConfig { max_size_in_bytes: u64::MAX, max_count: 3 };
//! let mut cache = SieveCache::init(config, None);
//! for i in 0..10 {
//!     cache.set(i, Arc::new(i));
//! }
//! assert_eq!(cache.len(), 3);
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Cache configuration structure
//! - [`policy`]: The [`CachePolicy`] trait
//! - [`weight`]: Weighing strategies and the weight-loss callback type
//! - [`metrics`]: Metrics collection and reporting
//! - [`concurrent`]: Thread-safe wrapper (requires the `concurrent` feature)

#![no_std]

#[cfg(not(feature = "hashbrown"))]
extern crate std;

/// Cache configuration structures.
///
/// Provides the dual-limit configuration shared by the single-threaded and
/// concurrent caches.
pub mod config;

/// The object-safe cache-policy trait.
///
/// Lets callers hold a `dyn CachePolicy<K, V>` without committing to the
/// weigher or hasher type parameters.
pub mod policy;

/// Value-weighing strategies.
///
/// Provides the [`WeightFn`] trait, the unit-weight [`EqualWeight`] strategy,
/// a blanket implementation for plain closures, and the
/// [`WeightLossCallback`] type used to observe eviction sweeps.
pub mod weight;

/// Insertion-ordered queue over a slot arena.
///
/// **Note**: internal infrastructure. Nodes are addressed by stable slot
/// ids rather than pointers, so links never dangle across removals. Use the
/// high-level cache instead.
pub(crate) mod queue;

/// SIEVE cache implementation.
///
/// Provides a weight-aware cache that evicts with a persistent second-chance
/// hand over the insertion order.
pub mod sieve;

/// Cache metrics system.
///
/// Provides core hit/miss/size counters plus the SIEVE-specific
/// `second_chances` and `hand_wraps` counters, reported through a common
/// interface.
pub mod metrics;

/// Concurrent cache implementation.
///
/// Provides a thread-safe SIEVE cache that serializes all operations behind
/// a single mutex. SIEVE's hand is global state over one insertion order, so
/// the key space is not partitioned into independently locked segments.
///
/// Available when the `concurrent` feature is enabled.
#[cfg(feature = "concurrent")]
pub mod concurrent;

// Re-export cache types
pub use sieve::SieveCache;

// Re-export the policy trait and weighing strategies
pub use policy::CachePolicy;
pub use weight::{EqualWeight, WeightFn, WeightLossCallback};

#[cfg(feature = "concurrent")]
pub use concurrent::ConcurrentSieveCache;
