//! Correctness Tests for the SIEVE Cache
//!
//! This module validates the fundamental correctness of the eviction policy
//! using simple, predictable access patterns. Each test explicitly validates
//! which specific key gets evicted when a set causes an eviction.
//!
//! ## Test Strategy
//! - Small budgets (2-5 units) for predictable behavior
//! - Simple, deterministic access patterns
//! - Explicit checks for which key was evicted after each set
//! - Separate sections for unit-weight, sized-weight, and dual-limit behavior

use sieve_rs::config::SieveCacheConfig;
use sieve_rs::metrics::CacheMetrics;
use sieve_rs::{CachePolicy, SieveCache};
use std::sync::Arc;

// ============================================================================
// HELPER FUNCTIONS FOR CACHE CREATION
// ============================================================================

/// Helper to create a unit-weight SieveCache with the given limits
fn make_sieve<K: std::hash::Hash + Eq + Clone, V>(
    max_size: u64,
    max_count: usize,
) -> SieveCache<K, V> {
    let config = SieveCacheConfig {
        max_size_in_bytes: max_size,
        max_count,
    };
    SieveCache::init(config, None)
}

/// Helper to create a SieveCache weighing String values by length
fn make_sized_sieve<K: std::hash::Hash + Eq + Clone>(
    max_size: u64,
) -> SieveCache<K, String, fn(&String) -> u64> {
    let config = SieveCacheConfig {
        max_size_in_bytes: max_size,
        max_count: 0,
    };
    SieveCache::with_weigher(config, (|v: &String| v.len() as u64) as fn(&String) -> u64)
}

fn keys<K: Clone + Ord, V>(cache: &SieveCache<K, V, impl sieve_rs::WeightFn<V>>) -> Vec<K>
where
    K: std::hash::Hash + Eq,
{
    let mut keys: Vec<K> = cache.dump().into_iter().map(|(k, _)| k).collect();
    keys.sort();
    keys
}

// ============================================================================
// SECTION 1: UNIT-WEIGHT EVICTION ORDER
// ============================================================================
// With the default EqualWeight weigher every entry weighs 1 and
// max_size_in_bytes acts as an entry budget, which makes the hand's path
// fully predictable.

#[test]
fn test_sieve_evicts_oldest_unvisited() {
    let mut cache = make_sieve(3, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));

    // Nothing visited: the hand starts at the front and evicts key 1.
    cache.set(4, Arc::new(40));
    assert!(cache.get(&1).is_none(), "Oldest unvisited key should be evicted");
    assert_eq!(keys(&cache), vec![2, 3, 4]);
}

#[test]
fn test_sieve_visited_entry_gets_second_chance() {
    let mut cache = make_sieve(3, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));
    cache.get(&1);

    // Key 1 is visited: the hand demotes it and evicts key 2 instead.
    cache.set(4, Arc::new(40));
    assert!(cache.get(&1).is_some(), "Visited key should be spared");
    assert!(cache.get(&2).is_none(), "Next unvisited key should be evicted");
    assert_eq!(keys(&cache), vec![1, 3, 4]);
}

#[test]
fn test_sieve_hand_persists_between_evictions() {
    let mut cache = make_sieve(3, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));

    // First eviction takes key 1 and leaves the hand parked on key 2's
    // position. Only probe the evicted key: probing a resident one would
    // set its visited bit and change the next sweep.
    cache.set(4, Arc::new(40));
    assert!(cache.get(&1).is_none());

    // The next eviction resumes from the hand, not from the queue front:
    // key 2 (now the entry under the hand, unvisited) goes next.
    cache.set(5, Arc::new(50));
    assert_eq!(keys(&cache), vec![3, 4, 5]);
}

#[test]
fn test_sieve_get_does_not_reorder() {
    // An access pattern that would fully protect entries under LRU: touch
    // each resident entry, newest first. Under SIEVE the queue order never
    // changes; all residents are demoted in insertion order and the
    // unvisited newcomer is the one bounced out.
    let mut cache = make_sieve(3, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));
    cache.get(&3);
    cache.get(&2);
    cache.get(&1);

    cache.set(4, Arc::new(40));
    assert!(cache.get(&4).is_none(), "Unvisited newcomer should be evicted");
    assert_eq!(keys(&cache), vec![1, 2, 3]);
}

#[test]
fn test_sieve_update_marks_visited() {
    let mut cache = make_sieve(3, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));

    // Updating key 1 replaces its value and sets the visited bit.
    cache.set(1, Arc::new(11));
    assert_eq!(cache.len(), 3, "Update must not grow the cache");

    cache.set(4, Arc::new(40));
    assert_eq!(cache.get(&1).as_deref(), Some(&11), "Updated key should be spared");
    assert!(cache.get(&2).is_none());
}

#[test]
fn test_sieve_eviction_loop_until_within_budget() {
    let mut cache = make_sieve(5, 0);
    for i in 1..=5 {
        cache.set(i, Arc::new(i));
    }
    // Shrinking to 2 forces three evictions in one sweep.
    cache.set_max_size_in_bytes(2);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.size_in_bytes(), 2);
}

// ============================================================================
// SECTION 2: WEIGHT-AWARE BEHAVIOR
// ============================================================================

#[test]
fn test_sized_eviction_stops_once_under_budget() {
    let mut cache = make_sized_sieve(10);
    cache.set("A", Arc::new(String::from("12345")));
    cache.set("B", Arc::new(String::from("123")));
    cache.get(&"A");

    // 5 + 3 + 4 = 12 > 10. The sweep spares visited A, evicts B, and stops
    // at 9 bytes without touching C.
    cache.set("C", Arc::new(String::from("1234")));
    assert_eq!(cache.size_in_bytes(), 9);
    assert!(cache.get(&"B").is_none());
    assert!(cache.get(&"A").is_some());
    assert!(cache.get(&"C").is_some());
}

#[test]
fn test_sized_update_adjusts_accounting() {
    let mut cache = make_sized_sieve(100);
    cache.set("k", Arc::new(String::from("0123456789")));
    assert_eq!(cache.size_in_bytes(), 10);

    cache.set("k", Arc::new(String::from("01")));
    assert_eq!(cache.size_in_bytes(), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_sized_growth_by_update_triggers_eviction() {
    let mut cache = make_sized_sieve(10);
    cache.set("a", Arc::new(String::from("1234")));
    cache.set("b", Arc::new(String::from("1234")));

    // Growing "b" to 8 bytes pushes the total to 12; "a" is unvisited and
    // goes, "b" was just marked visited by the update and stays.
    cache.set("b", Arc::new(String::from("12345678")));
    assert!(cache.get(&"a").is_none());
    assert_eq!(cache.get(&"b").unwrap().len(), 8);
    assert_eq!(cache.size_in_bytes(), 8);
}

#[test]
fn test_zero_weight_entries_are_free() {
    let mut cache = make_sized_sieve(5);
    for i in 0..100 {
        cache.set(i, Arc::new(String::new()));
    }
    // Empty strings weigh nothing, so no byte pressure ever builds.
    assert_eq!(cache.len(), 100);
    assert_eq!(cache.size_in_bytes(), 0);
}

#[test]
fn test_oversized_entry_admitted_then_swept() {
    let mut cache = make_sized_sieve(4);
    cache.set("big", Arc::new(String::from("123456789")));
    // The sweep runs until under budget or empty; a lone oversized entry
    // empties the cache.
    assert!(cache.is_empty());
    assert_eq!(cache.size_in_bytes(), 0);
}

// ============================================================================
// SECTION 3: DUAL-LIMIT ENFORCEMENT
// ============================================================================

#[test]
fn test_count_limit_binds_before_byte_limit() {
    let mut cache = make_sieve(u64::MAX, 2);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));
    assert_eq!(cache.len(), 2, "Count limit should bind despite byte headroom");
}

#[test]
fn test_byte_limit_binds_before_count_limit() {
    let mut cache: SieveCache<i32, String, fn(&String) -> u64> =
        SieveCache::with_weigher(
            SieveCacheConfig {
                max_size_in_bytes: 6,
                max_count: 100,
            },
            (|v: &String| v.len() as u64) as fn(&String) -> u64,
        );
    cache.set(1, Arc::new(String::from("1234")));
    cache.set(2, Arc::new(String::from("1234")));
    assert_eq!(cache.len(), 1, "Byte limit should bind despite count headroom");
}

#[test]
fn test_zero_byte_budget_accepts_nothing() {
    let mut cache = make_sieve(0, 0);
    cache.set(1, Arc::new(10));
    assert!(cache.is_empty());
}

#[test]
fn test_zero_count_means_no_count_limit() {
    let mut cache = make_sieve(1000, 0);
    for i in 0..1000 {
        cache.set(i, Arc::new(i));
    }
    assert_eq!(cache.len(), 1000);
}

#[test]
fn test_limits_can_be_widened_and_renarrowed() {
    let mut cache = make_sieve(2, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));

    cache.set_max_size_in_bytes(4);
    cache.set(3, Arc::new(30));
    cache.set(4, Arc::new(40));
    assert_eq!(cache.len(), 4);

    cache.set_max_count(1);
    assert_eq!(cache.len(), 1);
}

// ============================================================================
// SECTION 4: REMOVE, CLEAR, AND HANDLE STABILITY
// ============================================================================

#[test]
fn test_remove_returns_value_and_shrinks() {
    let mut cache = make_sized_sieve(100);
    cache.set("k", Arc::new(String::from("12345")));
    let removed = cache.remove(&"k").expect("entry should be present");
    assert_eq!(removed.as_str(), "12345");
    assert!(cache.is_empty());
    assert_eq!(cache.size_in_bytes(), 0);
    assert!(cache.remove(&"k").is_none(), "Second remove should be a no-op");
}

#[test]
fn test_remove_entry_under_hand_then_keep_evicting() {
    let mut cache = make_sieve(3, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.set(3, Arc::new(30));
    cache.get(&1);
    // Overflow: 1 demoted, 2 evicted, hand rests on 3.
    cache.set(4, Arc::new(40));
    // Remove the entry the hand points at, then keep churning.
    cache.remove(&3);
    cache.set(5, Arc::new(50));
    cache.set(6, Arc::new(60));
    assert!(cache.len() <= 3);
    assert_eq!(cache.size_in_bytes(), cache.len() as u64);
}

#[test]
fn test_clear_then_reuse() {
    let mut cache = make_sieve(3, 0);
    for i in 0..3 {
        cache.set(i, Arc::new(i));
    }
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.size_in_bytes(), 0);

    // The cache stays fully functional after a clear.
    for i in 10..13 {
        cache.set(i, Arc::new(i));
    }
    assert_eq!(cache.len(), 3);
    cache.set(13, Arc::new(13));
    assert_eq!(cache.len(), 3);
}

#[test]
fn test_value_handles_survive_eviction() {
    let mut cache = make_sieve(1, 0);
    cache.set("a", Arc::new(vec![1, 2, 3]));
    let handle = cache.get(&"a").unwrap();

    cache.set("b", Arc::new(vec![4]));
    cache.set("c", Arc::new(vec![5]));
    assert!(cache.get(&"a").is_none(), "Entry should have been evicted");
    assert_eq!(*handle, vec![1, 2, 3], "Held handle must survive eviction");
}

// ============================================================================
// SECTION 5: CALLBACK, METRICS, AND TRAIT SURFACE
// ============================================================================

#[test]
fn test_weight_loss_callback_sees_every_sweep() {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc as StdArc;

    let lost = StdArc::new(AtomicU64::new(0));
    let calls = StdArc::new(AtomicU64::new(0));

    let mut cache = make_sized_sieve(8);
    let lost_in_cb = StdArc::clone(&lost);
    let calls_in_cb = StdArc::clone(&calls);
    cache.set_weight_loss_callback(Box::new(move |weight| {
        lost_in_cb.fetch_add(weight, Ordering::Relaxed);
        calls_in_cb.fetch_add(1, Ordering::Relaxed);
    }));

    cache.set("a", Arc::new(String::from("1234"))); // no eviction, reports 0
    cache.set("b", Arc::new(String::from("1234"))); // no eviction, reports 0
    assert_eq!(calls.load(Ordering::Relaxed), 2);
    assert_eq!(lost.load(Ordering::Relaxed), 0);

    cache.set("c", Arc::new(String::from("12"))); // evicts a (4 bytes)
    assert_eq!(calls.load(Ordering::Relaxed), 3);
    assert_eq!(lost.load(Ordering::Relaxed), 4);

    // Narrowing the limit also runs a sweep and reports its losses.
    cache.set_max_size_in_bytes(0);
    assert_eq!(calls.load(Ordering::Relaxed), 4);
    assert_eq!(lost.load(Ordering::Relaxed), 10);
}

#[test]
fn test_metrics_report_hits_misses_and_sieve_counters() {
    let mut cache = make_sieve(2, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.get(&1);
    if cache.get(&99).is_none() {
        cache.record_miss(1);
    }
    cache.set(3, Arc::new(30)); // demotes 1, evicts 2

    let metrics = cache.metrics();
    assert_eq!(metrics.get("cache_hits"), Some(&1.0));
    assert_eq!(metrics.get("cache_misses"), Some(&1.0));
    assert_eq!(metrics.get("bytes_written_to_cache"), Some(&3.0));
    assert_eq!(metrics.get("evictions"), Some(&1.0));
    assert_eq!(metrics.get("second_chances"), Some(&1.0));
    assert_eq!(metrics.get("cache_size_bytes"), Some(&2.0));
    assert_eq!(cache.algorithm_name(), "SIEVE");
}

#[test]
fn test_hand_wrap_counter_increments() {
    let mut cache = make_sieve(2, 0);
    cache.set(1, Arc::new(10));
    cache.set(2, Arc::new(20));
    cache.get(&1);
    cache.get(&2);
    // Everything visited: the sweep demotes 1 and 2, falls off the tail to
    // the newcomer, evicts it, and the wrap is recorded.
    cache.set(3, Arc::new(30));
    let metrics = cache.metrics();
    assert!(metrics.get("hand_wraps").copied().unwrap_or(0.0) >= 1.0);
}

#[test]
fn test_cache_policy_trait_object() {
    let mut cache: SieveCache<String, i32> = make_sieve(2, 0);
    let policy: &mut dyn CachePolicy<String, i32> = &mut cache;

    policy.set(String::from("x"), Arc::new(1));
    policy.set(String::from("y"), Arc::new(2));
    assert_eq!(policy.count(), 2);
    assert_eq!(policy.size_in_bytes(), 2);
    assert_eq!(policy.max_size_in_bytes(), 2);
    assert_eq!(policy.max_count(), 0);

    let (key, value) = policy.get_with_key(&String::from("x")).unwrap();
    assert_eq!(key, "x");
    assert_eq!(*value, 1);

    policy.set_max_size_in_bytes(1);
    assert_eq!(policy.count(), 1);
    policy.clear();
    assert_eq!(policy.count(), 0);
}

#[test]
fn test_dump_matches_live_contents() {
    let mut cache = make_sieve(10, 0);
    for i in 0..5 {
        cache.set(i, Arc::new(i * 100));
    }
    let mut dumped: Vec<(i32, i32)> = cache.dump().into_iter().map(|(k, v)| (k, *v)).collect();
    dumped.sort();
    assert_eq!(dumped, vec![(0, 0), (1, 100), (2, 200), (3, 300), (4, 400)]);
}

// ============================================================================
// SECTION 6: WORKLOAD SANITY
// ============================================================================

#[test]
fn test_skewed_workload_retains_hot_keys() {
    // Keys 0-4 are hot (touched every round), keys 5.. are one-shot. After
    // sustained churn the hot set must still be resident.
    let mut cache = make_sieve(10, 0);
    for i in 0..5 {
        cache.set(i, Arc::new(i));
    }
    for cold in 5..200 {
        for hot in 0..5 {
            cache.get(&hot);
        }
        cache.set(cold, Arc::new(cold));
    }
    for hot in 0..5 {
        assert!(
            cache.get(&hot).is_some(),
            "Hot key {hot} should survive cold churn"
        );
    }
    assert_eq!(cache.len(), 10);
}

#[test]
fn test_accounting_consistent_after_mixed_operations() {
    let mut cache = make_sized_sieve(64);
    for i in 0..100u32 {
        let len = (i % 7) as usize;
        cache.set(i, Arc::new("x".repeat(len)));
        if i % 3 == 0 {
            cache.get(&(i / 2));
        }
        if i % 11 == 0 {
            cache.remove(&(i / 3));
        }
    }
    let expected: u64 = cache.dump().iter().map(|(_, v)| v.len() as u64).sum();
    assert_eq!(cache.size_in_bytes(), expected);
    assert!(cache.size_in_bytes() <= 64);
}
