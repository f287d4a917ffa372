//! Simulation runner
//!
//! Replays request logs through the SIEVE cache in each requested mode and
//! collects hit-rate, storage, and timing statistics. The cache stores the
//! object size as its value and weighs entries by it, so eviction pressure
//! tracks the byte budget exactly as a real object cache would.

use crate::input::{LogParseError, LogReader};
use crate::models::{CacheMode, RunStats, SimulationConfig, SimulationResult};
use ahash::RandomState;
use sieve_rs::config::SieveCacheConfig;
use sieve_rs::metrics::CacheMetrics;
use sieve_rs::{ConcurrentSieveCache, SieveCache};
use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

type Weigher = fn(&u64) -> u64;

fn weigh(value: &u64) -> u64 {
    *value
}

/// Either cache flavor behind one replay interface
enum SimCache {
    Sequential(SieveCache<String, u64, Weigher, RandomState>),
    Concurrent(ConcurrentSieveCache<String, u64, Weigher, RandomState>),
}

impl SimCache {
    fn build(mode: CacheMode, config: &SimulationConfig) -> Self {
        let cache_config = SieveCacheConfig {
            max_size_in_bytes: config.max_size,
            max_count: config.max_count,
        };
        // Fixed seeds keep replays reproducible across runs and modes.
        let hasher = RandomState::with_seeds(1, 2, 3, 4);
        match mode {
            CacheMode::Sequential => SimCache::Sequential(SieveCache::with_weigher_and_hasher(
                cache_config,
                weigh as Weigher,
                hasher,
            )),
            CacheMode::Concurrent => {
                SimCache::Concurrent(ConcurrentSieveCache::with_weigher_and_hasher(
                    cache_config,
                    weigh as Weigher,
                    hasher,
                ))
            }
        }
    }

    fn get(&mut self, key: &str) -> bool {
        match self {
            SimCache::Sequential(cache) => cache.get(key).is_some(),
            SimCache::Concurrent(cache) => cache.get(key).is_some(),
        }
    }

    fn admit(&mut self, key: &str, size: u64) {
        match self {
            SimCache::Sequential(cache) => {
                cache.record_miss(size);
                cache.set(key.to_string(), Arc::new(size));
            }
            SimCache::Concurrent(cache) => {
                cache.record_miss(size);
                cache.set(key.to_string(), Arc::new(size));
            }
        }
    }

    fn size_in_bytes(&self) -> u64 {
        match self {
            SimCache::Sequential(cache) => cache.size_in_bytes(),
            SimCache::Concurrent(cache) => cache.size_in_bytes(),
        }
    }

    fn metric(&self, name: &str) -> u64 {
        let metrics = match self {
            SimCache::Sequential(cache) => cache.metrics(),
            SimCache::Concurrent(cache) => cache.metrics(),
        };
        metrics.get(name).copied().unwrap_or(0.0) as u64
    }
}

/// Runs the configured simulation and aggregates per-mode statistics
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<SimulationResult, LogParseError> {
        let started = Instant::now();
        let reader = LogReader::new(&self.config.input_dir);

        let mut stats: HashMap<CacheMode, RunStats> = HashMap::new();
        let mut total_requests = 0u64;
        let mut total_bytes = 0u64;
        let mut unique_objects = 0usize;

        for (run_index, &mode) in self.config.modes.iter().enumerate() {
            println!("Replaying log through {mode} cache...");
            let mut cache = SimCache::build(mode, &self.config);
            let mut run = RunStats::default();
            // Only the first replay pays for dataset-wide counting.
            let mut seen: Option<HashSet<String>> =
                (run_index == 0).then(HashSet::new);

            for request in reader.stream_requests()? {
                let request = request?;

                if let Some(seen) = seen.as_mut() {
                    if seen.insert(request.key.clone()) {
                        unique_objects += 1;
                    }
                    total_requests += 1;
                    total_bytes += request.size;
                }

                let op_start = Instant::now();
                if cache.get(&request.key) {
                    run.hits += 1;
                    run.bytes_hit += request.size;
                } else {
                    cache.admit(&request.key, request.size);
                    run.misses += 1;
                    run.bytes_miss += request.size;
                }
                run.cache_time_ns += op_start.elapsed().as_nanos() as u64;
                run.peak_storage_bytes = run.peak_storage_bytes.max(cache.size_in_bytes());
            }

            run.final_storage_bytes = cache.size_in_bytes();
            run.evictions = cache.metric("evictions");
            run.second_chances = cache.metric("second_chances");
            run.hand_wraps = cache.metric("hand_wraps");
            stats.insert(mode, run);
        }

        Ok(SimulationResult {
            stats,
            total_requests,
            total_bytes,
            unique_objects,
            duration: started.elapsed(),
        })
    }
}
