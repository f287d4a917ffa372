// Data models for SIEVE cache simulation

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Represents a single cache request
#[derive(Debug, Clone)]
pub struct Request {
    /// Unix timestamp of the request in seconds
    #[allow(dead_code)]
    pub timestamp: u64,
    /// Cache key
    pub key: String,
    /// Size of the object in bytes
    pub size: u64,
}

impl Request {
    pub fn new(timestamp: u64, key: String, size: u64) -> Self {
        Self {
            timestamp,
            key,
            size,
        }
    }
}

/// Cache execution mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CacheMode {
    /// Single-threaded `SieveCache`
    Sequential,
    /// Mutex-wrapped `ConcurrentSieveCache`
    Concurrent,
}

impl CacheMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheMode::Sequential => "Sequential",
            CacheMode::Concurrent => "Concurrent",
        }
    }

    pub fn all() -> Vec<CacheMode> {
        vec![CacheMode::Sequential, CacheMode::Concurrent]
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Directory containing input log files
    pub input_dir: PathBuf,
    /// Maximum cache size in bytes
    pub max_size: u64,
    /// Maximum entry count (0 = no count limit)
    pub max_count: usize,
    /// Modes to simulate
    pub modes: Vec<CacheMode>,
}

/// Statistics for a single simulated cache run
#[derive(Debug, Default, Clone)]
pub struct RunStats {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Bytes served from cache (hits)
    pub bytes_hit: u64,
    /// Bytes served from backend (misses)
    pub bytes_miss: u64,
    /// Wall-clock time spent in cache operations, in nanoseconds
    pub cache_time_ns: u64,
    /// Peak cache storage in bytes
    pub peak_storage_bytes: u64,
    /// Final cache storage in bytes
    pub final_storage_bytes: u64,
    /// Evictions performed by the cache
    pub evictions: u64,
    /// Visited entries demoted in place by sweeps
    pub second_chances: u64,
    /// Times the hand wrapped past the queue front
    pub hand_wraps: u64,
}

impl RunStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total > 0 {
            (self.hits as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Byte hit rate as a percentage
    pub fn byte_hit_rate(&self) -> f64 {
        let total = self.bytes_hit + self.bytes_miss;
        if total > 0 {
            (self.bytes_hit as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Cache operations per second, counting one get and at most one set
    /// per request
    pub fn ops_per_sec(&self) -> f64 {
        if self.cache_time_ns > 0 {
            let ops = self.hits + 2 * self.misses;
            (ops as f64 * 1_000_000_000.0) / self.cache_time_ns as f64
        } else {
            0.0
        }
    }
}

/// Results of a full simulation across all modes
#[derive(Debug)]
pub struct SimulationResult {
    /// Statistics per mode
    pub stats: HashMap<CacheMode, RunStats>,
    /// Total number of requests processed
    pub total_requests: u64,
    /// Total bytes requested
    pub total_bytes: u64,
    /// Number of unique objects in the dataset
    pub unique_objects: usize,
    /// Wall-clock duration of the whole simulation
    pub duration: Duration,
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub mode: String,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub byte_hit_rate: f64,
    pub bytes_hit: u64,
    pub bytes_miss: u64,
    pub cache_time_ns: u64,
    pub ops_per_sec: f64,
    pub peak_storage_bytes: u64,
    pub final_storage_bytes: u64,
    pub evictions: u64,
    pub second_chances: u64,
    pub hand_wraps: u64,
}
