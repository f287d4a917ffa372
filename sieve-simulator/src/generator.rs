//! Synthetic traffic generation
//!
//! Produces request logs with a popular/regular split: a small fraction of
//! objects receives most of the traffic, with a Zipf-like skew inside the
//! popular set. This is the shape of workload SIEVE is designed for, so the
//! generated logs make hit-rate differences between configurations visible.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

/// Parameters for generating random traffic logs
pub struct TrafficLogConfig {
    /// Total number of requests to generate
    pub requests: u64,
    /// Number of unique objects
    pub unique_objects: u32,
    /// Percentage of traffic that goes to popular objects
    pub popular_traffic_percent: u8,
    /// Percentage of objects considered "popular"
    pub popular_objects_percent: u8,
    /// Minimum object size in bytes
    pub min_size: u64,
    /// Maximum object size in bytes
    pub max_size: u64,
    /// Output directory
    pub output_dir: PathBuf,
    /// RNG seed; a fixed seed makes runs reproducible
    pub seed: u64,
}

impl Default for TrafficLogConfig {
    fn default() -> Self {
        Self {
            requests: 100_000,
            unique_objects: 10_000,
            popular_traffic_percent: 80,
            popular_objects_percent: 20,
            min_size: 1024,        // 1KB
            max_size: 1024 * 1024, // 1MB
            output_dir: PathBuf::from("traffic_logs"),
            seed: 42,
        }
    }
}

/// Generator for random traffic logs
pub struct TrafficLogGenerator {
    config: TrafficLogConfig,
}

impl TrafficLogGenerator {
    pub fn new(config: TrafficLogConfig) -> Self {
        Self { config }
    }

    /// Generate a request log according to the configuration.
    ///
    /// Object sizes are fixed per object (derived from the object id), so a
    /// re-requested key always reports the same size, matching how real
    /// origin objects behave.
    pub fn generate(&self) -> std::io::Result<PathBuf> {
        let config = &self.config;
        fs::create_dir_all(&config.output_dir)?;
        let path = config.output_dir.join("requests.csv");

        let mut rng = StdRng::seed_from_u64(config.seed);
        let mut writer = BufWriter::with_capacity(1024 * 1024, File::create(&path)?);
        writeln!(writer, "timestamp,key,size")?;

        let popular_objects =
            (config.unique_objects as u64 * config.popular_objects_percent as u64 / 100).max(1);
        let regular_objects = (config.unique_objects as u64).saturating_sub(popular_objects).max(1);
        let popular_probability = config.popular_traffic_percent as f64 / 100.0;

        let mut timestamp = 1_700_000_000u64;
        for _ in 0..config.requests {
            let object_id = if rng.gen::<f64>() < popular_probability {
                // Zipf-like skew inside the popular set: low ranks soak up
                // a disproportionate share of the popular traffic.
                let rank = rng.gen_range(0..popular_objects);
                let zipf_factor = 1.0 / ((rank + 1) as f64).powf(0.8);
                if rng.gen::<f64>() < zipf_factor * 0.8 {
                    rank / 10
                } else {
                    rank
                }
            } else {
                popular_objects + rng.gen_range(0..regular_objects)
            };

            let size = self.object_size(object_id);
            writeln!(writer, "{timestamp},obj_{object_id},{size}")?;
            timestamp += rng.gen_range(0..2);
        }
        writer.flush()?;

        Ok(path)
    }

    /// Deterministic per-object size in `[min_size, max_size]`
    fn object_size(&self, object_id: u64) -> u64 {
        let span = self.config.max_size.saturating_sub(self.config.min_size);
        if span == 0 {
            return self.config.min_size;
        }
        // Cheap integer hash so sizes look uncorrelated with popularity.
        let mut h = object_id.wrapping_mul(0x9E37_79B9_7F4A_7C15);
        h ^= h >> 33;
        self.config.min_size + h % (span + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_size_is_stable_and_bounded() {
        let generator = TrafficLogGenerator::new(TrafficLogConfig {
            min_size: 100,
            max_size: 200,
            ..Default::default()
        });
        for id in 0..1000 {
            let size = generator.object_size(id);
            assert_eq!(size, generator.object_size(id));
            assert!((100..=200).contains(&size));
        }
    }

    #[test]
    fn test_generate_writes_parseable_log() {
        let dir = std::env::temp_dir().join("sieve_simulator_generator_test");
        let _ = fs::remove_dir_all(&dir);
        let generator = TrafficLogGenerator::new(TrafficLogConfig {
            requests: 500,
            unique_objects: 50,
            output_dir: dir.clone(),
            ..Default::default()
        });
        let path = generator.generate().unwrap();
        let content = fs::read_to_string(&path).unwrap();
        // Header plus one line per request.
        assert_eq!(content.lines().count(), 501);
        assert!(content.starts_with("timestamp,key,size"));
        let _ = fs::remove_dir_all(&dir);
    }
}
