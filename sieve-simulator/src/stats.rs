// Statistics reporting for cache simulation

use crate::models::{CacheMode, CsvResultRow, RunStats, SimulationResult};
use std::collections::HashMap;
use std::path::Path;

/// Collects and reports statistics from simulation runs
pub struct SimulationStats {
    stats: HashMap<CacheMode, RunStats>,
}

impl SimulationStats {
    /// Build the reporter from a finished simulation result
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            stats: result.stats.clone(),
        }
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        println!("\nSIEVE Simulation Summary");
        println!("========================");
        println!(
            "{:<12} {:>8} {:>10} {:>10} {:>10} {:>10} {:>12} {:>10} {:>10}",
            "Mode",
            "HitRate",
            "ByteHit%",
            "Hits",
            "Misses",
            "Evictions",
            "2ndChances",
            "Wraps",
            "Ops/sec"
        );
        println!("{}", "-".repeat(100));

        let mut keys: Vec<_> = self.stats.keys().copied().collect();
        keys.sort();

        for mode in keys {
            let run = &self.stats[&mode];
            println!(
                "{:<12} {:>7.2}% {:>9.2}% {:>10} {:>10} {:>10} {:>12} {:>10} {:>10.0}",
                mode.as_str(),
                run.hit_rate(),
                run.byte_hit_rate(),
                run.hits,
                run.misses,
                run.evictions,
                run.second_chances,
                run.hand_wraps,
                run.ops_per_sec()
            );
        }
    }

    /// Print a comparison between sequential and concurrent modes.
    ///
    /// Both modes run the identical algorithm under the same seed, so their
    /// hit rates must match exactly; a delta indicates a bug in the
    /// concurrent wrapper.
    pub fn print_comparison(&self) {
        let seq = self.stats.get(&CacheMode::Sequential);
        let conc = self.stats.get(&CacheMode::Concurrent);
        let (Some(seq), Some(conc)) = (seq, conc) else {
            return;
        };

        println!("\nSequential vs Concurrent");
        println!("------------------------");
        println!(
            "Hit rate:  {:.2}% vs {:.2}% (delta {:+.4})",
            seq.hit_rate(),
            conc.hit_rate(),
            conc.hit_rate() - seq.hit_rate()
        );
        println!(
            "Ops/sec:   {:.0} vs {:.0} ({:.2}x lock overhead)",
            seq.ops_per_sec(),
            conc.ops_per_sec(),
            if conc.ops_per_sec() > 0.0 {
                seq.ops_per_sec() / conc.ops_per_sec()
            } else {
                0.0
            }
        );
        if seq.hits != conc.hits {
            println!("WARNING: hit counts diverge; the wrapper changed eviction behavior");
        }
    }

    /// Export per-mode results to a CSV file
    pub fn export_csv(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let mut writer = csv::Writer::from_path(path)?;

        let mut keys: Vec<_> = self.stats.keys().copied().collect();
        keys.sort();

        for mode in keys {
            let run = &self.stats[&mode];
            writer.serialize(CsvResultRow {
                mode: mode.as_str().to_string(),
                hits: run.hits,
                misses: run.misses,
                hit_rate: run.hit_rate(),
                byte_hit_rate: run.byte_hit_rate(),
                bytes_hit: run.bytes_hit,
                bytes_miss: run.bytes_miss,
                cache_time_ns: run.cache_time_ns,
                ops_per_sec: run.ops_per_sec(),
                peak_storage_bytes: run.peak_storage_bytes,
                final_storage_bytes: run.final_storage_bytes,
                evictions: run.evictions,
                second_chances: run.second_chances,
                hand_wraps: run.hand_wraps,
            })?;
        }
        writer.flush()?;
        Ok(())
    }
}
