use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod generator;
mod input;
mod models;
mod runner;
mod stats;

/// SIEVE cache workload simulator CLI
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a request log through the SIEVE cache
    Simulate {
        /// Directory containing log files (timestamp,key,size CSV)
        #[arg(short, long, value_name = "DIR")]
        input_dir: Option<PathBuf>,

        /// Maximum cache size in bytes
        /// Example: 104857600 for 100MB, 1073741824 for 1GB
        #[arg(long, default_value = "104857600")]
        max_size: u64,

        /// Maximum entry count (0 = no count limit)
        #[arg(long, default_value = "0")]
        max_count: usize,

        /// Cache mode: sequential, concurrent, or both (default: both)
        #[arg(long, default_value = "both")]
        mode: String,

        /// Export results to CSV file
        #[arg(long, value_name = "PATH")]
        output_csv: Option<PathBuf>,
    },

    /// Generate random traffic logs
    Generate {
        /// Total number of requests
        #[arg(long, default_value = "100000")]
        requests: u64,

        /// Number of unique objects
        #[arg(long, default_value = "10000")]
        objects: u32,

        /// Percentage of traffic from popular objects (default: 80%)
        #[arg(long, default_value = "80")]
        popular_traffic: u8,

        /// Percentage of objects that are popular (default: 20%)
        #[arg(long, default_value = "20")]
        popular_objects: u8,

        /// Minimum object size in KB
        #[arg(long, default_value = "1")]
        min_size: u64,

        /// Maximum object size in KB
        #[arg(long, default_value = "1024")]
        max_size: u64,

        /// RNG seed for reproducible logs
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output directory
        #[arg(short, long, default_value = "traffic_logs")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    match args.command {
        Commands::Generate {
            requests,
            objects,
            popular_traffic,
            popular_objects,
            min_size,
            max_size,
            seed,
            output,
        } => {
            let config = generator::TrafficLogConfig {
                requests,
                unique_objects: objects,
                popular_traffic_percent: popular_traffic,
                popular_objects_percent: popular_objects,
                min_size: min_size * 1024,
                max_size: max_size * 1024,
                output_dir: output,
                seed,
            };
            let generator = generator::TrafficLogGenerator::new(config);
            let path = generator.generate()?;
            println!("Generated {requests} requests in {}", path.display());
            Ok(())
        }

        Commands::Simulate {
            input_dir,
            max_size,
            max_count,
            mode,
            output_csv,
        } => run_simulator(input_dir, max_size, max_count, mode, output_csv),
    }
}

/// Parse the mode string into CacheMode values
fn parse_modes(mode: &str) -> Vec<models::CacheMode> {
    match mode.to_lowercase().as_str() {
        "sequential" | "seq" => vec![models::CacheMode::Sequential],
        "concurrent" | "conc" => vec![models::CacheMode::Concurrent],
        "both" | "all" => models::CacheMode::all(),
        _ => {
            println!("Warning: Unknown mode '{mode}', using 'both'");
            models::CacheMode::all()
        }
    }
}

fn run_simulator(
    input_dir: Option<PathBuf>,
    max_size: u64,
    max_count: usize,
    mode: String,
    output_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    // Generate a default workload when no input directory is provided.
    let input_dir = match input_dir {
        Some(dir) => dir,
        None => {
            let dir = PathBuf::from("test_data");
            if !dir.join("requests.csv").exists() {
                println!("No input directory given, generating test data...");
                let generator = generator::TrafficLogGenerator::new(generator::TrafficLogConfig {
                    output_dir: dir.clone(),
                    ..Default::default()
                });
                generator.generate()?;
            }
            dir
        }
    };

    let modes = parse_modes(&mode);

    println!("SIEVE Cache Simulation");
    println!("======================");
    println!("Input directory: {}", input_dir.display());
    println!(
        "Max cache size: {} bytes ({:.2} MB)",
        max_size,
        max_size as f64 / 1_048_576.0
    );
    if max_count > 0 {
        println!("Max entry count: {max_count}");
    }
    println!(
        "Modes: {:?}",
        modes.iter().map(|m| m.as_str()).collect::<Vec<_>>()
    );
    println!();

    let config = models::SimulationConfig {
        input_dir,
        max_size,
        max_count,
        modes,
    };

    let result = runner::SimulationRunner::new(config).run()?;

    println!("\nSimulation completed in {:.2?}", result.duration);
    println!("Total requests: {}", result.total_requests);
    println!("Unique objects: {}", result.unique_objects);
    println!(
        "Total bytes: {} ({:.2} MB)",
        result.total_bytes,
        result.total_bytes as f64 / (1024.0 * 1024.0)
    );

    let stats = stats::SimulationStats::from_result(&result);
    stats.print_summary();
    stats.print_comparison();

    if let Some(csv_path) = output_csv {
        match stats.export_csv(&csv_path) {
            Ok(()) => println!("\nResults exported to: {}", csv_path.display()),
            Err(e) => eprintln!("Failed to export CSV: {e}"),
        }
    }

    Ok(())
}
