//! quantmap - distribution statistics and remapping for CSV point files
//!
//! Summarizes one column of a point file, or rewrites it so its values
//! follow a uniform distribution (`equalize`) or the distribution of the
//! same column in another file (`match`).

mod config;
mod error;
mod pipeline;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::QuantmapConfig;

#[derive(Parser)]
#[command(name = "quantmap")]
#[command(about = "Distribution statistics, equalization and matching for CSV point files")]
#[command(version)]
struct Cli {
    /// Configuration file (TOML, or JSON with a .json extension)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print count, entropy and fractiles of a column
    Stats {
        input: PathBuf,

        /// Column to summarize (0, 1 or 2)
        #[arg(short, long, default_value_t = 0)]
        column: usize,

        /// Histogram bins, overriding the configuration
        #[arg(short, long)]
        bins: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Flatten the distribution of a column over its own range
    Equalize {
        input: PathBuf,
        output: PathBuf,

        #[arg(short, long, default_value_t = 0)]
        column: usize,
    },

    /// Give a column the distribution of the same column in TARGET
    Match {
        source: PathBuf,
        target: PathBuf,
        output: PathBuf,

        #[arg(short, long, default_value_t = 0)]
        column: usize,
    },

    /// Print the effective configuration
    Config {
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::debug!(path = %path.display(), "Loading configuration");
            QuantmapConfig::load(path)?
        }
        None => QuantmapConfig::default(),
    };

    match cli.command {
        Command::Stats {
            input,
            column,
            bins,
            json,
        } => {
            if let Some(bins) = bins {
                config.partition.bins = bins;
            }
            config.validate()?;

            let stats = pipeline::run_stats(&input, column, &config)?;
            if json {
                let report = pipeline::StatsReport::new(&stats, column);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", stats);
                println!();
            }
        }
        Command::Equalize {
            input,
            output,
            column,
        } => {
            let summary = pipeline::run_equalize(&input, &output, column, &config)?;
            println!(
                "Equalized {} points ({} outside the source range)",
                summary.points, summary.invalid
            );
        }
        Command::Match {
            source,
            target,
            output,
            column,
        } => {
            let summary = pipeline::run_match(&source, &target, &output, column, &config)?;
            println!(
                "Matched {} points ({} outside the source range)",
                summary.points, summary.invalid
            );
        }
        Command::Config { json } => {
            if json {
                println!("{}", config.to_json()?);
            } else {
                print!("{}", config.to_toml()?);
            }
        }
    }

    Ok(())
}
