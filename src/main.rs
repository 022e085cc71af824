//! Zonectl CLI - headless skirmishes between computer-controlled factions.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Zonectl - a real-time zone-control skirmish simulation
#[derive(Parser, Debug)]
#[command(name = "zonectl")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single skirmish between AI factions
    Run {
        /// Random seed (default: random)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Maximum ticks before a draw (default: 12000)
        #[arg(short, long)]
        ticks: Option<u32>,

        /// Fixed timestep in seconds (default: 0.1)
        #[arg(long)]
        dt: Option<f64>,

        /// Simulation config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Run many skirmishes in parallel and aggregate statistics
    Batch {
        /// Number of games to run (default: 100)
        #[arg(short, long, default_value = "100")]
        games: u64,

        /// Starting seed (increments for each game)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Simulation config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text, json, or csv
        #[arg(short, long, default_value = "text")]
        format: cli::BatchFormat,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Print the default simulation config as JSON
    Config,
}

fn main() -> ExitCode {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .try_init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            seed,
            ticks,
            dt,
            config,
            format,
        } => cli::run::execute(seed, ticks, dt, config, format),

        Commands::Batch {
            games,
            seed,
            threads,
            config,
            format,
            progress,
        } => cli::batch::execute(games, seed, threads, config, format, progress),

        Commands::Config => cli::config::execute(),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
