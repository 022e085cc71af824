//! Batch command implementation.

#![allow(clippy::cast_precision_loss)]

use std::path::PathBuf;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use super::output::{format_batch_csv, format_batch_text, BatchStats, JsonBatchResult};
use super::{resolve_seed, skirmish_config, BatchFormat, CliError};
use zonectl::skirmish::Skirmish;

/// Execute the batch command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub(crate) fn execute(
    games: u64,
    seed: Option<u64>,
    threads: Option<usize>,
    config: Option<PathBuf>,
    format: BatchFormat,
    progress: bool,
) -> Result<(), CliError> {
    let config = skirmish_config(config.as_deref(), None, None)?;
    // Fail fast on a bad configuration instead of once per game.
    Skirmish::new(0, &config)?;

    if let Some(num_threads) = threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized
    }

    let base_seed = resolve_seed(seed);
    let num_factions = config.sim.factions.len();

    let pb = if progress {
        let pb = ProgressBar::new(games);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} games ({per_sec})")
            .map_err(|e| CliError::new(format!("Invalid progress template: {e}")))?
            .progress_chars("=>-");
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    let start = Instant::now();

    // Each thread accumulates into its own BatchStats, merged at the end
    let stats = (0..games)
        .into_par_iter()
        .fold(
            || BatchStats::new(num_factions),
            |mut local, i| {
                if let Ok(skirmish) = Skirmish::new(base_seed.wrapping_add(i), &config) {
                    local.add_result(&skirmish.run());
                }
                if let Some(pb) = &pb {
                    pb.inc(1);
                }
                local
            },
        )
        .reduce(
            || BatchStats::new(num_factions),
            |mut a, b| {
                a.merge(&b);
                a
            },
        );

    if let Some(pb) = pb {
        pb.finish_with_message("done");
    }

    let duration = start.elapsed();
    let games_per_sec = if duration.as_secs_f64() > 0.0 {
        stats.games_played as f64 / duration.as_secs_f64()
    } else {
        0.0
    };

    match format {
        BatchFormat::Text => {
            println!();
            print!("{}", format_batch_text(&stats));
            println!();
            println!(
                "Duration: {:.2}s ({games_per_sec:.0} games/sec)",
                duration.as_secs_f64()
            );
        }
        BatchFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonBatchResult::from_stats(&stats))?;
            println!("{json}");
        }
        BatchFormat::Csv => {
            print!("{}", format_batch_csv(&stats));
        }
    }

    Ok(())
}
