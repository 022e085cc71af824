//! Run command implementation.

use std::path::PathBuf;

use super::output::{format_text, JsonRunResult};
use super::{resolve_seed, skirmish_config, CliError, OutputFormat};
use zonectl::skirmish::Skirmish;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or is invalid.
pub(crate) fn execute(
    seed: Option<u64>,
    ticks: Option<u32>,
    dt: Option<f64>,
    config: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), CliError> {
    let seed = resolve_seed(seed);
    let config = skirmish_config(config.as_deref(), dt, ticks)?;

    let mut skirmish = Skirmish::new(seed, &config)?;
    while skirmish.step() {}
    let result = skirmish.result();

    match format {
        OutputFormat::Text => {
            print!("{}", format_text(&result));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonRunResult {
                result: &result,
                snapshot: skirmish.snapshot(),
            })?;
            println!("{json}");
        }
    }

    Ok(())
}
