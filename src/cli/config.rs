//! Config command implementation.

use super::CliError;
use zonectl::SimConfig;

/// Print the default configuration as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub(crate) fn execute() -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(&SimConfig::default())?;
    println!("{json}");
    Ok(())
}
