//! CLI command implementations for zonectl.

pub(crate) mod batch;
pub(crate) mod config;
pub(crate) mod run;

mod output;

use clap::ValueEnum;
use std::error::Error;
use std::fmt;
use std::path::Path;

use zonectl::{SimConfig, SkirmishConfig};

/// Output format for the `run` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output, including the final world snapshot.
    Json,
}

/// Output format for the `batch` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BatchFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON output.
    Json,
    /// CSV format.
    Csv,
}

/// CLI error type.
#[derive(Debug)]
pub(crate) struct CliError {
    message: String,
}

impl CliError {
    /// Create a new CLI error.
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        Self::new(e.to_string())
    }
}

impl From<zonectl::ConfigError> for CliError {
    fn from(e: zonectl::ConfigError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<zonectl::SkirmishError> for CliError {
    fn from(e: zonectl::SkirmishError) -> Self {
        Self::new(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization failed: {e}"))
    }
}

/// Build a match configuration from the optional config file and overrides.
fn skirmish_config(
    path: Option<&Path>,
    dt: Option<f64>,
    max_ticks: Option<u32>,
) -> Result<SkirmishConfig, CliError> {
    let mut config = SkirmishConfig::default();
    if let Some(path) = path {
        config.sim = SimConfig::load(path)?;
    }
    if let Some(dt) = dt {
        config.dt = dt;
    }
    if let Some(ticks) = max_ticks {
        config.max_ticks = ticks;
    }
    Ok(config)
}

/// Seed from the clock when none is given.
fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| {
        use std::time::{SystemTime, UNIX_EPOCH};
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() ^ u64::from(d.subsec_nanos()))
            .unwrap_or(42)
    })
}
