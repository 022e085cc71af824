//! Error types for configuration loading.
//!
//! The simulation itself never fails: out-of-range values are clamped and
//! missing targets are ordinary state transitions. Errors only arise when
//! building a world from outside input.

use std::fmt;
use std::path::PathBuf;

/// Reasons a [`crate::config::SimConfig`] cannot be used.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// The grid has no rows or no columns.
    EmptyGrid {
        /// Configured rows.
        rows: u16,
        /// Configured columns.
        cols: u16,
    },
    /// A numeric field is non-finite or outside its allowed range.
    InvalidValue {
        /// Dotted path of the field.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
    /// Too few or too many factions.
    FactionCount(usize),
    /// Faction ids must be `0..n` in order.
    FactionOrder {
        /// Id expected at this position.
        expected: usize,
        /// Id found.
        found: u8,
    },
    /// The configuration file could not be read.
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error message.
        message: String,
    },
    /// The configuration text is not valid JSON for this schema.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { rows, cols } => {
                write!(f, "grid must have at least one zone, got {rows}x{cols}")
            }
            Self::InvalidValue { field, value } => write!(f, "invalid value for {field}: {value}"),
            Self::FactionCount(n) => write!(
                f,
                "need between 2 and {} factions, got {n}",
                crate::game::MAX_FACTIONS
            ),
            Self::FactionOrder { expected, found } => {
                write!(f, "faction at position {expected} has id {found}")
            }
            Self::Io { path, message } => write!(f, "failed to read {}: {message}", path.display()),
            Self::Parse(message) => write!(f, "invalid configuration: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}
