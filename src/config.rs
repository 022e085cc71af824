//! Simulation configuration.
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes. Validation runs on load and again when a world is built.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::game::{default_factions, Faction, GridConfig, UnitStats, ZoneConfig, MAX_FACTIONS};

/// Construction-time inputs for a [`crate::game::World`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Zone grid layout.
    pub grid: GridConfig,
    /// Zone contention tuning.
    pub zone: ZoneConfig,
    /// Unit constants.
    pub unit: UnitStats,
    /// Seconds between spawn waves.
    pub spawn_interval: f64,
    /// Competing factions, ids `0..n` in order.
    pub factions: Vec<Faction>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            zone: ZoneConfig::default(),
            unit: UnitStats::default(),
            spawn_interval: 5.0,
            factions: default_factions(2),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid JSON for this schema or the
    /// result fails validation.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or its contents are
    /// rejected by [`SimConfig::from_json_str`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    /// Check structural and numeric constraints.
    ///
    /// # Errors
    ///
    /// Returns the first constraint that does not hold.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::EmptyGrid {
                rows: self.grid.rows,
                cols: self.grid.cols,
            });
        }

        let positive = [
            ("grid.zone_width", self.grid.zone_width),
            ("grid.zone_depth", self.grid.zone_depth),
            ("zone.time_to_capture", self.zone.time_to_capture),
            ("spawn_interval", self.spawn_interval),
            ("unit.max_health", self.unit.max_health),
            ("unit.attack_rate", self.unit.attack_rate),
        ];
        let non_negative = [
            ("unit.speed", self.unit.speed),
            ("unit.attack_radius", self.unit.attack_radius),
            ("unit.attack_damage", self.unit.attack_damage),
            ("unit.corpse_duration", self.unit.corpse_duration),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        for (field, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        if !self.unit.render_height.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "unit.render_height",
                value: self.unit.render_height,
            });
        }

        let n = self.factions.len();
        if !(2..=MAX_FACTIONS).contains(&n) {
            return Err(ConfigError::FactionCount(n));
        }
        for (expected, faction) in self.factions.iter().enumerate() {
            if faction.index() != expected {
                return Err(ConfigError::FactionOrder {
                    expected,
                    found: faction.id,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config = SimConfig::from_json_str(r#"{"grid": {"rows": 3}, "spawn_interval": 2.5}"#).unwrap();
        assert_eq!(config.grid.rows, 3);
        assert_eq!(config.grid.cols, GridConfig::default().cols);
        assert!((config.spawn_interval - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.factions.len(), 2);
    }

    #[test]
    fn test_empty_grid_rejected() {
        let err = SimConfig::from_json_str(r#"{"grid": {"rows": 0}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGrid { rows: 0, .. }));
    }

    #[test]
    fn test_non_positive_capture_time_rejected() {
        let mut config = SimConfig::default();
        config.zone.time_to_capture = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "zone.time_to_capture",
                ..
            })
        ));
    }

    #[test]
    fn test_faction_count_and_order() {
        let mut config = SimConfig {
            factions: default_factions(1),
            ..SimConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::FactionCount(1)));

        config.factions = vec![Faction::new(0, 0), Faction::new(2, 0)];
        assert_eq!(
            config.validate(),
            Err(ConfigError::FactionOrder {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        let err = SimConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"factions": [{{"id": 0, "color": 1}}, {{"id": 1, "color": 2}}, {{"id": 2, "color": 3}}]}}"#).unwrap();
        let config = SimConfig::load(file.path()).unwrap();
        assert_eq!(config.factions.len(), 3);
        assert_eq!(config.factions[2].color, 3);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load(Path::new("/nonexistent/zonectl.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
