//! Headless matches between computer-controlled factions.
//!
//! Provides a pure function interface: `(seed, config) -> SkirmishResult`.
//! Every faction starts with one corner zone and an [`AiController`]; the
//! world is ticked at a fixed step until someone owns the whole grid or the
//! tick limit runs out.

use std::fmt;

use log::{debug, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::game::{
    assert_invariants, AiController, FactionId, World, WorldEvent, WorldSnapshot, ZoneCoord,
};

/// Mixes a faction index into the match seed for its controller.
const CONTROLLER_SEED_MIX: u64 = 0x9E37_79B9_7F4A_7C15;

/// Match parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SkirmishConfig {
    /// World configuration.
    pub sim: SimConfig,
    /// Fixed timestep in seconds.
    pub dt: f64,
    /// Ticks before the match is declared a draw.
    pub max_ticks: u32,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            dt: 0.1,
            max_ticks: 12_000,
        }
    }
}

/// Error type for skirmish setup.
#[derive(Debug, Clone, PartialEq)]
pub enum SkirmishError {
    /// The world configuration was rejected.
    Config(ConfigError),
    /// The timestep is not a positive finite number.
    InvalidTimestep(f64),
}

impl fmt::Display for SkirmishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "{e}"),
            Self::InvalidTimestep(dt) => write!(f, "timestep must be positive and finite, got {dt}"),
        }
    }
}

impl std::error::Error for SkirmishError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::InvalidTimestep(_) => None,
        }
    }
}

impl From<ConfigError> for SkirmishError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

/// Per-faction tallies for one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FactionStats {
    /// Faction identifier.
    pub faction: FactionId,
    /// Zones owned at the end.
    pub zones_owned: u32,
    /// Living units at the end.
    pub units_alive: u32,
    /// Units spawned during the match, including the starting wave.
    pub units_spawned: u32,
    /// Units killed during the match.
    pub units_lost: u32,
}

/// Final result of a match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkirmishResult {
    /// Seed the match was played with.
    pub seed: u64,
    /// The winning faction, `None` on a draw.
    pub winner: Option<FactionId>,
    /// Ticks simulated.
    pub ticks_played: u32,
    /// Simulated seconds.
    pub sim_time: f64,
    /// Per-faction statistics in id order.
    pub factions: Vec<FactionStats>,
}

/// Starting zone for a faction: the grid corners, in a fixed order.
#[must_use]
pub fn starting_zone(rows: u16, cols: u16, faction: FactionId) -> ZoneCoord {
    let (last_row, last_col) = (rows.saturating_sub(1), cols.saturating_sub(1));
    match faction % 4 {
        0 => ZoneCoord::new(0, 0),
        1 => ZoneCoord::new(last_row, last_col),
        2 => ZoneCoord::new(0, last_col),
        _ => ZoneCoord::new(last_row, 0),
    }
}

/// A match in progress.
#[derive(Debug)]
pub struct Skirmish {
    seed: u64,
    world: World,
    dt: f64,
    max_ticks: u32,
    ticks_played: u32,
    stats: Vec<FactionStats>,
}

impl Skirmish {
    /// Set up a match: claim starting corners and attach controllers.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(seed: u64, config: &SkirmishConfig) -> Result<Self, SkirmishError> {
        if !config.dt.is_finite() || config.dt <= 0.0 {
            return Err(SkirmishError::InvalidTimestep(config.dt));
        }
        let mut world = World::new(&config.sim, seed)?;
        let grid = *world.grid();

        let factions: Vec<FactionId> = world.factions().iter().map(|f| f.id).collect();
        for &faction in &factions {
            world.claim_zone(starting_zone(grid.rows, grid.cols, faction), faction);
            let controller_seed =
                seed ^ (u64::from(faction) + 1).wrapping_mul(CONTROLLER_SEED_MIX);
            world.add_controller(Box::new(AiController::new(
                faction,
                world.spawn_interval(),
                controller_seed,
            )));
        }

        let stats = factions
            .iter()
            .map(|&faction| FactionStats {
                faction,
                ..FactionStats::default()
            })
            .collect();

        debug!("skirmish {seed}: {} factions on {}x{}", factions.len(), grid.rows, grid.cols);

        let mut skirmish = Self {
            seed,
            world,
            dt: config.dt,
            max_ticks: config.max_ticks,
            ticks_played: 0,
            stats,
        };
        skirmish.tally_events();
        Ok(skirmish)
    }

    /// The simulated world.
    #[must_use]
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Ticks simulated so far.
    #[must_use]
    pub const fn ticks_played(&self) -> u32 {
        self.ticks_played
    }

    /// Whether the match has a winner or has run out of ticks.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.world.winner().is_some() || self.ticks_played >= self.max_ticks
    }

    /// Advance one tick. Returns `false` once the match is finished.
    pub fn step(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }
        self.world.tick(self.dt);
        self.ticks_played += 1;
        self.tally_events();
        assert_invariants(&self.world);
        true
    }

    /// Play to the end and report.
    #[must_use]
    pub fn run(mut self) -> SkirmishResult {
        while self.step() {}
        self.result()
    }

    /// Snapshot of the world as it stands.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }

    /// Summary of the match as it stands.
    #[must_use]
    pub fn result(&self) -> SkirmishResult {
        let mut factions = self.stats.clone();
        for stats in &mut factions {
            let owned = self
                .world
                .zones()
                .iter()
                .filter(|z| z.owner() == Some(stats.faction))
                .count();
            stats.zones_owned = u32::try_from(owned).unwrap_or(u32::MAX);
            stats.units_alive =
                u32::try_from(self.world.units_of(stats.faction).len()).unwrap_or(u32::MAX);
        }

        let winner = self.world.winner();
        if let Some(faction) = winner {
            info!(
                "skirmish {}: faction {faction} won after {} ticks",
                self.seed, self.ticks_played
            );
        } else {
            info!("skirmish {}: draw after {} ticks", self.seed, self.ticks_played);
        }

        SkirmishResult {
            seed: self.seed,
            winner,
            ticks_played: self.ticks_played,
            sim_time: self.world.elapsed(),
            factions,
        }
    }

    fn tally_events(&mut self) {
        for event in self.world.drain_events() {
            match event {
                WorldEvent::UnitSpawned { faction, .. } => {
                    if let Some(stats) = self.stats.get_mut(usize::from(faction)) {
                        stats.units_spawned += 1;
                    }
                }
                WorldEvent::UnitDied { unit, .. } => {
                    // Corpses linger, so the victim is still in the world here.
                    let faction = self.world.unit(unit).map(|u| usize::from(u.faction()));
                    if let Some(stats) = faction.and_then(|f| self.stats.get_mut(f)) {
                        stats.units_lost += 1;
                    }
                }
                WorldEvent::ZoneChanged { .. }
                | WorldEvent::OwnerChanged { .. }
                | WorldEvent::UnitRemoved { .. }
                | WorldEvent::Victory { .. } => {}
            }
        }
    }
}

/// Run a single match to completion.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn run_skirmish(seed: u64, config: &SkirmishConfig) -> Result<SkirmishResult, SkirmishError> {
    Ok(Skirmish::new(seed, config)?.run())
}

/// Run `games` matches in parallel with seeds `base_seed + i`.
///
/// Results come back in seed order.
///
/// # Errors
///
/// Returns an error if the configuration is invalid.
pub fn run_batch(
    base_seed: u64,
    games: u64,
    config: &SkirmishConfig,
) -> Result<Vec<SkirmishResult>, SkirmishError> {
    (0..games)
        .into_par_iter()
        .map(|i| run_skirmish(base_seed.wrapping_add(i), config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GridConfig;

    fn small_config() -> SkirmishConfig {
        SkirmishConfig {
            sim: SimConfig {
                grid: GridConfig {
                    rows: 2,
                    cols: 2,
                    zone_width: 100.0,
                    zone_depth: 100.0,
                },
                ..SimConfig::default()
            },
            dt: 0.25,
            max_ticks: 2_000,
        }
    }

    #[test]
    fn test_starting_zones_are_corners() {
        assert_eq!(starting_zone(8, 6, 0), ZoneCoord::new(0, 0));
        assert_eq!(starting_zone(8, 6, 1), ZoneCoord::new(7, 5));
        assert_eq!(starting_zone(8, 6, 2), ZoneCoord::new(0, 5));
        assert_eq!(starting_zone(8, 6, 3), ZoneCoord::new(7, 0));
    }

    #[test]
    fn test_new_claims_corners() {
        let skirmish = Skirmish::new(1, &small_config()).unwrap();
        let world = skirmish.world();
        assert_eq!(world.zone(ZoneCoord::new(0, 0)).unwrap().owner(), Some(0));
        assert_eq!(world.zone(ZoneCoord::new(1, 1)).unwrap().owner(), Some(1));
        assert_eq!(world.zone(ZoneCoord::new(0, 1)).unwrap().owner(), None);
        assert_eq!(skirmish.ticks_played(), 0);
    }

    #[test]
    fn test_rejects_bad_timestep() {
        let config = SkirmishConfig {
            dt: 0.0,
            ..small_config()
        };
        assert_eq!(
            run_skirmish(1, &config).unwrap_err(),
            SkirmishError::InvalidTimestep(0.0)
        );
    }

    #[test]
    fn test_rejects_bad_config() {
        let mut config = small_config();
        config.sim.grid.rows = 0;
        assert!(matches!(
            run_skirmish(1, &config),
            Err(SkirmishError::Config(ConfigError::EmptyGrid { .. }))
        ));
    }

    #[test]
    fn test_same_seed_same_result() {
        let config = small_config();
        let a = run_skirmish(7, &config).unwrap();
        let b = run_skirmish(7, &config).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_result_is_consistent() {
        let config = small_config();
        let result = run_skirmish(3, &config).unwrap();
        assert!(result.ticks_played <= config.max_ticks);
        assert_eq!(result.factions.len(), 2);
        for stats in &result.factions {
            assert!(stats.units_lost + stats.units_alive <= stats.units_spawned);
        }
        if let Some(winner) = result.winner {
            assert_eq!(result.factions[usize::from(winner)].zones_owned, 4);
        } else {
            assert_eq!(result.ticks_played, config.max_ticks);
        }
    }

    #[test]
    fn test_tick_limit_is_a_draw() {
        let config = SkirmishConfig {
            max_ticks: 10,
            ..small_config()
        };
        let result = run_skirmish(5, &config).unwrap();
        assert_eq!(result.winner, None);
        assert_eq!(result.ticks_played, 10);
        assert!((result.sim_time - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_batch_is_in_seed_order() {
        let config = SkirmishConfig {
            max_ticks: 200,
            ..small_config()
        };
        let results = run_batch(100, 4, &config).unwrap();
        let seeds: Vec<_> = results.iter().map(|r| r.seed).collect();
        assert_eq!(seeds, vec![100, 101, 102, 103]);
        assert_eq!(results[2], run_skirmish(102, &config).unwrap());
    }
}
