//! Game layer for zonectl.
//!
//! Implements the simulation rules:
//! - Zone grid with per-faction occupancy and ownership contention
//! - Units with a combat state machine and zone-transition tracking
//! - World orchestration, spawning and victory detection
//! - Controllers issuing orders at the start of each tick

mod controller;
mod events;
mod faction;
mod grid;
mod invariants;
mod snapshot;
mod unit;
mod world;
mod zone;

pub use controller::{AiController, Controller};
pub use events::WorldEvent;
pub use faction::{default_factions, Faction, FactionId, DEFAULT_COLORS, MAX_FACTIONS};
pub use grid::{Extents, GridConfig, Vec2, ZoneCoord};
pub use invariants::{assert_invariants, check_invariants, InvariantViolation};
pub use snapshot::{UnitSnapshot, WorldSnapshot, ZoneSnapshot};
pub use unit::{CheerVariant, Unit, UnitId, UnitState, UnitStats};
pub use world::World;
pub use zone::{OwnerChange, Zone, ZoneConfig};
