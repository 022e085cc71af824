// Allow unwrap and exact float comparison in tests (test code is not production)
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::float_cmp))]
//! Zonectl: a real-time zone-control skirmish simulation.
//!
//! The battlefield is a grid of rectangular zones. Factions own zones,
//! owned zones spawn units, and units wander, fight and contest zones
//! until one faction owns the whole grid.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Skirmish runner / CLI (batch)     │
//! ├─────────────────────────────────────┤
//! │   Controllers (AI, host input)      │
//! ├─────────────────────────────────────┤
//! │   World: zones, units, tick order   │
//! └─────────────────────────────────────┘
//! ```
//!
//! The core is deterministic for a given seed, configuration and
//! timestep sequence. It renders nothing; hosts read a
//! [`game::WorldSnapshot`] and drain [`game::WorldEvent`]s each tick.

pub mod config;
pub mod error;
pub mod game;
pub mod skirmish;

pub use config::SimConfig;
pub use error::ConfigError;

// Re-export key game types at crate root for convenience
pub use game::{
    AiController, Controller, FactionId, GridConfig, Unit, UnitId, UnitState, Vec2, World,
    WorldEvent, Zone, ZoneCoord,
};
pub use skirmish::{run_batch, run_skirmish, SkirmishConfig, SkirmishError, SkirmishResult};
