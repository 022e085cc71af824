//! Serializable read-only view of a world, for renderers and tooling.

use serde::Serialize;

use crate::game::{FactionId, UnitId, UnitState, Vec2, World, ZoneCoord};

/// State of one zone.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneSnapshot {
    /// Grid coordinate.
    pub coord: ZoneCoord,
    /// Owner, `None` when neutral.
    pub owner: Option<FactionId>,
    /// Status bar fraction in `[0, 1]`.
    pub status: f64,
    /// Occupant count per faction.
    pub occupants: Vec<u32>,
    /// Ownership accumulator per faction.
    pub ownership: Vec<f64>,
}

/// State of one unit.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct UnitSnapshot {
    /// Unit handle.
    pub id: UnitId,
    /// Owning faction.
    pub faction: FactionId,
    /// Ground position.
    pub position: Vec2,
    /// Combat state.
    pub state: UnitState,
    /// Seconds in the current state, for animation frame selection.
    pub state_time: f64,
    /// Remaining health.
    pub health: f64,
    /// Whether the unit is still simulated.
    pub active: bool,
}

/// State of a whole world at one instant.
#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    /// Simulated seconds since construction.
    pub elapsed: f64,
    /// Winner, once decided.
    pub winner: Option<FactionId>,
    /// Zones in row-major order.
    pub zones: Vec<ZoneSnapshot>,
    /// Units in collection order.
    pub units: Vec<UnitSnapshot>,
}

impl World {
    /// Capture the current state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            elapsed: self.elapsed(),
            winner: self.winner(),
            zones: self
                .zones()
                .iter()
                .map(|z| ZoneSnapshot {
                    coord: z.coord(),
                    owner: z.owner(),
                    status: z.status_fraction(),
                    occupants: z.occupant_counts().to_vec(),
                    ownership: z.ownership_values().to_vec(),
                })
                .collect(),
            units: self
                .units()
                .iter()
                .map(|u| UnitSnapshot {
                    id: u.id(),
                    faction: u.faction(),
                    position: u.position(),
                    state: u.state(),
                    state_time: u.state_time(),
                    health: u.health(),
                    active: u.is_active(),
                })
                .collect(),
        }
    }
}
