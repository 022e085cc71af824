//! Events emitted by the world for the render and audio layers.

use crate::game::{FactionId, UnitId, ZoneCoord};

/// Something that happened during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorldEvent {
    /// A unit was added to the world.
    UnitSpawned {
        /// New unit.
        unit: UnitId,
        /// Its faction.
        faction: FactionId,
    },
    /// A unit crossed a zone boundary. `from` is `None` on first placement.
    ZoneChanged {
        /// Unit that moved.
        unit: UnitId,
        /// Zone it left.
        from: Option<ZoneCoord>,
        /// Zone it entered.
        to: Option<ZoneCoord>,
    },
    /// A zone changed hands.
    OwnerChanged {
        /// Zone concerned.
        zone: ZoneCoord,
        /// Owner before.
        previous: Option<FactionId>,
        /// Owner after.
        current: Option<FactionId>,
    },
    /// A unit's health reached zero.
    UnitDied {
        /// Unit that died.
        unit: UnitId,
        /// Unit that landed the final hit.
        killer: UnitId,
    },
    /// A corpse was pruned from the world.
    UnitRemoved {
        /// Unit that was removed.
        unit: UnitId,
    },
    /// A faction owns every zone.
    Victory {
        /// Winning faction.
        faction: FactionId,
    },
}
