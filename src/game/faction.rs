//! Faction identity.

use serde::{Deserialize, Serialize};

/// Index of a faction into every per-faction array.
pub type FactionId = u8;

/// Maximum number of factions in a world.
pub const MAX_FACTIONS: usize = 4;

/// A competing side. Created once at setup and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Faction {
    /// Stable identifier, also the faction's slot in per-faction arrays.
    pub id: FactionId,
    /// Display color as `0xRRGGBB`.
    pub color: u32,
}

impl Faction {
    /// Create a faction with the given id and color.
    #[must_use]
    pub const fn new(id: FactionId, color: u32) -> Self {
        Self { id, color }
    }

    /// Slot of this faction in per-faction arrays.
    #[must_use]
    #[inline]
    pub const fn index(self) -> usize {
        self.id as usize
    }
}

/// Default palette, one color per faction slot.
pub const DEFAULT_COLORS: [u32; MAX_FACTIONS] = [0x00cc_3333, 0x0033_66cc, 0x0033_aa33, 0x00cc_aa22];

/// The first `count` factions of the default palette.
#[must_use]
pub fn default_factions(count: usize) -> Vec<Faction> {
    DEFAULT_COLORS
        .iter()
        .take(count.min(MAX_FACTIONS))
        .enumerate()
        .map(|(i, &color)| {
            #[allow(clippy::cast_possible_truncation)]
            let id = i as FactionId;
            Faction::new(id, color)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_faction_index() {
        let faction = Faction::new(3, 0x00ff_ffff);
        assert_eq!(faction.index(), 3);
    }

    #[test]
    fn test_default_factions_ids_are_sequential() {
        let factions = default_factions(3);
        assert_eq!(factions.len(), 3);
        for (i, f) in factions.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn test_default_factions_capped() {
        assert_eq!(default_factions(10).len(), MAX_FACTIONS);
    }
}
