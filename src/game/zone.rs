//! Zones and the ownership contention model.
//!
//! Each zone keeps a per-faction occupant count and a per-faction ownership
//! accumulator bounded by `[0, time_to_capture]`. Reaching the upper bound
//! hands the zone to that faction; the owner's accumulator draining to zero
//! returns the zone to neutral.
//!
//! Gaining pressure is applied at full strength while an owner losing
//! ground drains at `dt` rate. The asymmetry is part of the game's tuning.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::game::{Extents, FactionId, Unit, UnitId, UnitStats, Vec2, ZoneCoord};

/// Relative slack when comparing an accumulator against its bounds.
const BOUND_TOLERANCE: f64 = 1e-9;

/// Zone tuning shared by every zone of a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    /// Seconds of uncontested single-unit presence needed to capture.
    pub time_to_capture: f64,
}

impl Default for ZoneConfig {
    fn default() -> Self {
        Self {
            time_to_capture: 20.0,
        }
    }
}

/// Record of a call to [`Zone::set_owner`].
///
/// `previous` and `current` may be equal when an owner re-asserts control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerChange {
    /// Zone whose owner was set.
    pub zone: ZoneCoord,
    /// Owner before the call.
    pub previous: Option<FactionId>,
    /// Owner after the call.
    pub current: Option<FactionId>,
}

impl OwnerChange {
    /// Whether the owner actually differs.
    #[must_use]
    pub fn is_transfer(&self) -> bool {
        self.previous != self.current
    }
}

/// A grid cell that can be neutral or owned by one faction.
#[derive(Debug, Clone)]
pub struct Zone {
    coord: ZoneCoord,
    footprint: Extents,
    owner: Option<FactionId>,
    occupants: Vec<u32>,
    ownership: Vec<f64>,
    time_to_capture: f64,
}

impl Zone {
    /// Create a neutral, empty zone.
    #[must_use]
    pub fn new(coord: ZoneCoord, footprint: Extents, factions: usize, config: ZoneConfig) -> Self {
        Self {
            coord,
            footprint,
            owner: None,
            occupants: vec![0; factions],
            ownership: vec![0.0; factions],
            time_to_capture: config.time_to_capture,
        }
    }

    /// Grid coordinate.
    #[must_use]
    pub const fn coord(&self) -> ZoneCoord {
        self.coord
    }

    /// Ground area covered by the zone.
    #[must_use]
    pub const fn footprint(&self) -> Extents {
        self.footprint
    }

    /// Spatial centre.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.footprint.min.x + self.footprint.max.x) * 0.5,
            (self.footprint.min.z + self.footprint.max.z) * 0.5,
        )
    }

    /// Current owner, `None` when neutral.
    #[must_use]
    pub const fn owner(&self) -> Option<FactionId> {
        self.owner
    }

    /// Seconds of pressure needed to capture.
    #[must_use]
    pub const fn time_to_capture(&self) -> f64 {
        self.time_to_capture
    }

    /// Occupant count for a faction.
    #[must_use]
    pub fn occupants(&self, faction: FactionId) -> u32 {
        self.occupants.get(usize::from(faction)).copied().unwrap_or(0)
    }

    /// All occupant counts, indexed by faction.
    #[must_use]
    pub fn occupant_counts(&self) -> &[u32] {
        &self.occupants
    }

    /// Ownership accumulator for a faction.
    #[must_use]
    pub fn ownership(&self, faction: FactionId) -> f64 {
        self.ownership.get(usize::from(faction)).copied().unwrap_or(0.0)
    }

    /// All ownership accumulators, indexed by faction.
    #[must_use]
    pub fn ownership_values(&self) -> &[f64] {
        &self.ownership
    }

    /// Fraction of the capture time accumulated by a faction.
    #[must_use]
    pub fn ownership_ratio(&self, faction: FactionId) -> f64 {
        self.ownership(faction) / self.time_to_capture
    }

    /// Status bar fraction: the ratio of the first faction with any
    /// accumulated ownership, or zero.
    #[must_use]
    pub fn status_fraction(&self) -> f64 {
        self.ownership
            .iter()
            .find(|&&t| t > 0.0)
            .map_or(0.0, |&t| t / self.time_to_capture)
    }

    /// Whether any faction has units here.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        self.occupants.iter().any(|&n| n > 0)
    }

    /// Run one tick of the contention model.
    ///
    /// Returns the owner change if [`Zone::set_owner`] ran this tick.
    pub fn update(&mut self, dt: f64) -> Option<OwnerChange> {
        if !self.is_occupied() {
            self.settle_unoccupied(dt);
            return None;
        }

        let total: u32 = self.occupants.iter().sum();

        if let Some(owner) = self.owner {
            let mine = self.occupants(owner);
            let mut pressure = f64::from(mine) - f64::from(total - mine);
            if pressure < 0.0 {
                pressure *= dt;
            }
            return self.increment_ownership(owner, pressure);
        }

        // Strict comparison keeps the lowest index on ties.
        let mut leader = 0;
        for (i, &count) in self.occupants.iter().enumerate() {
            if count > self.occupants[leader] {
                leader = i;
            }
        }
        let count = self.occupants[leader];
        let pressure = f64::from(count) - f64::from(total - count);
        if pressure <= 0.0 {
            return None;
        }
        #[allow(clippy::cast_possible_truncation)]
        let leader = leader as FactionId;
        self.increment_ownership(leader, pressure * dt)
    }

    fn settle_unoccupied(&mut self, dt: f64) {
        match self.owner {
            Some(owner) => {
                let pinned = self.time_to_capture;
                for (i, t) in self.ownership.iter_mut().enumerate() {
                    *t = if i == usize::from(owner) { pinned } else { 0.0 };
                }
            }
            None => {
                for t in &mut self.ownership {
                    *t = (*t - dt).max(0.0);
                }
            }
        }
    }

    /// Add `amount` to a faction's accumulator, clamping to
    /// `[0, time_to_capture]`.
    ///
    /// Hitting zero strips that faction of ownership if it owns the zone;
    /// hitting the capture time makes it the owner.
    pub fn increment_ownership(&mut self, faction: FactionId, amount: f64) -> Option<OwnerChange> {
        let idx = usize::from(faction);
        let slot = self.ownership.get_mut(idx)?;
        *slot += amount;

        // Summed timesteps drift off the bounds by a few ulps.
        let tolerance = self.time_to_capture * BOUND_TOLERANCE;
        if *slot <= tolerance {
            *slot = 0.0;
            if self.owner == Some(faction) {
                return Some(self.set_owner(None));
            }
        } else if *slot >= self.time_to_capture - tolerance {
            *slot = self.time_to_capture;
            return Some(self.set_owner(Some(faction)));
        }
        None
    }

    /// Set the owner, resetting accumulators so that only the new owner's
    /// is pinned at the capture time.
    ///
    /// The caller runs the world's victory check afterwards.
    pub fn set_owner(&mut self, owner: Option<FactionId>) -> OwnerChange {
        let previous = self.owner;
        self.owner = owner.filter(|&f| usize::from(f) < self.ownership.len());
        self.ownership.iter_mut().for_each(|t| *t = 0.0);
        if let Some(f) = self.owner {
            self.ownership[usize::from(f)] = self.time_to_capture;
        }
        OwnerChange {
            zone: self.coord,
            previous,
            current: self.owner,
        }
    }

    /// A unit of `faction` entered the zone.
    pub fn owner_attached_character(&mut self, faction: FactionId) {
        if let Some(n) = self.occupants.get_mut(usize::from(faction)) {
            *n += 1;
        }
    }

    /// A unit of `faction` left the zone or was removed.
    ///
    /// Callers must only remove units they previously attached.
    pub fn owner_removed_character(&mut self, faction: FactionId) {
        if let Some(n) = self.occupants.get_mut(usize::from(faction)) {
            debug_assert!(*n > 0, "occupant count underflow in zone {:?}", self.coord);
            *n = n.saturating_sub(1);
        }
    }

    /// Create an idle unit for the owner at a uniform-random point in the
    /// footprint. Neutral zones spawn nothing.
    pub fn spawn_character<R: Rng + ?Sized>(
        &self,
        id: UnitId,
        stats: UnitStats,
        rng: &mut R,
    ) -> Option<Unit> {
        let owner = self.owner?;
        let Extents { min, max } = self.footprint;
        let position = Vec2::new(
            min.x + rng.gen_range(0.0..1.0) * (max.x - min.x),
            min.z + rng.gen_range(0.0..1.0) * (max.z - min.z),
        );
        Some(Unit::new(id, owner, position, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const T: f64 = 20.0;

    fn zone() -> Zone {
        let footprint = Extents {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 10.0),
        };
        Zone::new(ZoneCoord::new(0, 0), footprint, 4, ZoneConfig { time_to_capture: T })
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_new_zone_is_neutral_and_empty() {
        let z = zone();
        assert_eq!(z.owner(), None);
        assert!(!z.is_occupied());
        assert!(z.ownership_values().iter().all(|&t| t == 0.0));
        assert_eq!(z.center(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_single_occupant_captures_neutral_zone() {
        let mut z = zone();
        z.owner_attached_character(1);
        let dt = 0.5;
        let ticks = (T / dt).ceil() as usize;
        for _ in 0..ticks - 1 {
            assert_eq!(z.update(dt), None);
        }
        let change = z.update(dt).unwrap();
        assert_eq!(change.current, Some(1));
        assert!(change.is_transfer());
        assert_eq!(z.owner(), Some(1));
        assert!(approx(z.ownership(1), T));
    }

    #[test]
    fn test_neutral_pressure_is_count_minus_others() {
        let mut z = zone();
        for _ in 0..3 {
            z.owner_attached_character(2);
        }
        z.owner_attached_character(0);
        z.update(1.0);
        assert!(approx(z.ownership(2), 2.0));
        assert!(approx(z.ownership(0), 0.0));
    }

    #[test]
    fn test_neutral_tie_makes_no_progress() {
        let mut z = zone();
        z.owner_attached_character(0);
        z.owner_attached_character(1);
        assert_eq!(z.update(1.0), None);
        assert!(z.ownership_values().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn test_neutral_majority_against_combined_opposition_stalls() {
        let mut z = zone();
        z.owner_attached_character(0);
        z.owner_attached_character(0);
        z.owner_attached_character(1);
        z.owner_attached_character(2);
        z.update(1.0);
        assert!(z.ownership_values().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn test_unoccupied_neutral_decays_at_dt() {
        let mut z = zone();
        z.increment_ownership(3, 5.0);
        z.update(1.5);
        assert!(approx(z.ownership(3), 3.5));
        z.update(10.0);
        assert!(approx(z.ownership(3), 0.0));
    }

    #[test]
    fn test_unoccupied_owned_zone_is_pinned() {
        let mut z = zone();
        z.set_owner(Some(0));
        z.owner_attached_character(1);
        z.update(1.0);
        assert!(z.ownership(0) < T);
        z.owner_removed_character(1);
        z.update(1.0);
        assert!(approx(z.ownership(0), T));
        assert_eq!(z.owner(), Some(0));
    }

    #[test]
    fn test_owned_zone_drains_at_dt_rate() {
        let mut z = zone();
        z.set_owner(Some(0));
        z.owner_attached_character(1);
        z.owner_attached_character(1);
        z.update(0.5);
        // pressure -2 scaled by dt 0.5
        assert!(approx(z.ownership(0), T - 1.0));
    }

    #[test]
    fn test_owned_zone_gains_at_full_strength() {
        let mut z = zone();
        z.set_owner(Some(0));
        z.owner_attached_character(1);
        z.update(4.0);
        assert!(approx(z.ownership(0), T - 4.0));
        z.owner_attached_character(0);
        z.owner_attached_character(0);
        z.owner_attached_character(0);
        z.update(0.1);
        // pressure +2 applied unscaled
        assert!(approx(z.ownership(0), T - 2.0));
    }

    #[test]
    fn test_owner_loses_zone_when_drained() {
        let mut z = zone();
        z.set_owner(Some(0));
        z.owner_attached_character(1);
        let mut lost = None;
        for tick in 0..100 {
            if let Some(change) = z.update(1.0) {
                lost = Some((tick, change));
                break;
            }
        }
        let (tick, change) = lost.unwrap();
        assert_eq!(tick, 19);
        assert_eq!(change.previous, Some(0));
        assert_eq!(change.current, None);
        assert_eq!(z.owner(), None);
        assert!(z.ownership_values().iter().all(|&t| t == 0.0));
    }

    #[test]
    fn test_increment_clamps_both_ends() {
        let mut z = zone();
        assert_eq!(z.increment_ownership(2, -5.0), None);
        assert!(approx(z.ownership(2), 0.0));
        let change = z.increment_ownership(2, 1000.0).unwrap();
        assert_eq!(change.current, Some(2));
        assert!(approx(z.ownership(2), T));
    }

    #[test]
    fn test_capture_transfers_from_other_owner() {
        let mut z = zone();
        z.set_owner(Some(0));
        let change = z.increment_ownership(1, T).unwrap();
        assert_eq!(change.previous, Some(0));
        assert_eq!(z.owner(), Some(1));
        assert!(approx(z.ownership(0), 0.0));
        assert!(approx(z.ownership(1), T));
    }

    #[test]
    fn test_unknown_faction_is_ignored() {
        let mut z = zone();
        assert_eq!(z.increment_ownership(9, T), None);
        z.owner_attached_character(9);
        assert!(!z.is_occupied());
        assert_eq!(z.occupants(9), 0);
    }

    #[test]
    fn test_inexact_timesteps_reach_both_bounds() {
        for dt in [0.2, 0.016, 0.1, 1.0 / 60.0] {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let ticks = (T / dt).ceil() as u32;
            let mut z = zone();
            z.owner_attached_character(1);
            for _ in 0..ticks {
                z.update(dt);
            }
            assert_eq!(z.owner(), Some(1), "capture with dt {dt}");
            assert_eq!(z.ownership(1), T);

            z.owner_removed_character(1);
            z.owner_attached_character(0);
            for _ in 0..ticks {
                z.update(dt);
            }
            assert_eq!(z.owner(), None, "loss with dt {dt}");
            assert!(z.ownership_values().iter().all(|&t| t == 0.0));
        }
    }

    #[test]
    fn test_status_fraction_uses_first_positive() {
        let mut z = zone();
        assert!(approx(z.status_fraction(), 0.0));
        z.increment_ownership(2, 5.0);
        z.increment_ownership(3, 10.0);
        assert!(approx(z.status_fraction(), 0.25));
        assert!(approx(z.ownership_ratio(3), 0.5));
    }

    #[test]
    fn test_spawn_requires_owner_and_stays_in_footprint() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut z = zone();
        assert!(z.spawn_character(UnitId(0), UnitStats::default(), &mut rng).is_none());
        z.set_owner(Some(3));
        for i in 0..50 {
            let unit = z
                .spawn_character(UnitId(i), UnitStats::default(), &mut rng)
                .unwrap();
            assert_eq!(unit.faction(), 3);
            assert!(z.footprint().contains(unit.position()));
            assert_eq!(unit.state(), crate::game::UnitState::Idle);
        }
    }
}
