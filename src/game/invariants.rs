//! World invariants - sanity checks that detect bookkeeping bugs.
//!
//! The simulation recovers from bad inputs by clamping, so none of these
//! should ever fire. If one does, a tick step is out of order or a zone
//! transition was reported twice or not at all.

use crate::game::World;

/// Invariant violation error.
#[derive(Debug, Clone)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub message: String,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invariant violation: {}", self.message)
    }
}

impl std::error::Error for InvariantViolation {}

/// Check all world invariants.
///
/// Returns a list of violations found, or empty if all invariants hold.
#[must_use]
pub fn check_invariants(world: &World) -> Vec<InvariantViolation> {
    let mut violations = Vec::new();
    let mut push = |message: String| violations.push(InvariantViolation { message });

    // Occupancy must match the zones recorded on the units still held.
    let factions = world.factions().len();
    let mut expected = vec![vec![0u32; factions]; world.zones().len()];
    for unit in world.units() {
        if let Some(idx) = unit.zone().and_then(|c| world.grid().index_of(c)) {
            if let Some(slot) = expected[idx].get_mut(usize::from(unit.faction())) {
                *slot += 1;
            }
        }
    }

    for (zone, expected) in world.zones().iter().zip(&expected) {
        if zone.occupant_counts() != expected.as_slice() {
            push(format!(
                "Zone {:?} occupants {:?} but units say {:?}",
                zone.coord(),
                zone.occupant_counts(),
                expected
            ));
        }

        let cap = zone.time_to_capture();
        for (faction, &t) in zone.ownership_values().iter().enumerate() {
            if !(0.0..=cap).contains(&t) {
                push(format!(
                    "Zone {:?} faction {faction} ownership {t} outside [0, {cap}]",
                    zone.coord()
                ));
            }
            if let Some(owner) = zone.owner() {
                if usize::from(owner) != faction && t > 0.0 {
                    push(format!(
                        "Zone {:?} owned by {owner} but faction {faction} holds {t}",
                        zone.coord()
                    ));
                }
            }
        }
    }

    // Units
    let mut last_id = None;
    for unit in world.units() {
        let max = unit.stats().max_health;
        if !(0.0..=max).contains(&unit.health()) {
            push(format!(
                "Unit {} health {} outside [0, {max}]",
                unit.id().0,
                unit.health()
            ));
        }
        if unit.is_dying() && unit.health() > 0.0 {
            push(format!(
                "Unit {} is dying with health {}",
                unit.id().0,
                unit.health()
            ));
        }
        if last_id.is_some_and(|prev| prev >= unit.id()) {
            push(format!("Unit {} is out of id order", unit.id().0));
        }
        last_id = Some(unit.id());
    }

    // A recorded winner owns everything.
    if let Some(winner) = world.winner() {
        let held = world
            .zones()
            .iter()
            .filter(|z| z.owner() == Some(winner))
            .count();
        if held != world.zones().len() {
            push(format!(
                "Winner {winner} owns only {held} of {} zones",
                world.zones().len()
            ));
        }
    }

    violations
}

/// Assert all world invariants hold, panicking if any are violated.
///
/// Only active in debug builds. No-op in release builds.
///
/// # Panics
///
/// Panics with detailed message if any invariant is violated.
#[cfg(debug_assertions)]
pub fn assert_invariants(world: &World) {
    let violations = check_invariants(world);
    if !violations.is_empty() {
        let messages: Vec<_> = violations.iter().map(|v| v.message.as_str()).collect();
        panic!("World invariant violations:\n  - {}", messages.join("\n  - "));
    }
}

/// No-op in release builds.
#[cfg(not(debug_assertions))]
pub fn assert_invariants(_world: &World) {}
