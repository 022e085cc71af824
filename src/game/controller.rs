//! Controllers issue orders to a faction's units at the start of each tick.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::{FactionId, Vec2, World};

/// Source of orders for one faction.
pub trait Controller: fmt::Debug + Send {
    /// Faction this controller commands.
    fn faction(&self) -> FactionId;

    /// Issue orders for this tick.
    fn update(&mut self, dt: f64, world: &mut World);
}

/// Computer opponent: periodically sends every unit to a random point in
/// the world on an aggressive move.
#[derive(Debug, Clone)]
pub struct AiController {
    faction: FactionId,
    time_per_action: f64,
    since_last_action: f64,
    rng: ChaCha8Rng,
}

impl AiController {
    /// Create a controller acting every `time_per_action` seconds.
    ///
    /// The first action happens on the first update.
    #[must_use]
    pub fn new(faction: FactionId, time_per_action: f64, seed: u64) -> Self {
        Self {
            faction,
            time_per_action,
            since_last_action: time_per_action,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seconds between rounds of orders.
    #[must_use]
    pub const fn time_per_action(&self) -> f64 {
        self.time_per_action
    }
}

impl Controller for AiController {
    fn faction(&self) -> FactionId {
        self.faction
    }

    fn update(&mut self, dt: f64, world: &mut World) {
        if world.winner().is_some() || self.time_per_action <= 0.0 {
            return;
        }
        self.since_last_action += dt;
        if self.since_last_action < self.time_per_action {
            return;
        }
        self.since_last_action %= self.time_per_action;

        let extents = world.grid().extents();
        for id in world.units_of(self.faction) {
            let destination = Vec2::new(
                extents.min.x + self.rng.gen_range(0.0..1.0) * (extents.max.x - extents.min.x),
                extents.min.z + self.rng.gen_range(0.0..1.0) * (extents.max.z - extents.min.z),
            );
            world.set_destination(id, destination, true);
        }
    }
}
