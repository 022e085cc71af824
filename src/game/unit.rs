//! Units and their combat state machine.
//!
//! A unit's state is private; every change goes through [`Unit::set_state`],
//! which refuses to leave [`UnitState::Dying`]. Targets are [`UnitId`]
//! handles resolved through the world, never references.

use serde::{Deserialize, Serialize};

use crate::game::{FactionId, Vec2, ZoneCoord};

/// Stable handle to a unit. Ids are never reused within a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Celebration pose played after a victory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CheerVariant {
    /// First pose.
    First,
    /// Second pose.
    Second,
    /// Third pose.
    Third,
}

impl CheerVariant {
    /// Round-robin pose for the unit at `index` in the world's collection.
    #[must_use]
    pub const fn for_index(index: usize) -> Self {
        match index % 3 {
            0 => Self::First,
            1 => Self::Second,
            _ => Self::Third,
        }
    }
}

/// Combat state of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitState {
    /// Standing still, ignoring enemies.
    Idle,
    /// Standing still, engaging any enemy in range.
    AggressiveIdle,
    /// Walking to the destination, ignoring enemies.
    Move,
    /// Walking to the destination, engaging enemies on the way.
    AggressiveMove,
    /// Hitting the current target.
    Attack,
    /// Dead; terminal.
    Dying,
    /// Celebrating a victory.
    Cheer(CheerVariant),
}

impl UnitState {
    /// Whether this state scans for enemies every tick.
    #[must_use]
    pub const fn is_aggressive(self) -> bool {
        matches!(self, Self::AggressiveIdle | Self::AggressiveMove)
    }

    /// Whether this state integrates movement.
    #[must_use]
    pub const fn is_moving(self) -> bool {
        matches!(self, Self::Move | Self::AggressiveMove)
    }
}

/// Per-unit constants shared by every unit of a world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitStats {
    /// Health a unit spawns with.
    pub max_health: f64,
    /// Ground speed in world units per second.
    pub speed: f64,
    /// Distance at which aggressive units pick up targets.
    pub attack_radius: f64,
    /// Health removed per hit.
    pub attack_damage: f64,
    /// Seconds between hits.
    pub attack_rate: f64,
    /// Seconds a dead unit lingers before removal.
    pub corpse_duration: f64,
    /// Constant height handed to the renderer.
    pub render_height: f64,
}

impl Default for UnitStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            speed: 60.0,
            attack_radius: 40.0,
            attack_damage: 10.0,
            attack_rate: 1.0,
            corpse_duration: 3.0,
            render_height: 16.0,
        }
    }
}

/// An autonomous combat entity.
#[derive(Debug, Clone, Copy)]
pub struct Unit {
    id: UnitId,
    faction: FactionId,
    position: Vec2,
    destination: Vec2,
    health: f64,
    state: UnitState,
    state_time: f64,
    target: Option<UnitId>,
    attack_timer: f64,
    zone: Option<ZoneCoord>,
    active: bool,
    stats: UnitStats,
}

impl Unit {
    /// Create an idle unit at full health, standing at `position`.
    #[must_use]
    pub fn new(id: UnitId, faction: FactionId, position: Vec2, stats: UnitStats) -> Self {
        Self {
            id,
            faction,
            position,
            destination: position,
            health: stats.max_health,
            state: UnitState::Idle,
            state_time: 0.0,
            target: None,
            attack_timer: 0.0,
            zone: None,
            active: true,
            stats,
        }
    }

    /// Unit handle.
    #[must_use]
    pub const fn id(&self) -> UnitId {
        self.id
    }

    /// Owning faction.
    #[must_use]
    pub const fn faction(&self) -> FactionId {
        self.faction
    }

    /// Ground position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Position including the constant render height, as `[x, y, z]`.
    #[must_use]
    pub const fn render_position(&self) -> [f64; 3] {
        [self.position.x, self.stats.render_height, self.position.z]
    }

    /// Current destination.
    #[must_use]
    pub const fn destination(&self) -> Vec2 {
        self.destination
    }

    /// Remaining health, in `[0, max_health]`.
    #[must_use]
    pub const fn health(&self) -> f64 {
        self.health
    }

    /// Current combat state.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        self.state
    }

    /// Seconds spent in the current state.
    #[must_use]
    pub const fn state_time(&self) -> f64 {
        self.state_time
    }

    /// Current attack target, if any.
    #[must_use]
    pub const fn target(&self) -> Option<UnitId> {
        self.target
    }

    /// Zone recorded on the last transition check.
    #[must_use]
    pub const fn zone(&self) -> Option<ZoneCoord> {
        self.zone
    }

    /// Whether the unit is still part of the simulation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the unit is dead or about to be removed.
    #[must_use]
    pub fn is_dying(&self) -> bool {
        self.state == UnitState::Dying
    }

    /// Whether the unit can be targeted or scanned by combat logic.
    #[must_use]
    pub fn is_targetable(&self) -> bool {
        self.active && !self.is_dying()
    }

    /// Unit constants.
    #[must_use]
    pub const fn stats(&self) -> &UnitStats {
        &self.stats
    }

    /// Change state. Rejected once the unit is dying.
    ///
    /// Entering a different state resets the state timer. Returns whether
    /// the unit is now in `state`.
    pub fn set_state(&mut self, state: UnitState) -> bool {
        if self.is_dying() {
            return false;
        }
        if self.state != state {
            self.state = state;
            self.state_time = 0.0;
        }
        true
    }

    /// Set a new destination and start walking towards it.
    ///
    /// Clears any target. Returns `false` for dying units.
    pub fn set_destination(&mut self, destination: Vec2, aggressive: bool) -> bool {
        if self.is_dying() {
            return false;
        }
        self.destination = destination;
        self.target = None;
        let state = if aggressive {
            UnitState::AggressiveMove
        } else {
            UnitState::Move
        };
        self.set_state(state)
    }

    /// Lock onto a target and switch to attacking it.
    pub fn set_target(&mut self, target: UnitId) -> bool {
        if self.is_dying() || target == self.id {
            return false;
        }
        self.target = Some(target);
        self.set_state(UnitState::Attack)
    }

    /// Drop the target after it disappeared, resuming the aggressive
    /// counterpart of moving or idling.
    pub(crate) fn lose_target(&mut self) {
        self.target = None;
        self.attack_timer = 0.0;
        #[allow(clippy::float_cmp)]
        let at_destination = self.position == self.destination;
        if at_destination {
            self.set_state(UnitState::AggressiveIdle);
        } else {
            self.set_state(UnitState::AggressiveMove);
        }
    }

    /// Apply damage. Health is floored at zero; reaching zero starts dying.
    ///
    /// Returns `true` only on the hit that killed the unit.
    pub fn apply_damage(&mut self, amount: f64) -> bool {
        if self.is_dying() {
            self.health = 0.0;
            return false;
        }
        self.health = (self.health - amount).min(self.stats.max_health);
        if self.health <= 0.0 {
            self.health = 0.0;
            self.target = None;
            self.set_state(UnitState::Dying);
            return true;
        }
        false
    }

    /// Advance the state clock.
    pub(crate) fn tick_state_time(&mut self, dt: f64) {
        self.state_time += dt;
    }

    /// Accumulate the attack timer; returns `true` when a hit lands.
    ///
    /// Overflow past one period is kept for the next hit.
    pub(crate) fn tick_attack_timer(&mut self, dt: f64) -> bool {
        self.attack_timer += dt;
        if self.attack_timer >= self.stats.attack_rate {
            self.attack_timer %= self.stats.attack_rate;
            return true;
        }
        false
    }

    /// Step towards the destination at `speed * dt`.
    ///
    /// Returns `true` when the step would reach or pass the destination,
    /// in which case the unit snaps onto it.
    pub(crate) fn step_towards_destination(&mut self, dt: f64) -> bool {
        let remaining = self.position.to(self.destination);
        let remaining_sq = remaining.length_sq();
        let Some(direction) = remaining.normalized() else {
            return true;
        };
        let step = direction.scale(self.stats.speed * dt);
        if step.length_sq() >= remaining_sq {
            self.position = self.destination;
            return true;
        }
        self.position = self.position.add(step);
        false
    }

    /// Keep the corpse clock running; deactivates once it expires.
    pub(crate) fn tick_corpse(&mut self) {
        if self.state_time >= self.stats.corpse_duration {
            self.active = false;
        }
    }

    /// Record the zone the unit now stands in.
    ///
    /// Returns the previous zone when it differs from `current`, so the
    /// caller can notify exactly once per change.
    pub(crate) fn record_zone(
        &mut self,
        current: Option<ZoneCoord>,
    ) -> Option<Option<ZoneCoord>> {
        if self.zone == current {
            return None;
        }
        Some(std::mem::replace(&mut self.zone, current))
    }
}
