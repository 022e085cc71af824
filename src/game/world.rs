//! The world: zone grid, unit arena, and the per-tick update order.
//!
//! A tick runs controllers, then (until a winner exists) zone contention
//! and spawning, then prunes expired units, then updates the remaining
//! units. Zone transitions are reported from inside the unit update, so
//! contention always sees the previous tick's occupancy.

use log::{debug, info, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::SimConfig;
use crate::error::ConfigError;
use crate::game::{
    CheerVariant, Controller, Faction, FactionId, GridConfig, OwnerChange, Unit, UnitId,
    UnitState, UnitStats, Vec2, WorldEvent, Zone, ZoneCoord,
};

/// Complete simulation state.
#[derive(Debug)]
pub struct World {
    grid: GridConfig,
    zones: Vec<Zone>,
    factions: Vec<Faction>,
    /// Sorted by id; ids are handed out in increasing order.
    units: Vec<Unit>,
    controllers: Vec<Box<dyn Controller>>,
    unit_stats: UnitStats,
    spawn_interval: f64,
    spawn_timer: f64,
    winner: Option<FactionId>,
    next_unit_id: u32,
    elapsed: f64,
    rng: ChaCha8Rng,
    events: Vec<WorldEvent>,
}

impl World {
    /// Build a world of neutral zones from a configuration.
    ///
    /// `seed` drives spawn placement and group-order scatter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: &SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let grid = config.grid;
        let zones = grid
            .coords()
            .map(|coord| Zone::new(coord, grid.footprint_of(coord), config.factions.len(), config.zone))
            .collect();

        Ok(Self {
            grid,
            zones,
            factions: config.factions.clone(),
            units: Vec::new(),
            controllers: Vec::new(),
            unit_stats: config.unit,
            spawn_interval: config.spawn_interval,
            spawn_timer: 0.0,
            winner: None,
            next_unit_id: 0,
            elapsed: 0.0,
            rng: ChaCha8Rng::seed_from_u64(seed),
            events: Vec::new(),
        })
    }

    /// Grid layout.
    #[must_use]
    pub const fn grid(&self) -> &GridConfig {
        &self.grid
    }

    /// All zones in row-major order.
    #[must_use]
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    /// Zone at a coordinate.
    #[must_use]
    pub fn zone(&self, coord: ZoneCoord) -> Option<&Zone> {
        self.grid.index_of(coord).map(|idx| &self.zones[idx])
    }

    fn zone_mut(&mut self, coord: ZoneCoord) -> Option<&mut Zone> {
        self.grid.index_of(coord).map(|idx| &mut self.zones[idx])
    }

    /// Factions in id order.
    #[must_use]
    pub fn factions(&self) -> &[Faction] {
        &self.factions
    }

    /// Look up a faction by id.
    #[must_use]
    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(usize::from(id))
    }

    /// Units still held by the world, including corpses awaiting removal.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    /// Look up a unit by id.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.unit_index(id).map(|idx| &self.units[idx])
    }

    fn unit_index(&self, id: UnitId) -> Option<usize> {
        self.units.binary_search_by_key(&id, Unit::id).ok()
    }

    /// Living units of a faction, in collection order.
    #[must_use]
    pub fn units_of(&self, faction: FactionId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.faction() == faction && u.is_targetable())
            .map(Unit::id)
            .collect()
    }

    /// Constants used for newly spawned units.
    #[must_use]
    pub const fn unit_stats(&self) -> &UnitStats {
        &self.unit_stats
    }

    /// Seconds between spawn waves.
    #[must_use]
    pub const fn spawn_interval(&self) -> f64 {
        self.spawn_interval
    }

    /// Seconds accumulated towards the next spawn wave.
    #[must_use]
    pub const fn spawn_timer(&self) -> f64 {
        self.spawn_timer
    }

    /// The winning faction, once decided.
    #[must_use]
    pub const fn winner(&self) -> Option<FactionId> {
        self.winner
    }

    /// Simulated seconds since construction.
    #[must_use]
    pub const fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Attach a controller; it runs at the start of every tick.
    pub fn add_controller(&mut self, controller: Box<dyn Controller>) {
        self.controllers.push(controller);
    }

    /// Take every event recorded since the last call.
    ///
    /// The buffer grows until drained, so hosts should drain once per tick.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand a zone to a faction directly, as at game setup.
    ///
    /// Runs the victory check like any other ownership change.
    pub fn claim_zone(&mut self, coord: ZoneCoord, faction: FactionId) -> bool {
        if self.faction(faction).is_none() {
            return false;
        }
        let Some(zone) = self.zone_mut(coord) else {
            return false;
        };
        let change = zone.set_owner(Some(faction));
        self.on_owner_set(change);
        true
    }

    /// Place a new idle unit for a faction. The position is clamped into
    /// the world; its zone is recorded on its first update. Non-finite
    /// positions are rejected.
    pub fn spawn_unit(&mut self, faction: FactionId, position: Vec2) -> Option<UnitId> {
        self.faction(faction)?;
        if !position.is_finite() {
            return None;
        }
        let position = self.grid.extents().clamp(position);
        let unit = Unit::new(self.allocate_unit_id(), faction, position, self.unit_stats);
        Some(self.register_unit(unit))
    }

    fn allocate_unit_id(&mut self) -> UnitId {
        let id = UnitId(self.next_unit_id);
        self.next_unit_id += 1;
        id
    }

    fn register_unit(&mut self, unit: Unit) -> UnitId {
        let id = unit.id();
        debug!(
            "spawned unit {} for faction {} at ({:.1}, {:.1})",
            id.0,
            unit.faction(),
            unit.position().x,
            unit.position().z
        );
        self.events.push(WorldEvent::UnitSpawned {
            unit: id,
            faction: unit.faction(),
        });
        self.units.push(unit);
        id
    }

    // ------------------------------------------------------------------
    // Orders from the input layer
    // ------------------------------------------------------------------

    /// Send a unit towards a point, clamped into the world.
    ///
    /// Rejected for dying or unknown units, non-finite points, and after
    /// the game is won.
    pub fn set_destination(&mut self, id: UnitId, destination: Vec2, aggressive: bool) -> bool {
        if self.winner.is_some() || !destination.is_finite() {
            return false;
        }
        let destination = self.grid.extents().clamp(destination);
        let Some(idx) = self.unit_index(id) else {
            return false;
        };
        self.units[idx].set_destination(destination, aggressive)
    }

    /// Order a unit to attack another.
    ///
    /// Rejected when either unit is unknown, the target is not targetable,
    /// the attacker is dying, or the game is won.
    pub fn set_target(&mut self, id: UnitId, target: UnitId) -> bool {
        if self.winner.is_some() {
            return false;
        }
        let Some(target_idx) = self.unit_index(target) else {
            return false;
        };
        if !self.units[target_idx].is_targetable() {
            return false;
        }
        let Some(idx) = self.unit_index(id) else {
            return false;
        };
        self.units[idx].set_target(target)
    }

    /// Force a unit's state. No-op for dying units and after the game is won.
    ///
    /// Cheering is reserved for the victory broadcast and always rejected.
    pub fn set_state(&mut self, id: UnitId, state: UnitState) -> bool {
        if self.winner.is_some() || matches!(state, UnitState::Cheer(_)) {
            return false;
        }
        let Some(idx) = self.unit_index(id) else {
            return false;
        };
        self.units[idx].set_state(state)
    }

    /// Living units of a faction inside the box spanned by two corners.
    #[must_use]
    pub fn units_in_rect(&self, faction: FactionId, a: Vec2, b: Vec2) -> Vec<UnitId> {
        let (min_x, max_x) = (a.x.min(b.x), a.x.max(b.x));
        let (min_z, max_z) = (a.z.min(b.z), a.z.max(b.z));
        self.units
            .iter()
            .filter(|u| u.faction() == faction && u.is_targetable())
            .filter(|u| {
                let p = u.position();
                p.x >= min_x && p.x <= max_x && p.z >= min_z && p.z <= max_z
            })
            .map(Unit::id)
            .collect()
    }

    /// Send a group towards a point, scattering each destination within
    /// one zone footprint centred on it. Returns how many units accepted.
    pub fn order_group(&mut self, units: &[UnitId], point: Vec2, aggressive: bool) -> usize {
        let (w, d) = (self.grid.zone_width, self.grid.zone_depth);
        let mut accepted = 0;
        for &id in units {
            let destination = Vec2::new(
                point.x - w / 2.0 + self.rng.gen_range(0.0..1.0) * w,
                point.z - d / 2.0 + self.rng.gen_range(0.0..1.0) * d,
            );
            if self.set_destination(id, destination, aggressive) {
                accepted += 1;
            }
        }
        accepted
    }

    // ------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds.
    pub fn tick(&mut self, dt: f64) {
        self.elapsed += dt;
        self.update_controllers(dt);
        if self.winner.is_none() {
            self.update_zones(dt);
            self.update_spawns(dt);
        }
        self.prune_units();
        for idx in 0..self.units.len() {
            self.update_unit(idx, dt);
        }
    }

    fn update_controllers(&mut self, dt: f64) {
        let mut controllers = std::mem::take(&mut self.controllers);
        for controller in &mut controllers {
            controller.update(dt, self);
        }
        controllers.append(&mut self.controllers);
        self.controllers = controllers;
    }

    fn update_zones(&mut self, dt: f64) {
        for idx in 0..self.zones.len() {
            if let Some(change) = self.zones[idx].update(dt) {
                self.on_owner_set(change);
            }
        }
    }

    fn update_spawns(&mut self, dt: f64) {
        self.spawn_timer += dt;
        if self.spawn_timer < self.spawn_interval {
            return;
        }
        self.spawn_timer %= self.spawn_interval;
        for idx in 0..self.zones.len() {
            let id = UnitId(self.next_unit_id);
            if let Some(unit) = self.zones[idx].spawn_character(id, self.unit_stats, &mut self.rng) {
                self.next_unit_id += 1;
                self.register_unit(unit);
            }
        }
    }

    /// Drop inactive units, releasing their zone occupancy.
    fn prune_units(&mut self) {
        let grid = self.grid;
        let zones = &mut self.zones;
        let events = &mut self.events;
        self.units.retain(|unit| {
            if unit.is_active() {
                return true;
            }
            if let Some(idx) = unit.zone().and_then(|coord| grid.index_of(coord)) {
                zones[idx].owner_removed_character(unit.faction());
            }
            events.push(WorldEvent::UnitRemoved { unit: unit.id() });
            false
        });
    }

    fn update_unit(&mut self, idx: usize, dt: f64) {
        if !self.units[idx].is_active() {
            return;
        }
        self.units[idx].tick_state_time(dt);

        match self.units[idx].state() {
            UnitState::Idle | UnitState::Cheer(_) => {}
            UnitState::AggressiveIdle => self.acquire_target(idx),
            state @ (UnitState::Move | UnitState::AggressiveMove) => {
                if self.units[idx].step_towards_destination(dt) {
                    self.units[idx].set_state(UnitState::AggressiveIdle);
                } else if state.is_aggressive() {
                    self.acquire_target(idx);
                }
            }
            UnitState::Attack => self.resolve_attack(idx, dt),
            UnitState::Dying => self.units[idx].tick_corpse(),
        }

        let current = self.grid.zone_at(self.units[idx].position());
        if let Some(previous) = self.units[idx].record_zone(current) {
            let id = self.units[idx].id();
            self.notify_character_changed_zone(id, previous, current);
        }
    }

    /// Target the first living enemy within attack radius, in collection
    /// order.
    fn acquire_target(&mut self, idx: usize) {
        let me = &self.units[idx];
        let (id, faction, position) = (me.id(), me.faction(), me.position());
        let radius_sq = me.stats().attack_radius * me.stats().attack_radius;

        let found = self
            .units
            .iter()
            .find(|other| {
                other.id() != id
                    && other.faction() != faction
                    && other.is_targetable()
                    && other.position().distance_sq(position) <= radius_sq
            })
            .map(Unit::id);

        if let Some(target) = found {
            self.units[idx].set_target(target);
        }
    }

    fn resolve_attack(&mut self, idx: usize, dt: f64) {
        let target_idx = self.units[idx]
            .target()
            .and_then(|target| self.unit_index(target))
            .filter(|&t| self.units[t].is_targetable());

        let Some(target_idx) = target_idx else {
            self.units[idx].lose_target();
            return;
        };

        if !self.units[idx].tick_attack_timer(dt) {
            return;
        }
        let attacker = self.units[idx].id();
        let damage = self.units[idx].stats().attack_damage;
        let target = &mut self.units[target_idx];
        if target.apply_damage(damage) {
            debug!("unit {} killed by unit {}", target.id().0, attacker.0);
            self.events.push(WorldEvent::UnitDied {
                unit: target.id(),
                killer: attacker,
            });
        }
    }

    /// Move a unit's occupancy from its previous zone to its current one.
    ///
    /// Called exactly once per actual zone change; either side may be
    /// `None` when the unit is entering or leaving the grid.
    pub fn notify_character_changed_zone(
        &mut self,
        unit: UnitId,
        previous: Option<ZoneCoord>,
        current: Option<ZoneCoord>,
    ) {
        let Some(faction) = self.unit(unit).map(Unit::faction) else {
            return;
        };
        trace!("unit {} changed zone {previous:?} -> {current:?}", unit.0);
        if let Some(zone) = previous.and_then(|c| self.zone_mut(c)) {
            zone.owner_removed_character(faction);
        }
        if let Some(zone) = current.and_then(|c| self.zone_mut(c)) {
            zone.owner_attached_character(faction);
        }
        self.events.push(WorldEvent::ZoneChanged {
            unit,
            from: previous,
            to: current,
        });
    }

    fn on_owner_set(&mut self, change: OwnerChange) {
        if change.is_transfer() {
            info!(
                "zone ({}, {}) owner {:?} -> {:?}",
                change.zone.row, change.zone.col, change.previous, change.current
            );
            self.events.push(WorldEvent::OwnerChanged {
                zone: change.zone,
                previous: change.previous,
                current: change.current,
            });
        }
        self.check_for_winner();
    }

    /// Record a winner if the owner of zone (0, 0) owns every zone.
    ///
    /// A neutral candidate never wins. On victory every active unit starts
    /// cheering, cycling through the poses by collection index.
    pub fn check_for_winner(&mut self) -> Option<FactionId> {
        if self.winner.is_some() {
            return self.winner;
        }
        let candidate = self.zones.first()?.owner()?;
        if !self.zones.iter().all(|z| z.owner() == Some(candidate)) {
            return None;
        }

        info!("faction {candidate} wins after {:.1}s", self.elapsed);
        self.winner = Some(candidate);
        self.events.push(WorldEvent::Victory { faction: candidate });
        for (i, unit) in self.units.iter_mut().enumerate() {
            if unit.is_active() {
                unit.set_state(UnitState::Cheer(CheerVariant::for_index(i)));
            }
        }
        self.winner
    }
}
