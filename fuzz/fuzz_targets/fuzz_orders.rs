#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zonectl::game::{check_invariants, GridConfig, UnitId, UnitState, Vec2, World, ZoneCoord};
use zonectl::SimConfig;

/// One order from a hypothetical input layer.
#[derive(Arbitrary, Debug)]
enum Order {
    /// Spawn a unit for faction `f % 2` at a point.
    Spawn { f: u8, x: i16, z: i16 },
    /// Move a unit (index into spawned ids).
    Move { unit: u8, x: i16, z: i16, aggressive: bool },
    /// Attack between two spawned units.
    Attack { unit: u8, target: u8 },
    /// Force aggressive idle.
    Guard { unit: u8 },
    /// Claim a zone outright.
    Claim { row: u8, col: u8, f: u8 },
    /// Advance time by `n / 32` seconds.
    Tick(u8),
}

/// Structured input for world fuzzing.
#[derive(Arbitrary, Debug)]
struct OrdersInput {
    /// World seed.
    seed: u64,
    /// Orders, applied in sequence.
    orders: Vec<Order>,
}

fuzz_target!(|input: OrdersInput| {
    let config = SimConfig {
        grid: GridConfig {
            rows: 3,
            cols: 3,
            zone_width: 64.0,
            zone_depth: 64.0,
        },
        ..SimConfig::default()
    };
    let Ok(mut world) = World::new(&config, input.seed) else {
        return;
    };
    let mut ids: Vec<UnitId> = Vec::new();
    let pick = |ids: &[UnitId], n: u8| -> Option<UnitId> {
        if ids.is_empty() {
            None
        } else {
            Some(ids[usize::from(n) % ids.len()])
        }
    };

    // Cap orders to keep runs short
    for order in input.orders.into_iter().take(1024) {
        match order {
            Order::Spawn { f, x, z } => {
                if let Some(id) = world.spawn_unit(f % 2, Vec2::new(f64::from(x), f64::from(z))) {
                    ids.push(id);
                }
            }
            Order::Move { unit, x, z, aggressive } => {
                if let Some(id) = pick(&ids, unit) {
                    world.set_destination(id, Vec2::new(f64::from(x), f64::from(z)), aggressive);
                }
            }
            Order::Attack { unit, target } => {
                if let (Some(a), Some(b)) = (pick(&ids, unit), pick(&ids, target)) {
                    world.set_target(a, b);
                }
            }
            Order::Guard { unit } => {
                if let Some(id) = pick(&ids, unit) {
                    world.set_state(id, UnitState::AggressiveIdle);
                }
            }
            Order::Claim { row, col, f } => {
                world.claim_zone(ZoneCoord::new(u16::from(row % 4), u16::from(col % 4)), f % 3);
            }
            Order::Tick(n) => {
                world.tick(f64::from(n) / 32.0);
                world.drain_events();
            }
        }

        let violations = check_invariants(&world);
        assert!(violations.is_empty(), "Invariants violated: {violations:?}");
    }
});
