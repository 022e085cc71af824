//! Property-based tests for zone contention and unit movement.
//!
//! Run with: cargo test --release prop_sim

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use zonectl::game::{
    check_invariants, Extents, GridConfig, UnitState, Vec2, World, Zone, ZoneConfig, ZoneCoord,
};
use zonectl::SimConfig;

const T: f64 = 20.0;

/// One step applied to a zone under test.
#[derive(Debug, Clone)]
enum ZoneOp {
    Enter(u8),
    Leave(u8),
    Update(f64),
    Increment(u8, f64),
}

fn zone_op() -> impl Strategy<Value = ZoneOp> {
    prop_oneof![
        (0u8..3).prop_map(ZoneOp::Enter),
        (0u8..3).prop_map(ZoneOp::Leave),
        (0.0f64..2.0).prop_map(ZoneOp::Update),
        ((0u8..3), -50.0f64..50.0).prop_map(|(f, a)| ZoneOp::Increment(f, a)),
    ]
}

fn open_world() -> World {
    let config = SimConfig {
        grid: GridConfig {
            rows: 4,
            cols: 4,
            zone_width: 250.0,
            zone_depth: 250.0,
        },
        ..SimConfig::default()
    };
    World::new(&config, 0).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// Accumulators stay in [0, T] whatever the sequence of inputs.
    #[test]
    fn prop_ownership_bounded(ops in prop::collection::vec(zone_op(), 1..200)) {
        let mut zone = Zone::new(
            ZoneCoord::new(0, 0),
            Extents { min: Vec2::new(0.0, 0.0), max: Vec2::new(10.0, 10.0) },
            3,
            ZoneConfig { time_to_capture: T },
        );
        let mut present = [0u32; 3];

        for op in ops {
            match op {
                ZoneOp::Enter(f) => {
                    zone.owner_attached_character(f);
                    present[usize::from(f)] += 1;
                }
                ZoneOp::Leave(f) => {
                    if present[usize::from(f)] > 0 {
                        zone.owner_removed_character(f);
                        present[usize::from(f)] -= 1;
                    }
                }
                ZoneOp::Update(dt) => {
                    zone.update(dt);
                }
                ZoneOp::Increment(f, amount) => {
                    zone.increment_ownership(f, amount);
                }
            }

            for (i, &t) in zone.ownership_values().iter().enumerate() {
                prop_assert!((0.0..=T).contains(&t), "faction {} at {}", i, t);
            }
            if let Some(owner) = zone.owner() {
                prop_assert!(zone.ownership(owner) > 0.0);
            }
            prop_assert!((0.0..=1.0).contains(&zone.status_fraction()));
            prop_assert_eq!(zone.occupant_counts(), &present[..]);
        }
    }

    /// A moving unit lands exactly on its destination without overshooting.
    #[test]
    fn prop_movement_terminates_on_destination(
        sx in 0.0f64..1000.0,
        sz in 0.0f64..1000.0,
        dx in 0.0f64..1000.0,
        dz in 0.0f64..1000.0,
        dt in 0.01f64..0.5,
    ) {
        let mut world = open_world();
        let id = world.spawn_unit(0, Vec2::new(sx, sz)).unwrap();
        let destination = Vec2::new(dx, dz);
        prop_assert!(world.set_destination(id, destination, false));

        let speed = world.unit_stats().speed;
        let mut remaining = Vec2::new(sx, sz).distance_sq(destination);
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let budget = (remaining.sqrt() / (speed * dt)).ceil() as usize + 2;

        let mut arrived = false;
        for _ in 0..budget {
            world.tick(dt);
            let unit = world.unit(id).unwrap();
            let now = unit.position().distance_sq(destination);
            prop_assert!(now <= remaining);
            remaining = now;
            if unit.state() == UnitState::AggressiveIdle {
                arrived = true;
                break;
            }
        }
        prop_assert!(arrived);
        prop_assert_eq!(world.unit(id).unwrap().position(), destination);
    }

    /// Random orders never break world bookkeeping.
    #[test]
    fn prop_random_orders_keep_invariants(
        orders in prop::collection::vec((0u8..2, 0.0f64..1000.0, 0.0f64..1000.0, any::<bool>()), 1..40),
        seed in any::<u64>(),
    ) {
        let config = SimConfig {
            grid: GridConfig { rows: 4, cols: 4, zone_width: 250.0, zone_depth: 250.0 },
            ..SimConfig::default()
        };
        let mut world = World::new(&config, seed).unwrap();
        world.claim_zone(ZoneCoord::new(0, 0), 0);
        world.claim_zone(ZoneCoord::new(3, 3), 1);

        for (faction, x, z, aggressive) in orders {
            if let Some(id) = world.spawn_unit(faction, Vec2::new(x, z)) {
                world.set_destination(id, Vec2::new(1000.0 - x, 1000.0 - z), aggressive);
            }
            for _ in 0..10 {
                world.tick(0.25);
            }
            let violations = check_invariants(&world);
            prop_assert!(violations.is_empty(), "{:?}", violations);
        }
    }
}
