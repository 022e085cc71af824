//! Benchmarks for full skirmishes and crowded ticks.

#![allow(missing_docs)]
#![allow(clippy::unwrap_used)]

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use zonectl::game::{Vec2, World};
use zonectl::{SimConfig, SkirmishConfig, run_skirmish};

fn bench_skirmish(c: &mut Criterion) {
    let config = SkirmishConfig {
        max_ticks: 3_000,
        ..SkirmishConfig::default()
    };

    c.bench_function("skirmish_2p_8x8", |b| {
        b.iter(|| {
            let result = run_skirmish(black_box(42), black_box(&config));
            black_box(result)
        });
    });
}

fn bench_skirmish_4p(c: &mut Criterion) {
    let mut config = SkirmishConfig {
        max_ticks: 3_000,
        ..SkirmishConfig::default()
    };
    config.sim.factions = zonectl::game::default_factions(4);

    c.bench_function("skirmish_4p_8x8", |b| {
        b.iter(|| {
            let result = run_skirmish(black_box(42), black_box(&config));
            black_box(result)
        });
    });
}

fn bench_crowded_tick(c: &mut Criterion) {
    let mut world = World::new(&SimConfig::default(), 7).unwrap();
    let extent = world.grid().extents().max;
    for i in 0..2_000u32 {
        let faction = u8::try_from(i % 2).unwrap();
        let x = f64::from(i % 50) / 50.0 * extent.x;
        let z = f64::from(i / 50) / 40.0 * extent.z;
        let id = world.spawn_unit(faction, Vec2::new(x, z)).unwrap();
        world.set_destination(id, Vec2::new(extent.x - x, extent.z - z), true);
    }

    c.bench_function("tick_2000_units", |b| {
        b.iter(|| {
            world.tick(black_box(0.016));
            black_box(world.drain_events())
        });
    });
}

criterion_group!(benches, bench_skirmish, bench_skirmish_4p, bench_crowded_tick);
criterion_main!(benches);
