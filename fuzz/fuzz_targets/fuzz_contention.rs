#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zonectl::game::{Extents, Vec2, Zone, ZoneConfig, ZoneCoord};

/// One input to a zone.
#[derive(Arbitrary, Debug)]
enum Step {
    /// A unit of faction `n % 4` enters.
    Enter(u8),
    /// A unit of faction `n % 4` leaves, if one is present.
    Leave(u8),
    /// Tick with `dt = n / 16` seconds.
    Update(u8),
}

/// Structured input for contention fuzzing.
#[derive(Arbitrary, Debug)]
struct ContentionInput {
    /// Initial owner (`n % 5 == 4` means neutral).
    owner: u8,
    /// Sequence of occupancy changes and ticks.
    steps: Vec<Step>,
}

const TIME_TO_CAPTURE: f64 = 20.0;

fuzz_target!(|input: ContentionInput| {
    let mut zone = Zone::new(
        ZoneCoord::new(0, 0),
        Extents {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(64.0, 64.0),
        },
        4,
        ZoneConfig {
            time_to_capture: TIME_TO_CAPTURE,
        },
    );
    let initial = input.owner % 5;
    if initial < 4 {
        zone.set_owner(Some(initial));
    }
    let mut present = [0u32; 4];

    // Cap steps to keep runs short
    for step in input.steps.into_iter().take(4096) {
        match step {
            Step::Enter(n) => {
                let f = n % 4;
                zone.owner_attached_character(f);
                present[usize::from(f)] += 1;
            }
            Step::Leave(n) => {
                let f = n % 4;
                if present[usize::from(f)] > 0 {
                    zone.owner_removed_character(f);
                    present[usize::from(f)] -= 1;
                }
            }
            Step::Update(n) => {
                let change = zone.update(f64::from(n) / 16.0);
                if let Some(change) = change {
                    assert_eq!(change.current, zone.owner());
                }
            }
        }

        for &t in zone.ownership_values() {
            assert!((0.0..=TIME_TO_CAPTURE).contains(&t), "accumulator {t} out of range");
        }
        if let Some(owner) = zone.owner() {
            for (i, &t) in zone.ownership_values().iter().enumerate() {
                if i != usize::from(owner) {
                    assert!(t <= 0.0, "non-owner {i} holds {t}");
                }
            }
        }
        assert_eq!(zone.occupant_counts(), &present[..]);
    }
});
