//! Custom assertions for race reports and traces

use racegraph_ir::features::race_detection::Race;
use racegraph_ir::features::trace::{EventKind, ThreadTrace};

/// Assert that no race was reported
pub fn assert_no_races(races: &[Race]) {
    assert!(
        races.is_empty(),
        "Expected no races, got: {:#?}",
        races.iter().map(|r| r.to_string()).collect::<Vec<_>>()
    );
}

/// Assert the exact number of reported races
pub fn assert_race_count(races: &[Race], expected: usize) {
    assert_eq!(
        races.len(),
        expected,
        "Expected {expected} races, got: {:#?}",
        races.iter().map(|r| r.to_string()).collect::<Vec<_>>()
    );
}

/// Assert a race between accesses on the two source lines (either order)
pub fn assert_race_between_lines(races: &[Race], a: u32, b: u32) {
    let line = |access: &racegraph_ir::features::race_detection::RaceAccess| {
        access.location.as_ref().map(|loc| loc.line)
    };
    assert!(
        races.iter().any(|race| {
            let pair = (line(&race.first), line(&race.second));
            pair == (Some(a), Some(b)) || pair == (Some(b), Some(a))
        }),
        "Expected a race between lines {a} and {b}, got: {:#?}",
        races.iter().map(|r| r.to_string()).collect::<Vec<_>>()
    );
}

/// Event kinds of a thread, in order
pub fn kinds(thread: &ThreadTrace) -> Vec<EventKind> {
    thread.events().iter().map(|event| event.kind).collect()
}
