//! Property tests over generated pthread programs
//!
//! Every worker is spawned before any is joined, so accesses of different
//! workers are always concurrent and unprotected. Races must then exist
//! exactly when the object is shared.

use crate::common::*;
use proptest::prelude::*;
use racegraph_ir::config::AnalysisConfig;
use racegraph_ir::features::race_detection::{RaceAnalysis, RaceSeverity};
use racegraph_ir::features::shared_memory::SharedMemory;
use racegraph_ir::features::trace::AccessType;
use racegraph_ir::shared::models::{ModuleBuilder, Operand};

#[derive(Debug, Clone, Copy)]
enum Op {
    Load,
    Store,
    Free,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Load), Just(Op::Store), Just(Op::Free)]
}

fn workers_strategy() -> impl Strategy<Value = Vec<Vec<Op>>> {
    prop::collection::vec(prop::collection::vec(op_strategy(), 0..5), 1..5)
}

fn program(workers: &[Vec<Op>]) -> Fixture {
    let mut mb = ModuleBuilder::new("generated.c");
    let p = mb.value();
    let handles: Vec<_> = workers.iter().map(|_| mb.value()).collect();

    for (idx, ops) in workers.iter().enumerate() {
        mb.function(&format!("worker{idx}"), |f| {
            for op in ops {
                match op {
                    Op::Load => {
                        f.load(p);
                    }
                    Op::Store => {
                        f.store(p);
                    }
                    Op::Free => {
                        f.call("free", vec![Operand::Value(p)]);
                    }
                }
            }
        });
    }
    mb.function("main", |f| {
        for (idx, &handle) in handles.iter().enumerate() {
            spawn(f, handle, &format!("worker{idx}"));
        }
        for &handle in &handles {
            join(f, handle);
        }
    });
    Fixture::distinct(mb.build(), &[p])
}

proptest! {
    #[test]
    fn prop_races_exist_iff_object_shared(workers in workers_strategy()) {
        let fixture = program(&workers);
        let config = AnalysisConfig::default();
        let trace = fixture.trace(&config);
        let shared = SharedMemory::new(&trace);
        let races = RaceAnalysis::run_on_trace(&trace, &config);

        prop_assert_eq!(!races.is_empty(), !shared.shared_objects().is_empty());
    }

    #[test]
    fn prop_single_accessing_thread_never_races(
        ops in prop::collection::vec(op_strategy(), 0..8),
        idle in 0usize..3,
    ) {
        let mut workers = vec![ops];
        workers.extend(std::iter::repeat(Vec::new()).take(idle));
        let fixture = program(&workers);
        prop_assert!(fixture.races().is_empty());
    }

    #[test]
    fn prop_reported_races_are_well_formed(workers in workers_strategy()) {
        let races = program(&workers).races();
        let mut pairs = std::collections::HashSet::new();
        for race in &races {
            prop_assert_ne!(race.first.event.tid, race.second.event.tid);
            prop_assert!(race.first.access.conflicts_with(race.second.access));
            prop_assert_eq!(
                race.severity == RaceSeverity::Critical,
                race.first.access == AccessType::Free || race.second.access == AccessType::Free
            );
            prop_assert!(pairs.insert(race.inst_pair()));
        }
    }

    #[test]
    fn prop_sequential_and_parallel_agree(workers in workers_strategy()) {
        let fixture = program(&workers);
        let sequential = fixture.races_with(&AnalysisConfig::default().with_parallel(false));
        let parallel = fixture.races_with(&AnalysisConfig::default().with_parallel(true));
        prop_assert_eq!(sequential, parallel);
    }
}
