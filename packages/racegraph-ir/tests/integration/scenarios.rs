//! Native-thread scenarios
//!
//! Fork/join, locks and call memoization on pthread programs.

use crate::common::*;
use pretty_assertions::assert_eq;
use racegraph_ir::config::AnalysisConfig;
use racegraph_ir::features::shared_memory::SharedMemory;
use racegraph_ir::features::trace::{EventKind, EventRef};
use racegraph_ir::shared::models::ModuleBuilder;

// ═══════════════════════════════════════════════════════════════════════════
// Race / no-race scenarios
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_two_unsynchronized_writers_race() {
    let mut mb = ModuleBuilder::new("writers.c");
    let (t1, t2, x) = (mb.value(), mb.value(), mb.value());
    mb.function("w1", |f| {
        f.at(10, 5).store(x);
    });
    mb.function("w2", |f| {
        f.at(20, 5).store(x);
    });
    mb.function("main", |f| {
        spawn(f, t1, "w1");
        spawn(f, t2, "w2");
        join(f, t1);
        join(f, t2);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);

    let trace = fixture.trace(&AnalysisConfig::default());
    let shared = SharedMemory::new(&trace);
    assert_eq!(shared.shared_objects().len(), 1);

    let races = fixture.races();
    assert_race_count(&races, 1);
    assert_race_between_lines(&races, 10, 20);
    assert!(races[0].is_write_write());
}

#[test]
fn test_common_lock_prevents_race() {
    let mut mb = ModuleBuilder::new("locked.c");
    let (t1, t2, m, x) = (mb.value(), mb.value(), mb.value(), mb.value());
    for name in ["w1", "w2"] {
        mb.function(name, |f| {
            lock(f, m);
            f.store(x);
            unlock(f, m);
        });
    }
    mb.function("main", |f| {
        spawn(f, t1, "w1");
        spawn(f, t2, "w2");
        join(f, t1);
        join(f, t2);
    });
    let fixture = Fixture::distinct(mb.build(), &[x, m]);

    let trace = fixture.trace(&AnalysisConfig::default());
    assert_eq!(SharedMemory::new(&trace).shared_objects().len(), 1);
    assert_no_races(&fixture.races());
}

#[test]
fn test_lock_through_aliasing_pointers_prevents_race() {
    let mut mb = ModuleBuilder::new("lock_alias.c");
    let (t1, m_global, m_arg, x) = (mb.value(), mb.value(), mb.value(), mb.value());
    mb.function("worker", |f| {
        lock(f, m_arg);
        f.store(x);
        unlock(f, m_arg);
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        lock(f, m_global);
        f.store(x);
        unlock(f, m_global);
        join(f, t1);
    });
    let module = mb.build();
    let mut fixture = Fixture::distinct(module, &[x]);
    let mutex = fixture.pts.object("mutex");
    fixture.pts.bind(m_global, [mutex]).bind(m_arg, [mutex]);

    assert_no_races(&fixture.races());
}

#[test]
fn test_fork_join_orders_parent_and_child() {
    let mut mb = ModuleBuilder::new("ordered.c");
    let (t1, x) = (mb.value(), mb.value());
    mb.function("worker", |f| {
        f.at(10, 5).store(x);
    });
    mb.function("main", |f| {
        f.at(5, 5).store(x);
        spawn(f, t1, "worker");
        join(f, t1);
        f.at(7, 5).store(x);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);

    let trace = fixture.trace(&AnalysisConfig::default());
    assert_eq!(SharedMemory::new(&trace).shared_objects().len(), 1);
    assert_no_races(&fixture.races());
}

#[test]
fn test_access_between_fork_and_join_races() {
    let mut mb = ModuleBuilder::new("window.c");
    let (t1, x) = (mb.value(), mb.value());
    mb.function("worker", |f| {
        f.at(10, 5).load(x);
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        f.at(6, 5).store(x);
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);

    let races = fixture.races();
    assert_race_count(&races, 1);
    assert_race_between_lines(&races, 6, 10);
}

#[test]
fn test_read_only_sharing_is_not_a_race() {
    let mut mb = ModuleBuilder::new("readers.c");
    let (t1, t2, x) = (mb.value(), mb.value(), mb.value());
    mb.function("reader", |f| {
        f.load(x);
    });
    mb.function("main", |f| {
        spawn(f, t1, "reader");
        spawn(f, t2, "reader");
        f.load(x);
        join(f, t1);
        join(f, t2);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);

    let trace = fixture.trace(&AnalysisConfig::default());
    assert!(SharedMemory::new(&trace).shared_objects().is_empty());
    assert_no_races(&fixture.races());
}

#[test]
fn test_use_after_free_across_threads() {
    let mut mb = ModuleBuilder::new("free.c");
    let (t1, p) = (mb.value(), mb.value());
    mb.function("worker", |f| {
        f.at(10, 5).load(p);
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        f.at(4, 3).call("free", vec![p.into()]);
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[p]);

    let races = fixture.races();
    assert_race_count(&races, 1);
    assert!(races[0].involves_free());
    assert_race_between_lines(&races, 4, 10);
}

#[test]
fn test_memcpy_reads_source_and_writes_destination() {
    let mut mb = ModuleBuilder::new("memcpy.c");
    let (t1, dst, src) = (mb.value(), mb.value(), mb.value());
    mb.function("worker", |f| {
        f.at(10, 5).call("memcpy", vec![dst.into(), src.into(), racegraph_ir::shared::models::Operand::Const(8)]);
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        f.at(5, 5).store(src);
        f.at(6, 5).load(dst);
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[dst, src]);

    let races = fixture.races();
    assert_race_count(&races, 2);
    assert_race_between_lines(&races, 5, 10);
    assert_race_between_lines(&races, 6, 10);
}

// ═══════════════════════════════════════════════════════════════════════════
// Trace shape
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_fork_join_round_trip() {
    let mut mb = ModuleBuilder::new("round_trip.c");
    let (t1, x) = (mb.value(), mb.value());
    mb.function("worker", |f| {
        f.store(x);
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);
    let trace = fixture.trace(&AnalysisConfig::default());

    assert_eq!(trace.thread_count(), 2);
    assert_eq!(
        kinds(trace.main()),
        vec![EventKind::Fork { child: 1 }, EventKind::Join { child: Some(1) }]
    );
    let child = trace.thread(1).unwrap();
    assert_eq!(child.entry(), "worker");
    assert_eq!(child.parent(), Some(0));
    assert_eq!(child.spawn_site(), Some(EventRef::new(0, 0)));
    assert_eq!(kinds(child), vec![EventKind::Write]);
}

#[test]
fn test_thread_ids_follow_depth_first_fork_order() {
    let mut mb = ModuleBuilder::new("nested.c");
    let (ha, hb, hc) = (mb.value(), mb.value(), mb.value());
    mb.function("leaf", |f| {
        f.other();
    });
    mb.function("middle", |f| {
        spawn(f, hc, "leaf");
        join(f, hc);
    });
    mb.function("main", |f| {
        spawn(f, ha, "middle");
        spawn(f, hb, "leaf");
        join(f, ha);
        join(f, hb);
    });
    let fixture = Fixture::distinct(mb.build(), &[]);
    let trace = fixture.trace(&AnalysisConfig::default());

    let entries: Vec<_> = trace.threads().iter().map(|t| t.entry().to_string()).collect();
    assert_eq!(entries, vec!["main", "middle", "leaf", "leaf"]);
    assert_eq!(trace.main().children(), &[1, 3]);
    assert_eq!(trace.thread(1).unwrap().children(), &[2]);
    assert_eq!(trace.thread(2).unwrap().parent(), Some(1));
}

#[test]
fn test_zero_event_thread() {
    let mut mb = ModuleBuilder::new("idle.c");
    let (t1, x) = (mb.value(), mb.value());
    mb.function("idle", |f| {
        f.call("printf", vec![]);
    });
    mb.function("main", |f| {
        spawn(f, t1, "idle");
        f.store(x);
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);
    let trace = fixture.trace(&AnalysisConfig::default());

    assert!(trace.thread(1).unwrap().is_empty());
    assert_no_races(&fixture.races());
}

#[test]
fn test_volatile_accesses_are_plain_events() {
    let mut mb = ModuleBuilder::new("volatile.c");
    let (t1, flag) = (mb.value(), mb.value());
    mb.function("worker", |f| {
        f.volatile_store(flag);
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        f.volatile_load(flag);
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[flag]);
    let trace = fixture.trace(&AnalysisConfig::default());

    assert_eq!(kinds(trace.thread(1).unwrap()), vec![EventKind::Write]);
    assert!(kinds(trace.main()).contains(&EventKind::Read));
    assert_race_count(&fixture.races(), 1);
}

#[test]
fn test_indirect_thread_entry_resolved_through_points_to() {
    let mut mb = ModuleBuilder::new("fnptr.c");
    let (t1, fp, x) = (mb.value(), mb.value(), mb.value());
    mb.function("worker", |f| {
        f.store(x);
    });
    mb.function("main", |f| {
        f.call(
            "pthread_create",
            vec![t1.into(), racegraph_ir::shared::models::Operand::Null, fp.into(), racegraph_ir::shared::models::Operand::Null],
        );
        f.store(x);
        join(f, t1);
    });
    let mut fixture = Fixture::distinct(mb.build(), &[x]);
    fixture.pts.bind_function(fp, "worker");

    let trace = fixture.trace(&AnalysisConfig::default());
    assert_eq!(trace.thread(1).unwrap().entry(), "worker");
    assert_race_count(&fixture.races(), 1);
}

#[test]
fn test_recursive_spawn_is_cut() {
    let mut mb = ModuleBuilder::new("fork_bomb.c");
    let t1 = mb.value();
    mb.function("worker", |f| {
        spawn(f, t1, "worker");
    });
    mb.function("main", |f| {
        spawn(f, t1, "worker");
        join(f, t1);
    });
    let fixture = Fixture::distinct(mb.build(), &[]);
    let trace = fixture.trace(&AnalysisConfig::default());

    assert_eq!(trace.thread_count(), 2);
    assert!(trace.thread(1).unwrap().is_empty());
}

#[test]
fn test_missing_entry_is_an_error() {
    let mut mb = ModuleBuilder::new("no_main.c");
    mb.function("worker", |f| {
        f.other();
    });
    let fixture = Fixture::distinct(mb.build(), &[]);

    let result = racegraph_ir::RaceAnalysis::new(&fixture.module, &fixture.pts, &AnalysisConfig::default()).run();
    assert!(matches!(result, Err(racegraph_ir::RaceGraphError::Trace(_))));
}

// ═══════════════════════════════════════════════════════════════════════════
// Call memoization
// ═══════════════════════════════════════════════════════════════════════════

fn twice_called_module(with_lock_between: bool) -> (racegraph_ir::shared::models::Module, racegraph_ir::shared::models::ValueId) {
    let mut mb = ModuleBuilder::new("memo.c");
    let (m, x) = (mb.value(), mb.value());
    mb.function("helper", |f| {
        f.store(x);
    });
    mb.function("main", |f| {
        if with_lock_between {
            lock(f, m);
            f.call("helper", vec![x.into()]);
            unlock(f, m);
        } else {
            f.call("helper", vec![x.into()]);
        }
        f.call("helper", vec![x.into()]);
    });
    (mb.build(), x)
}

#[test]
fn test_duplicate_call_expanded_once() {
    let (module, x) = twice_called_module(false);
    let fixture = Fixture::distinct(module, &[x]);
    let trace = fixture.trace(&AnalysisConfig::default());

    assert_eq!(
        kinds(trace.main()),
        vec![EventKind::Call, EventKind::Write, EventKind::Return]
    );
}

#[test]
fn test_duplicate_call_expanded_again_in_new_lock_context() {
    let (module, x) = twice_called_module(true);
    let fixture = Fixture::distinct(module, &[x]);
    let trace = fixture.trace(&AnalysisConfig::default());

    let writes = kinds(trace.main())
        .into_iter()
        .filter(|kind| *kind == EventKind::Write)
        .count();
    assert_eq!(writes, 2);
}

#[test]
fn test_dedup_disabled_expands_every_call() {
    let (module, x) = twice_called_module(false);
    let fixture = Fixture::distinct(module, &[x]);
    let trace = fixture.trace(&AnalysisConfig::default().with_dedup_calls(false));

    assert_eq!(trace.main().len(), 6);
}

#[test]
fn test_calls_that_fork_are_never_deduplicated() {
    let mut mb = ModuleBuilder::new("fork_helper.c");
    let (t1, x) = (mb.value(), mb.value());
    mb.function("worker", |f| {
        f.store(x);
    });
    mb.function("start", |f| {
        spawn(f, t1, "worker");
        join(f, t1);
    });
    mb.function("main", |f| {
        f.call("start", vec![]);
        f.call("start", vec![]);
    });
    let fixture = Fixture::distinct(mb.build(), &[x]);
    let trace = fixture.trace(&AnalysisConfig::default());

    assert_eq!(trace.thread_count(), 3);
    assert_no_races(&fixture.races());
}
