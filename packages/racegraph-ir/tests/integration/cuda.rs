//! CUDA programs
//!
//! Kernel launches fork one thread per modeled device thread; the host
//! joins them when it synchronizes with the device.

use crate::common::*;
use pretty_assertions::assert_eq;
use racegraph_ir::config::{AnalysisConfig, RuntimeSelection};
use racegraph_ir::features::trace::{EventKind, TraceBuilder};
use racegraph_ir::shared::models::{ModuleBuilder, ValueId};

fn host_and_kernel(sync: Option<&str>) -> (Fixture, ValueId) {
    let mut mb = ModuleBuilder::new("saxpy.cu");
    let x = mb.value();
    mb.function("kernel", |f| {
        f.at(10, 5).store(x);
    });
    mb.function("main", |f| {
        f.at(5, 5).store(x);
        cuda_launch(f, "kernel");
        if let Some(sync) = sync {
            f.call(sync, vec![]);
        }
        f.at(30, 5).load(x);
    });
    (Fixture::distinct(mb.build(), &[x]), x)
}

#[test]
fn test_device_synchronize_joins_kernel_threads() {
    let (fixture, _) = host_and_kernel(Some("cudaDeviceSynchronize"));
    let config = AnalysisConfig::default();
    assert_eq!(
        TraceBuilder::new(&fixture.module, &fixture.pts, &config).runtime_selection(),
        RuntimeSelection::Cuda
    );

    let trace = fixture.trace(&config);
    // default grid: 2 blocks of 2 threads
    assert_eq!(trace.thread_count(), 5);
    let mut expected = vec![EventKind::Write];
    expected.extend((1..=4).map(|child| EventKind::Fork { child }));
    expected.extend((1..=4).map(|child| EventKind::Join { child: Some(child) }));
    expected.push(EventKind::Read);
    assert_eq!(kinds(trace.main()), expected);

    // device threads still race among themselves
    let races = fixture.races();
    assert_race_count(&races, 1);
    assert_race_between_lines(&races, 10, 10);
}

#[test]
fn test_stream_synchronize_behaves_like_device_synchronize() {
    let (fixture, _) = host_and_kernel(Some("cudaStreamSynchronize"));
    assert_race_count(&fixture.races(), 1);
}

#[test]
fn test_host_access_without_synchronize_races() {
    let (fixture, _) = host_and_kernel(None);
    let races = fixture.races();
    assert_race_count(&races, 2);
    assert_race_between_lines(&races, 10, 10);
    assert_race_between_lines(&races, 10, 30);
}

#[test]
fn test_grid_size_follows_config() {
    let (fixture, _) = host_and_kernel(Some("cudaDeviceSynchronize"));
    let trace = fixture.trace(&AnalysisConfig::default().with_cuda_grid(3, 4));
    assert_eq!(trace.thread_count(), 13);
}

fn block_barrier_kernel() -> Fixture {
    let mut mb = ModuleBuilder::new("shared_tile.cu");
    let tile = mb.value();
    mb.function("kernel", |f| {
        f.at(10, 5).store(tile);
        f.call("llvm.nvvm.barrier0", vec![]);
        f.at(20, 5).load(tile);
    });
    mb.function("main", |f| {
        cuda_launch(f, "kernel");
        f.call("cudaDeviceSynchronize", vec![]);
    });
    Fixture::distinct(mb.build(), &[tile])
}

#[test]
fn test_syncthreads_orders_threads_of_one_block() {
    let fixture = block_barrier_kernel();
    let config = AnalysisConfig::default().with_cuda_grid(1, 2);

    let races = fixture.races_with(&config);
    assert_race_count(&races, 1);
    assert_race_between_lines(&races, 10, 10);
}

#[test]
fn test_syncthreads_does_not_order_across_blocks() {
    let fixture = block_barrier_kernel();
    let config = AnalysisConfig::default().with_cuda_grid(2, 1);

    let races = fixture.races_with(&config);
    assert_race_count(&races, 2);
    assert_race_between_lines(&races, 10, 20);
}

#[test]
fn test_syncthreads_does_not_order_separate_launches() {
    let mut mb = ModuleBuilder::new("relaunch.cu");
    let tile = mb.value();
    mb.function("kernel", |f| {
        f.at(10, 5).store(tile);
        f.call("llvm.nvvm.barrier0", vec![]);
        f.at(20, 5).load(tile);
    });
    mb.function("launch", |f| {
        cuda_launch(f, "kernel");
    });
    mb.function("main", |f| {
        f.call("launch", vec![]);
        f.call("launch", vec![]);
        f.call("cudaDeviceSynchronize", vec![]);
    });
    let fixture = Fixture::distinct(mb.build(), &[tile]);
    let config = AnalysisConfig::default().with_cuda_grid(1, 2);

    assert_eq!(fixture.trace(&config).thread_count(), 5);
    // the second launch's read is not ordered after the first launch's write
    let races = fixture.races_with(&config);
    assert_race_count(&races, 2);
    assert_race_between_lines(&races, 10, 10);
    assert_race_between_lines(&races, 10, 20);
}

#[test]
fn test_atomics_produce_no_events() {
    let mut mb = ModuleBuilder::new("atomic.cu");
    let counter = mb.value();
    mb.function("kernel", |f| {
        f.call("_ZL9atomicAddPjj", vec![counter.into()]);
    });
    mb.function("main", |f| {
        cuda_launch(f, "kernel");
        f.call("cudaDeviceSynchronize", vec![]);
    });
    let fixture = Fixture::distinct(mb.build(), &[counter]);

    let trace = fixture.trace(&AnalysisConfig::default());
    assert!(trace.threads()[1..].iter().all(|thread| thread.is_empty()));
    assert_no_races(&fixture.races());
}
