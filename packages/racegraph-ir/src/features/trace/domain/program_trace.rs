//! Whole-program trace
//!
//! All threads live in one flat vector indexed by `ThreadId`; thread ids
//! follow fork order (depth-first pre-order) with main at index 0. The trace
//! also owns the IR arena its events point into and keeps the module and
//! points-to provider it was built from.

use super::event::{Event, EventRef, ThreadId};
use super::thread_trace::ThreadTrace;
use crate::config::AnalysisConfig;
use crate::features::ir_model::domain::{ForkIr, IrArena, IrNode};
use crate::features::points_to::PointsToProvider;
use crate::features::trace::error::Result;
use crate::features::trace::infrastructure::TraceBuilder;
use crate::shared::models::Module;
use std::fmt;

pub struct ProgramTrace<'a> {
    threads: Vec<ThreadTrace>,
    arena: IrArena,
    module: &'a Module,
    points_to: &'a dyn PointsToProvider,
}

impl fmt::Debug for ProgramTrace<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProgramTrace")
            .field("module", &self.module.name())
            .field("threads", &self.threads)
            .field("nodes", &self.arena.len())
            .finish()
    }
}

impl<'a> ProgramTrace<'a> {
    pub(crate) fn new(
        threads: Vec<ThreadTrace>,
        arena: IrArena,
        module: &'a Module,
        points_to: &'a dyn PointsToProvider,
    ) -> Self {
        Self {
            threads,
            arena,
            module,
            points_to,
        }
    }

    /// Trace `config.entry` with the standard classifiers
    pub fn build(
        module: &'a Module,
        points_to: &'a dyn PointsToProvider,
        config: &AnalysisConfig,
    ) -> Result<Self> {
        TraceBuilder::new(module, points_to, config).build()
    }

    pub fn threads(&self) -> &[ThreadTrace] {
        &self.threads
    }

    pub fn thread(&self, tid: ThreadId) -> Option<&ThreadTrace> {
        self.threads.get(tid)
    }

    pub fn main(&self) -> &ThreadTrace {
        &self.threads[0]
    }

    pub fn thread_count(&self) -> usize {
        self.threads.len()
    }

    pub fn event_count(&self) -> usize {
        self.threads.iter().map(ThreadTrace::len).sum()
    }

    pub fn event(&self, at: EventRef) -> Option<&Event> {
        self.threads.get(at.tid)?.event(at.eid)
    }

    /// All events, threads in id order and events in program order
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.threads.iter().flat_map(|thread| thread.events().iter())
    }

    /// IR node behind an event
    pub fn node(&self, event: &Event) -> &IrNode {
        &self.arena[event.node]
    }

    /// Fork node that spawned `tid`
    pub fn spawn_fork(&self, tid: ThreadId) -> Option<&ForkIr> {
        let node = self.threads.get(tid)?.spawn_fork()?;
        self.arena[node].as_fork()
    }

    pub fn arena(&self) -> &IrArena {
        &self.arena
    }

    pub fn module(&self) -> &'a Module {
        self.module
    }

    pub fn points_to(&self) -> &'a dyn PointsToProvider {
        self.points_to
    }
}
