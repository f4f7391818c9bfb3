//! Trace Builder
//!
//! Walks the main thread's entry function through its function summaries,
//! turning IR nodes into events. A fork spawns a child whose trace is built
//! depth-first before the parent continues, so thread ids come out in
//! pre-order with main = 0.
//!
//! ## Per node
//! 1. `skip_until` set → drop nodes until the marked instruction is reached
//! 2. `RuntimeModel::pre_visit` may veto default handling
//! 3. default handling:
//!    - Read/Write/Free/Lock/Unlock/Barrier → one event
//!    - Fork → one Fork event and a child thread per resolved entry
//!    - Join → one Join event per joined child
//!    - Call → `Call`, callee summary, `Return` (memoized per sync context)

use super::build_state::{ForkRecord, Frame, ThreadBuildState};
use super::context::{BuildContext, FunctionSummary};
use super::runtime::{CudaRuntime, OpenMpRuntime, PthreadRuntime};
use crate::config::{AnalysisConfig, RuntimeSelection};
use crate::features::ir_model::domain::{NodeCategory, NodeId, ThreadEntry};
use crate::features::ir_model::infrastructure::cuda::is_kernel_launch;
use crate::features::ir_model::infrastructure::ClassifierChain;
use crate::features::points_to::PointsToProvider;
use crate::features::trace::domain::{EventKind, EventRef, ProgramTrace, ThreadId};
use crate::features::trace::error::{Result, TraceError};
use crate::features::trace::ports::RuntimeModel;
use crate::shared::models::{Module, Operand};
use tracing::{debug, info, warn};

/// `'a` is the lifetime of the analyzed program, `'c` that of the configuration
pub struct TraceBuilder<'a, 'c> {
    module: &'a Module,
    points_to: &'a dyn PointsToProvider,
    config: &'c AnalysisConfig,
    chain: ClassifierChain,
}

impl<'a, 'c> TraceBuilder<'a, 'c> {
    pub fn new(module: &'a Module, points_to: &'a dyn PointsToProvider, config: &'c AnalysisConfig) -> Self {
        Self {
            module,
            points_to,
            config,
            chain: ClassifierChain::standard(),
        }
    }

    /// Replace the standard classifier chain
    pub fn with_classifiers(mut self, chain: ClassifierChain) -> Self {
        self.chain = chain;
        self
    }

    /// Runtime selected by configuration, or detected from the module's callees
    pub fn runtime_selection(&self) -> RuntimeSelection {
        match self.config.runtime {
            RuntimeSelection::Auto => detect_runtime(self.module),
            selected => selected,
        }
    }

    fn runtime_model(&self) -> Box<dyn RuntimeModel> {
        match self.runtime_selection() {
            RuntimeSelection::Cuda => Box::new(CudaRuntime::new()),
            RuntimeSelection::OpenMp => Box::new(OpenMpRuntime::new()),
            RuntimeSelection::Pthread | RuntimeSelection::Auto => Box::new(PthreadRuntime),
        }
    }

    pub fn build(&self) -> Result<ProgramTrace<'a>> {
        let entry = &self.config.entry;
        let function = self
            .module
            .function(entry)
            .ok_or_else(|| TraceError::EntryNotFound(entry.clone()))?;
        if function.is_declaration() {
            return Err(TraceError::EntryWithoutBody(entry.clone()));
        }

        let mut runtime = self.runtime_model();
        info!(
            module = self.module.name(),
            entry = entry.as_str(),
            runtime = runtime.name(),
            "building program trace"
        );

        let mut ctx = BuildContext::new(self.module, self.points_to, self.config, &self.chain);
        let main = ctx.reserve_thread(entry.clone(), None, None);
        ThreadBuildState::new(&mut ctx, main, vec![entry.clone()]).run(runtime.as_mut());

        let (threads, arena) = ctx.into_parts();
        let trace = ProgramTrace::new(threads, arena, self.module, self.points_to);
        info!(
            threads = trace.thread_count(),
            events = trace.event_count(),
            nodes = trace.arena().len(),
            "program trace built"
        );
        Ok(trace)
    }
}

fn detect_runtime(module: &Module) -> RuntimeSelection {
    let mut selection = RuntimeSelection::Pthread;
    for callee in module.direct_callees() {
        if is_kernel_launch(callee) {
            return RuntimeSelection::Cuda;
        }
        if callee.starts_with("__kmpc_fork") {
            selection = RuntimeSelection::OpenMp;
        }
    }
    selection
}

impl ThreadBuildState<'_, '_> {
    /// Build this thread from its entry and seal the trace
    pub(crate) fn run(mut self, runtime: &mut dyn RuntimeModel) {
        let entry = self.ctx.threads[self.tid].entry().to_string();
        if let Some(summary) = self.ctx.summary(&entry) {
            self.walk(entry, summary, runtime);
        }
        runtime.on_thread_end(&mut self);

        debug!(tid = self.tid, events = self.events.len(), "thread trace sealed");
        self.ctx.threads[self.tid].events = std::mem::take(&mut self.events);
    }

    fn walk(&mut self, function: String, nodes: FunctionSummary, runtime: &mut dyn RuntimeModel) {
        self.frames.push(Frame {
            function,
            nodes: nodes.clone(),
            pos: 0,
        });
        for (idx, &node) in nodes.iter().enumerate() {
            if let Some(frame) = self.frames.last_mut() {
                frame.pos = idx + 1;
            }
            self.visit(node, runtime);
        }
        self.frames.pop();
    }

    fn visit(&mut self, node: NodeId, runtime: &mut dyn RuntimeModel) {
        if let Some(until) = self.skip_until {
            if self.ctx.arena[node].inst() != until {
                return;
            }
            self.skip_until = None;
        }

        if !runtime.pre_visit(node, self) {
            return;
        }

        match self.ctx.arena[node].category() {
            NodeCategory::Read => {
                self.record(node, EventKind::Read);
            }
            NodeCategory::Write => {
                self.record(node, EventKind::Write);
            }
            NodeCategory::Free => {
                self.record(node, EventKind::Free);
            }
            NodeCategory::Lock => {
                self.record(node, EventKind::Lock);
            }
            NodeCategory::Unlock => {
                self.record(node, EventKind::Unlock);
            }
            NodeCategory::Barrier => {
                self.record(node, EventKind::Barrier);
            }
            NodeCategory::Fork => self.fork(node, runtime),
            NodeCategory::Join => self.join(node),
            NodeCategory::Call => self.call(node, runtime),
        }
    }

    fn fork(&mut self, node: NodeId, runtime: &mut dyn RuntimeModel) {
        let Some(fork) = self.ctx.arena[node].as_fork().cloned() else {
            return;
        };
        let entries = match &fork.entry {
            ThreadEntry::Direct(name) => vec![name.clone()],
            ThreadEntry::Indirect(value) => self.ctx.points_to.function_targets(*value),
        };
        if entries.is_empty() {
            warn!(fork = %self.ctx.arena[node], "thread entry could not be resolved");
            self.skipped_forks.insert(node);
        }

        for entry in entries {
            if self.ancestry.contains(&entry) {
                warn!(entry = entry.as_str(), tid = self.tid, "skipping recursive thread spawn");
                self.skipped_forks.insert(node);
                continue;
            }
            if self.ctx.threads.len() >= self.ctx.config.max_threads {
                warn!(
                    entry = entry.as_str(),
                    max_threads = self.ctx.config.max_threads,
                    "thread limit reached, fork skipped"
                );
                self.skipped_forks.insert(node);
                continue;
            }

            let site = EventRef::new(self.tid, self.events.len());
            let child = self.ctx.reserve_thread(entry.clone(), Some(site), Some(node));
            let event = self.record(node, EventKind::Fork { child });
            runtime.pre_fork(&fork, &event);

            let mut ancestry = self.ancestry.clone();
            ancestry.push(entry);
            ThreadBuildState::new(&mut *self.ctx, child, ancestry).run(runtime);

            self.forks.push(ForkRecord {
                node,
                child,
                handle: fork.handle.clone(),
                joined: false,
            });
            runtime.post_fork(node, self, &event);
        }
    }

    fn join(&mut self, node: NodeId) {
        let Some(join) = self.ctx.arena[node].as_join().cloned() else {
            return;
        };

        if let Some(fork) = join.fork {
            let recorded = self.forks.iter().any(|record| record.node == fork);
            assert!(
                recorded || self.skipped_forks.contains(&fork),
                "companion join {} in thread {} has no recorded fork {fork}",
                self.ctx.arena[node],
                self.tid
            );
            let children: Vec<ThreadId> = self
                .forks
                .iter_mut()
                .filter(|record| record.node == fork && !record.joined)
                .map(|record| {
                    record.joined = true;
                    record.child
                })
                .collect();
            for child in children {
                self.record(node, EventKind::Join { child: Some(child) });
            }
            return;
        }

        let child = self.resolve_join(&join.handle);
        if child.is_none() {
            warn!(join = %self.ctx.arena[node], tid = self.tid, "join could not be resolved");
        }
        self.record(node, EventKind::Join { child });
    }

    /// Most recent unjoined own fork with an aliasing handle, else the
    /// first thread anywhere spawned with an aliasing handle
    fn resolve_join(&mut self, handle: &Operand) -> Option<ThreadId> {
        let points_to = self.ctx.points_to;
        if let Some(record) = self
            .forks
            .iter_mut()
            .rev()
            .find(|record| !record.joined && points_to.operands_may_alias(&record.handle, handle))
        {
            record.joined = true;
            return Some(record.child);
        }

        let arena = &self.ctx.arena;
        self.ctx
            .threads
            .iter()
            .filter(|thread| thread.id() != self.tid)
            .find(|thread| {
                thread
                    .spawn_fork()
                    .and_then(|fork| arena[fork].thread_handle())
                    .is_some_and(|spawned| points_to.operands_may_alias(spawned, handle))
            })
            .map(|thread| thread.id())
    }

    fn call(&mut self, node: NodeId, runtime: &mut dyn RuntimeModel) {
        let Some(call) = self.ctx.arena[node].as_call().cloned() else {
            return;
        };
        // Runtime constructs nobody claimed carry no events.
        if call.api.is_runtime() {
            return;
        }

        for target in self.ctx.call_targets(&call.callee) {
            let Some(summary) = self.ctx.summary(&target) else {
                continue;
            };
            if self.frames.iter().any(|frame| frame.function == target) {
                warn!(callee = target.as_str(), tid = self.tid, "skipping recursive call");
                continue;
            }
            if self.ctx.config.dedup_calls && !self.ctx.has_thread_effects(&target) {
                let key = self.call_key(&target, &call.args);
                if !self.memo.insert(key) {
                    debug!(callee = target.as_str(), tid = self.tid, "call already expanded in this context");
                    continue;
                }
            }

            self.record(node, EventKind::Call);
            self.walk(target, summary, runtime);
            self.record(node, EventKind::Return);
        }
    }
}
