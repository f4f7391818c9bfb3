//! Shared build context: IR arena, function summaries, thread table
//!
//! One context per trace build. Every thread's build state borrows it in
//! turn (children are built depth-first while the parent waits).

use crate::config::AnalysisConfig;
use crate::features::ir_model::domain::{IrArena, IrNode, NodeId};
use crate::features::ir_model::infrastructure::ClassifierChain;
use crate::features::ir_model::ports::ClassifyContext;
use crate::features::points_to::PointsToProvider;
use crate::features::trace::domain::{EventRef, ThreadId, ThreadTrace};
use crate::shared::models::{Callee, Module};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::debug;

/// Ordered IR nodes of one function body
pub type FunctionSummary = Arc<[NodeId]>;

pub struct BuildContext<'a> {
    pub(crate) module: &'a Module,
    pub(crate) points_to: &'a dyn PointsToProvider,
    pub(crate) config: &'a AnalysisConfig,
    chain: &'a ClassifierChain,
    pub(crate) arena: IrArena,
    pub(crate) threads: Vec<ThreadTrace>,
    summaries: FxHashMap<String, FunctionSummary>,
    thread_effects: FxHashMap<String, bool>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        module: &'a Module,
        points_to: &'a dyn PointsToProvider,
        config: &'a AnalysisConfig,
        chain: &'a ClassifierChain,
    ) -> Self {
        Self {
            module,
            points_to,
            config,
            chain,
            arena: IrArena::new(),
            threads: Vec::new(),
            summaries: FxHashMap::default(),
            thread_effects: FxHashMap::default(),
        }
    }

    /// Summary of a defined function, classified on first use
    pub fn summary(&mut self, function: &str) -> Option<FunctionSummary> {
        if let Some(summary) = self.summaries.get(function) {
            return Some(summary.clone());
        }
        let module = self.module;
        let definition = module.definition(function)?;

        let mut nodes = Vec::new();
        {
            let mut ctx = ClassifyContext::new(module, self.config, &mut self.arena, &mut nodes);
            for inst in &definition.body {
                self.chain.classify_instruction(inst, &mut ctx);
            }
        }
        debug!(
            function,
            instructions = definition.body.len(),
            nodes = nodes.len(),
            "summary cache miss"
        );

        let summary: FunctionSummary = nodes.into();
        self.summaries.insert(function.to_string(), summary.clone());
        Some(summary)
    }

    /// Functions a call may reach (direct name or points-to targets)
    pub fn call_targets(&self, callee: &Callee) -> Vec<String> {
        match callee {
            Callee::Direct(name) => vec![name.clone()],
            Callee::Indirect(value) => self.points_to.function_targets(*value),
        }
    }

    /// Whether calling `function` can (transitively) fork, join, hit a
    /// barrier or reach a runtime construct
    ///
    /// Calls without such effects are safe to deduplicate.
    pub fn has_thread_effects(&mut self, function: &str) -> bool {
        if let Some(&known) = self.thread_effects.get(function) {
            return known;
        }
        // Provisional answer while the call graph cycle is explored.
        self.thread_effects.insert(function.to_string(), false);

        let Some(summary) = self.summary(function) else {
            return false;
        };

        let mut callees = Vec::new();
        let mut direct = false;
        for &id in summary.iter() {
            match &self.arena[id] {
                IrNode::Fork(_) | IrNode::Join(_) | IrNode::Barrier(_) => direct = true,
                IrNode::Call(call) if call.api.is_runtime() => direct = true,
                IrNode::Call(call) => callees.extend(self.call_targets(&call.callee)),
                _ => {}
            }
            if direct {
                break;
            }
        }

        let effects = direct || callees.iter().any(|callee| self.has_thread_effects(callee));
        self.thread_effects.insert(function.to_string(), effects);
        effects
    }

    /// Allocate the next thread id with an empty trace
    pub fn reserve_thread(
        &mut self,
        entry: String,
        spawn_site: Option<EventRef>,
        spawn_fork: Option<NodeId>,
    ) -> ThreadId {
        let tid = self.threads.len();
        self.threads
            .push(ThreadTrace::new(tid, entry, spawn_site, spawn_fork));
        if let Some(site) = spawn_site {
            self.threads[site.tid].children.push(tid);
        }
        tid
    }

    pub fn into_parts(self) -> (Vec<ThreadTrace>, IrArena) {
        (self.threads, self.arena)
    }
}
