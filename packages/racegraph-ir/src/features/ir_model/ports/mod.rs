//! Ports (Interfaces) for instruction classification
//!
//! Each concurrency API contributes one classifier. A classifier looks at a
//! direct call, decides whether it models the callee, and if so emits zero or
//! more IR nodes into the function summary being built.

use crate::config::AnalysisConfig;
use crate::features::ir_model::domain::{IrArena, IrNode, NodeId};
use crate::shared::models::{Instruction, Module, Operand};

/// Per-API recognizer of library calls
pub trait InstructionClassifier: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Emit nodes for a recognized call; `false` lets the next classifier try
    fn classify(
        &self,
        inst: &Instruction,
        callee: &str,
        args: &[Operand],
        ctx: &mut ClassifyContext<'_>,
    ) -> bool;
}

/// Output sink and lookup context for one function summary
pub struct ClassifyContext<'a> {
    pub module: &'a Module,
    pub config: &'a AnalysisConfig,
    arena: &'a mut IrArena,
    nodes: &'a mut Vec<NodeId>,
}

impl<'a> ClassifyContext<'a> {
    pub fn new(
        module: &'a Module,
        config: &'a AnalysisConfig,
        arena: &'a mut IrArena,
        nodes: &'a mut Vec<NodeId>,
    ) -> Self {
        Self {
            module,
            config,
            arena,
            nodes,
        }
    }

    /// Store a node and append it to the summary
    pub fn emit(&mut self, node: IrNode) -> NodeId {
        let id = self.arena.push(node);
        self.nodes.push(id);
        id
    }

    /// Append the companion join of an already emitted fork
    pub fn emit_companion_join(&mut self, fork: NodeId) -> NodeId {
        let id = self.arena.companion_join(fork);
        self.nodes.push(id);
        id
    }

    pub fn arena(&self) -> &IrArena {
        self.arena
    }
}
