//! Ordered classifier dispatch
//!
//! Turns one raw instruction into its IR nodes:
//! - `Load` → Read, `Store` → Write
//! - direct call → first classifier that recognizes the callee, else a plain Call
//! - indirect call → plain Call (targets are resolved by the trace builder)
//! - `Other` → nothing

use super::{CudaClassifier, IntrinsicClassifier, LibcClassifier, OpenMpClassifier, PthreadClassifier};
use crate::features::ir_model::domain::{CallApi, IrNode};
use crate::features::ir_model::ports::{ClassifyContext, InstructionClassifier};
use crate::shared::models::{InstKind, Instruction};

pub struct ClassifierChain {
    classifiers: Vec<Box<dyn InstructionClassifier>>,
}

impl Default for ClassifierChain {
    fn default() -> Self {
        Self::standard()
    }
}

impl std::fmt::Debug for ClassifierChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ClassifierChain {
    /// Chain without any classifiers: every call stays a plain Call
    pub fn empty() -> Self {
        Self {
            classifiers: Vec::new(),
        }
    }

    /// Intrinsics, libc, pthread, OpenMP, CUDA
    pub fn standard() -> Self {
        Self::empty()
            .with(IntrinsicClassifier)
            .with(LibcClassifier)
            .with(PthreadClassifier)
            .with(OpenMpClassifier)
            .with(CudaClassifier)
    }

    pub fn with(mut self, classifier: impl InstructionClassifier + 'static) -> Self {
        self.classifiers.push(Box::new(classifier));
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.classifiers.iter().map(|c| c.name()).collect()
    }

    /// Offer a direct call to each classifier in order
    pub fn classify_call(&self, inst: &Instruction, callee: &str, ctx: &mut ClassifyContext<'_>) -> bool {
        let args = inst.args();
        self.classifiers
            .iter()
            .any(|classifier| classifier.classify(inst, callee, args, ctx))
    }

    pub fn classify_instruction(&self, inst: &Instruction, ctx: &mut ClassifyContext<'_>) {
        match &inst.kind {
            InstKind::Load { .. } => {
                ctx.emit(IrNode::load(inst));
            }
            InstKind::Store { .. } => {
                ctx.emit(IrNode::store(inst));
            }
            InstKind::Call { callee, .. } => {
                let recognized = callee
                    .name()
                    .is_some_and(|name| self.classify_call(inst, name, ctx));
                if !recognized {
                    ctx.emit(IrNode::call(inst, CallApi::Plain));
                }
            }
            InstKind::Other => {}
        }
    }
}
