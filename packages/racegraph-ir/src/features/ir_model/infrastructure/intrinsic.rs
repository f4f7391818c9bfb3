//! Calls that are recognized but carry no concurrency meaning

use crate::features::ir_model::ports::{ClassifyContext, InstructionClassifier};
use crate::shared::models::{Instruction, Operand};

#[derive(Debug, Default, Clone, Copy)]
pub struct IntrinsicClassifier;

impl InstructionClassifier for IntrinsicClassifier {
    fn name(&self) -> &'static str {
        "intrinsic"
    }

    fn classify(
        &self,
        _inst: &Instruction,
        callee: &str,
        _args: &[Operand],
        _ctx: &mut ClassifyContext<'_>,
    ) -> bool {
        matches!(callee, "printf" | "llvm.dbg.declare" | "llvm.dbg.value")
    }
}
