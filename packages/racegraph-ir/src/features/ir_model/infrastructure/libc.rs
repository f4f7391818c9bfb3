//! C/C++ memory routines
//!
//! Deallocation becomes a Free node; block copies and fills become an
//! API-level write of the destination (and read of the source).

use crate::features::ir_model::domain::{FreeApi, IrNode};
use crate::features::ir_model::ports::{ClassifyContext, InstructionClassifier};
use crate::shared::models::{Instruction, Operand};

#[derive(Debug, Default, Clone, Copy)]
pub struct LibcClassifier;

fn is_copy(callee: &str) -> bool {
    matches!(callee, "memcpy" | "memmove")
        || callee.starts_with("llvm.memcpy")
        || callee.starts_with("llvm.memmove")
}

fn is_fill(callee: &str) -> bool {
    callee == "memset" || callee.starts_with("llvm.memset")
}

impl InstructionClassifier for LibcClassifier {
    fn name(&self) -> &'static str {
        "libc"
    }

    fn classify(
        &self,
        inst: &Instruction,
        callee: &str,
        _args: &[Operand],
        ctx: &mut ClassifyContext<'_>,
    ) -> bool {
        match callee {
            "free" => {
                ctx.emit(IrNode::free(inst, FreeApi::Free, 0));
            }
            // operator delete / delete[]
            "_ZdlPv" | "_ZdaPv" => {
                ctx.emit(IrNode::free(inst, FreeApi::CxxDelete, 0));
            }
            _ if is_copy(callee) => {
                ctx.emit(IrNode::api_write(inst, 0));
                ctx.emit(IrNode::api_read(inst, 1));
            }
            _ if is_fill(callee) => {
                ctx.emit(IrNode::api_write(inst, 0));
            }
            _ => return false,
        }
        true
    }
}
