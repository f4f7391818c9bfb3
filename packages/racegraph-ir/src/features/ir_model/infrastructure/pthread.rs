//! POSIX threads
//!
//! `pthread_create(handle, attr, entry, arg)`, `pthread_join(handle, ret)`,
//! mutex and spin lock pairs.

use crate::features::ir_model::domain::{ForkApi, IrNode, JoinApi, LockApi};
use crate::features::ir_model::ports::{ClassifyContext, InstructionClassifier};
use crate::shared::models::{Instruction, Operand};

#[derive(Debug, Default, Clone, Copy)]
pub struct PthreadClassifier;

impl InstructionClassifier for PthreadClassifier {
    fn name(&self) -> &'static str {
        "pthread"
    }

    fn classify(
        &self,
        inst: &Instruction,
        callee: &str,
        _args: &[Operand],
        ctx: &mut ClassifyContext<'_>,
    ) -> bool {
        let node = match callee {
            "pthread_create" => IrNode::fork(inst, ForkApi::PthreadCreate, 0, 2),
            "pthread_join" => IrNode::join(inst, JoinApi::PthreadJoin, 0),
            "pthread_mutex_lock" => IrNode::lock(inst, LockApi::PthreadMutex, 0),
            "pthread_mutex_unlock" => IrNode::unlock(inst, LockApi::PthreadMutex, 0),
            "pthread_spin_lock" => IrNode::lock(inst, LockApi::PthreadSpin, 0),
            "pthread_spin_unlock" => IrNode::unlock(inst, LockApi::PthreadSpin, 0),
            _ => return false,
        };
        ctx.emit(node);
        true
    }
}
