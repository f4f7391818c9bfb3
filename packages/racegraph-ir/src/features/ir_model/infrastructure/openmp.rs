//! OpenMP runtime (libomp `__kmpc_*` entry points)
//!
//! A parallel region call forks a whole team and joins it again before the
//! call returns. The classifier expands it into `team_size` fork nodes (the
//! first one is the master) followed by their companion joins, so the trace
//! builder sees ordinary fork/join pairs.
//!
//! Work-sharing constructs (master, single, taskwait, reductions) are emitted
//! as runtime calls and interpreted by the OpenMP runtime model.

use crate::features::ir_model::domain::{BarrierApi, CallApi, ForkApi, IrNode, LockApi, ThreadEntry};
use crate::features::ir_model::ports::{ClassifyContext, InstructionClassifier};
use crate::shared::models::{Instruction, Operand};

pub const TASK_ALLOC: &str = "__kmpc_omp_task_alloc";

/// `__kmpc_omp_task_alloc(loc, gtid, flags, sizeof_task, sizeof_shareds, entry)`
const TASK_ALLOC_ENTRY: usize = 5;
/// `__kmpc_omp_task(loc, gtid, task)`
const TASK_OPERAND: usize = 2;

#[derive(Debug, Default, Clone, Copy)]
pub struct OpenMpClassifier;

impl OpenMpClassifier {
    fn emit_team(
        inst: &Instruction,
        ctx: &mut ClassifyContext<'_>,
        member: impl Fn(bool) -> ForkApi,
    ) {
        let team_size = ctx.config.openmp.team_size;
        let forks: Vec<_> = (0..team_size)
            .map(|idx| ctx.emit(IrNode::fork(inst, member(idx == 0), 0, 2)))
            .collect();
        for fork in forks {
            ctx.emit_companion_join(fork);
        }
    }

    /// Task entry, found through the allocation call feeding the task operand
    fn task_entry(inst: &Instruction, ctx: &ClassifyContext<'_>) -> ThreadEntry {
        let alloc_id = match inst.arg(TASK_OPERAND) {
            Some(Operand::Result(id)) => *id,
            other => panic!(
                "__kmpc_omp_task {}: operand {TASK_OPERAND} must be the result of {TASK_ALLOC}, found {other:?}",
                inst.id
            ),
        };
        let alloc = ctx
            .module
            .instruction(alloc_id)
            .filter(|alloc| alloc.callee_name() == Some(TASK_ALLOC))
            .unwrap_or_else(|| {
                panic!(
                    "__kmpc_omp_task {}: {alloc_id} is not a call to {TASK_ALLOC}",
                    inst.id
                )
            });
        alloc
            .arg(TASK_ALLOC_ENTRY)
            .and_then(ThreadEntry::from_operand)
            .unwrap_or_else(|| {
                panic!(
                    "{TASK_ALLOC} {}: operand {TASK_ALLOC_ENTRY} is not a task routine",
                    alloc.id
                )
            })
    }
}

fn is_reduction(callee: &str) -> bool {
    matches!(
        callee,
        "__kmpc_reduce" | "__kmpc_reduce_nowait" | "__kmpc_end_reduce" | "__kmpc_end_reduce_nowait"
    )
}

impl InstructionClassifier for OpenMpClassifier {
    fn name(&self) -> &'static str {
        "openmp"
    }

    fn classify(
        &self,
        inst: &Instruction,
        callee: &str,
        _args: &[Operand],
        ctx: &mut ClassifyContext<'_>,
    ) -> bool {
        match callee {
            "__kmpc_fork_call" => Self::emit_team(inst, ctx, |master| ForkApi::OmpFork { master }),
            "__kmpc_fork_teams" => Self::emit_team(inst, ctx, |master| ForkApi::OmpTeams { master }),
            "__kmpc_omp_task" => {
                let entry = Self::task_entry(inst, ctx);
                let handle = match &entry {
                    ThreadEntry::Direct(name) => Operand::Function(name.clone()),
                    ThreadEntry::Indirect(value) => Operand::Value(*value),
                };
                ctx.emit(IrNode::fork_with_entry(inst, ForkApi::OmpTask, handle, entry));
            }
            "__kmpc_critical" => {
                ctx.emit(IrNode::lock(inst, LockApi::OmpCritical, 2));
            }
            "__kmpc_end_critical" => {
                ctx.emit(IrNode::unlock(inst, LockApi::OmpCritical, 2));
            }
            "omp_set_lock" => {
                ctx.emit(IrNode::lock(inst, LockApi::OmpLock, 0));
            }
            "omp_unset_lock" => {
                ctx.emit(IrNode::unlock(inst, LockApi::OmpLock, 0));
            }
            "__kmpc_ordered" => {
                ctx.emit(IrNode::lock(inst, LockApi::OmpOrdered, 0));
            }
            "__kmpc_end_ordered" => {
                ctx.emit(IrNode::unlock(inst, LockApi::OmpOrdered, 0));
            }
            "__kmpc_barrier" => {
                ctx.emit(IrNode::barrier(inst, BarrierApi::OmpBarrier));
            }
            "__kmpc_master" => {
                ctx.emit(IrNode::call(inst, CallApi::OmpMaster));
            }
            "__kmpc_end_master" => {
                ctx.emit(IrNode::call(inst, CallApi::OmpEndMaster));
            }
            "__kmpc_single" => {
                ctx.emit(IrNode::call(inst, CallApi::OmpSingle));
            }
            "__kmpc_end_single" => {
                ctx.emit(IrNode::call(inst, CallApi::OmpEndSingle));
            }
            "__kmpc_omp_taskwait" => {
                ctx.emit(IrNode::call(inst, CallApi::OmpTaskwait));
            }
            _ if is_reduction(callee) => {
                ctx.emit(IrNode::call(inst, CallApi::OmpReduce));
            }
            // Remaining runtime bookkeeping (task_alloc, static loop init/fini,
            // thread-number queries) carries no ordering.
            _ if callee.starts_with("__kmpc_") || callee.starts_with("omp_") => {}
            _ => return false,
        }
        true
    }
}
