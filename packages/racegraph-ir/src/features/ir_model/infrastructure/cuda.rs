//! CUDA host and device calls
//!
//! A kernel launch is expanded into one fork per modeled device thread
//! (`blocks × threads_per_block`), each tagged with its block so that
//! `__syncthreads` only synchronizes threads of the same block. There is no
//! warp level. Launches are never joined here; the host joins them when it
//! synchronizes with the device.

use crate::features::ir_model::domain::{BarrierApi, CallApi, ForkApi, IrNode};
use crate::features::ir_model::ports::{ClassifyContext, InstructionClassifier};
use crate::shared::models::{Instruction, Operand};
use once_cell::sync::Lazy;
use rustc_hash::FxHashSet;

static ATOMICS: Lazy<FxHashSet<&'static str>> = Lazy::new(|| {
    [
        "_ZL9atomicAddPjj",
        "_ZL9atomicSubPjj",
        "_ZL9atomicMinPjj",
        "_ZL9atomicMaxPjj",
        "_ZL9atomicIncPjj",
        "_ZL9atomicDecPjj",
        "_ZL10atomicExchPjj",
        "_ZL9atomicCASPjjj",
        "_ZL9atomicAndPjj",
        "_ZL8atomicOrPjj",
        "_ZL9atomicXorPjj",
    ]
    .into_iter()
    .collect()
});

pub fn is_kernel_launch(callee: &str) -> bool {
    matches!(callee, "cudaLaunch" | "cudaLaunchKernel")
}

fn is_atomic(callee: &str) -> bool {
    ATOMICS.contains(callee) || callee.starts_with("llvm.nvvm.atomic.")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CudaClassifier;

impl InstructionClassifier for CudaClassifier {
    fn name(&self) -> &'static str {
        "cuda"
    }

    fn classify(
        &self,
        inst: &Instruction,
        callee: &str,
        _args: &[Operand],
        ctx: &mut ClassifyContext<'_>,
    ) -> bool {
        match callee {
            _ if is_kernel_launch(callee) => {
                let blocks = ctx.config.cuda.blocks;
                let threads = ctx.config.cuda.threads_per_block;
                for block in 0..blocks {
                    for thread in 0..threads {
                        ctx.emit(IrNode::fork(inst, ForkApi::CudaKernel { block, thread }, 0, 0));
                    }
                }
            }
            "llvm.nvvm.barrier0" => {
                ctx.emit(IrNode::barrier(inst, BarrierApi::CudaBlock));
            }
            "cudaDeviceSynchronize" => {
                ctx.emit(IrNode::call(inst, CallApi::CudaDeviceSync));
            }
            "cudaStreamSynchronize" => {
                ctx.emit(IrNode::call(inst, CallApi::CudaStreamSync));
            }
            // Atomics never race with each other.
            _ if is_atomic(callee) => {}
            _ => return false,
        }
        true
    }
}
