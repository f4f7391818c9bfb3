//! CUDA runtime model
//!
//! Kernel launches are asynchronous: device threads stay outstanding on the
//! launching host thread until it synchronizes with the device. Stream
//! synchronization is treated like device synchronization since streams are
//! not modeled.

use crate::features::ir_model::domain::{CallApi, ForkApi, IrNode, NodeId};
use crate::features::trace::domain::{Event, EventKind, ThreadId};
use crate::features::trace::infrastructure::ThreadBuildState;
use crate::features::trace::ports::RuntimeModel;
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct CudaRuntime {
    /// host thread -> (fork node, device thread) not yet synchronized
    outstanding: FxHashMap<ThreadId, Vec<(NodeId, ThreadId)>>,
}

impl CudaRuntime {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RuntimeModel for CudaRuntime {
    fn name(&self) -> &'static str {
        "cuda"
    }

    fn pre_visit(&mut self, node: NodeId, state: &mut ThreadBuildState<'_, '_>) -> bool {
        let is_sync = matches!(
            state.node(node),
            IrNode::Call(call) if matches!(call.api, CallApi::CudaDeviceSync | CallApi::CudaStreamSync)
        );
        if !is_sync {
            return true;
        }

        let launched = self.outstanding.remove(&state.tid()).unwrap_or_default();
        debug!(tid = state.tid(), device_threads = launched.len(), "device synchronize");
        for (fork, child) in launched {
            state.join_child(fork, child);
        }
        false
    }

    fn post_fork(&mut self, fork: NodeId, state: &mut ThreadBuildState<'_, '_>, event: &Event) {
        let EventKind::Fork { child } = event.kind else {
            return;
        };
        if matches!(state.node(fork), IrNode::Fork(f) if matches!(f.api, ForkApi::CudaKernel { .. })) {
            self.outstanding
                .entry(state.tid())
                .or_default()
                .push((fork, child));
        }
    }
}
