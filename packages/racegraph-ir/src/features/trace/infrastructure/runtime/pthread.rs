//! POSIX threads need nothing beyond the builder's default handling

use crate::features::ir_model::domain::NodeId;
use crate::features::trace::infrastructure::ThreadBuildState;
use crate::features::trace::ports::RuntimeModel;

#[derive(Debug, Default, Clone, Copy)]
pub struct PthreadRuntime;

impl RuntimeModel for PthreadRuntime {
    fn name(&self) -> &'static str {
        "pthread"
    }

    fn pre_visit(&mut self, _node: NodeId, _state: &mut ThreadBuildState<'_, '_>) -> bool {
        true
    }
}
