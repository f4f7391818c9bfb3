//! Ports (Interfaces) for concurrency runtime models
//!
//! A runtime model teaches the trace builder the semantics of one
//! concurrency API family that the plain fork/join/lock vocabulary cannot
//! express on its own: implicit joins, regions run by a single team member,
//! device synchronization. Exactly one model is active per build.

use crate::features::ir_model::domain::{ForkIr, NodeId};
use crate::features::trace::domain::Event;
use crate::features::trace::infrastructure::ThreadBuildState;

pub trait RuntimeModel {
    fn name(&self) -> &'static str;

    /// Called before the builder handles `node`; `false` means the model
    /// handled it and default handling is skipped
    fn pre_visit(&mut self, node: NodeId, state: &mut ThreadBuildState<'_, '_>) -> bool;

    /// Fork event recorded in the parent, child not yet built
    fn pre_fork(&mut self, _fork: &ForkIr, _event: &Event) {}

    /// Child fully built; `state` is the parent's
    fn post_fork(&mut self, _fork: NodeId, _state: &mut ThreadBuildState<'_, '_>, _event: &Event) {}

    /// Thread's instruction stream exhausted, trace not yet sealed
    fn on_thread_end(&mut self, _state: &mut ThreadBuildState<'_, '_>) {}
}
