//! OpenMP runtime model
//!
//! Team forks and their joins arrive as ordinary fork/companion-join pairs
//! from the classifier. This model adds what the runtime does implicitly:
//!
//! - `master` and `single` regions run in the master team thread only;
//!   other team threads jump to the matching end call
//! - tasks stay pending on the thread that created them until a
//!   `taskwait` (direct children only), a barrier (all pending tasks), or
//!   the end of the team thread
//! - a finished task hands its still-pending tasks to its parent
//! - joins happen direct tasks first, then inherited ones
//!
//! Reductions are runtime internal and produce no events.

use crate::features::ir_model::domain::{CallApi, ForkApi, ForkIr, NodeId};
use crate::features::trace::domain::{Event, EventKind, ThreadId};
use crate::features::trace::infrastructure::ThreadBuildState;
use crate::features::trace::ports::RuntimeModel;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingTask {
    fork: NodeId,
    child: ThreadId,
    /// Created by the thread holding it (as opposed to inherited from a finished task)
    direct: bool,
}

#[derive(Debug, Default)]
pub struct OpenMpRuntime {
    pending: FxHashMap<ThreadId, Vec<PendingTask>>,
    tasks: FxHashSet<ThreadId>,
    team_threads: FxHashSet<ThreadId>,
}

impl OpenMpRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    fn join_pending(&mut self, state: &mut ThreadBuildState<'_, '_>, direct_only: bool) {
        let Some(pending) = self.pending.get_mut(&state.tid()) else {
            return;
        };
        let (mut joined, kept): (Vec<_>, Vec<_>) = pending
            .drain(..)
            .partition(|task| task.direct || !direct_only);
        *pending = kept;
        // Direct tasks first, each group in the order it became pending.
        joined.sort_by_key(|task| !task.direct);
        for task in joined {
            state.join_child(task.fork, task.child);
        }
    }

    /// Non-master team threads jump over `open`..`close`
    fn skip_region(&self, node: NodeId, state: &mut ThreadBuildState<'_, '_>, open: CallApi, close: CallApi) {
        let in_worker = state
            .spawn_fork()
            .is_some_and(|fork| fork.api.is_team_member() && !fork.api.is_master());
        if !in_worker {
            return;
        }
        let end = state.find_region_end(open, close).unwrap_or_else(|| {
            panic!(
                "{open:?} region at {} has no matching {close:?} in {}",
                state.node(node),
                state.current_function().unwrap_or("<unknown>")
            )
        });
        debug!(tid = state.tid(), region = ?open, "skipping region in non-master team thread");
        state.skip_until(end);
    }
}

impl RuntimeModel for OpenMpRuntime {
    fn name(&self) -> &'static str {
        "openmp"
    }

    fn pre_visit(&mut self, node: NodeId, state: &mut ThreadBuildState<'_, '_>) -> bool {
        if state.node(node).as_barrier().is_some() {
            // Tasks complete before the barrier is passed.
            self.join_pending(state, false);
            return true;
        }
        let Some(api) = state.node(node).as_call().map(|call| call.api) else {
            return true;
        };

        match api {
            CallApi::OmpMaster => self.skip_region(node, state, CallApi::OmpMaster, CallApi::OmpEndMaster),
            CallApi::OmpSingle => self.skip_region(node, state, CallApi::OmpSingle, CallApi::OmpEndSingle),
            CallApi::OmpTaskwait => self.join_pending(state, true),
            CallApi::OmpEndMaster | CallApi::OmpEndSingle | CallApi::OmpReduce => {}
            _ => return true,
        }
        false
    }

    fn pre_fork(&mut self, fork: &ForkIr, event: &Event) {
        let EventKind::Fork { child } = event.kind else {
            return;
        };
        match fork.api {
            ForkApi::OmpTask => {
                self.tasks.insert(child);
            }
            api if api.is_team_member() => {
                self.team_threads.insert(child);
            }
            _ => {}
        }
    }

    fn post_fork(&mut self, fork: NodeId, state: &mut ThreadBuildState<'_, '_>, event: &Event) {
        let EventKind::Fork { child } = event.kind else {
            return;
        };
        if self.tasks.contains(&child) {
            self.pending.entry(state.tid()).or_default().push(PendingTask {
                fork,
                child,
                direct: true,
            });
        }
    }

    fn on_thread_end(&mut self, state: &mut ThreadBuildState<'_, '_>) {
        let tid = state.tid();
        if self.team_threads.contains(&tid) {
            self.join_pending(state, false);
        } else if self.tasks.contains(&tid) {
            let Some(orphans) = self.pending.remove(&tid) else {
                return;
            };
            if let Some(parent) = state.parent() {
                self.pending.entry(parent).or_default().extend(
                    orphans.into_iter().map(|task| PendingTask {
                        direct: false,
                        ..task
                    }),
                );
            }
        }
    }
}
