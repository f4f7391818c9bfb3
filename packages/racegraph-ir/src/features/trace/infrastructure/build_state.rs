//! Mutable per-thread build state
//!
//! Everything the builder tracks while walking one thread: the events so
//! far, the stack of function summaries being walked, the forks this thread
//! made, the call memo and the rolling sync-context hashes. Runtime models
//! receive it in their hooks and act through the methods below.

use super::context::{BuildContext, FunctionSummary};
use crate::features::ir_model::domain::{CallApi, ForkIr, IrArena, IrNode, NodeId};
use crate::features::points_to::PointsToProvider;
use crate::features::trace::domain::{Event, EventKind, ThreadId};
use crate::shared::models::{InstId, Operand};
use rustc_hash::{FxHashSet, FxHasher};
use std::hash::{Hash, Hasher};

/// Function summary being walked and the index of the next node
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) function: String,
    pub(crate) nodes: FunctionSummary,
    pub(crate) pos: usize,
}

/// Child spawned by this thread
#[derive(Debug, Clone)]
pub(crate) struct ForkRecord {
    pub(crate) node: NodeId,
    pub(crate) child: ThreadId,
    pub(crate) handle: Operand,
    pub(crate) joined: bool,
}

pub struct ThreadBuildState<'c, 'a> {
    pub(crate) ctx: &'c mut BuildContext<'a>,
    pub(crate) tid: ThreadId,
    /// Entries of this thread and all its spawning ancestors
    pub(crate) ancestry: Vec<String>,
    pub(crate) events: Vec<Event>,
    pub(crate) frames: Vec<Frame>,
    pub(crate) skip_until: Option<InstId>,
    pub(crate) forks: Vec<ForkRecord>,
    /// Fork nodes visited without spawning (unresolved, recursive, over the cap)
    pub(crate) skipped_forks: FxHashSet<NodeId>,
    pub(crate) memo: FxHashSet<u64>,
    sync_hash: u64,
    lock_hash: u64,
}

fn roll(previous: u64, kind: &EventKind, eid: usize) -> u64 {
    let mut hasher = FxHasher::default();
    previous.hash(&mut hasher);
    kind.hash(&mut hasher);
    eid.hash(&mut hasher);
    hasher.finish()
}

impl<'c, 'a> ThreadBuildState<'c, 'a> {
    pub(crate) fn new(ctx: &'c mut BuildContext<'a>, tid: ThreadId, ancestry: Vec<String>) -> Self {
        Self {
            ctx,
            tid,
            ancestry,
            events: Vec::new(),
            frames: Vec::new(),
            skip_until: None,
            forks: Vec::new(),
            skipped_forks: FxHashSet::default(),
            memo: FxHashSet::default(),
            sync_hash: 0,
            lock_hash: 0,
        }
    }

    pub fn tid(&self) -> ThreadId {
        self.tid
    }

    pub fn parent(&self) -> Option<ThreadId> {
        self.ctx.threads[self.tid].parent()
    }

    /// Fork node that spawned this thread (`None` for main)
    pub fn spawn_fork(&self) -> Option<&ForkIr> {
        let node = self.ctx.threads[self.tid].spawn_fork()?;
        self.ctx.arena[node].as_fork()
    }

    pub fn node(&self, id: NodeId) -> &IrNode {
        &self.ctx.arena[id]
    }

    pub fn arena(&self) -> &IrArena {
        &self.ctx.arena
    }

    pub fn points_to(&self) -> &dyn PointsToProvider {
        self.ctx.points_to
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Name of the function currently being walked
    pub fn current_function(&self) -> Option<&str> {
        self.frames.last().map(|frame| frame.function.as_str())
    }

    /// Nodes of the current summary after the one being visited
    pub fn remaining(&self) -> &[NodeId] {
        match self.frames.last() {
            Some(frame) => &frame.nodes[frame.pos..],
            None => &[],
        }
    }

    /// Skip every node until one stemming from `inst` is reached
    pub fn skip_until(&mut self, inst: InstId) {
        self.skip_until = Some(inst);
    }

    /// Instruction closing the region opened by the node being visited
    ///
    /// Scans the rest of the current summary; nested regions of the same
    /// kind are skipped over.
    pub fn find_region_end(&self, open: CallApi, close: CallApi) -> Option<InstId> {
        let mut depth = 0usize;
        for &id in self.remaining() {
            let Some(call) = self.ctx.arena[id].as_call() else {
                continue;
            };
            if call.api == open {
                depth += 1;
            } else if call.api == close {
                if depth == 0 {
                    return Some(call.site.inst);
                }
                depth -= 1;
            }
        }
        None
    }

    /// Append an event for `node`
    pub fn record(&mut self, node: NodeId, kind: EventKind) -> Event {
        let event = Event {
            tid: self.tid,
            eid: self.events.len(),
            node,
            kind,
        };
        match kind {
            EventKind::Fork { .. } | EventKind::Join { .. } | EventKind::Barrier => {
                self.sync_hash = roll(self.sync_hash, &kind, event.eid);
            }
            EventKind::Lock | EventKind::Unlock => {
                self.lock_hash = roll(self.lock_hash, &kind, event.eid);
            }
            _ => {}
        }
        self.events.push(event);
        event
    }

    /// Join `child`, spawned from `fork`, through the fork's companion join node
    pub fn join_child(&mut self, fork: NodeId, child: ThreadId) -> Event {
        let join = self.ctx.arena.companion_join(fork);
        if let Some(record) = self
            .forks
            .iter_mut()
            .find(|record| record.node == fork && record.child == child)
        {
            record.joined = true;
        }
        self.record(join, EventKind::Join { child: Some(child) })
    }

    /// Memo key of a call in the current fork/join and lock context
    pub(crate) fn call_key(&self, callee: &str, args: &[Operand]) -> u64 {
        let mut hasher = FxHasher::default();
        callee.hash(&mut hasher);
        args.hash(&mut hasher);
        self.sync_hash.hash(&mut hasher);
        self.lock_hash.hash(&mut hasher);
        hasher.finish()
    }
}
