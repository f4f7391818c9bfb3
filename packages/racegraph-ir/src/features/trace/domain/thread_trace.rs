//! Per-thread event sequence

use super::event::{Event, EventId, EventRef, ThreadId};
use crate::features::ir_model::domain::NodeId;

/// Ordered events of one thread plus its place in the fork tree
///
/// Filled in by the trace builder and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ThreadTrace {
    pub(crate) id: ThreadId,
    pub(crate) entry: String,
    pub(crate) parent: Option<ThreadId>,
    pub(crate) spawn_site: Option<EventRef>,
    pub(crate) spawn_fork: Option<NodeId>,
    pub(crate) events: Vec<Event>,
    pub(crate) children: Vec<ThreadId>,
}

impl ThreadTrace {
    pub(crate) fn new(
        id: ThreadId,
        entry: String,
        spawn_site: Option<EventRef>,
        spawn_fork: Option<NodeId>,
    ) -> Self {
        Self {
            id,
            entry,
            parent: spawn_site.map(|site| site.tid),
            spawn_site,
            spawn_fork,
            events: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ThreadId {
        self.id
    }

    /// Routine the thread starts in
    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn parent(&self) -> Option<ThreadId> {
        self.parent
    }

    /// Fork event in the parent that created this thread (`None` for main)
    pub fn spawn_site(&self) -> Option<EventRef> {
        self.spawn_site
    }

    /// Fork node behind the spawn site
    pub fn spawn_fork(&self) -> Option<NodeId> {
        self.spawn_fork
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn event(&self, eid: EventId) -> Option<&Event> {
        self.events.get(eid)
    }

    /// Directly spawned threads, in fork order
    pub fn children(&self) -> &[ThreadId] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
