//! Events: one IR node occurring in one thread

use crate::features::ir_model::domain::NodeId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense thread index; 0 is the main thread
pub type ThreadId = usize;

/// Position of an event within its thread
pub type EventId = usize;

/// Global address of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventRef {
    pub tid: ThreadId,
    pub eid: EventId,
}

impl EventRef {
    pub fn new(tid: ThreadId, eid: EventId) -> Self {
        Self { tid, eid }
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "t{}:e{}", self.tid, self.eid)
    }
}

/// Event category plus the data resolved while tracing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    Read,
    Write,
    Free,
    Fork { child: ThreadId },
    /// `None` when the joined thread could not be resolved
    Join { child: Option<ThreadId> },
    Lock,
    Unlock,
    Barrier,
    Call,
    Return,
}

impl EventKind {
    pub fn access_type(&self) -> Option<AccessType> {
        match self {
            EventKind::Read => Some(AccessType::Read),
            EventKind::Write => Some(AccessType::Write),
            EventKind::Free => Some(AccessType::Free),
            _ => None,
        }
    }

    /// Fork, join and barrier events shape the happens-before order
    pub fn is_sync(&self) -> bool {
        matches!(
            self,
            EventKind::Fork { .. } | EventKind::Join { .. } | EventKind::Barrier
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub tid: ThreadId,
    pub eid: EventId,
    pub node: NodeId,
    pub kind: EventKind,
}

impl Event {
    pub fn event_ref(&self) -> EventRef {
        EventRef::new(self.tid, self.eid)
    }

    pub fn access_type(&self) -> Option<AccessType> {
        self.kind.access_type()
    }
}

/// Memory access flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessType {
    Read,
    Write,
    Free,
}

impl AccessType {
    /// Writes and frees conflict with every other access
    pub fn is_write(&self) -> bool {
        matches!(self, AccessType::Write | AccessType::Free)
    }

    pub fn conflicts_with(&self, other: AccessType) -> bool {
        self.is_write() || other.is_write()
    }
}

impl fmt::Display for AccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessType::Read => write!(f, "read"),
            AccessType::Write => write!(f, "write"),
            AccessType::Free => write!(f, "free"),
        }
    }
}
