//! Lock sets
//!
//! For every event, the lock nodes its thread holds when the event happens.
//! An unlock releases the most recently acquired held lock whose value
//! must-alias the unlocked one; unmatched unlocks are ignored.

use crate::features::ir_model::domain::NodeId;
use crate::features::trace::domain::{EventKind, EventRef, ProgramTrace};
use std::sync::Arc;
use tracing::debug;

pub struct LockSet<'t, 'a> {
    trace: &'t ProgramTrace<'a>,
    /// thread -> event -> locks held (shared between events while unchanged)
    held: Vec<Vec<Arc<[NodeId]>>>,
}

impl<'t, 'a> LockSet<'t, 'a> {
    pub fn new(trace: &'t ProgramTrace<'a>) -> Self {
        let points_to = trace.points_to();
        let mut held = Vec::with_capacity(trace.thread_count());

        for thread in trace.threads() {
            let mut current: Vec<NodeId> = Vec::new();
            let mut snapshot: Arc<[NodeId]> = Arc::from(Vec::new());
            let mut per_event = Vec::with_capacity(thread.len());

            for event in thread.events() {
                match event.kind {
                    EventKind::Lock => {
                        current.push(event.node);
                        snapshot = Arc::from(current.as_slice());
                    }
                    EventKind::Unlock => {
                        let released = trace.node(event).lock_value();
                        let position = current.iter().rposition(|&lock| {
                            match (trace.arena()[lock].lock_value(), released) {
                                (Some(a), Some(b)) => points_to.operands_must_alias(a, b),
                                _ => false,
                            }
                        });
                        match position {
                            Some(idx) => {
                                current.remove(idx);
                                snapshot = Arc::from(current.as_slice());
                            }
                            None => debug!(at = %event.event_ref(), "unlock without a matching held lock"),
                        }
                    }
                    _ => {}
                }
                per_event.push(Arc::clone(&snapshot));
            }
            held.push(per_event);
        }

        Self { trace, held }
    }

    /// Lock nodes held at an event, outermost first
    pub fn held(&self, at: EventRef) -> &[NodeId] {
        self.held
            .get(at.tid)
            .and_then(|thread| thread.get(at.eid))
            .map(|locks| &locks[..])
            .unwrap_or(&[])
    }

    /// Some lock held at `a` must-alias some lock held at `b`
    pub fn shares_lock(&self, a: EventRef, b: EventRef) -> bool {
        let (held_a, held_b) = (self.held(a), self.held(b));
        if held_a.is_empty() || held_b.is_empty() {
            return false;
        }
        let arena = self.trace.arena();
        let points_to = self.trace.points_to();
        held_a.iter().any(|&la| {
            held_b.iter().any(|&lb| {
                match (arena[la].lock_value(), arena[lb].lock_value()) {
                    (Some(x), Some(y)) => points_to.operands_must_alias(x, y),
                    _ => false,
                }
            })
        })
    }
}
