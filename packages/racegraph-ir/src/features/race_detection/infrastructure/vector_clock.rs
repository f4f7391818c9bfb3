//! Vector Clock
//!
//! Dense clock indexed by `ThreadId`. Entry `t` is the number of events of
//! thread `t` known to have happened before (or at) the clock's point.
//!
//! ## Reference
//! - Lamport (1978), "Time, Clocks, and the Ordering of Events in a Distributed System"
//! - Mattern (1989), "Virtual Time and Global States of Distributed Systems"

use crate::features::trace::domain::ThreadId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VectorClock {
    clocks: Vec<u32>,
}

impl VectorClock {
    /// All-zero clock over `threads` threads
    pub fn new(threads: usize) -> Self {
        Self {
            clocks: vec![0; threads],
        }
    }

    /// Timestamp for a thread (0 when out of range)
    pub fn get(&self, tid: ThreadId) -> u32 {
        self.clocks.get(tid).copied().unwrap_or(0)
    }

    /// Raise a thread's entry to at least `time`
    pub fn advance(&mut self, tid: ThreadId, time: u32) {
        if tid >= self.clocks.len() {
            self.clocks.resize(tid + 1, 0);
        }
        self.clocks[tid] = self.clocks[tid].max(time);
    }

    pub fn increment(&mut self, tid: ThreadId) {
        let next = self.get(tid) + 1;
        self.advance(tid, next);
    }

    /// Pointwise max with another clock
    pub fn join(&mut self, other: &VectorClock) {
        if other.clocks.len() > self.clocks.len() {
            self.clocks.resize(other.clocks.len(), 0);
        }
        for (mine, &theirs) in self.clocks.iter_mut().zip(&other.clocks) {
            *mine = (*mine).max(theirs);
        }
    }

    /// self ≤ other pointwise
    pub fn happens_before(&self, other: &VectorClock) -> bool {
        self.clocks
            .iter()
            .enumerate()
            .all(|(tid, &time)| time <= other.get(tid))
    }

    /// concurrent(a, b) iff ¬(a ≤ b) ∧ ¬(b ≤ a)
    pub fn concurrent(&self, other: &VectorClock) -> bool {
        !self.happens_before(other) && !other.happens_before(self)
    }
}
