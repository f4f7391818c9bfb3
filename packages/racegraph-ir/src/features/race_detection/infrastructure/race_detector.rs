//! Race Detector
//!
//! A race exists between accesses a and b to one shared object iff:
//! - a and b run in different threads
//! - at least one of them writes or frees
//! - ¬(a → b) ∧ ¬(b → a)
//! - no lock held at a must-alias a lock held at b
//!
//! Races are deduplicated by unordered instruction pair, keeping the first
//! in (object, first event, second event) order.

use super::happens_before::HappensBeforeGraph;
use super::lock_set::LockSet;
use crate::features::race_detection::domain::{Race, RaceAccess};
use crate::features::shared_memory::{ObjId, SharedMemory};
use crate::features::trace::domain::{AccessType, EventRef, ProgramTrace};
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

pub struct RaceDetector<'r, 't, 'a> {
    trace: &'t ProgramTrace<'a>,
    shared: &'r SharedMemory,
    hb: &'r HappensBeforeGraph,
    locks: &'r LockSet<'t, 'a>,
    parallel: bool,
}

impl<'r, 't, 'a> RaceDetector<'r, 't, 'a> {
    pub fn new(
        trace: &'t ProgramTrace<'a>,
        shared: &'r SharedMemory,
        hb: &'r HappensBeforeGraph,
        locks: &'r LockSet<'t, 'a>,
    ) -> Self {
        Self {
            trace,
            shared,
            hb,
            locks,
            parallel: false,
        }
    }

    /// Check objects on the rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn detect(&self) -> Vec<Race> {
        let objects = self.shared.shared_objects();
        let per_object: Vec<Vec<Race>> = if self.parallel {
            objects.par_iter().map(|&id| self.races_on(id)).collect()
        } else {
            objects.iter().map(|&id| self.races_on(id)).collect()
        };

        let mut races: Vec<Race> = per_object.into_iter().flatten().collect();
        races.sort_by(|a, b| {
            (a.object, a.first.event, a.second.event).cmp(&(b.object, b.first.event, b.second.event))
        });
        let found = races.len();
        let mut seen = FxHashSet::default();
        races.retain(|race| seen.insert(race.inst_pair()));

        info!(
            shared_objects = objects.len(),
            races = races.len(),
            duplicates = found - races.len(),
            "race detection finished"
        );
        races
    }

    /// Races on a single shared object
    pub fn races_on(&self, id: ObjId) -> Vec<Race> {
        let Some(object) = self.shared.object(id) else {
            return Vec::new();
        };
        let accesses = self.accesses(id);
        let mut races = Vec::new();

        for (i, &(a, access_a)) in accesses.iter().enumerate() {
            for &(b, access_b) in &accesses[i + 1..] {
                if a.tid == b.tid || !access_a.conflicts_with(access_b) {
                    continue;
                }
                if !self.hb.are_concurrent(a, b) || self.locks.shares_lock(a, b) {
                    continue;
                }
                races.push(Race::new(
                    id,
                    object,
                    self.race_access(a, access_a),
                    self.race_access(b, access_b),
                ));
            }
        }
        debug!(object = %id, accesses = accesses.len(), races = races.len(), "object checked");
        races
    }

    fn accesses(&self, id: ObjId) -> Vec<(EventRef, AccessType)> {
        let tables = [
            (self.shared.threaded_reads(id), AccessType::Read),
            (self.shared.threaded_writes(id), AccessType::Write),
            (self.shared.threaded_frees(id), AccessType::Free),
        ];
        let mut accesses: Vec<(EventRef, AccessType)> = tables
            .iter()
            .flat_map(|(table, access)| {
                table
                    .values()
                    .flatten()
                    .map(move |&at| (at, *access))
            })
            .collect();
        accesses.sort();
        accesses
    }

    fn race_access(&self, at: EventRef, access: AccessType) -> RaceAccess {
        let (inst, location) = match self.trace.event(at) {
            Some(event) => {
                let node = self.trace.node(event);
                (node.inst(), node.location().cloned())
            }
            None => unreachable!("shared memory only indexes trace events, {at} is unknown"),
        };
        RaceAccess {
            event: at,
            access,
            inst,
            location,
        }
    }
}
