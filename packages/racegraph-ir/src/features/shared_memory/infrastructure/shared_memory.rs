//! Per-object access index and sharing policy
//!
//! Sharing policy, first match wins:
//! 1. ≥2 writer threads or ≥2 freeing threads → shared
//! 2. one writer or one freeing thread, and ≥2 reader threads → shared
//! 3. one writer and one reader, different threads → shared
//! 4. one freeing thread and one reader, different threads → shared
//! 5. one freeing thread and one writer, different threads → shared
//! 6. otherwise → not shared

use crate::features::points_to::AbstractObject;
use crate::features::shared_memory::domain::ObjId;
use crate::features::trace::domain::{AccessType, EventKind, EventRef, ProgramTrace, ThreadId};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::info;

/// Accesses to one object, per thread, in program order
pub type ThreadAccesses = BTreeMap<ThreadId, Vec<EventRef>>;

static NO_ACCESSES: ThreadAccesses = BTreeMap::new();

#[derive(Debug, Default, Clone)]
pub struct SharedMemory {
    objects: Vec<AbstractObject>,
    ids: FxHashMap<AbstractObject, ObjId>,
    reads: FxHashMap<ObjId, ThreadAccesses>,
    writes: FxHashMap<ObjId, ThreadAccesses>,
    frees: FxHashMap<ObjId, ThreadAccesses>,
}

impl SharedMemory {
    /// Index all accesses of a program trace
    pub fn new(trace: &ProgramTrace<'_>) -> Self {
        let points_to = trace.points_to();
        let accesses = trace.events().flat_map(|event| {
            let node = trace.node(event);
            let objects = match event.kind {
                EventKind::Read | EventKind::Write => node
                    .accessed_value()
                    .map(|value| points_to.points_to(value))
                    .unwrap_or_default(),
                EventKind::Free => node
                    .freed_value()
                    .map(|value| points_to.freed_objects(value))
                    .unwrap_or_default(),
                _ => Vec::new(),
            };
            let access = event.access_type();
            let at = event.event_ref();
            objects
                .into_iter()
                .filter_map(move |object| access.map(|access| (object, access, at)))
        });
        let memory = Self::from_accesses(accesses);
        info!(
            objects = memory.object_count(),
            shared = memory.shared_objects().len(),
            "shared memory indexed"
        );
        memory
    }

    /// Index explicit `(object, access, event)` triples, in the given order
    pub fn from_accesses(accesses: impl IntoIterator<Item = (AbstractObject, AccessType, EventRef)>) -> Self {
        let mut memory = Self::default();
        for (object, access, at) in accesses {
            let id = memory.intern(object);
            let table = match access {
                AccessType::Read => &mut memory.reads,
                AccessType::Write => &mut memory.writes,
                AccessType::Free => &mut memory.frees,
            };
            table
                .entry(id)
                .or_default()
                .entry(at.tid)
                .or_default()
                .push(at);
        }
        memory
    }

    fn intern(&mut self, object: AbstractObject) -> ObjId {
        if let Some(&id) = self.ids.get(&object) {
            return id;
        }
        let id = ObjId(self.objects.len() as u32);
        self.objects.push(object);
        self.ids.insert(object, id);
        id
    }

    pub fn is_shared(&self, id: ObjId) -> bool {
        let (reads, writes, frees) = (
            self.threaded_reads(id),
            self.threaded_writes(id),
            self.threaded_frees(id),
        );
        let (r, w, f) = (reads.len(), writes.len(), frees.len());

        if w >= 2 || f >= 2 {
            return true;
        }
        if (w == 1 || f == 1) && r >= 2 {
            return true;
        }
        let apart = |a: &ThreadAccesses, b: &ThreadAccesses| a.keys().next() != b.keys().next();
        (w == 1 && r == 1 && apart(writes, reads))
            || (f == 1 && r == 1 && apart(frees, reads))
            || (f == 1 && w == 1 && apart(frees, writes))
    }

    /// Objects satisfying the sharing policy, in id order
    pub fn shared_objects(&self) -> Vec<ObjId> {
        (0..self.objects.len() as u32)
            .map(ObjId)
            .filter(|&id| self.is_shared(id))
            .collect()
    }

    pub fn threaded_reads(&self, id: ObjId) -> &ThreadAccesses {
        self.reads.get(&id).unwrap_or(&NO_ACCESSES)
    }

    pub fn threaded_writes(&self, id: ObjId) -> &ThreadAccesses {
        self.writes.get(&id).unwrap_or(&NO_ACCESSES)
    }

    pub fn threaded_frees(&self, id: ObjId) -> &ThreadAccesses {
        self.frees.get(&id).unwrap_or(&NO_ACCESSES)
    }

    pub fn num_threads_read(&self, id: ObjId) -> usize {
        self.threaded_reads(id).len()
    }

    pub fn num_threads_write(&self, id: ObjId) -> usize {
        self.threaded_writes(id).len()
    }

    pub fn num_threads_free(&self, id: ObjId) -> usize {
        self.threaded_frees(id).len()
    }

    pub fn object_id(&self, object: AbstractObject) -> Option<ObjId> {
        self.ids.get(&object).copied()
    }

    pub fn object(&self, id: ObjId) -> Option<AbstractObject> {
        self.objects.get(id.0 as usize).copied()
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }
}
