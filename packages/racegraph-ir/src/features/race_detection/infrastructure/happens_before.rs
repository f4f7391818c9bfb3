//! Happens-Before Graph
//!
//! Lamport's happens-before relation over a whole program trace, as a DAG.
//!
//! ## Nodes
//! - one per event, plus a virtual start and end node per thread
//! - one sync node per barrier round of each barrier group
//!
//! ## Edges
//! 1. **Program order**: start → e0 → e1 → … → end
//! 2. **Fork**: fork event → child start
//! 3. **Join**: child end → join event
//! 4. **Barrier**: the k-th barrier of every group member → sync node →
//!    the event after each member's k-th barrier
//!
//! A barrier group is the set of threads spawned with the same team tag (one
//! OpenMP team, one CUDA block) by one execution of a fork instruction, i.e.
//! one run of consecutive fork events from that instruction in the parent.
//!
//! Program order and fork edges never form a cycle. A join edge or a barrier
//! group that would close one is left out on its own (with a `warn`); the
//! rest of the graph keeps its edges.
//!
//! Vector clocks are computed once over a topological order, so queries are
//! O(1). Event `e` of thread `t` advances entry `t` to `e + 1`; then
//! `a → b` iff `clock(b)[a.tid] > a.eid`.

use super::vector_clock::VectorClock;
use crate::features::trace::domain::{EventKind, EventRef, ProgramTrace, ThreadId};
use crate::shared::models::InstId;
use petgraph::algo::{has_path_connecting, is_cyclic_directed, toposort, DfsSpace};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HbNode {
    Start(ThreadId),
    End(ThreadId),
    Event(EventRef),
    /// Barrier round `round` of barrier group `group`
    Sync { group: usize, round: usize },
}

pub struct HappensBeforeGraph {
    graph: DiGraph<HbNode, ()>,
    starts: Vec<NodeIndex>,
    ends: Vec<NodeIndex>,
    events: Vec<Vec<NodeIndex>>,
    clocks: Vec<VectorClock>,
    groups: Vec<Vec<ThreadId>>,
    dropped_groups: Vec<usize>,
    dropped_joins: Vec<EventRef>,
}

impl std::fmt::Debug for HappensBeforeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HappensBeforeGraph")
            .field("nodes", &self.graph.node_count())
            .field("edges", &self.graph.edge_count())
            .field("barrier_groups", &self.groups.len())
            .field("dropped_groups", &self.dropped_groups)
            .field("dropped_joins", &self.dropped_joins)
            .finish()
    }
}

impl HappensBeforeGraph {
    pub fn new(trace: &ProgramTrace<'_>) -> Self {
        let mut hb = Self::layout(trace);
        hb.add_join_edges(trace);
        hb.add_barrier_edges(trace);

        let order = match toposort(&hb.graph, None) {
            Ok(order) => order,
            Err(cycle) => unreachable!(
                "cycle through {:?} left after join and barrier checks",
                hb.graph[cycle.node_id()]
            ),
        };
        hb.compute_clocks(&order, trace.thread_count());
        debug!(
            nodes = hb.graph.node_count(),
            edges = hb.graph.edge_count(),
            barrier_groups = hb.groups.len(),
            dropped_groups = hb.dropped_groups.len(),
            dropped_joins = hb.dropped_joins.len(),
            "happens-before graph built"
        );
        hb
    }

    /// Thread nodes, program order and fork edges
    fn layout(trace: &ProgramTrace<'_>) -> Self {
        let mut graph = DiGraph::new();
        let mut starts = Vec::with_capacity(trace.thread_count());
        let mut ends = Vec::with_capacity(trace.thread_count());
        let mut events = Vec::with_capacity(trace.thread_count());

        for thread in trace.threads() {
            let start = graph.add_node(HbNode::Start(thread.id()));
            let nodes: Vec<NodeIndex> = thread
                .events()
                .iter()
                .map(|event| graph.add_node(HbNode::Event(event.event_ref())))
                .collect();
            let end = graph.add_node(HbNode::End(thread.id()));

            let mut prev = start;
            for &node in nodes.iter().chain(std::iter::once(&end)) {
                graph.add_edge(prev, node, ());
                prev = node;
            }
            starts.push(start);
            ends.push(end);
            events.push(nodes);
        }

        for event in trace.events() {
            if let EventKind::Fork { child } = event.kind {
                graph.add_edge(events[event.tid][event.eid], starts[child], ());
            }
        }

        Self {
            graph,
            starts,
            ends,
            events,
            clocks: Vec::new(),
            groups: barrier_groups(trace),
            dropped_groups: Vec::new(),
            dropped_joins: Vec::new(),
        }
    }

    fn add_join_edges(&mut self, trace: &ProgramTrace<'_>) {
        let mut space = DfsSpace::new(&self.graph);
        for event in trace.events() {
            let EventKind::Join { child: Some(child) } = event.kind else {
                continue;
            };
            let (from, to) = (self.ends[child], self.events[event.tid][event.eid]);
            if has_path_connecting(&self.graph, to, from, Some(&mut space)) {
                warn!(join = %event.event_ref(), child, "join edge would close a cycle, dropped");
                self.dropped_joins.push(event.event_ref());
                continue;
            }
            self.graph.add_edge(from, to, ());
        }
    }

    fn add_barrier_edges(&mut self, trace: &ProgramTrace<'_>) {
        for group in 0..self.groups.len() {
            let barriers = barrier_positions(trace, &self.groups[group]);
            let rounds = barriers.iter().map(|(_, b)| b.len()).max().unwrap_or(0);
            if barriers.iter().any(|(_, b)| b.len() != rounds) {
                warn!(group, members = ?self.groups[group], "barrier counts differ within team");
            }

            let mut syncs = Vec::with_capacity(rounds);
            for round in 0..rounds {
                let sync = self.graph.add_node(HbNode::Sync { group, round });
                syncs.push(sync);
                for (tid, positions) in &barriers {
                    let Some(&eid) = positions.get(round) else {
                        continue;
                    };
                    let next = self.events[*tid]
                        .get(eid + 1)
                        .copied()
                        .unwrap_or(self.ends[*tid]);
                    self.graph.add_edge(self.events[*tid][eid], sync, ());
                    self.graph.add_edge(sync, next, ());
                }
            }

            if is_cyclic_directed(&self.graph) {
                warn!(group, members = ?self.groups[group], "barrier group would close a cycle, dropped");
                // Sync nodes are the newest nodes; removing newest first keeps every other index.
                for sync in syncs.into_iter().rev() {
                    self.graph.remove_node(sync);
                }
                self.dropped_groups.push(group);
            }
        }
    }

    fn compute_clocks(&mut self, order: &[NodeIndex], threads: usize) {
        self.clocks = vec![VectorClock::default(); self.graph.node_count()];
        for &node in order {
            let mut clock = VectorClock::new(threads);
            for pred in self.graph.neighbors_directed(node, Direction::Incoming) {
                clock.join(&self.clocks[pred.index()]);
            }
            if let HbNode::Event(at) = self.graph[node] {
                clock.advance(at.tid, at.eid as u32 + 1);
            }
            self.clocks[node.index()] = clock;
        }
    }

    fn index(&self, at: EventRef) -> Option<NodeIndex> {
        self.events.get(at.tid)?.get(at.eid).copied()
    }

    /// Clock at an event; `None` for unknown events
    pub fn clock(&self, at: EventRef) -> Option<&VectorClock> {
        self.index(at).map(|node| &self.clocks[node.index()])
    }

    /// Clock at a thread's virtual end node
    pub fn end_clock(&self, tid: ThreadId) -> Option<&VectorClock> {
        self.ends.get(tid).map(|node| &self.clocks[node.index()])
    }

    /// a → b (strict)
    pub fn happens_before(&self, a: EventRef, b: EventRef) -> bool {
        if self.index(a).is_none() {
            return false;
        }
        if a.tid == b.tid {
            return a.eid < b.eid && self.index(b).is_some();
        }
        self.clock(b)
            .is_some_and(|clock| clock.get(a.tid) > a.eid as u32)
    }

    pub fn are_concurrent(&self, a: EventRef, b: EventRef) -> bool {
        a != b && !self.happens_before(a, b) && !self.happens_before(b, a)
    }

    /// Barrier groups, each listing member threads in id order
    pub fn barrier_groups(&self) -> &[Vec<ThreadId>] {
        &self.groups
    }

    /// Indexes into `barrier_groups()` of groups left without barrier edges
    pub fn dropped_barrier_groups(&self) -> &[usize] {
        &self.dropped_groups
    }

    /// Join events left without their child end edge
    pub fn dropped_joins(&self) -> &[EventRef] {
        &self.dropped_joins
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

/// Barrier events of each member, by event id
fn barrier_positions(trace: &ProgramTrace<'_>, members: &[ThreadId]) -> Vec<(ThreadId, Vec<usize>)> {
    members
        .iter()
        .map(|&tid| {
            let positions = trace.threads()[tid]
                .events()
                .iter()
                .filter(|event| event.kind == EventKind::Barrier)
                .map(|event| event.eid)
                .collect();
            (tid, positions)
        })
        .collect()
}

/// Threads grouped by (parent, first fork event of the launch, team tag),
/// groups in order of their first member
fn barrier_groups(trace: &ProgramTrace<'_>) -> Vec<Vec<ThreadId>> {
    let mut index: FxHashMap<(ThreadId, usize, u32), usize> = FxHashMap::default();
    let mut groups: Vec<Vec<ThreadId>> = Vec::new();

    for parent in trace.threads() {
        // (fork instruction, first fork event) of the run being scanned
        let mut launch: Option<(InstId, usize)> = None;
        for event in parent.events() {
            let EventKind::Fork { child } = event.kind else {
                launch = None;
                continue;
            };
            let inst = trace.node(event).inst();
            let first = match launch {
                Some((previous, first)) if previous == inst => first,
                _ => event.eid,
            };
            launch = Some((inst, first));

            let Some(team) = trace.spawn_fork(child).and_then(|fork| fork.team()) else {
                continue;
            };
            let slot = *index.entry((parent.id(), first, team)).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[slot].push(child);
        }
    }
    groups.retain(|members| members.len() > 1);
    groups.sort_by_key(|members| members[0]);
    groups
}
