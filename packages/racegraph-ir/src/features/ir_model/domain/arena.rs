//! Node arena
//!
//! All IR nodes of one analysis run live here and are referenced by
//! `NodeId`, so one call site can back many events (and a fork/join pair can
//! be derived from a single call) without shared ownership.

use super::node::IrNode;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

#[derive(Debug, Default, Clone)]
pub struct IrArena {
    nodes: Vec<IrNode>,
    /// fork node -> its companion join, created on demand
    companions: FxHashMap<NodeId, NodeId>,
}

impl IrArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, node: IrNode) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&IrNode> {
        self.nodes.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &IrNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeId(idx as u32), node))
    }

    /// Companion join of a fork node, allocated once per fork
    ///
    /// Panics if `fork` is not a Fork node.
    pub fn companion_join(&mut self, fork: NodeId) -> NodeId {
        if let Some(&join) = self.companions.get(&fork) {
            return join;
        }
        let node = match &self[fork] {
            IrNode::Fork(fork_ir) => IrNode::companion_join(fork, fork_ir),
            other => panic!("companion join requested for non-fork node {other}"),
        };
        let join = self.push(node);
        self.companions.insert(fork, join);
        join
    }
}

impl Index<NodeId> for IrArena {
    type Output = IrNode;

    fn index(&self, id: NodeId) -> &IrNode {
        &self.nodes[id.0 as usize]
    }
}
