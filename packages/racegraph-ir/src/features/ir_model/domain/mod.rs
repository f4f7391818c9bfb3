//! IR model domain
pub mod arena;
pub mod node;

pub use arena::{IrArena, NodeId};
pub use node::*;
