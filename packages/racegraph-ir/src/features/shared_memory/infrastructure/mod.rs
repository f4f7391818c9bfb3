//! Shared memory index
pub mod shared_memory;

pub use shared_memory::{SharedMemory, ThreadAccesses};
