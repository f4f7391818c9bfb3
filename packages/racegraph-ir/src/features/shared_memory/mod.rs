//! # Shared Memory Analysis
//!
//! Indexes every read, write and free of the program trace by abstract
//! object and thread, then classifies objects as shared (race candidates) or
//! thread-local. Only shared objects reach the happens-before stage.

pub mod domain;
pub mod infrastructure;

pub use domain::ObjId;
pub use infrastructure::{SharedMemory, ThreadAccesses};
