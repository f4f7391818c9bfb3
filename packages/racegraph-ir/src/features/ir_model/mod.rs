//! # Instruction Model (IR)
//!
//! Typed, concurrency-aware view over raw instructions.
//!
//! - **Domain**: `IrNode` (closed sum over Read/Write/Free/Fork/Join/Lock/
//!   Unlock/Barrier/Call), `IrArena`, `NodeId`
//! - **Ports**: `InstructionClassifier`, `ClassifyContext`
//! - **Infrastructure**: per-API classifiers (pthread, OpenMP, CUDA, libc,
//!   ignored intrinsics) and the `ClassifierChain` that tries them in order

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use infrastructure::ClassifierChain;
pub use ports::{ClassifyContext, InstructionClassifier};
