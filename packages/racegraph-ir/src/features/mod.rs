//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/     - Pure business logic (no external dependencies)
//! - ports/      - Interface definitions (traits)
//! - application/ - Use cases
//! - infrastructure/ - External dependency implementations
//!
//! Leaves first: points_to → ir_model → trace → shared_memory → race_detection

pub mod points_to;

// Closed IR node model + per-API instruction classifiers
pub mod ir_model;

// Thread traces, runtime models
pub mod trace;

pub mod shared_memory;

// Happens-before / lock-set race detection
pub mod race_detection;
