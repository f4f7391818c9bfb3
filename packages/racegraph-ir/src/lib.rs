/*
 * Racegraph IR - Static Data-Race Detection Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Raw program model (Module, Function, Instruction, Operand)
 * - features/    : Vertical slices (points_to → ir_model → trace → shared_memory → race_detection)
 * - config/      : Analysis configuration (presets, YAML, validation)
 *
 * Pipeline:
 * - Classify raw instructions into IR nodes (pthread, OpenMP, CUDA, libc)
 * - Build one trace per thread, depth-first from the entry function
 * - Keep objects accessed by more than one thread
 * - Report conflicting access pairs unordered by happens-before and unprotected by a common lock
 */

// Crate-level lint configuration
#![allow(clippy::type_complexity)] // Nested per-thread/per-event tables
#![allow(clippy::module_inception)] // Module naming intentional
#![allow(clippy::new_without_default)] // Default impl not always needed
#![allow(clippy::empty_line_after_doc_comments)] // Doc comment style

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models and utilities
pub mod shared;

/// Feature modules (vertical slices)
pub mod features;

/// Analysis configuration
pub mod config;

/// Crate-level error type
pub mod errors;

pub use config::{AnalysisConfig, Preset, RuntimeSelection};
pub use errors::{RaceGraphError, Result};
pub use features::points_to::{AbstractObject, PointsToProvider, StaticPointsTo};
pub use features::race_detection::{Race, RaceAccess, RaceAnalysis, RaceSeverity, RaceSummary};
pub use features::shared_memory::{ObjId, SharedMemory};
pub use features::trace::{Event, EventKind, EventRef, ProgramTrace, ThreadTrace};
pub use shared::models::{Module, ModuleBuilder};
