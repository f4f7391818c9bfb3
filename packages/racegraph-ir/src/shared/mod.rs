//! Shared module - Common types and utilities
//!
//! This module contains the raw program model shared across all features.
//! It has no knowledge of concurrency APIs or of points-to analysis.

pub mod models;

// Re-exports for convenience
pub use models::*;
