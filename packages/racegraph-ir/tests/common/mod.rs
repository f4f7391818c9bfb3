//! Common test utilities for racegraph-ir
//!
//! This module provides shared program builders and assertions
//! for integration tests.

#![allow(dead_code)]

mod assertions;
mod builders;

// Re-export all utilities
pub use assertions::*;
pub use builders::*;
