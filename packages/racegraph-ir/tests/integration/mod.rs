//! Integration tests for racegraph-ir
//!
//! Whole-pipeline checks: module → trace → shared memory → races.

#[path = "../common/mod.rs"]
mod common;

mod cuda;
mod loading;
mod properties;
mod scenarios;
