//! Abstract memory object
//!
//! Represents a points-to target (allocation site or memory location class).
//! The handle is opaque: it is minted and owned by the points-to provider and
//! only compared and hashed by the race analysis.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a points-to target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbstractObject(pub u64);

impl fmt::Display for AbstractObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}
