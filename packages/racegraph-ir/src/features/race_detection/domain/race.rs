/// Race domain model
use crate::features::points_to::AbstractObject;
use crate::features::shared_memory::ObjId;
use crate::features::trace::domain::{AccessType, EventRef};
use crate::shared::models::{InstId, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Race severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RaceSeverity {
    /// Write-Read race
    Medium,
    /// Write-Write race
    High,
    /// A free racing with any other access (use-after-free, double free)
    Critical,
}

impl RaceSeverity {
    /// Determine severity from two access types
    pub fn from_accesses(a: AccessType, b: AccessType) -> Self {
        match (a, b) {
            (AccessType::Free, _) | (_, AccessType::Free) => RaceSeverity::Critical,
            (AccessType::Write, AccessType::Write) => RaceSeverity::High,
            _ => RaceSeverity::Medium,
        }
    }
}

/// One side of a race
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RaceAccess {
    pub event: EventRef,
    pub access: AccessType,
    pub inst: InstId,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for RaceAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ", self.access)?;
        match &self.location {
            Some(location) => write!(f, "{location}")?,
            None => write!(f, "{}", self.inst)?,
        }
        write!(f, " ({})", self.event)
    }
}

/// Two unordered conflicting accesses to one shared object
///
/// `first.event < second.event` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Race {
    pub object: ObjId,
    pub abstract_object: AbstractObject,
    pub first: RaceAccess,
    pub second: RaceAccess,
    pub severity: RaceSeverity,
}

impl Race {
    /// Build a race, ordering the accesses by event
    pub fn new(object: ObjId, abstract_object: AbstractObject, a: RaceAccess, b: RaceAccess) -> Self {
        let (first, second) = if a.event <= b.event { (a, b) } else { (b, a) };
        let severity = RaceSeverity::from_accesses(first.access, second.access);
        Self {
            object,
            abstract_object,
            first,
            second,
            severity,
        }
    }

    /// Unordered instruction pair, the deduplication key
    pub fn inst_pair(&self) -> (InstId, InstId) {
        let (a, b) = (self.first.inst, self.second.inst);
        if a <= b { (a, b) } else { (b, a) }
    }

    pub fn is_write_write(&self) -> bool {
        self.first.access == AccessType::Write && self.second.access == AccessType::Write
    }

    pub fn involves_free(&self) -> bool {
        self.first.access == AccessType::Free || self.second.access == AccessType::Free
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} race on {}: {} / {}",
            self.severity, self.abstract_object, self.first, self.second
        )
    }
}
