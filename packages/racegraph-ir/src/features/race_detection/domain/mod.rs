//! Race detection domain models
pub mod race;

pub use race::{Race, RaceAccess, RaceSeverity};
