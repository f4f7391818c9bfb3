pub mod analyze_races;

pub use analyze_races::{RaceAnalysis, RaceSummary};
