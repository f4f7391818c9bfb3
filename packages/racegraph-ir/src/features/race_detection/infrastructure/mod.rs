pub mod happens_before;
pub mod lock_set;
pub mod race_detector;
pub mod vector_clock;


pub use happens_before::{HappensBeforeGraph, HbNode};
pub use lock_set::LockSet;
pub use race_detector::RaceDetector;
pub use vector_clock::VectorClock;
