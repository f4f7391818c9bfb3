pub mod application;
/// Race Detection Feature
///
/// Static data-race detection over a program trace.
///
/// ## Features
/// - **Happens-before**: fork/join/barrier DAG with vector clocks
/// - **Lock sets**: must-alias lock protection
/// - **Race detector**: conflicting, unordered, unprotected access pairs
///
/// ## Architecture
/// - **Domain**: `Race`, `RaceAccess`, `RaceSeverity`
/// - **Infrastructure**: `HappensBeforeGraph`, `LockSet`, `RaceDetector`
/// - **Application**: `RaceAnalysis` (trace → shared memory → races)
///
/// ## Academic References
/// - Lamport (1978), happens-before
/// - Savage et al. (1997), "Eraser: A Dynamic Data Race Detector for Multithreaded Programs"
pub mod domain;
pub mod infrastructure;

pub use application::*;
pub use domain::*;

#[doc(hidden)]
pub use infrastructure::*;
