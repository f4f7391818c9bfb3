//! # Trace Construction
//!
//! Reconstructs, from a module's instruction stream, the forest of thread
//! traces a run of the program could produce.
//!
//! - **Domain**: `Event`, `ThreadTrace`, `ProgramTrace`
//! - **Ports**: `RuntimeModel` (one per concurrency API family)
//! - **Infrastructure**: `TraceBuilder`, per-thread `ThreadBuildState`,
//!   pthread/OpenMP/CUDA runtime models
//!
//! ## Usage
//! ```
//! use racegraph_ir::config::AnalysisConfig;
//! use racegraph_ir::features::points_to::StaticPointsTo;
//! use racegraph_ir::features::trace::ProgramTrace;
//! use racegraph_ir::shared::models::{ModuleBuilder, Operand};
//!
//! let mut mb = ModuleBuilder::new("fork.c");
//! let (handle, x) = (mb.value(), mb.value());
//! mb.function("worker", |f| {
//!     f.store(x);
//! });
//! mb.function("main", |f| {
//!     f.call("pthread_create", vec![handle.into(), Operand::Null, Operand::function("worker"), Operand::Null]);
//!     f.call("pthread_join", vec![handle.into(), Operand::Null]);
//! });
//! let module = mb.build();
//! let pts = StaticPointsTo::new();
//!
//! let trace = ProgramTrace::build(&module, &pts, &AnalysisConfig::default()).unwrap();
//! assert_eq!(trace.thread_count(), 2);
//! assert_eq!(trace.main().children(), &[1]);
//! ```

pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use domain::*;
pub use error::{Result, TraceError};
pub use infrastructure::{ThreadBuildState, TraceBuilder};
pub use ports::RuntimeModel;
