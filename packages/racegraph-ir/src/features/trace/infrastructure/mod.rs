//! Trace construction
pub mod build_state;
pub mod builder;
pub mod context;
pub mod runtime;

pub use build_state::ThreadBuildState;
pub use builder::TraceBuilder;
pub use context::{BuildContext, FunctionSummary};
pub use runtime::{CudaRuntime, OpenMpRuntime, PthreadRuntime};
