//! Runtime model plug-ins, one per concurrency API family
pub mod cuda;
pub mod openmp;
pub mod pthread;

pub use cuda::CudaRuntime;
pub use openmp::OpenMpRuntime;
pub use pthread::PthreadRuntime;
