//! Per-API instruction classifiers
pub mod chain;
pub mod cuda;
pub mod intrinsic;
pub mod libc;
pub mod openmp;
pub mod pthread;

pub use chain::ClassifierChain;
pub use cuda::CudaClassifier;
pub use intrinsic::IntrinsicClassifier;
pub use libc::LibcClassifier;
pub use openmp::OpenMpClassifier;
pub use pthread::PthreadClassifier;
