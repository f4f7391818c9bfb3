//! Analysis configuration
//!
//! Two ways in:
//! - Preset + builder setters
//! - Versioned YAML (`version: 1`), optionally naming a base preset
//!
//! # Examples
//!
//! ```
//! use racegraph_ir::config::{AnalysisConfig, Preset, RuntimeSelection};
//!
//! let config = AnalysisConfig::preset(Preset::Fast)
//!     .with_runtime(RuntimeSelection::OpenMp)
//!     .with_team_size(4);
//! assert!(config.validate().is_ok());
//!
//! let config = AnalysisConfig::from_yaml_str("version: 1\npreset: thorough\n").unwrap();
//! assert!(!config.dedup_calls);
//! ```

pub mod analysis_config;
pub mod error;
pub mod preset;

// Re-exports
pub use analysis_config::{AnalysisConfig, CudaConfig, OpenMpConfig, RuntimeSelection};
pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
