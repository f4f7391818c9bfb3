//! Error types for racegraph-ir
//!
//! Provides unified error handling across the crate.

use crate::config::ConfigError;
use crate::features::trace::TraceError;
use crate::shared::models::ModelError;
use thiserror::Error;

/// Main error type for racegraph-ir operations
#[derive(Debug, Error)]
pub enum RaceGraphError {
    /// Trace construction error
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Program model loading error
    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

/// Result type alias for racegraph operations
pub type Result<T> = std::result::Result<T, RaceGraphError>;
