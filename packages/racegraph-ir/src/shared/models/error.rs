//! Program model loading errors

use super::ids::InstId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON module or points-to table
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Duplicate function '{0}' in module")]
    DuplicateFunction(String),

    #[error("Duplicate instruction id {0} in module")]
    DuplicateInstruction(InstId),
}

pub type Result<T> = std::result::Result<T, ModelError>;
