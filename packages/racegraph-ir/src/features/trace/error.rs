//! Trace construction errors
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Entry function not found: {0}")]
    EntryNotFound(String),

    #[error("Entry function has no body: {0}")]
    EntryWithoutBody(String),
}

pub type Result<T> = std::result::Result<T, TraceError>;
