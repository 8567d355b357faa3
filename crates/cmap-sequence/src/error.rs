//! Sequence error types

use thiserror::Error;

/// Errors raised while building counters or parsing sequences
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("Invalid range [{min}, {max}]: {reason}")]
    InvalidRange {
        min: i64,
        max: i64,
        reason: &'static str,
    },

    #[error("Invalid sequence encoding: {0}")]
    InvalidEncoding(String),
}

/// Result type for sequence operations
pub type SequenceResult<T> = Result<T, SequenceError>;
