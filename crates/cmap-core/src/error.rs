//! Error types for cmap core

use thiserror::Error;

/// Core error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    #[error("Corrupt data: {0}")]
    CorruptData(String),

    #[error("Payload too large: {size} > {max}")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Map a read failure: a short read means the payload was truncated,
    /// anything else is the caller's stream failing and passes through.
    pub(crate) fn from_read(err: std::io::Error, what: &str) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            Error::CorruptData(format!("truncated {}", what))
        } else {
            Error::Io(err)
        }
    }
}

/// Result type alias for cmap core operations
pub type Result<T> = std::result::Result<T, Error>;
