//! Protocol error types

use thiserror::Error;

/// Protocol-specific errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Unknown operation type: {0}")]
    UnknownOperationType(u8),

    #[error("Unknown response type: {0}")]
    UnknownResponseType(u8),

    #[error("Core error: {0}")]
    Core(#[from] cmap_core::Error),
}

impl ProtocolError {
    /// True when the bytes themselves were ill-formed
    pub fn is_corrupt(&self) -> bool {
        matches!(self, ProtocolError::Core(cmap_core::Error::CorruptData(_)))
    }

    /// True when the caller's stream failed underneath the codec
    pub fn is_io(&self) -> bool {
        matches!(self, ProtocolError::Core(cmap_core::Error::Io(_)))
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        ProtocolError::Core(cmap_core::Error::Io(err))
    }
}

/// Result type for protocol operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;
