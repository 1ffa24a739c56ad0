//! Error types for the codec crate.

use crate::container::ContainerMode;

/// Errors that can occur while encoding, decoding, or comparing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The container's mode forbids the attempted operation.
    #[error("operation not allowed: cannot {operation} a {mode} container")]
    ModeViolation {
        mode: ContainerMode,
        operation: &'static str,
    },

    /// Bytes could not be encoded or decoded in the expected format.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No diffing codec is registered under this format.
    #[error("no codec registered for format {0:?}")]
    UnknownFormat(String),
}

/// Convenience alias for codec results.
pub type CodecResult<T> = Result<T, CodecError>;
