use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid record mode: {0:?} (expected never, missing, failed, or all)")]
    InvalidRecordMode(String),

    #[error("invalid baseline identifier: {0}")]
    InvalidIdentifier(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("cannot read configuration {path}: {message}")]
    ConfigIo { path: String, message: String },
}

/// Result alias for type operations.
pub type TypeResult<T> = Result<T, TypeError>;
