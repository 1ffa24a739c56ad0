use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The wait was cancelled before the lock was granted.
    #[error("operation cancelled")]
    Cancelled,

    /// The mutex or pool was closed.
    #[error("closed")]
    Closed,

    /// The resource factory failed to produce a resource.
    #[error("resource factory failed: {0}")]
    Factory(String),
}

pub type SyncResult<T> = Result<T, SyncError>;
