use std::path::PathBuf;

use snap_types::BaselineId;

/// Errors from baseline store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested baseline was not found.
    #[error("baseline not found: {0}")]
    NotFound(BaselineId),

    /// I/O error from the underlying storage backend.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A directory walk failed while listing baselines.
    #[error("failed to list baselines: {0}")]
    Walk(#[from] walkdir::Error),
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
