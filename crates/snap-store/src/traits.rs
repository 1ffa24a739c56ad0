use std::path::PathBuf;

use snap_types::BaselineId;

use crate::error::StoreResult;

/// Persistent home of baselines.
///
/// Implementations must satisfy these invariants:
/// - `read` after a successful `write` of the same id returns those bytes.
/// - `write` replaces any existing baseline for the id atomically.
/// - Baselines are never deleted by the store.
pub trait BaselineStore: Send + Sync {
    /// Check whether a baseline exists.
    fn exists(&self, id: &BaselineId) -> StoreResult<bool>;

    /// Read a baseline's bytes.
    ///
    /// Returns [`StoreError::NotFound`](crate::StoreError::NotFound) if it
    /// does not exist.
    fn read(&self, id: &BaselineId) -> StoreResult<Vec<u8>>;

    /// Create or overwrite a baseline.
    fn write(&self, id: &BaselineId, bytes: &[u8]) -> StoreResult<()>;

    /// All stored baseline ids, sorted.
    ///
    /// The default implementation returns an empty list; backends that can
    /// enumerate their contents override it.
    fn list(&self) -> StoreResult<Vec<BaselineId>> {
        Ok(Vec::new())
    }

    /// Filesystem location of a baseline, for backends that have one.
    fn locate(&self, _id: &BaselineId) -> Option<PathBuf> {
        None
    }
}
