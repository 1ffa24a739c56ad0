use std::collections::HashMap;
use std::sync::RwLock;

use snap_types::BaselineId;

use crate::error::{StoreError, StoreResult};
use crate::traits::BaselineStore;

/// In-memory, HashMap-based baseline store.
///
/// Intended for tests and embedding. Bytes are cloned on read and write.
pub struct InMemoryBaselineStore {
    baselines: RwLock<HashMap<BaselineId, Vec<u8>>>,
}

impl InMemoryBaselineStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            baselines: RwLock::new(HashMap::new()),
        }
    }

    /// Number of baselines currently stored.
    pub fn len(&self) -> usize {
        self.baselines.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.baselines.read().expect("lock poisoned").is_empty()
    }

    /// Total bytes across all stored baselines.
    pub fn total_bytes(&self) -> usize {
        self.baselines
            .read()
            .expect("lock poisoned")
            .values()
            .map(Vec::len)
            .sum()
    }
}

impl Default for InMemoryBaselineStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BaselineStore for InMemoryBaselineStore {
    fn exists(&self, id: &BaselineId) -> StoreResult<bool> {
        let map = self.baselines.read().expect("lock poisoned");
        Ok(map.contains_key(id))
    }

    fn read(&self, id: &BaselineId) -> StoreResult<Vec<u8>> {
        let map = self.baselines.read().expect("lock poisoned");
        map.get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    fn write(&self, id: &BaselineId, bytes: &[u8]) -> StoreResult<()> {
        let mut map = self.baselines.write().expect("lock poisoned");
        map.insert(id.clone(), bytes.to_vec());
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<BaselineId>> {
        let map = self.baselines.read().expect("lock poisoned");
        let mut ids: Vec<BaselineId> = map.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

impl std::fmt::Debug for InMemoryBaselineStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBaselineStore")
            .field("baseline_count", &self.len())
            .finish()
    }
}
