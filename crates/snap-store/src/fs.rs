use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use snap_types::{BaselineId, SnapshotConfig};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{StoreError, StoreResult};
use crate::traits::BaselineStore;

/// Baseline store keeping one file per baseline under a snapshot directory.
///
/// A baseline `Suite/test.1.txt` lives at `<dir>/Suite/test.1.txt`. Writes go
/// to a temporary file in the target directory that is then renamed over
/// the destination, so readers never observe a partial baseline.
#[derive(Clone, Debug)]
pub struct FsBaselineStore {
    dir: PathBuf,
}

impl FsBaselineStore {
    /// Store rooted directly at `dir`. The directory is created lazily.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at `<root>/<config.snapshot_dir>`.
    pub fn from_config(root: &Path, config: &SnapshotConfig) -> Self {
        Self::new(root.join(&config.snapshot_dir))
    }

    /// Directory holding all baselines.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute location of a baseline on disk.
    pub fn path_for(&self, id: &BaselineId) -> PathBuf {
        self.dir.join(id.relative_path())
    }
}

impl BaselineStore for FsBaselineStore {
    fn exists(&self, id: &BaselineId) -> StoreResult<bool> {
        let path = self.path_for(id);
        match fs::metadata(&path) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn read(&self, id: &BaselineId) -> StoreResult<Vec<u8>> {
        let path = self.path_for(id);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(id = %id, bytes = bytes.len(), "baseline read");
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Err(StoreError::NotFound(id.clone())),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, id: &BaselineId, bytes: &[u8]) -> StoreResult<()> {
        let path = self.path_for(id);
        let parent = path.parent().unwrap_or(&self.dir).to_path_buf();
        fs::create_dir_all(&parent).map_err(|e| StoreError::io(&parent, e))?;

        let mut tmp =
            tempfile::NamedTempFile::new_in(&parent).map_err(|e| StoreError::io(&parent, e))?;
        tmp.write_all(bytes).map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path).map_err(|e| StoreError::io(&path, e.error))?;

        info!(id = %id, path = %path.display(), bytes = bytes.len(), "baseline written");
        Ok(())
    }

    fn list(&self) -> StoreResult<Vec<BaselineId>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let walker = WalkDir::new(&self.dir)
            .min_depth(2)
            .max_depth(2)
            .follow_links(false);
        for entry in walker {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(&self.dir).unwrap_or(entry.path());
            match BaselineId::from_relative_path(relative) {
                Ok(id) => ids.push(id),
                Err(e) => {
                    warn!(
                        path = %entry.path().display(),
                        error = %e,
                        "skipping unrecognised baseline file"
                    );
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn locate(&self, id: &BaselineId) -> Option<PathBuf> {
        Some(self.path_for(id))
    }
}
