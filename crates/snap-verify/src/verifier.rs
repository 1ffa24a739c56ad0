use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use snap_codec::{ByteContainer, DiffReport, Diffing};
use snap_store::BaselineStore;
use snap_types::{BaselineId, RecordMode, SnapshotConfig};
use tracing::{debug, info, warn};

use crate::decision::{decide_with, Decision};
use crate::error::{VerifyError, VerifyResult};
use crate::report::{diff_tool_hint, mismatch_message, missing_message, recorded_message};

/// A verification that passed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verified {
    /// [`Decision::Pass`] or [`Decision::WriteAndPass`].
    pub decision: Decision,
    /// Whether the baseline was written.
    pub recorded: bool,
    /// Difference from the previous baseline when an overwrite replaced
    /// differing content. Informational only.
    pub report: Option<DiffReport>,
}

/// Runs verifications against a baseline store.
///
/// Each call touches the store at most three times: one `exists`, at most
/// one `read`, and at most one `write`. A write completes before the outcome
/// is returned.
pub struct Verifier {
    store: Arc<dyn BaselineStore>,
    artifacts_dir: PathBuf,
}

impl Verifier {
    /// Create a verifier. Rejected candidates are written under the system
    /// temp directory when a diff tool is configured.
    pub fn new(store: Arc<dyn BaselineStore>) -> Self {
        Self {
            store,
            artifacts_dir: std::env::temp_dir().join("snapline"),
        }
    }

    /// Directory receiving rejected candidates for the diff tool hint.
    pub fn with_artifacts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.artifacts_dir = dir.into();
        self
    }

    pub fn store(&self) -> &Arc<dyn BaselineStore> {
        &self.store
    }

    pub fn artifacts_dir(&self) -> &Path {
        &self.artifacts_dir
    }

    /// Verify a read-only `candidate` against the baseline `id`.
    ///
    /// Failing decisions come back as errors: [`VerifyError::Mismatch`],
    /// [`VerifyError::NoBaselineAvailable`] or [`VerifyError::Recorded`].
    pub fn verify(
        &self,
        id: &BaselineId,
        candidate: &ByteContainer,
        diffing: &dyn Diffing,
        config: &SnapshotConfig,
    ) -> VerifyResult<Verified> {
        let bytes = candidate.bytes()?;
        let exists = self.store.exists(id)?;

        let (matches, report) = if exists {
            let baseline = ByteContainer::reader(self.store.read(id)?);
            match diffing.compare(&baseline, candidate, config.context_lines) {
                Ok(report) => {
                    debug!(
                        id = %id,
                        format = diffing.format(),
                        matches = report.is_none(),
                        "baseline compared"
                    );
                    (report.is_none(), report)
                }
                // `All` overwrites whatever the content, so a baseline that no
                // longer decodes is replaced. The candidate must still decode.
                Err(e)
                    if config.record_mode == RecordMode::All
                        && diffing.compare(candidate, candidate, 0).is_ok() =>
                {
                    warn!(
                        id = %id,
                        format = diffing.format(),
                        error = %e,
                        "baseline could not be decoded, overwriting"
                    );
                    (false, None)
                }
                Err(e) => return Err(e.into()),
            }
        } else {
            (false, None)
        };

        let decision = decide_with(config.record_mode, exists, matches, config.fail_on_record);
        debug!(
            id = %id,
            mode = %config.record_mode,
            exists,
            matches,
            decision = %decision,
            "record decision"
        );

        if decision.writes() {
            self.store.write(id, bytes)?;
            info!(id = %id, mode = %config.record_mode, replaced = exists, "baseline recorded");
        }

        match decision {
            Decision::Pass | Decision::WriteAndPass => Ok(Verified {
                decision,
                recorded: decision.writes(),
                report,
            }),
            Decision::WriteAndFail => Err(VerifyError::Recorded {
                id: id.clone(),
                message: recorded_message(id, config.record_mode, exists),
            }),
            Decision::Fail => match report {
                None => Err(VerifyError::NoBaselineAvailable {
                    id: id.clone(),
                    message: missing_message(id, config.record_mode),
                }),
                Some(report) => {
                    debug!(id = %id, "mismatch detected");
                    let hint = self.hint(id, bytes, config);
                    Err(VerifyError::Mismatch {
                        id: id.clone(),
                        message: mismatch_message(id, hint.as_deref(), &report),
                        report,
                    })
                }
            },
        }
    }

    /// Save the rejected candidate as an artifact and build the diff tool
    /// command line. `None` without a tool or a locatable baseline.
    fn hint(&self, id: &BaselineId, candidate: &[u8], config: &SnapshotConfig) -> Option<String> {
        let tool = config.diff_tool.as_deref()?;
        let baseline_path = self.store.locate(id)?;
        let candidate_path = self.artifacts_dir.join(id.relative_path());

        let written = candidate_path
            .parent()
            .map_or(Ok(()), fs::create_dir_all)
            .and_then(|()| fs::write(&candidate_path, candidate));
        if let Err(e) = written {
            warn!(
                path = %candidate_path.display(),
                error = %e,
                "could not write rejected candidate"
            );
            return None;
        }
        Some(diff_tool_hint(tool, &baseline_path, &candidate_path))
    }
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("artifacts_dir", &self.artifacts_dir)
            .finish_non_exhaustive()
    }
}
