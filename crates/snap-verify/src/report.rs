//! Failure messages and the reporting boundary.

use std::path::Path;

use snap_codec::DiffReport;
use snap_types::{BaselineId, NamedBytes, RecordMode};

use crate::error::VerifyError;

/// A failed check as handed to a test reporter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Failure {
    pub message: String,
    pub attachments: Vec<NamedBytes>,
    /// `false` for infrastructure errors that are not content failures.
    pub expected: bool,
}

impl From<VerifyError> for Failure {
    fn from(e: VerifyError) -> Self {
        let expected = e.is_expected_failure();
        let attachments = e
            .report()
            .map(|report| report.attachments.clone())
            .unwrap_or_default();
        Self {
            message: e.to_string(),
            attachments,
            expected,
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// `<tool> "<baseline>" "<candidate>"`.
pub fn diff_tool_hint(tool: &str, baseline: &Path, candidate: &Path) -> String {
    format!(
        "{tool} \"{}\" \"{}\"",
        baseline.display(),
        candidate.display()
    )
}

pub(crate) fn mismatch_message(id: &BaselineId, hint: Option<&str>, report: &DiffReport) -> String {
    let mut message = format!("Snapshot does not match baseline \"{id}\".");
    if let Some(hint) = hint {
        message.push_str("\n\n");
        message.push_str(hint);
    }
    message.push_str("\n\n");
    message.push_str(&report.message);
    message
}

pub(crate) fn missing_message(id: &BaselineId, mode: RecordMode) -> String {
    format!(
        "No baseline was found for \"{id}\" and recording is disabled (record mode: {mode})."
    )
}

pub(crate) fn recorded_message(id: &BaselineId, mode: RecordMode, existed: bool) -> String {
    let verb = if existed { "Re-recorded" } else { "Recorded" };
    format!(
        "{verb} baseline \"{id}\" (record mode: {mode}). \
         Re-run the test to verify against the new baseline."
    )
}
