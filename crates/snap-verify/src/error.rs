use snap_codec::{CodecError, DiffReport};
use snap_store::StoreError;
use snap_types::BaselineId;

/// Errors produced by a verification.
///
/// [`Mismatch`](Self::Mismatch), [`NoBaselineAvailable`](Self::NoBaselineAvailable)
/// and [`Recorded`](Self::Recorded) are expected test failures; every other
/// variant is an infrastructure problem.
#[derive(Debug, thiserror::Error)]
pub enum VerifyError {
    /// Malformed bytes on either side of a comparison.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A container was used against its mode.
    #[error("{0}")]
    ContainerModeViolation(String),

    /// The baseline store failed.
    #[error("baseline I/O error: {0}")]
    BaselineIo(#[from] StoreError),

    /// No diffing codec is registered for the strategy's format.
    #[error("no codec registered for format {0:?}")]
    UnknownFormat(String),

    /// The candidate differs from its baseline.
    #[error("{message}")]
    Mismatch {
        id: BaselineId,
        message: String,
        report: DiffReport,
    },

    /// The baseline is missing and the record mode forbids creating it.
    #[error("{message}")]
    NoBaselineAvailable { id: BaselineId, message: String },

    /// The baseline was written but the check is reported as failed.
    #[error("{message}")]
    Recorded { id: BaselineId, message: String },

    /// A lock or lease wait was cancelled.
    #[error("operation cancelled")]
    Cancelled,

    /// The resource pool or mutex was shut down while waiting.
    #[error("resource pool closed")]
    Closed,
}

impl VerifyError {
    /// Whether this is an ordinary test failure rather than an
    /// infrastructure problem.
    pub fn is_expected_failure(&self) -> bool {
        matches!(
            self,
            Self::Mismatch { .. } | Self::NoBaselineAvailable { .. } | Self::Recorded { .. }
        )
    }

    /// Diff report carried by a mismatch.
    pub fn report(&self) -> Option<&DiffReport> {
        match self {
            Self::Mismatch { report, .. } => Some(report),
            _ => None,
        }
    }
}

impl From<CodecError> for VerifyError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Serialization(msg) => Self::Serialization(msg),
            CodecError::UnknownFormat(format) => Self::UnknownFormat(format),
            violation @ CodecError::ModeViolation { .. } => {
                Self::ContainerModeViolation(violation.to_string())
            }
        }
    }
}

/// Result alias for verification.
pub type VerifyResult<T> = Result<T, VerifyError>;

#[cfg(test)]
mod tests {
    use super::*;
    use snap_codec::ContainerMode;

    #[test]
    fn codec_errors_map_onto_taxonomy() {
        let err: VerifyError = CodecError::ModeViolation {
            mode: ContainerMode::ReadOnly,
            operation: "write to",
        }
        .into();
        assert!(matches!(err, VerifyError::ContainerModeViolation(_)));
        assert_eq!(
            err.to_string(),
            "operation not allowed: cannot write to a read-only container"
        );

        let err: VerifyError = CodecError::Serialization("bad".into()).into();
        assert!(matches!(err, VerifyError::Serialization(ref m) if m == "bad"));

        let err: VerifyError = CodecError::UnknownFormat("png".into()).into();
        assert!(matches!(err, VerifyError::UnknownFormat(ref f) if f == "png"));
    }

    #[test]
    fn expected_failures() {
        let id = BaselineId::new("S", "t", "txt").unwrap();
        let missing = VerifyError::NoBaselineAvailable {
            id: id.clone(),
            message: "missing".into(),
        };
        assert!(missing.is_expected_failure());
        assert!(missing.report().is_none());

        let mismatch = VerifyError::Mismatch {
            id,
            message: "differs".into(),
            report: DiffReport {
                message: "@@".into(),
                attachments: Vec::new(),
            },
        };
        assert!(mismatch.is_expected_failure());
        assert_eq!(mismatch.report().unwrap().message, "@@");

        assert!(!VerifyError::Cancelled.is_expected_failure());
        assert!(!VerifyError::Serialization("x".into()).is_expected_failure());
        let io = VerifyError::from(StoreError::NotFound(BaselineId::new("S", "t", "txt").unwrap()));
        assert!(!io.is_expected_failure());
    }
}
