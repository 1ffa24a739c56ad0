use snap_codec::CodecError;
use snap_sync::SyncError;
use snap_types::TypeError;
use snap_verify::{Failure, VerifyError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Verify(#[from] VerifyError),

    #[error("invalid configuration or identifier: {0}")]
    Invalid(#[from] TypeError),

    #[error("resource factory failed: {0}")]
    Resource(String),
}

impl SdkError {
    /// Whether this is an ordinary test failure (mismatch, missing baseline,
    /// or a baseline recorded under `fail_on_record`).
    pub fn is_expected_failure(&self) -> bool {
        matches!(self, Self::Verify(e) if e.is_expected_failure())
    }
}

impl From<CodecError> for SdkError {
    fn from(e: CodecError) -> Self {
        Self::Verify(e.into())
    }
}

impl From<SyncError> for SdkError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Cancelled => Self::Verify(VerifyError::Cancelled),
            SyncError::Closed => Self::Verify(VerifyError::Closed),
            SyncError::Factory(message) => Self::Resource(message),
        }
    }
}

impl From<SdkError> for Failure {
    fn from(e: SdkError) -> Self {
        match e {
            SdkError::Verify(e) => e.into(),
            other => Failure {
                message: other.to_string(),
                attachments: Vec::new(),
                expected: false,
            },
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
