use snap_sync::CancellationToken;
use snap_types::{ConfigOverrides, RecordMode};

/// Per-call settings layered over the suite configuration.
#[derive(Clone, Debug, Default)]
pub struct VerifyOptions {
    /// Record mode for this call only.
    pub record_mode: Option<RecordMode>,
    /// Context lines for this call only.
    pub context_lines: Option<usize>,
    /// Explicit discriminator. Without one the suite numbers repeated
    /// verifications within a test automatically.
    pub name: Option<String>,
    /// Abandon waiting for a pooled resource once cancelled.
    pub cancellation: Option<CancellationToken>,
}

impl VerifyOptions {
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn record(mut self, mode: RecordMode) -> Self {
        self.record_mode = Some(mode);
        self
    }

    pub fn context(mut self, lines: usize) -> Self {
        self.context_lines = Some(lines);
        self
    }

    pub fn cancel_on(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            record_mode: self.record_mode,
            context_lines: self.context_lines,
        }
    }
}
