use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TypeError, TypeResult};
use crate::record_mode::RecordMode;

/// Lines of unchanged context kept around each hunk.
pub const DEFAULT_CONTEXT_LINES: usize = 4;
/// Upper bound on regular leased resources alive at once.
pub const DEFAULT_MAX_CONCURRENT_LEASES: usize = 3;
/// Directory (under the store root) that holds baselines.
pub const DEFAULT_SNAPSHOT_DIR: &str = "__Snapshots__";

/// Environment variable overriding [`SnapshotConfig::record_mode`].
pub const ENV_RECORD: &str = "SNAPLINE_RECORD";
/// Environment variable overriding [`SnapshotConfig::context_lines`].
pub const ENV_CONTEXT: &str = "SNAPLINE_CONTEXT";
/// Environment variable overriding [`SnapshotConfig::diff_tool`].
pub const ENV_DIFF_TOOL: &str = "SNAPLINE_DIFF_TOOL";

/// Configuration for snapshot verification.
///
/// Missing keys in a TOML file fall back to the defaults, so an empty file
/// is a valid configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Record policy applied when no per-call override is given.
    pub record_mode: RecordMode,
    /// Unchanged lines kept around each hunk of a failure report.
    pub context_lines: usize,
    /// Maximum number of regular leased resources.
    pub max_concurrent_leases: usize,
    /// When `true`, recording a missing or differing baseline still fails
    /// the check so the test is re-run against the new baseline.
    pub fail_on_record: bool,
    /// External diff command mentioned in mismatch messages, e.g. `"ksdiff"`.
    pub diff_tool: Option<String>,
    /// Baseline directory name under the store root.
    pub snapshot_dir: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            record_mode: RecordMode::default(),
            context_lines: DEFAULT_CONTEXT_LINES,
            max_concurrent_leases: DEFAULT_MAX_CONCURRENT_LEASES,
            fail_on_record: false,
            diff_tool: None,
            snapshot_dir: DEFAULT_SNAPSHOT_DIR.to_string(),
        }
    }
}

impl SnapshotConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> TypeResult<Self> {
        let config: Self = toml::from_str(s).map_err(|e| TypeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> TypeResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| TypeError::ConfigIo {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }

    /// Apply `SNAPLINE_*` overrides from the process environment.
    pub fn apply_env(self) -> TypeResult<Self> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides using an arbitrary variable lookup.
    pub fn apply_env_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> TypeResult<Self> {
        if let Some(raw) = lookup(ENV_RECORD).filter(|v| !v.trim().is_empty()) {
            self.record_mode = raw.parse()?;
        }
        if let Some(raw) = lookup(ENV_CONTEXT).filter(|v| !v.trim().is_empty()) {
            self.context_lines = raw.trim().parse().map_err(|_| {
                TypeError::Config(format!("{ENV_CONTEXT} must be a non-negative integer, got {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_DIFF_TOOL) {
            let tool = raw.trim();
            self.diff_tool = (!tool.is_empty()).then(|| tool.to_string());
        }
        self.validate()?;
        Ok(self)
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> TypeResult<()> {
        if self.max_concurrent_leases == 0 {
            return Err(TypeError::Config(
                "max_concurrent_leases must be at least 1".into(),
            ));
        }
        if self.snapshot_dir.trim().is_empty() {
            return Err(TypeError::Config("snapshot_dir must not be empty".into()));
        }
        Ok(())
    }

    /// A copy of this config with per-call overrides applied.
    pub fn with_overrides(&self, overrides: &ConfigOverrides) -> Self {
        let mut config = self.clone();
        if let Some(mode) = overrides.record_mode {
            config.record_mode = mode;
        }
        if let Some(context) = overrides.context_lines {
            config.context_lines = context;
        }
        config
    }
}

/// Per-call overrides layered over a [`SnapshotConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub record_mode: Option<RecordMode>,
    pub context_lines: Option<usize>,
}

impl ConfigOverrides {
    pub fn record(mode: RecordMode) -> Self {
        Self {
            record_mode: Some(mode),
            ..Default::default()
        }
    }
}
