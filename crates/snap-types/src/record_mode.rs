use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Policy governing whether a baseline may be created or overwritten.
///
/// The mode is fixed for the duration of one verification call but may
/// differ between calls (per-call overrides, environment, config file).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordMode {
    /// Never write a baseline; a missing baseline is a failure.
    Never,
    /// Write a baseline only when none exists yet.
    #[default]
    Missing,
    /// Write when missing, and overwrite when the candidate differs.
    Failed,
    /// Always write, even when the candidate matches.
    All,
}

impl RecordMode {
    /// All modes, in escalating order of permissiveness.
    pub const ALL: [RecordMode; 4] = [Self::Never, Self::Missing, Self::Failed, Self::All];

    /// Lowercase name, as accepted by [`FromStr`] and the config file.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Never => "never",
            Self::Missing => "missing",
            Self::Failed => "failed",
            Self::All => "all",
        }
    }

    /// Returns `true` if a missing baseline may be created.
    pub fn records_missing(&self) -> bool {
        !matches!(self, Self::Never)
    }

    /// Returns `true` if a differing baseline may be overwritten.
    pub fn records_failures(&self) -> bool {
        matches!(self, Self::Failed | Self::All)
    }
}

impl fmt::Display for RecordMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordMode {
    type Err = TypeError;

    /// Parses a mode name case-insensitively. Boolean spellings are accepted
    /// for environment variables: truthy values mean `all`, falsy `missing`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "never" => Ok(Self::Never),
            "missing" => Ok(Self::Missing),
            "failed" => Ok(Self::Failed),
            "all" => Ok(Self::All),
            "true" | "1" | "yes" => Ok(Self::All),
            "false" | "0" | "no" => Ok(Self::Missing),
            _ => Err(TypeError::InvalidRecordMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_missing() {
        assert_eq!(RecordMode::default(), RecordMode::Missing);
    }

    #[test]
    fn parse_names_case_insensitively() {
        assert_eq!("never".parse::<RecordMode>().unwrap(), RecordMode::Never);
        assert_eq!("Missing".parse::<RecordMode>().unwrap(), RecordMode::Missing);
        assert_eq!(" FAILED ".parse::<RecordMode>().unwrap(), RecordMode::Failed);
        assert_eq!("all".parse::<RecordMode>().unwrap(), RecordMode::All);
    }

    #[test]
    fn parse_boolean_spellings() {
        assert_eq!("true".parse::<RecordMode>().unwrap(), RecordMode::All);
        assert_eq!("1".parse::<RecordMode>().unwrap(), RecordMode::All);
        assert_eq!("false".parse::<RecordMode>().unwrap(), RecordMode::Missing);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "sometimes".parse::<RecordMode>().unwrap_err();
        assert_eq!(err, TypeError::InvalidRecordMode("sometimes".into()));
    }

    #[test]
    fn display_round_trips_through_parse() {
        for mode in RecordMode::ALL {
            assert_eq!(mode.to_string().parse::<RecordMode>().unwrap(), mode);
        }
    }

    #[test]
    fn permission_helpers() {
        assert!(!RecordMode::Never.records_missing());
        assert!(RecordMode::Missing.records_missing());
        assert!(!RecordMode::Missing.records_failures());
        assert!(RecordMode::Failed.records_failures());
        assert!(RecordMode::All.records_failures());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&RecordMode::Failed).unwrap();
        assert_eq!(json, "\"failed\"");
        let back: RecordMode = serde_json::from_str("\"never\"").unwrap();
        assert_eq!(back, RecordMode::Never);
    }
}
