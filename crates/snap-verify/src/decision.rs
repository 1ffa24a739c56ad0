use std::fmt;

use serde::{Deserialize, Serialize};
use snap_types::RecordMode;

/// Outcome of the record-mode table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Baseline matches; nothing is written.
    Pass,
    /// Baseline is written and the check passes.
    WriteAndPass,
    /// Baseline is written but the check fails so the test is re-run.
    WriteAndFail,
    /// The check fails without touching the baseline.
    Fail,
}

impl Decision {
    /// Whether the baseline must be written before reporting.
    pub fn writes(&self) -> bool {
        matches!(self, Self::WriteAndPass | Self::WriteAndFail)
    }

    pub fn passes(&self) -> bool {
        matches!(self, Self::Pass | Self::WriteAndPass)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pass => "pass",
            Self::WriteAndPass => "write-and-pass",
            Self::WriteAndFail => "write-and-fail",
            Self::Fail => "fail",
        };
        f.write_str(s)
    }
}

/// The record-mode decision table.
///
/// | mode    | missing        | matches        | differs        |
/// |---------|----------------|----------------|----------------|
/// | never   | fail           | pass           | fail           |
/// | missing | write, pass    | pass           | fail           |
/// | failed  | write, pass    | pass           | write, pass    |
/// | all     | write, pass    | write, pass    | write, pass    |
///
/// `matches` is ignored when the baseline does not exist.
pub fn decide(mode: RecordMode, baseline_exists: bool, matches: bool) -> Decision {
    match (mode, baseline_exists, matches) {
        (RecordMode::All, _, _) => Decision::WriteAndPass,
        (_, true, true) => Decision::Pass,
        (RecordMode::Never, _, _) => Decision::Fail,
        (RecordMode::Missing, false, _) => Decision::WriteAndPass,
        (RecordMode::Missing, true, false) => Decision::Fail,
        (RecordMode::Failed, _, _) => Decision::WriteAndPass,
    }
}

/// [`decide`], then turn a write that created or changed the baseline into
/// [`Decision::WriteAndFail`] when `fail_on_record` is set.
///
/// Rewriting an identical baseline under [`RecordMode::All`] still passes.
pub fn decide_with(
    mode: RecordMode,
    baseline_exists: bool,
    matches: bool,
    fail_on_record: bool,
) -> Decision {
    match decide(mode, baseline_exists, matches) {
        Decision::WriteAndPass if fail_on_record && !(baseline_exists && matches) => {
            Decision::WriteAndFail
        }
        decision => decision,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Decision::*;

    /// (mode, missing, matches, differs)
    const TABLE: [(RecordMode, Decision, Decision, Decision); 4] = [
        (RecordMode::Never, Fail, Pass, Fail),
        (RecordMode::Missing, WriteAndPass, Pass, Fail),
        (RecordMode::Failed, WriteAndPass, Pass, WriteAndPass),
        (RecordMode::All, WriteAndPass, WriteAndPass, WriteAndPass),
    ];

    #[test]
    fn full_table() {
        for (mode, missing, matching, differing) in TABLE {
            assert_eq!(decide(mode, false, false), missing, "{mode} missing");
            assert_eq!(decide(mode, false, true), missing, "{mode} missing (match ignored)");
            assert_eq!(decide(mode, true, true), matching, "{mode} matches");
            assert_eq!(decide(mode, true, false), differing, "{mode} differs");
        }
    }

    #[test]
    fn fail_on_record_escalates_real_writes_only() {
        assert_eq!(decide_with(RecordMode::Missing, false, false, true), WriteAndFail);
        assert_eq!(decide_with(RecordMode::Failed, true, false, true), WriteAndFail);
        assert_eq!(decide_with(RecordMode::All, false, false, true), WriteAndFail);
        assert_eq!(decide_with(RecordMode::All, true, true, true), WriteAndPass);
        assert_eq!(decide_with(RecordMode::Never, false, false, true), Fail);
        assert_eq!(decide_with(RecordMode::Missing, true, true, true), Pass);
    }

    #[test]
    fn without_fail_on_record_matches_table() {
        for mode in RecordMode::ALL {
            for (exists, matches) in [(false, false), (true, true), (true, false)] {
                assert_eq!(
                    decide_with(mode, exists, matches, false),
                    decide(mode, exists, matches)
                );
            }
        }
    }

    #[test]
    fn decision_predicates() {
        assert!(WriteAndFail.writes() && !WriteAndFail.passes());
        assert!(WriteAndPass.writes() && WriteAndPass.passes());
        assert!(!Pass.writes() && Pass.passes());
        assert!(!Fail.writes() && !Fail.passes());
        assert_eq!(WriteAndFail.to_string(), "write-and-fail");
    }
}
