//! Check outcomes and per-run results.

use crate::rubric::CheckId;
use serde::{Deserialize, Serialize};

/// Result of evaluating one check. Failure is an ordinary value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Passed { detail: Option<String> },
    Failed { detail: String },
    /// Not attempted because an earlier gate failed.
    Skipped { reason: String },
}

impl CheckOutcome {
    pub fn pass() -> Self {
        CheckOutcome::Passed { detail: None }
    }

    pub fn pass_with(detail: impl Into<String>) -> Self {
        CheckOutcome::Passed {
            detail: Some(detail.into()),
        }
    }

    pub fn fail(detail: impl Into<String>) -> Self {
        CheckOutcome::Failed {
            detail: detail.into(),
        }
    }

    pub fn skip(reason: impl Into<String>) -> Self {
        CheckOutcome::Skipped {
            reason: reason.into(),
        }
    }

    /// Pass when `condition` holds, otherwise fail with `detail`.
    pub fn from_condition(condition: bool, detail: impl Into<String>) -> Self {
        if condition {
            Self::pass()
        } else {
            Self::fail(detail)
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, CheckOutcome::Passed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, CheckOutcome::Skipped { .. })
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            CheckOutcome::Passed { detail } => detail.as_deref(),
            CheckOutcome::Failed { detail } => Some(detail),
            CheckOutcome::Skipped { reason } => Some(reason),
        }
    }
}

/// A scored check within one run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub check: CheckId,
    pub name: String,
    pub points: u32,
    pub outcome: CheckOutcome,
    pub duration_ms: u64,
}

impl CheckResult {
    pub fn new(check: CheckId, outcome: CheckOutcome, duration_ms: u64) -> Self {
        Self {
            check,
            name: check.name().to_string(),
            points: check.points(),
            outcome,
            duration_ms,
        }
    }

    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }

    /// Points earned: full value on pass, zero otherwise.
    pub fn earned(&self) -> u32 {
        if self.passed() {
            self.points
        } else {
            0
        }
    }

    pub fn detail(&self) -> Option<&str> {
        self.outcome.detail()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_condition() {
        assert!(CheckOutcome::from_condition(true, "unused").passed());
        let failed = CheckOutcome::from_condition(false, "no HEALTHCHECK");
        assert!(!failed.passed());
        assert_eq!(failed.detail(), Some("no HEALTHCHECK"));
    }

    #[test]
    fn test_skipped_is_not_passed() {
        let skipped = CheckOutcome::skip("image build failed");
        assert!(!skipped.passed());
        assert!(skipped.is_skipped());
    }

    #[test]
    fn test_check_result_earned() {
        let ok = CheckResult::new(CheckId::MultiStage, CheckOutcome::pass(), 1);
        assert_eq!(ok.earned(), 15);
        assert_eq!(ok.name, "Multi-stage build");

        let bad = CheckResult::new(CheckId::MultiStage, CheckOutcome::fail("one FROM"), 1);
        assert_eq!(bad.earned(), 0);
        assert_eq!(bad.points, 15);
    }

    #[test]
    fn test_outcome_serializes_tagged() {
        let value = serde_json::to_value(CheckOutcome::fail("boom")).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["detail"], "boom");
    }
}
