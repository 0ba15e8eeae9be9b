//! Summary counts and the bounded score

use crate::error::AggregationError;
use brandscan_scan::{Finding, FindingStatus};
use serde::Serialize;
use std::fmt;

/// Penalty per failing finding
pub const FAIL_PENALTY: f64 = 10.0;

/// Penalty per warning
pub const WARNING_PENALTY: f64 = 5.0;

/// Status counts and score of a scan
///
/// Only constructible from findings, so the counts always add up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    passed: usize,
    warnings: usize,
    failed: usize,
    score: u8,
}

impl ScanSummary {
    /// Count findings by status and score them
    ///
    /// # Errors
    /// `AggregationError::NoFindings` for an empty slice
    pub fn from_findings(findings: &[Finding]) -> Result<Self, AggregationError> {
        let (mut passed, mut warnings, mut failed) = (0, 0, 0);
        for finding in findings {
            match finding.status {
                FindingStatus::Pass => passed += 1,
                FindingStatus::Warning => warnings += 1,
                FindingStatus::Fail => failed += 1,
            }
        }
        let score = score(passed, warnings, failed).ok_or(AggregationError::NoFindings)?;
        Ok(Self {
            passed,
            warnings,
            failed,
            score,
        })
    }

    /// Passing findings
    #[inline]
    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Warnings
    #[inline]
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Failing findings
    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Total findings
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.passed + self.warnings + self.failed
    }

    /// Score in `0..=100`
    #[inline]
    #[must_use]
    pub fn score(&self) -> u8 {
        self.score
    }

    /// Display band for the score
    #[inline]
    #[must_use]
    pub fn band(&self) -> ScoreBand {
        ScoreBand::of(self.score)
    }
}

/// `clamp(round(passed/total*100 - failed*10 - warnings*5), 0, 100)`
///
/// `None` when there is nothing to score.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn score(passed: usize, warnings: usize, failed: usize) -> Option<u8> {
    let total = passed + warnings + failed;
    if total == 0 {
        return None;
    }
    let raw = (passed as f64 / total as f64) * 100.0
        - failed as f64 * FAIL_PENALTY
        - warnings as f64 * WARNING_PENALTY;
    Some(raw.round().clamp(0.0, 100.0) as u8)
}

/// Coarse rating of a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreBand {
    /// 90 and above
    Strong,
    /// 70 to 89
    Fair,
    /// Below 70
    Weak,
}

impl ScoreBand {
    /// Band of a score
    #[must_use]
    pub fn of(score: u8) -> Self {
        match score {
            90.. => Self::Strong,
            70..=89 => Self::Fair,
            _ => Self::Weak,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strong => "strong",
            Self::Fair => "fair",
            Self::Weak => "weak",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn worked_examples() {
        assert_eq!(score(6, 2, 1), Some(47));
        assert_eq!(score(8, 1, 0), Some(84));
        assert_eq!(score(5, 0, 0), Some(100));
        assert_eq!(score(0, 0, 3), Some(0));
        assert_eq!(score(0, 0, 0), None);
    }

    #[test]
    fn bands() {
        assert_eq!(ScoreBand::of(100), ScoreBand::Strong);
        assert_eq!(ScoreBand::of(90), ScoreBand::Strong);
        assert_eq!(ScoreBand::of(84), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(70), ScoreBand::Fair);
        assert_eq!(ScoreBand::of(47), ScoreBand::Weak);
    }

    #[test]
    fn empty_findings_are_rejected() {
        assert_eq!(ScanSummary::from_findings(&[]), Err(AggregationError::NoFindings));
    }

    proptest! {
        #[test]
        fn score_is_bounded(passed in 0usize..500, warnings in 0usize..500, failed in 0usize..500) {
            prop_assume!(passed + warnings + failed > 0);
            let s = score(passed, warnings, failed).unwrap();
            prop_assert!(s <= 100);
        }

        #[test]
        fn issues_never_raise_the_score(passed in 1usize..50, warnings in 0usize..20, failed in 0usize..20) {
            let clean = score(passed, 0, 0).unwrap();
            let dirty = score(passed, warnings, failed).unwrap();
            prop_assert!(dirty <= clean);
        }
    }
}
