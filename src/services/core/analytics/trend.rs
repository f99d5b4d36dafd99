// Trend Classifier - The One Threshold Ladder
// Every module that labels a rate (growth, velocity, the fan-out) goes
// through this function so the thresholds cannot drift apart per caller.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendLabel {
    StronglyPositive,
    Positive,
    Stable,
    Negative,
    StronglyNegative,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::StronglyPositive => "strongly_positive",
            TrendLabel::Positive => "positive",
            TrendLabel::Stable => "stable",
            TrendLabel::Negative => "negative",
            TrendLabel::StronglyNegative => "strongly_negative",
        }
    }
}

/// Map a rate to its trend label.
///
/// The ladder: `>5 -> strongly_positive`, `>1 -> positive`, `>-1 -> stable`,
/// `>-5 -> negative`, else `strongly_negative`. Growth callers pass a
/// percentage; the velocity estimator passes an absolute per-interval delta.
pub fn classify_rate(rate: f64) -> TrendLabel {
    if rate > 5.0 {
        TrendLabel::StronglyPositive
    } else if rate > 1.0 {
        TrendLabel::Positive
    } else if rate > -1.0 {
        TrendLabel::Stable
    } else if rate > -5.0 {
        TrendLabel::Negative
    } else {
        TrendLabel::StronglyNegative
    }
}
