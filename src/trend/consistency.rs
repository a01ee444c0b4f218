//! Session-to-session consistency (coefficient of variation).

use serde::Serialize;
use u_numflow::stats;

use crate::error::{ensure_finite_series, Result};

const MEAN_FLOOR: f64 = 0.001;

/// Consistency tier of a score series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConsistencyLevel {
    /// Fewer than 2 sessions.
    NeedMoreSessions,
    /// Mean score is (effectively) zero.
    NoData,
    /// CV < 3%.
    Excellent,
    /// CV < 6%.
    Good,
    /// CV < 10%.
    Moderate,
    HighVariability,
}

impl ConsistencyLevel {
    pub fn interpretation(self) -> &'static str {
        match self {
            Self::NeedMoreSessions => "Need more sessions",
            Self::NoData => "No data",
            Self::Excellent => "Excellent consistency - very reproducible",
            Self::Good => "Good consistency",
            Self::Moderate => "Moderate variability",
            Self::HighVariability => "High variability - performance fluctuates significantly",
        }
    }
}

/// Result of [`practice_consistency`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PracticeConsistency {
    pub n: usize,
    pub mean: f64,
    /// Sample standard deviation.
    pub std_dev: f64,
    /// Coefficient of variation in percent.
    pub cv: f64,
    pub level: ConsistencyLevel,
}

/// Coefficient of variation of session scores (or average arrow scores).
///
/// # Errors
///
/// Non-finite scores.
///
/// # Examples
///
/// ```
/// use u_archery::trend::{practice_consistency, ConsistencyLevel};
///
/// let r = practice_consistency(&[540.0, 552.0, 547.0, 549.0]).unwrap();
/// assert_eq!(r.level, ConsistencyLevel::Excellent);
/// assert!(r.cv < 3.0);
/// ```
pub fn practice_consistency(scores: &[f64]) -> Result<PracticeConsistency> {
    ensure_finite_series("session scores", scores)?;
    let n = scores.len();
    if n < 2 {
        return Ok(PracticeConsistency {
            n,
            mean: scores.first().copied().unwrap_or(0.0),
            std_dev: 0.0,
            cv: 0.0,
            level: ConsistencyLevel::NeedMoreSessions,
        });
    }

    let mean = stats::mean(scores).unwrap_or(0.0);
    if mean < MEAN_FLOOR {
        return Ok(PracticeConsistency {
            n,
            mean: 0.0,
            std_dev: 0.0,
            cv: 0.0,
            level: ConsistencyLevel::NoData,
        });
    }
    let std_dev = stats::std_dev(scores).unwrap_or(0.0);
    let cv = std_dev / mean * 100.0;
    let level = if cv < 3.0 {
        ConsistencyLevel::Excellent
    } else if cv < 6.0 {
        ConsistencyLevel::Good
    } else if cv < 10.0 {
        ConsistencyLevel::Moderate
    } else {
        ConsistencyLevel::HighVariability
    };

    Ok(PracticeConsistency {
        n,
        mean,
        std_dev,
        cv,
        level,
    })
}
