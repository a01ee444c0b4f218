//! End-to-end fatigue: does the average end score fall as a session goes on?

use std::collections::BTreeMap;

use serde::Serialize;

use crate::distribution::population_std_dev;
use crate::error::{ensure_finite_series, Result};
use crate::group::Covariance2;

/// Spread of end averages below which there is nothing to correlate.
const FLAT_SCORES: f64 = 0.01;
const STRONG_FATIGUE_R: f64 = -0.7;
const MILD_FATIGUE_R: f64 = -0.4;

/// Average score of one end number, pooled over sessions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EndScore {
    pub end_number: u32,
    pub avg_score: f64,
    pub shot_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FatigueLevel {
    None,
    Mild,
    /// Moderate to strong.
    Strong,
}

/// Result of [`end_fatigue`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EndFatigue {
    pub end_scores: Vec<EndScore>,
    /// Least-squares slope of average score on end number (points per end).
    pub slope: f64,
    /// Pearson correlation of average score with end number.
    pub correlation: f64,
    /// Points lost over the session, |slope × number of ends|.
    pub estimated_drop: f64,
    pub level: FatigueLevel,
}

impl EndFatigue {
    pub fn interpretation(&self) -> String {
        match self.level {
            FatigueLevel::None => "No fatigue detected".to_string(),
            FatigueLevel::Mild => format!(
                "Mild fatigue detected (last ends drop ~{:.1} pts)",
                self.estimated_drop
            ),
            FatigueLevel::Strong => format!(
                "Moderate to strong fatigue detected (last ends drop ~{:.1} pts)",
                self.estimated_drop
            ),
        }
    }
}

/// Correlates average end score with end number.
///
/// `ends` pairs an end number with that end's scores; ends sharing a number
/// (from different sessions) are pooled.
///
/// # Errors
///
/// Non-finite scores.
///
/// # Examples
///
/// ```
/// use u_archery::trend::{end_fatigue, FatigueLevel};
///
/// let ends = [
///     (1, vec![10.0, 9.0, 10.0]),
///     (2, vec![9.0, 9.0, 10.0]),
///     (3, vec![9.0, 8.0, 9.0]),
///     (4, vec![8.0, 8.0, 9.0]),
/// ];
/// let fatigue = end_fatigue(&ends).unwrap();
/// assert_eq!(fatigue.level, FatigueLevel::Strong);
/// assert!(fatigue.slope < 0.0);
/// ```
pub fn end_fatigue<S: AsRef<[f64]>>(ends: &[(u32, S)]) -> Result<EndFatigue> {
    let mut pooled: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
    for (end_number, scores) in ends {
        let scores = scores.as_ref();
        ensure_finite_series("end scores", scores)?;
        if scores.is_empty() {
            continue;
        }
        let slot = pooled.entry(*end_number).or_insert((0.0, 0));
        slot.0 += scores.iter().sum::<f64>();
        slot.1 += scores.len();
    }

    let end_scores: Vec<EndScore> = pooled
        .into_iter()
        .map(|(end_number, (sum, count))| EndScore {
            end_number,
            avg_score: sum / count as f64,
            shot_count: count,
        })
        .collect();

    let numbers: Vec<f64> = end_scores.iter().map(|e| f64::from(e.end_number)).collect();
    let averages: Vec<f64> = end_scores.iter().map(|e| e.avg_score).collect();

    let (slope, correlation) = if end_scores.len() > 1
        && population_std_dev(&averages).unwrap_or(0.0) > FLAT_SCORES
    {
        match Covariance2::sample(&numbers, &averages) {
            Some(cov) if cov.xx > 0.0 => (cov.xy / cov.xx, cov.correlation()),
            _ => (0.0, 0.0),
        }
    } else {
        (0.0, 0.0)
    };

    let level = if correlation < STRONG_FATIGUE_R {
        FatigueLevel::Strong
    } else if correlation < MILD_FATIGUE_R {
        FatigueLevel::Mild
    } else {
        FatigueLevel::None
    };
    let estimated_drop = if level == FatigueLevel::None {
        0.0
    } else {
        (slope * end_scores.len() as f64).abs()
    };

    Ok(EndFatigue {
        end_scores,
        slope,
        correlation,
        estimated_drop,
        level,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn steady_decline_is_strong_fatigue() {
        let ends: Vec<(u32, Vec<f64>)> = (1..=6)
            .map(|e| (e, vec![10.0 - 0.25 * f64::from(e); 3]))
            .collect();
        let f = end_fatigue(&ends).expect("valid");
        assert!((f.slope + 0.25).abs() < 1e-12);
        assert!((f.correlation + 1.0).abs() < 1e-12);
        assert_eq!(f.level, FatigueLevel::Strong);
        assert!((f.estimated_drop - 1.5).abs() < 1e-12);
        assert_eq!(
            f.interpretation(),
            "Moderate to strong fatigue detected (last ends drop ~1.5 pts)"
        );
    }

    #[test]
    fn ends_pool_across_sessions() {
        let ends = [(1, vec![10.0]), (2, vec![8.0]), (1, vec![8.0])];
        let f = end_fatigue(&ends).expect("valid");
        assert_eq!(f.end_scores.len(), 2);
        assert_eq!(f.end_scores[0].end_number, 1);
        assert_eq!(f.end_scores[0].shot_count, 2);
        assert!((f.end_scores[0].avg_score - 9.0).abs() < 1e-12);
    }

    #[test]
    fn flat_or_single_end_has_no_fatigue() {
        let flat = [(1, vec![9.0, 9.0]), (2, vec![9.0, 9.0]), (3, vec![9.0, 9.0])];
        let f = end_fatigue(&flat).expect("valid");
        assert_eq!(f.slope, 0.0);
        assert_eq!(f.correlation, 0.0);
        assert_eq!(f.level, FatigueLevel::None);

        let single = [(1, vec![9.0, 8.0])];
        let f = end_fatigue(&single).expect("valid");
        assert_eq!(f.level, FatigueLevel::None);
        assert_eq!(f.interpretation(), "No fatigue detected");
    }

    #[test]
    fn improving_session_is_not_fatigue() {
        let ends = [(1, vec![7.0]), (2, vec![8.0]), (3, vec![9.0])];
        let f = end_fatigue(&ends).expect("valid");
        assert!(f.correlation > 0.9);
        assert_eq!(f.level, FatigueLevel::None);
        assert_eq!(f.estimated_drop, 0.0);
    }
}
