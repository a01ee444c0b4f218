//! Score by shot position within an end.
//!
//! Input is a list of ends, each the scores of that end in shooting order.
//! Ends of different lengths are fine: position k only averages the ends
//! that have a k-th shot.

use serde::Serialize;

use crate::error::{ensure_finite_series, Result};

/// Best-minus-worst gap under which positions count as equal.
const CONSISTENT_GAP: f64 = 0.2;
/// Score gap beyond which the first arrow differs from the rest.
const FIRST_ARROW_GAP: f64 = 0.3;

/// Average score at one position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionScore {
    /// 1-based shot position.
    pub position: usize,
    pub avg_score: f64,
    pub count: usize,
}

/// Which position, if any, stands out as weakest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PositionPattern {
    NoData,
    Consistent,
    FirstArrowWeakest,
    LastArrowWeakest,
    /// A position between the first and the last.
    InteriorWeakest,
}

/// Result of [`within_end_trend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WithinEndTrend {
    pub positions: Vec<PositionScore>,
    /// 1-based; 0 when there is no data.
    pub best_position: usize,
    pub worst_position: usize,
    pub pattern: PositionPattern,
}

impl WithinEndTrend {
    pub fn interpretation(&self) -> String {
        let find = |position: usize| {
            self.positions
                .iter()
                .find(|p| p.position == position)
                .map_or(0.0, |p| p.avg_score)
        };
        let worst = find(self.worst_position);
        match self.pattern {
            PositionPattern::NoData => "No data".to_string(),
            PositionPattern::Consistent => "Consistent across all shot positions".to_string(),
            PositionPattern::FirstArrowWeakest => format!(
                "First arrow is weakest ({worst:.2} avg). Consider a more deliberate pre-shot routine."
            ),
            PositionPattern::LastArrowWeakest => format!(
                "Last arrow is weakest ({worst:.2} avg). May indicate rushing or fatigue within the end."
            ),
            PositionPattern::InteriorWeakest => format!(
                "Shot {} is weakest ({worst:.2} avg), shot {} is best ({:.2} avg).",
                self.worst_position,
                self.best_position,
                find(self.best_position)
            ),
        }
    }
}

/// Buckets scores by position within the end and finds the weakest one.
///
/// # Errors
///
/// Non-finite scores.
///
/// # Examples
///
/// ```
/// use u_archery::trend::{within_end_trend, PositionPattern};
///
/// let ends = [[7.0, 9.0, 9.0], [8.0, 9.0, 10.0], [7.0, 10.0, 9.0]];
/// let trend = within_end_trend(&ends).unwrap();
/// assert_eq!(trend.worst_position, 1);
/// assert_eq!(trend.pattern, PositionPattern::FirstArrowWeakest);
/// ```
pub fn within_end_trend<S: AsRef<[f64]>>(ends: &[S]) -> Result<WithinEndTrend> {
    let mut sums: Vec<(f64, usize)> = Vec::new();
    for end in ends {
        let end = end.as_ref();
        ensure_finite_series("end scores", end)?;
        if sums.len() < end.len() {
            sums.resize(end.len(), (0.0, 0));
        }
        for (slot, &score) in sums.iter_mut().zip(end) {
            slot.0 += score;
            slot.1 += 1;
        }
    }

    let positions: Vec<PositionScore> = sums
        .iter()
        .enumerate()
        .filter(|(_, (_, count))| *count > 0)
        .map(|(i, &(sum, count))| PositionScore {
            position: i + 1,
            avg_score: sum / count as f64,
            count,
        })
        .collect();

    if positions.is_empty() {
        return Ok(WithinEndTrend {
            positions,
            best_position: 0,
            worst_position: 0,
            pattern: PositionPattern::NoData,
        });
    }
    let last_position = positions.len();

    // First maximum and first minimum.
    let mut best = &positions[0];
    let mut worst = &positions[0];
    for p in &positions[1..] {
        if p.avg_score > best.avg_score {
            best = p;
        }
        if p.avg_score < worst.avg_score {
            worst = p;
        }
    }

    let pattern = if best.avg_score - worst.avg_score < CONSISTENT_GAP {
        PositionPattern::Consistent
    } else if worst.position == 1 {
        PositionPattern::FirstArrowWeakest
    } else if worst.position == last_position {
        PositionPattern::LastArrowWeakest
    } else {
        PositionPattern::InteriorWeakest
    };

    Ok(WithinEndTrend {
        best_position: best.position,
        worst_position: worst.position,
        pattern,
        positions,
    })
}

/// Whether the first arrow of an end scores differently from the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FirstArrowEffect {
    /// First arrow averages more than 0.3 below the others.
    Penalty,
    /// First arrow averages more than 0.3 above the others.
    Advantage,
    None,
}

/// Result of [`first_arrow_effect`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FirstArrowAnalysis {
    pub first_avg: f64,
    pub other_avg: f64,
    /// `first_avg − other_avg`.
    pub penalty: f64,
    pub effect: FirstArrowEffect,
}

impl FirstArrowAnalysis {
    pub fn interpretation(&self) -> String {
        match self.effect {
            FirstArrowEffect::Penalty => {
                format!("First-arrow penalty detected ({:.1} pts)", self.penalty)
            }
            FirstArrowEffect::Advantage => {
                format!("First-arrow advantage detected (+{:.1} pts)", self.penalty)
            }
            FirstArrowEffect::None => "No first-arrow effect".to_string(),
        }
    }
}

/// Compares the first shot of every end with all later shots.
///
/// Without later shots the other average equals the first average; without
/// any shots everything is 0.
pub fn first_arrow_effect<S: AsRef<[f64]>>(ends: &[S]) -> Result<FirstArrowAnalysis> {
    let (mut first_sum, mut first_n) = (0.0, 0usize);
    let (mut other_sum, mut other_n) = (0.0, 0usize);
    for end in ends {
        let end = end.as_ref();
        ensure_finite_series("end scores", end)?;
        if let Some((&first, rest)) = end.split_first() {
            first_sum += first;
            first_n += 1;
            other_sum += rest.iter().sum::<f64>();
            other_n += rest.len();
        }
    }

    if first_n == 0 {
        return Ok(FirstArrowAnalysis {
            first_avg: 0.0,
            other_avg: 0.0,
            penalty: 0.0,
            effect: FirstArrowEffect::None,
        });
    }
    let first_avg = first_sum / first_n as f64;
    let other_avg = if other_n > 0 {
        other_sum / other_n as f64
    } else {
        first_avg
    };
    let penalty = first_avg - other_avg;
    let effect = if penalty < -FIRST_ARROW_GAP {
        FirstArrowEffect::Penalty
    } else if penalty > FIRST_ARROW_GAP {
        FirstArrowEffect::Advantage
    } else {
        FirstArrowEffect::None
    };

    Ok(FirstArrowAnalysis {
        first_avg,
        other_avg,
        penalty,
        effect,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positions_are_one_based_with_counts() {
        let ends: Vec<Vec<f64>> = vec![vec![9.0, 8.0], vec![10.0, 8.0, 7.0]];
        let trend = within_end_trend(&ends).expect("valid");
        assert_eq!(trend.positions.len(), 3);
        assert_eq!(trend.positions[0].position, 1);
        assert_eq!(trend.positions[0].count, 2);
        assert!((trend.positions[0].avg_score - 9.5).abs() < 1e-12);
        assert_eq!(trend.positions[2].count, 1);
        assert_eq!(trend.best_position, 1);
        assert_eq!(trend.worst_position, 3);
        assert_eq!(trend.pattern, PositionPattern::LastArrowWeakest);
        assert!(trend.interpretation().starts_with("Last arrow is weakest (7.00 avg)"));
    }

    #[test]
    fn interior_weakest() {
        let ends = [[9.0, 7.0, 10.0], [9.0, 8.0, 10.0]];
        let trend = within_end_trend(&ends).expect("valid");
        assert_eq!(trend.pattern, PositionPattern::InteriorWeakest);
        assert_eq!(trend.worst_position, 2);
        assert_eq!(trend.best_position, 3);
        assert_eq!(
            trend.interpretation(),
            "Shot 2 is weakest (7.50 avg), shot 3 is best (10.00 avg)."
        );
    }

    #[test]
    fn consistent_and_empty() {
        let ends = [[9.0, 9.1, 9.0], [9.0, 9.0, 9.1]];
        let trend = within_end_trend(&ends).expect("valid");
        assert_eq!(trend.pattern, PositionPattern::Consistent);

        let empty: [[f64; 0]; 0] = [];
        let trend = within_end_trend(&empty).expect("valid");
        assert_eq!(trend.pattern, PositionPattern::NoData);
        assert_eq!(trend.best_position, 0);
        assert_eq!(trend.interpretation(), "No data");
    }

    #[test]
    fn ties_resolve_to_first_position() {
        let ends = [[8.0, 10.0, 8.0, 10.0]];
        let trend = within_end_trend(&ends).expect("valid");
        assert_eq!(trend.best_position, 2);
        assert_eq!(trend.worst_position, 1);
    }

    #[test]
    fn first_arrow_penalty() {
        let ends = [[7.0, 9.0, 9.0], [8.0, 9.0, 9.0]];
        let r = first_arrow_effect(&ends).expect("valid");
        assert!((r.first_avg - 7.5).abs() < 1e-12);
        assert!((r.other_avg - 9.0).abs() < 1e-12);
        assert_eq!(r.effect, FirstArrowEffect::Penalty);
        assert_eq!(r.interpretation(), "First-arrow penalty detected (-1.5 pts)");
    }

    #[test]
    fn first_arrow_without_followups() {
        let ends = [[9.0], [8.0]];
        let r = first_arrow_effect(&ends).expect("valid");
        assert_eq!(r.other_avg, r.first_avg);
        assert_eq!(r.effect, FirstArrowEffect::None);

        let r = first_arrow_effect(&[[10.0, 8.0, 8.0]]).expect("valid");
        assert_eq!(r.effect, FirstArrowEffect::Advantage);
        assert_eq!(r.interpretation(), "First-arrow advantage detected (+2.0 pts)");
    }
}
