//! Score-goal simulation: the group size a target total demands.
//!
//! The goal total is turned into an average arrow score, the Park model is
//! inverted for the radial sigma that produces it, and that requirement is
//! compared with the archer's current radial sigma.

use serde::Serialize;
use tracing::debug;

use crate::error::{ensure_non_negative, AnalysisError, Result};
use crate::group::radial_sigma;

use super::park::{expected_score, sigma_from_score};

/// Where the archer stands relative to the goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GoalOutcome {
    /// Goal average exceeds 10 points per arrow.
    Infeasible,
    /// No current group to compare against.
    NoCurrentData,
    /// Current sigma is already at or below the requirement.
    AlreadyAchieved,
    ImprovementNeeded,
}

/// Result of [`score_goal`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreGoal {
    pub goal_total: f64,
    pub arrows: u32,
    /// Goal average per arrow, clamped to 10.
    pub goal_avg_arrow: f64,
    /// Radial sigma (cm) that yields the goal average.
    pub required_sigma_cm: f64,
    pub current_sigma_cm: Option<f64>,
    /// Expected arrow score at the current sigma.
    pub current_expected_score: Option<f64>,
    /// `(current − required) / current × 100`; negative when already tighter.
    pub sigma_improvement_pct: Option<f64>,
    pub feasible: bool,
    pub outcome: GoalOutcome,
}

impl ScoreGoal {
    pub fn interpretation(&self) -> String {
        match self.outcome {
            GoalOutcome::Infeasible => format!(
                "A score of {}/{} exceeds the maximum possible.",
                self.goal_total,
                u64::from(self.arrows) * 10
            ),
            GoalOutcome::NoCurrentData => format!(
                "To average {:.2}/arrow you need σ ≤ {:.2} cm. No sessions available for comparison.",
                self.goal_avg_arrow, self.required_sigma_cm
            ),
            GoalOutcome::AlreadyAchieved => format!(
                "You're already there! Your current σ ({:.2} cm) is tighter than the required σ ({:.2} cm).",
                self.current_sigma_cm.unwrap_or(0.0),
                self.required_sigma_cm
            ),
            GoalOutcome::ImprovementNeeded => format!(
                "You need to tighten your groups by {:.0}% (from σ={:.2} cm to σ={:.2} cm).",
                self.sigma_improvement_pct.unwrap_or(0.0),
                self.current_sigma_cm.unwrap_or(0.0),
                self.required_sigma_cm
            ),
        }
    }
}

/// Radial sigma needed to shoot `goal_total` over `arrows` arrows on a face
/// of `face_diameter` cm, compared with `current_sigma_cm` when known.
///
/// Feasibility is judged on the unclamped goal average; the required sigma
/// uses the average clamped to 10.
///
/// # Errors
///
/// Zero arrows, negative or non-finite goal, non-positive face, negative
/// or non-finite current sigma.
///
/// # Examples
///
/// ```
/// use u_archery::projection::{score_goal, GoalOutcome};
///
/// let goal = score_goal(270.0, 30, 40.0, Some(3.0)).unwrap();
/// assert!(goal.feasible);
/// assert_eq!(goal.outcome, GoalOutcome::ImprovementNeeded);
/// assert!(goal.required_sigma_cm < 3.0);
/// ```
pub fn score_goal(
    goal_total: f64,
    arrows: u32,
    face_diameter: f64,
    current_sigma_cm: Option<f64>,
) -> Result<ScoreGoal> {
    if arrows == 0 {
        return Err(AnalysisError::invalid("arrows", 0.0, "must be at least 1"));
    }
    ensure_non_negative("goal total", goal_total)?;
    let current = current_sigma_cm
        .map(|s| ensure_non_negative("current sigma", s))
        .transpose()?;

    let raw_avg = goal_total / f64::from(arrows);
    let feasible = raw_avg <= 10.0;
    let goal_avg_arrow = raw_avg.min(10.0);
    let required_sigma_cm = sigma_from_score(goal_avg_arrow, face_diameter)?;

    let current_expected_score = current
        .map(|s| expected_score(s, face_diameter))
        .transpose()?;
    let sigma_improvement_pct = current
        .filter(|&s| s > 0.0)
        .map(|s| (s - required_sigma_cm) / s * 100.0);

    let outcome = if !feasible {
        GoalOutcome::Infeasible
    } else {
        match (current, sigma_improvement_pct) {
            (None, _) => GoalOutcome::NoCurrentData,
            // A zero-sigma group already meets any requirement.
            (Some(_), None) => GoalOutcome::AlreadyAchieved,
            (Some(_), Some(pct)) if pct <= 0.0 => GoalOutcome::AlreadyAchieved,
            (Some(_), Some(_)) => GoalOutcome::ImprovementNeeded,
        }
    };
    debug!(goal_total, arrows, required_sigma_cm, ?outcome, "score goal");

    Ok(ScoreGoal {
        goal_total,
        arrows,
        goal_avg_arrow,
        required_sigma_cm,
        current_sigma_cm: current,
        current_expected_score,
        sigma_improvement_pct,
        feasible,
        outcome,
    })
}

/// [`score_goal`] with the current sigma taken from a set of impacts
/// (`√(σx² + σy²)/√2`, population). An empty set means no current data.
///
/// # Errors
///
/// As [`score_goal`], plus mismatched or non-finite coordinates.
pub fn score_goal_for_shots(
    goal_total: f64,
    arrows: u32,
    face_diameter: f64,
    xs: &[f64],
    ys: &[f64],
) -> Result<ScoreGoal> {
    let sigma = radial_sigma(xs, ys)?;
    let current = (!xs.is_empty()).then_some(sigma);
    score_goal(goal_total, arrows, face_diameter, current)
}
