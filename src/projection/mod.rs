//! Cross-distance projection.
//!
//! Everything here rests on the Park model ([`expected_score`]): a circular
//! normal group of radial sigma σᵣ on a ten-ring face has a closed-form
//! expected arrow score, and the score can be inverted back to σᵣ
//! ([`sigma_from_score`]). Holding angular error constant then carries a
//! score from one distance and face to another.
//!
//! - [`predict_score_at_distance`] / [`drag_loss`]: projection and the gap
//!   to an actual long-distance score
//! - [`score_goal`]: group size needed for a target total
//! - [`multi_distance_profile`]: does angular error grow with distance?
//!
//! # Examples
//!
//! ```
//! use u_archery::projection::{expected_score, sigma_from_score};
//!
//! let score = expected_score(5.0, 122.0).unwrap();
//! let sigma = sigma_from_score(score, 122.0).unwrap();
//! assert!((sigma - 5.0).abs() < 0.01);
//! ```
//!
//! # References
//!
//! - Park, J.L. (2010). "The behaviour of an arrow shot from a compound
//!   archery bow", *Proc. IMechE Part P* 225, pp. 8-21.

mod goal;
mod park;
mod profile;

pub use goal::{score_goal, score_goal_for_shots, GoalOutcome, ScoreGoal};
pub use park::{
    drag_loss, expected_score, predict_score_at_distance, sigma_from_score, DistancePrediction,
    DragLoss,
};
pub use profile::{
    multi_distance_profile, DistanceEvidence, DistanceProfile, DistanceSample, DistanceTheta,
};
