//! Park model: expected score as a function of radial group size.
//!
//! With circular normal impacts of scale σᵣ the radial miss distance is
//! Rayleigh distributed, so P(r > R) = exp(−R²/(2σᵣ²)). Summing that over
//! the ten ring edges Rᵢ = i·w gives the expected points lost per arrow:
//!
//! ```text
//! E[score] = 10 − Σ_{i=1..10} exp(−(i·w)² / (2σᵣ²))
//! ```
//!
//! Angular error σθ = σᵣ / distance is assumed constant across distances,
//! which lets a score shot at one distance and face be projected onto
//! another.
//!
//! # Reference
//!
//! Park, J.L. (2010). "The behaviour of an arrow shot from a compound
//! archery bow", *Proc. IMechE Part P* 225, pp. 8-21.

use serde::Serialize;

use crate::error::{ensure_positive, AnalysisError, Result};
use crate::scoring::ring_width;

/// Upper end of the σ search bracket (cm).
const SIGMA_SEARCH_MAX: f64 = 200.0;
/// σ reported for a score of 0 or less.
const SIGMA_FOR_ZERO: f64 = 1000.0;
const MAX_BISECTIONS: usize = 50;
/// Bisection stops once the σ bracket is narrower than this (cm).
const SIGMA_TOLERANCE: f64 = 0.001;

/// Expected average arrow score for radial sigma `sigma_r` cm on a face of
/// `face_diameter` cm. σᵣ ≤ 0 scores a perfect 10.
///
/// # Examples
///
/// ```
/// use u_archery::projection::expected_score;
///
/// assert_eq!(expected_score(0.0, 40.0).unwrap(), 10.0);
/// let s = expected_score(2.0, 40.0).unwrap();
/// assert!((s - 9.2467).abs() < 1e-3);
/// ```
pub fn expected_score(sigma_r: f64, face_diameter: f64) -> Result<f64> {
    let w = ring_width(face_diameter)?;
    if sigma_r.is_nan() {
        return Err(AnalysisError::NonFinite("radial sigma"));
    }
    if sigma_r <= 0.0 {
        return Ok(10.0);
    }
    Ok(expected_score_unchecked(sigma_r, w))
}

fn expected_score_unchecked(sigma_r: f64, w: f64) -> f64 {
    let two_var = 2.0 * sigma_r * sigma_r;
    let loss: f64 = (1..=10)
        .map(|i| {
            let r = f64::from(i) * w;
            (-(r * r) / two_var).exp()
        })
        .sum();
    10.0 - loss
}

/// Radial sigma (cm) whose expected score equals `score`.
///
/// Scores ≥ 10 give 0, scores ≤ 0 give 1000. Otherwise bisection over
/// [0, 200] cm, at most 50 halvings, until the bracket is narrower than
/// 0.001 cm.
///
/// # Errors
///
/// Non-finite score, non-positive face diameter.
pub fn sigma_from_score(score: f64, face_diameter: f64) -> Result<f64> {
    let w = ring_width(face_diameter)?;
    if !score.is_finite() {
        return Err(AnalysisError::NonFinite("score"));
    }
    if score >= 10.0 {
        return Ok(0.0);
    }
    if score <= 0.0 {
        return Ok(SIGMA_FOR_ZERO);
    }

    let (mut low, mut high) = (0.0, SIGMA_SEARCH_MAX);
    for _ in 0..MAX_BISECTIONS {
        if high - low < SIGMA_TOLERANCE {
            break;
        }
        let mid = 0.5 * (low + high);
        // Expected score falls as σ grows.
        if expected_score_unchecked(mid, w) > score {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(0.5 * (low + high))
}

/// Score projected onto a new distance and face.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistancePrediction {
    pub predicted_score: f64,
    /// σᵣ implied by the known score (cm).
    pub sigma_known_cm: f64,
    /// σᵣ at the target distance (cm).
    pub sigma_target_cm: f64,
    /// Angular error in milliradians.
    pub sigma_theta_mrad: f64,
}

/// Projects an average arrow score shot at one distance/face onto another,
/// holding angular error constant.
///
/// # Errors
///
/// Non-positive distances or faces, non-finite score.
///
/// # Examples
///
/// ```
/// use u_archery::projection::predict_score_at_distance;
///
/// // 9.0 per arrow at 18 m on a 40 cm face, projected to 70 m on 122 cm.
/// let p = predict_score_at_distance(9.0, 18.0, 40.0, 70.0, 122.0).unwrap();
/// assert!(p.sigma_target_cm > p.sigma_known_cm);
/// assert!(p.predicted_score < 9.0);
/// ```
pub fn predict_score_at_distance(
    known_score: f64,
    known_distance_m: f64,
    known_face_cm: f64,
    target_distance_m: f64,
    target_face_cm: f64,
) -> Result<DistancePrediction> {
    let known_distance = ensure_positive("known distance", known_distance_m)?;
    let target_distance = ensure_positive("target distance", target_distance_m)?;
    ensure_positive("target face diameter", target_face_cm)?;

    let sigma_known_cm = sigma_from_score(known_score, known_face_cm)?;
    let sigma_theta = sigma_known_cm / (known_distance * 100.0);
    let sigma_target_cm = sigma_theta * target_distance * 100.0;

    Ok(DistancePrediction {
        predicted_score: expected_score(sigma_target_cm, target_face_cm)?,
        sigma_known_cm,
        sigma_target_cm,
        sigma_theta_mrad: sigma_theta * 1000.0,
    })
}

/// Points lost at long distance beyond what short-distance skill predicts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragLoss {
    pub predicted_score: f64,
    pub actual_score: f64,
    /// `predicted − actual`; positive means worse than predicted.
    pub points_lost: f64,
    /// Points lost as a percentage of the prediction; 0 when the prediction
    /// is not positive.
    pub percent_loss: f64,
}

/// Compares an actual long-distance score with the score projected from a
/// short-distance one. The gap captures drag, wind drift and tuning.
///
/// # Errors
///
/// Non-positive distances or faces, non-finite scores.
pub fn drag_loss(
    short_score: f64,
    short_distance_m: f64,
    short_face_cm: f64,
    long_score: f64,
    long_distance_m: f64,
    long_face_cm: f64,
) -> Result<DragLoss> {
    if !long_score.is_finite() {
        return Err(AnalysisError::NonFinite("long-distance score"));
    }
    let predicted = predict_score_at_distance(
        short_score,
        short_distance_m,
        short_face_cm,
        long_distance_m,
        long_face_cm,
    )?
    .predicted_score;
    let points_lost = predicted - long_score;
    let percent_loss = if predicted > 0.0 {
        points_lost / predicted * 100.0
    } else {
        0.0
    };

    Ok(DragLoss {
        predicted_score: predicted,
        actual_score: long_score,
        points_lost,
        percent_loss,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn sigma_round_trip(
            face in prop::sample::select(vec![40.0_f64, 60.0, 80.0, 122.0]),
            fraction in 0.0_f64..1.0,
        ) {
            // From a quarter ring width (where scores still differ from 10
            // in f64) up to 50 cm.
            let low = face / 80.0;
            let sigma = low + fraction * (50.0 - low);
            let score = expected_score(sigma, face).unwrap();
            let back = sigma_from_score(score, face).unwrap();
            prop_assert!((back - sigma).abs() < 0.01, "σ={} back={}", sigma, back);
        }

        #[test]
        fn expected_score_in_range(sigma in 0.0_f64..500.0, face in 10.0_f64..150.0) {
            let s = expected_score(sigma, face).unwrap();
            prop_assert!((0.0..=10.0).contains(&s));
        }
    }
}
