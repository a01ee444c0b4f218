//! Angular precision across distances.
//!
//! If angular error were the only source of spread, σθ = σ / distance would
//! be flat. A σθ that climbs with distance points at drag, wind or tuning.

use serde::Serialize;

use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::regression::simple_linear_regression;

/// Two-distance rule: far σθ must exceed near σθ by this factor.
const TWO_DISTANCE_RATIO: f64 = 1.2;
const SLOPE_P_THRESHOLD: f64 = 0.1;

/// Group size measured at one distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceSample {
    pub distance_m: f64,
    /// Radial sigma in cm.
    pub sigma_cm: f64,
    /// Sessions behind the sigma; used as the averaging weight.
    pub session_count: u32,
}

/// A [`DistanceSample`] with its angular error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceTheta {
    pub distance_m: f64,
    pub sigma_cm: f64,
    pub session_count: u32,
    pub sigma_theta_mrad: f64,
}

/// Which rule decided the distance effect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DistanceEvidence {
    /// Fewer than two distances.
    Insufficient,
    /// Near/far ratio test.
    TwoDistances,
    /// Regression of σθ on distance.
    Regression { slope: f64, p_value: f64 },
    /// Three or more distances, but the regression was degenerate
    /// (all at one distance).
    RegressionUnavailable,
}

/// Result of [`multi_distance_profile`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistanceProfile {
    /// Sorted by distance.
    pub distances: Vec<DistanceTheta>,
    /// Session-weighted mean σθ (mrad).
    pub mean_sigma_theta_mrad: f64,
    pub distance_effect: bool,
    pub evidence: DistanceEvidence,
}

impl DistanceProfile {
    pub fn interpretation(&self) -> String {
        let mean = self.mean_sigma_theta_mrad;
        match self.evidence {
            DistanceEvidence::Insufficient => "Need data at ≥2 distances".to_string(),
            DistanceEvidence::Regression { slope, p_value } if self.distance_effect => format!(
                "Distance-dependent degradation detected (slope={slope:.4} mrad/m, p={p_value:.3}). \
                 Equipment drag or tuning may limit long-distance performance."
            ),
            DistanceEvidence::TwoDistances if self.distance_effect => {
                let (near, far) = (
                    self.distances[0].sigma_theta_mrad,
                    self.distances[1].sigma_theta_mrad,
                );
                format!(
                    "Angular deviation increases at longer distance ({near:.2} → {far:.2} mrad). \
                     Possible equipment drag or tuning issue."
                )
            }
            DistanceEvidence::TwoDistances => format!(
                "Similar angular precision across distances (mean σ_θ = {mean:.2} mrad)."
            ),
            _ => format!(
                "Consistent angular precision across distances (mean σ_θ = {mean:.2} mrad)."
            ),
        }
    }
}

/// Angular error per distance, its weighted mean and whether it grows
/// with distance.
///
/// # Algorithm
///
/// σθ = σ / (distance · 100) · 1000 mrad. The mean is weighted by session
/// count (unweighted when every count is 0). With three or more distances a
/// least-squares line of σθ on distance flags an effect when its slope is
/// positive with p < 0.1; with exactly two, when the far σθ exceeds 1.2 × the
/// near one.
///
/// # Errors
///
/// Non-positive or non-finite distances, negative or non-finite sigmas.
///
/// # Examples
///
/// ```
/// use u_archery::projection::{multi_distance_profile, DistanceSample};
///
/// let samples = [
///     DistanceSample { distance_m: 70.0, sigma_cm: 14.0, session_count: 2 },
///     DistanceSample { distance_m: 18.0, sigma_cm: 2.7, session_count: 5 },
/// ];
/// let p = multi_distance_profile(&samples).unwrap();
/// // 1.5 mrad at 18 m versus 2.0 mrad at 70 m
/// assert_eq!(p.distances[0].distance_m, 18.0);
/// assert!(p.distance_effect);
/// ```
pub fn multi_distance_profile(samples: &[DistanceSample]) -> Result<DistanceProfile> {
    let mut distances = samples
        .iter()
        .map(|s| {
            let distance = ensure_positive("distance", s.distance_m)?;
            let sigma = ensure_non_negative("sigma", s.sigma_cm)?;
            Ok(DistanceTheta {
                distance_m: distance,
                sigma_cm: sigma,
                session_count: s.session_count,
                sigma_theta_mrad: sigma / (distance * 100.0) * 1000.0,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    distances.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));

    if distances.len() < 2 {
        return Ok(DistanceProfile {
            distances,
            mean_sigma_theta_mrad: 0.0,
            distance_effect: false,
            evidence: DistanceEvidence::Insufficient,
        });
    }

    let thetas: Vec<f64> = distances.iter().map(|d| d.sigma_theta_mrad).collect();
    let mean_sigma_theta_mrad = weighted_mean(&distances);

    let (distance_effect, evidence) = if distances.len() >= 3 {
        let xs: Vec<f64> = distances.iter().map(|d| d.distance_m).collect();
        match simple_linear_regression(&xs, &thetas) {
            Some(fit) => (
                fit.slope > 0.0 && fit.slope_p < SLOPE_P_THRESHOLD,
                DistanceEvidence::Regression {
                    slope: fit.slope,
                    p_value: fit.slope_p,
                },
            ),
            None => (false, DistanceEvidence::RegressionUnavailable),
        }
    } else {
        (
            thetas[1] > thetas[0] * TWO_DISTANCE_RATIO,
            DistanceEvidence::TwoDistances,
        )
    };

    Ok(DistanceProfile {
        distances,
        mean_sigma_theta_mrad,
        distance_effect,
        evidence,
    })
}

fn weighted_mean(distances: &[DistanceTheta]) -> f64 {
    let total_weight: f64 = distances.iter().map(|d| f64::from(d.session_count)).sum();
    if total_weight > 0.0 {
        distances
            .iter()
            .map(|d| d.sigma_theta_mrad * f64::from(d.session_count))
            .sum::<f64>()
            / total_weight
    } else {
        distances.iter().map(|d| d.sigma_theta_mrad).sum::<f64>() / distances.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(distance_m: f64, sigma_cm: f64, session_count: u32) -> DistanceSample {
        DistanceSample {
            distance_m,
            sigma_cm,
            session_count,
        }
    }

    #[test]
    fn single_distance_needs_more() {
        let p = multi_distance_profile(&[sample(18.0, 2.0, 3)]).expect("valid");
        assert_eq!(p.evidence, DistanceEvidence::Insufficient);
        assert!(!p.distance_effect);
        assert_eq!(p.mean_sigma_theta_mrad, 0.0);
        assert_eq!(p.interpretation(), "Need data at ≥2 distances");

        let empty = multi_distance_profile(&[]).expect("valid");
        assert!(empty.distances.is_empty());
    }

    #[test]
    fn weighted_mean_theta() {
        // 1.0 mrad (w=3) and 2.0 mrad (w=1) → 1.25
        let p = multi_distance_profile(&[sample(20.0, 2.0, 3), sample(50.0, 10.0, 1)])
            .expect("valid");
        assert!((p.mean_sigma_theta_mrad - 1.25).abs() < 1e-12);
        assert!(p.distance_effect);
        assert!(p.interpretation().contains("1.00 → 2.00 mrad"));
    }

    #[test]
    fn zero_weights_average_unweighted() {
        let p = multi_distance_profile(&[sample(20.0, 2.0, 0), sample(50.0, 5.5, 0)])
            .expect("valid");
        // 1.0 and 1.1 mrad
        assert!((p.mean_sigma_theta_mrad - 1.05).abs() < 1e-12);
        // 1.1 < 1.2 × 1.0
        assert!(!p.distance_effect);
        assert!(p.interpretation().starts_with("Similar angular precision"));
    }

    #[test]
    fn regression_detects_growth() {
        // σθ = 1.0, 1.2, 1.4, 1.6 mrad at 18, 30, 50, 70 m: nearly linear rise.
        let p = multi_distance_profile(&[
            sample(18.0, 1.80, 1),
            sample(30.0, 3.60, 1),
            sample(50.0, 7.00, 1),
            sample(70.0, 11.20, 1),
        ])
        .expect("valid");
        assert!(matches!(p.evidence, DistanceEvidence::Regression { slope, .. } if slope > 0.0));
        assert!(p.distance_effect);
        assert!(p.interpretation().starts_with("Distance-dependent degradation"));
    }

    #[test]
    fn regression_flat_is_consistent() {
        // σθ = 1.30, 1.10, 1.32, 1.12 mrad: no trend.
        let p = multi_distance_profile(&[
            sample(18.0, 2.34, 1),
            sample(30.0, 3.30, 1),
            sample(50.0, 6.60, 1),
            sample(70.0, 7.84, 1),
        ])
        .expect("valid");
        assert!(!p.distance_effect);
        assert!(p.interpretation().starts_with("Consistent angular precision"));
    }

    #[test]
    fn sorted_by_distance() {
        let p = multi_distance_profile(&[
            sample(70.0, 10.0, 1),
            sample(18.0, 2.0, 1),
            sample(30.0, 4.0, 1),
        ])
        .expect("valid");
        let ds: Vec<f64> = p.distances.iter().map(|d| d.distance_m).collect();
        assert_eq!(ds, vec![18.0, 30.0, 70.0]);
    }

    #[test]
    fn caller_errors() {
        assert!(multi_distance_profile(&[sample(0.0, 1.0, 1), sample(18.0, 1.0, 1)]).is_err());
        assert!(multi_distance_profile(&[sample(18.0, -1.0, 1)]).is_err());
        assert!(multi_distance_profile(&[sample(f64::NAN, 1.0, 1)]).is_err());
    }
}
