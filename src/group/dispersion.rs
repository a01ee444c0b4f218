//! Dispersion measures of a shot group.
//!
//! # Measures
//!
//! | Measure | Definition |
//! |---|---|
//! | MPI | (x̄, ȳ) |
//! | DRMS | √(σx² + σy²), population variances |
//! | R95 | 95th percentile of radial distance from the MPI |
//! | Extreme spread | largest pairwise distance |
//! | Rayleigh σ | √(Σr² / 2n), r measured from the MPI |
//!
//! # Rayleigh interval
//!
//! With r² summed over n shots, 2n·σ̂²/σ² ~ χ²(2n), so for α = 1 − c:
//!
//! ```text
//! lower = σ̂ · √(2n / χ²_{1−α/2}(2n))
//! upper = σ̂ · √(2n / χ²_{α/2}(2n))
//! ```

use serde::Serialize;

use crate::distribution::{mean_or_zero, percentile, population_variance};
use crate::error::{ensure_coordinates, ensure_probability, Result};

/// A point on the face, cm from the center.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Rayleigh scale estimate with its confidence interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RayleighEstimate {
    pub sigma: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub confidence: f64,
    /// Number of shots the estimate is based on.
    pub n: usize,
}

/// Mean point of impact; the origin for an empty group.
pub fn mpi(xs: &[f64], ys: &[f64]) -> Result<Point> {
    ensure_coordinates(xs, ys)?;
    Ok(Point {
        x: mean_or_zero(xs),
        y: mean_or_zero(ys),
    })
}

/// Distance root mean square, √(σx² + σy²) with population variances.
///
/// Contains about 63.2% of a circular normal group. 0 for an empty group.
pub fn drms(xs: &[f64], ys: &[f64]) -> Result<f64> {
    ensure_coordinates(xs, ys)?;
    Ok(drms_unchecked(xs, ys))
}

pub(crate) fn drms_unchecked(xs: &[f64], ys: &[f64]) -> f64 {
    let vx = population_variance(xs).unwrap_or(0.0);
    let vy = population_variance(ys).unwrap_or(0.0);
    (vx + vy).sqrt()
}

/// Radial sigma √((σx² + σy²) / 2), the per-axis equivalent of DRMS.
pub fn radial_sigma(xs: &[f64], ys: &[f64]) -> Result<f64> {
    Ok(drms(xs, ys)? / std::f64::consts::SQRT_2)
}

/// Radial distance of every shot from the MPI.
pub fn radii_from_mpi(xs: &[f64], ys: &[f64]) -> Result<Vec<f64>> {
    let center = mpi(xs, ys)?;
    Ok(xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x - center.x).hypot(y - center.y))
        .collect())
}

/// 95th percentile radial error around the MPI; 0 for an empty group.
pub fn r95(xs: &[f64], ys: &[f64]) -> Result<f64> {
    let radii = radii_from_mpi(xs, ys)?;
    Ok(percentile(&radii, 0.95).unwrap_or(0.0))
}

/// Largest distance between any two shots; 0 for fewer than 2 shots.
///
/// # Complexity
///
/// Time: O(n²), Space: O(1)
pub fn extreme_spread(xs: &[f64], ys: &[f64]) -> Result<f64> {
    ensure_coordinates(xs, ys)?;
    let n = xs.len();
    let mut widest: f64 = 0.0;
    for i in 0..n {
        for j in (i + 1)..n {
            widest = widest.max((xs[i] - xs[j]).hypot(ys[i] - ys[j]));
        }
    }
    Ok(widest)
}

/// Rayleigh scale σ with a chi-squared confidence interval.
///
/// An empty group yields σ = 0 with a zero-width interval and `n = 0`.
///
/// # Errors
///
/// Mismatched or non-finite coordinates, confidence outside (0, 1).
///
/// # Examples
///
/// ```
/// use u_archery::group::rayleigh_sigma;
///
/// let xs = [1.0, -1.0, 0.0, 0.0];
/// let ys = [0.0, 0.0, 1.0, -1.0];
/// let est = rayleigh_sigma(&xs, &ys, 0.95).unwrap();
/// // Σr² = 4, n = 4 → σ² = 0.5
/// assert!((est.sigma - 0.5_f64.sqrt()).abs() < 1e-12);
/// assert!(est.ci_lower < est.sigma && est.sigma < est.ci_upper);
/// ```
pub fn rayleigh_sigma(xs: &[f64], ys: &[f64], confidence: f64) -> Result<RayleighEstimate> {
    ensure_probability("confidence", confidence)?;
    let radii = radii_from_mpi(xs, ys)?;
    let n = radii.len();
    if n == 0 {
        return Ok(RayleighEstimate {
            sigma: 0.0,
            ci_lower: 0.0,
            ci_upper: 0.0,
            confidence,
            n,
        });
    }

    let sum_sq: f64 = radii.iter().map(|r| r * r).sum();
    let sigma = (sum_sq / (2.0 * n as f64)).sqrt();
    let (ci_lower, ci_upper) =
        rayleigh_confidence_interval(sigma, n, confidence).unwrap_or((sigma, sigma));

    Ok(RayleighEstimate {
        sigma,
        ci_lower,
        ci_upper,
        confidence,
        n,
    })
}

/// Confidence interval for a Rayleigh σ estimated from `n` shots.
///
/// `None` if `n` is 0, `sigma` is negative or non-finite, or `confidence`
/// is outside (0, 1).
pub fn rayleigh_confidence_interval(sigma: f64, n: usize, confidence: f64) -> Option<(f64, f64)> {
    if n == 0 || !sigma.is_finite() || sigma < 0.0 || !(confidence > 0.0 && confidence < 1.0) {
        return None;
    }
    let dof = 2.0 * n as f64;
    let alpha = 1.0 - confidence;
    let chi2_low = crate::distribution::chi_squared_quantile(alpha / 2.0, dof)?;
    let chi2_high = crate::distribution::chi_squared_quantile(1.0 - alpha / 2.0, dof)?;
    Some((sigma * (dof / chi2_high).sqrt(), sigma * (dof / chi2_low).sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const XS: [f64; 4] = [0.0, 0.5, -0.3, 1.2];
    const YS: [f64; 4] = [0.0, 0.3, -0.2, -0.8];

    #[test]
    fn mpi_of_example_group() {
        let c = mpi(&XS, &YS).expect("valid");
        assert!((c.x - 0.35).abs() < 1e-12);
        assert!((c.y + 0.175).abs() < 1e-12);
    }

    #[test]
    fn drms_known_value() {
        // Population variances of a unit cross: var(x) = var(y) = 0.5.
        let xs = [1.0, -1.0, 0.0, 0.0];
        let ys = [0.0, 0.0, 1.0, -1.0];
        let d = drms(&xs, &ys).expect("valid");
        assert!((d - 1.0).abs() < 1e-12, "drms = {d}");
        let r = radial_sigma(&xs, &ys).expect("valid");
        assert!((r - 0.5_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn r95_at_least_drms_for_example_group() {
        let d = drms(&XS, &YS).expect("valid");
        let r = r95(&XS, &YS).expect("valid");
        assert!(r >= d, "r95 {r} < drms {d}");
    }

    #[test]
    fn extreme_spread_known_value() {
        let xs = [0.0, 3.0, 1.0];
        let ys = [0.0, 4.0, 1.0];
        assert!((extreme_spread(&xs, &ys).expect("valid") - 5.0).abs() < 1e-12);
        assert_eq!(extreme_spread(&[2.0], &[2.0]).expect("valid"), 0.0);
        assert_eq!(extreme_spread(&[], &[]).expect("valid"), 0.0);
    }

    #[test]
    fn empty_group_is_zero() {
        assert_eq!(mpi(&[], &[]).expect("valid"), Point::default());
        assert_eq!(drms(&[], &[]).expect("valid"), 0.0);
        assert_eq!(r95(&[], &[]).expect("valid"), 0.0);
        let est = rayleigh_sigma(&[], &[], 0.95).expect("valid");
        assert_eq!(est.n, 0);
        assert_eq!(est.sigma, 0.0);
        assert_eq!(est.ci_upper, 0.0);
    }

    #[test]
    fn single_shot_group() {
        assert_eq!(drms(&[3.0], &[4.0]).expect("valid"), 0.0);
        let est = rayleigh_sigma(&[3.0], &[4.0], 0.95).expect("valid");
        assert_eq!(est.sigma, 0.0);
        assert!(est.ci_lower <= est.sigma && est.sigma <= est.ci_upper);
    }

    #[test]
    fn rayleigh_ci_brackets_estimate() {
        let est = rayleigh_sigma(&XS, &YS, 0.95).expect("valid");
        assert!(est.ci_lower <= est.sigma && est.sigma <= est.ci_upper);
        assert_eq!(est.n, 4);
    }

    #[test]
    fn rayleigh_ci_narrows_with_more_shots() {
        let mut previous = f64::INFINITY;
        for n in [3, 6, 12, 24, 48, 96] {
            let (lo, hi) = rayleigh_confidence_interval(2.0, n, 0.95).expect("valid");
            let width = hi - lo;
            assert!(width < previous, "n={n}: width {width} >= {previous}");
            previous = width;
        }
    }

    #[test]
    fn rayleigh_ci_known_value() {
        // n = 10 → χ²(20): 9.591 and 34.170.
        let (lo, hi) = rayleigh_confidence_interval(1.0, 10, 0.95).expect("valid");
        assert!((lo - (20.0_f64 / 34.170).sqrt()).abs() < 1e-3, "lo = {lo}");
        assert!((hi - (20.0_f64 / 9.591).sqrt()).abs() < 1e-3, "hi = {hi}");
    }

    #[test]
    fn higher_confidence_is_wider() {
        let (l90, h90) = rayleigh_confidence_interval(1.5, 12, 0.90).expect("valid");
        let (l99, h99) = rayleigh_confidence_interval(1.5, 12, 0.99).expect("valid");
        assert!(l99 < l90 && h99 > h90);
    }

    #[test]
    fn caller_errors() {
        assert!(drms(&[1.0, 2.0], &[1.0]).is_err());
        assert!(rayleigh_sigma(&XS, &YS, 1.0).is_err());
        assert!(r95(&[f64::NAN], &[0.0]).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn rayleigh_interval_contains_sigma(
            xs in proptest::collection::vec(-30.0_f64..30.0, 2..=40),
            seed in proptest::collection::vec(-30.0_f64..30.0, 40),
            confidence in 0.5_f64..0.99,
        ) {
            let ys = &seed[..xs.len()];
            let est = rayleigh_sigma(&xs, ys, confidence).unwrap();
            prop_assert!(est.sigma >= 0.0);
            prop_assert!(est.ci_lower <= est.sigma + 1e-12);
            prop_assert!(est.sigma <= est.ci_upper + 1e-12);
        }

        #[test]
        fn drms_bounded_by_extreme_spread(
            xs in proptest::collection::vec(-30.0_f64..30.0, 2..=40),
            seed in proptest::collection::vec(-30.0_f64..30.0, 40),
        ) {
            let ys = &seed[..xs.len()];
            let d = drms(&xs, ys).unwrap();
            let es = extreme_spread(&xs, ys).unwrap();
            prop_assert!(d >= 0.0);
            prop_assert!(d <= es + 1e-9, "drms {} > extreme spread {}", d, es);
        }
    }
}
