//! Confidence ellipse of a shot group.
//!
//! # Algorithm
//!
//! 1. Sample covariance Σ of (x, y) (n − 1 denominator).
//! 2. Closed-form eigendecomposition λ₁ ≥ λ₂ with major eigenvector v₁.
//! 3. k = χ²_p(2) for coverage p.
//! 4. Semi-axes √(k·λ₁), √(k·max(λ₂, 0)); orientation atan2(v₁y, v₁x).
//!
//! Groups of fewer than 3 shots produce a zero-size ellipse at the MPI.

use serde::Serialize;

use crate::distribution::chi_squared_quantile;
use crate::error::{ensure_probability, AnalysisError, Result};
use crate::group::covariance::Covariance2;
use crate::group::dispersion::mpi;

/// A coverage ellipse around the MPI.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceEllipse {
    pub center_x: f64,
    pub center_y: f64,
    pub semi_major: f64,
    pub semi_minor: f64,
    /// Orientation of the major axis in degrees, in (−90, 90]; 0 is horizontal.
    pub angle_deg: f64,
    pub coverage: f64,
    /// Pearson correlation of x and y.
    pub correlation: f64,
}

/// Builds the ellipse expected to contain `coverage` of the shots.
///
/// # Errors
///
/// Mismatched or non-finite coordinates, coverage outside (0, 1).
///
/// # Examples
///
/// ```
/// use u_archery::group::confidence_ellipse;
///
/// // Group strung out along the diagonal.
/// let xs = [-2.0, -1.0, 0.0, 1.0, 2.0, 0.5];
/// let ys = [-2.1, -0.8, 0.1, 1.1, 1.9, 0.2];
/// let e = confidence_ellipse(&xs, &ys, 0.9).unwrap();
/// assert!(e.semi_major > e.semi_minor);
/// assert!((e.angle_deg - 45.0).abs() < 5.0);
/// ```
pub fn confidence_ellipse(xs: &[f64], ys: &[f64], coverage: f64) -> Result<ConfidenceEllipse> {
    ensure_probability("coverage", coverage)?;
    let center = mpi(xs, ys)?;

    let degenerate = ConfidenceEllipse {
        center_x: center.x,
        center_y: center.y,
        semi_major: 0.0,
        semi_minor: 0.0,
        angle_deg: 0.0,
        coverage,
        correlation: 0.0,
    };
    if xs.len() < 3 {
        return Ok(degenerate);
    }
    let Some(cov) = Covariance2::sample(xs, ys) else {
        return Ok(degenerate);
    };

    let scale = chi_squared_quantile(coverage, 2.0)
        .ok_or_else(|| AnalysisError::invalid("coverage", coverage, "no χ² quantile"))?;
    let eigen = cov.eigen();
    let semi_major = (eigen.major.max(0.0) * scale).sqrt();
    let semi_minor = (eigen.minor.max(0.0) * scale).sqrt().min(semi_major);

    Ok(ConfidenceEllipse {
        center_x: center.x,
        center_y: center.y,
        semi_major,
        semi_minor,
        angle_deg: axis_angle_deg(eigen.major_axis),
        coverage,
        correlation: cov.correlation(),
    })
}

/// Orientation of an undirected axis, folded into (−90, 90] degrees.
fn axis_angle_deg((vx, vy): (f64, f64)) -> f64 {
    let mut angle = vy.atan2(vx).to_degrees();
    if angle > 90.0 {
        angle -= 180.0;
    } else if angle <= -90.0 {
        angle += 180.0;
    }
    angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_angle_folding() {
        assert!((axis_angle_deg((1.0, 0.0))).abs() < 1e-12);
        assert!((axis_angle_deg((-1.0, 0.0))).abs() < 1e-12);
        assert!((axis_angle_deg((0.0, 1.0)) - 90.0).abs() < 1e-12);
        assert!((axis_angle_deg((0.0, -1.0)) - 90.0).abs() < 1e-12);
        assert!((axis_angle_deg((-1.0, -1.0)) - 45.0).abs() < 1e-12);
        assert!((axis_angle_deg((1.0, -1.0)) + 45.0).abs() < 1e-12);
    }

    #[test]
    fn axis_aligned_group() {
        // Wide horizontally, narrow vertically, uncorrelated.
        let xs = [-3.0, 3.0, -3.0, 3.0, 0.0];
        let ys = [-1.0, -1.0, 1.0, 1.0, 0.0];
        let e = confidence_ellipse(&xs, &ys, 0.9).expect("valid");
        // var(x) = 36/4 = 9, var(y) = 4/4 = 1, k = 4.60517
        let k = -2.0 * (0.1_f64).ln();
        assert!((e.semi_major - (9.0 * k).sqrt()).abs() < 1e-9);
        assert!((e.semi_minor - k.sqrt()).abs() < 1e-9);
        assert!(e.angle_deg.abs() < 1e-9);
        assert!(e.correlation.abs() < 1e-12);
    }

    #[test]
    fn fewer_than_three_shots_is_zero_size() {
        let e = confidence_ellipse(&[1.0, 3.0], &[2.0, 4.0], 0.9).expect("valid");
        assert_eq!(e.semi_major, 0.0);
        assert_eq!(e.semi_minor, 0.0);
        assert_eq!(e.center_x, 2.0);
        assert_eq!(e.center_y, 3.0);

        let e = confidence_ellipse(&[], &[], 0.9).expect("valid");
        assert_eq!(e.semi_major, 0.0);
    }

    #[test]
    fn larger_coverage_gives_larger_ellipse() {
        let xs = [0.1, 1.2, -0.8, 0.4, -1.1, 0.9];
        let ys = [0.3, -0.6, 0.2, 1.0, -0.4, 0.1];
        let e50 = confidence_ellipse(&xs, &ys, 0.5).expect("valid");
        let e95 = confidence_ellipse(&xs, &ys, 0.95).expect("valid");
        assert!(e95.semi_major > e50.semi_major);
        assert!(e95.semi_minor > e50.semi_minor);
        assert_eq!(e50.angle_deg, e95.angle_deg);
    }

    #[test]
    fn collinear_group_has_zero_minor_axis() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let e = confidence_ellipse(&xs, &ys, 0.9).expect("valid");
        assert!(e.semi_minor < 1e-6);
        assert!((e.angle_deg - 45.0).abs() < 1e-9);
        assert!((e.correlation - 1.0).abs() < 1e-12);
    }

    #[test]
    fn invalid_coverage() {
        assert!(confidence_ellipse(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0], 1.0).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn semi_major_not_below_semi_minor(
            xs in proptest::collection::vec(-50.0_f64..50.0, 0..=30),
            seed in proptest::collection::vec(-50.0_f64..50.0, 30),
            coverage in 0.05_f64..0.99,
        ) {
            let ys = &seed[..xs.len()];
            let e = confidence_ellipse(&xs, ys, coverage).unwrap();
            prop_assert!(e.semi_major >= e.semi_minor);
            prop_assert!(e.semi_minor >= 0.0);
            prop_assert!(e.angle_deg > -90.0 && e.angle_deg <= 90.0);
            if xs.len() < 3 {
                prop_assert_eq!(e.semi_major, 0.0);
            }
        }
    }
}
