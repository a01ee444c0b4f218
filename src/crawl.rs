//! String-walking crawl calibration.
//!
//! A barebow archer aims at the target and moves the string hand down the
//! string ("crawl") to change the arrow's launch angle. Crawl against
//! distance is close to a parabola, so a few calibrated distances are fitted
//! with a polynomial of degree ≤ 2 and read off for every other distance.
//! The distance where the fitted crawl is zero is the *point-on* distance.
//!
//! # Examples
//!
//! ```
//! use u_archery::crawl::CrawlModel;
//!
//! let model = CrawlModel::fit(&[10.0, 30.0, 50.0], &[25.0, 10.0, 0.0]).unwrap();
//! assert!((model.predict(30.0) - 10.0).abs() < 1e-9);
//! let point_on = model.zero_crossing_distance().unwrap();
//! assert!((point_on - 50.0).abs() < 0.1);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::error::{ensure_finite_series, ensure_positive, AnalysisError, Result};
use crate::regression::{fit_polynomial, Polynomial};

/// Point-on candidates outside this range (m) are not plausible.
const POINT_ON_RANGE: (f64, f64) = (5.0, 100.0);

/// One row of a crawl chart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CrawlMark {
    pub distance_m: f64,
    /// Crawl rounded to 0.1 (same unit as the calibration offsets).
    pub crawl: f64,
}

/// Fitted crawl-versus-distance curve.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrawlModel {
    polynomial: Polynomial,
    calibration_points: usize,
}

impl CrawlModel {
    /// Fits crawl offsets measured at known distances.
    ///
    /// Degree is `min(2, n − 1)`: a line through two points, a parabola
    /// from three on.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::LengthMismatch`] if the slices differ in length
    /// - [`AnalysisError::InsufficientPoints`] for fewer than 2 points
    /// - [`AnalysisError::NonFinite`] for NaN or infinite inputs
    /// - [`AnalysisError::DegenerateCalibration`] when repeated distances
    ///   leave too few distinct ones for the degree
    pub fn fit(distances: &[f64], offsets: &[f64]) -> Result<Self> {
        if distances.len() != offsets.len() {
            return Err(AnalysisError::LengthMismatch {
                x: distances.len(),
                y: offsets.len(),
            });
        }
        let n = distances.len();
        if n < 2 {
            return Err(AnalysisError::InsufficientPoints {
                what: "crawl calibration",
                required: 2,
                got: n,
            });
        }
        ensure_finite_series("crawl distances", distances)?;
        ensure_finite_series("crawl offsets", offsets)?;

        let degree = (n - 1).min(2);
        let polynomial = fit_polynomial(distances, offsets, degree).ok_or_else(|| {
            AnalysisError::DegenerateCalibration(format!(
                "{n} points do not determine a degree-{degree} curve"
            ))
        })?;
        debug!(n, degree, coefficients = ?polynomial.coefficients(), "crawl model fitted");

        Ok(Self {
            polynomial,
            calibration_points: n,
        })
    }

    /// Crawl at `distance_m`. Negative values mean aiming above point-on.
    pub fn predict(&self, distance_m: f64) -> f64 {
        self.polynomial.eval(distance_m)
    }

    /// Chart rows at `min, min + step, …` up to `max`, crawl rounded to 0.1.
    ///
    /// # Errors
    ///
    /// Non-positive or non-finite step, non-finite bounds, `min > max`.
    pub fn chart(&self, min_m: f64, max_m: f64, step_m: f64) -> Result<Vec<CrawlMark>> {
        let step = ensure_positive("chart step", step_m)?;
        if !(min_m.is_finite() && max_m.is_finite()) {
            return Err(AnalysisError::NonFinite("chart range"));
        }
        if min_m > max_m {
            return Err(AnalysisError::invalid(
                "chart minimum",
                min_m,
                "must not exceed the maximum",
            ));
        }

        // Rows from k·step avoid accumulated drift; the slack keeps `max`
        // itself when the range is an exact multiple of the step.
        let rows = ((max_m - min_m) / step + 1e-9).floor() as usize + 1;
        Ok((0..rows)
            .map(|k| {
                let distance_m = min_m + k as f64 * step;
                CrawlMark {
                    distance_m,
                    crawl: round_tenth(self.predict(distance_m)),
                }
            })
            .collect())
    }

    /// Point-on distance: the smallest real root within 5–100 m, rounded to
    /// 0.1 m. `None` when the curve never reaches zero there.
    pub fn zero_crossing_distance(&self) -> Option<f64> {
        let (low, high) = POINT_ON_RANGE;
        self.polynomial
            .real_roots()?
            .into_iter()
            .filter(|r| (low..=high).contains(r))
            .min_by(f64::total_cmp)
            .map(round_tenth)
    }

    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// Coefficients in ascending powers of distance.
    pub fn coefficients(&self) -> &[f64] {
        self.polynomial.coefficients()
    }

    pub fn calibration_points(&self) -> usize {
        self.calibration_points
    }
}

fn round_tenth(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
