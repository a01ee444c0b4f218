//! Least-squares regression.
//!
//! - [`simple_linear_regression`] — closed-form OLS with a slope t-test
//! - [`fit_polynomial`] — low-degree polynomial least squares through the
//!   normal equations
//!
//! # Examples
//!
//! ```
//! use u_archery::regression::simple_linear_regression;
//!
//! // Angular error (mrad) rising with distance (m).
//! let distance = [18.0, 30.0, 50.0, 70.0];
//! let theta = [1.02, 1.18, 1.41, 1.59];
//! let fit = simple_linear_regression(&distance, &theta).unwrap();
//! assert!(fit.slope > 0.0);
//! assert!(fit.slope_p < 0.05);
//! ```

use serde::Serialize;
use u_numflow::matrix::Matrix;
use u_numflow::special;
use u_numflow::stats;

/// Least-squares line `y = intercept + slope · x` with a test of the slope.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Standard error of the slope.
    pub slope_se: f64,
    /// t statistic for H₀: slope = 0 (n − 2 degrees of freedom).
    pub slope_t: f64,
    /// Two-sided p-value of `slope_t`.
    pub slope_p: f64,
    pub n: usize,
}

// ---------------------------------------------------------------------------
// Straight line
// ---------------------------------------------------------------------------

/// Ordinary least-squares line through `(x[i], y[i])`.
///
/// # Algorithm
///
/// With Sxx = Σ(x − x̄)², Sxy = Σ(x − x̄)(y − ȳ) and SSE the residual sum of
/// squares: slope = Sxy / Sxx, se = √(SSE / (n − 2) / Sxx), t = slope / se.
/// A perfect fit has se = 0 and reports p = 0.
///
/// # Returns
///
/// `None` for fewer than 3 points, mismatched lengths, non-finite values or
/// constant x.
pub fn simple_linear_regression(x: &[f64], y: &[f64]) -> Option<LinearFit> {
    let n = x.len();
    if n < 3 || y.len() != n || !all_finite(x) || !all_finite(y) {
        return None;
    }

    let (mx, my) = (stats::mean(x)?, stats::mean(y)?);
    let (mut sxx, mut sxy, mut syy) = (0.0, 0.0, 0.0);
    for (&xi, &yi) in x.iter().zip(y) {
        let (dx, dy) = (xi - mx, yi - my);
        sxx += dx * dx;
        sxy += dx * dy;
        syy += dy * dy;
    }
    if sxx <= f64::MIN_POSITIVE {
        return None;
    }

    let slope = sxy / sxx;
    let intercept = my - slope * mx;
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(&xi, &yi)| (yi - intercept - slope * xi).powi(2))
        .sum();
    let dof = (n - 2) as f64;
    let slope_se = (sse / dof / sxx).sqrt();

    let (slope_t, slope_p) = if slope_se > 0.0 {
        let t = slope / slope_se;
        let p = 2.0 * (1.0 - special::t_distribution_cdf(t.abs(), dof));
        (t, p.clamp(0.0, 1.0))
    } else {
        (f64::INFINITY.copysign(slope), 0.0)
    };

    Some(LinearFit {
        slope,
        intercept,
        r_squared: if syy > 0.0 { 1.0 - sse / syy } else { 1.0 },
        slope_se,
        slope_t,
        slope_p,
        n,
    })
}

fn all_finite(v: &[f64]) -> bool {
    v.iter().all(|x| x.is_finite())
}

// ---------------------------------------------------------------------------
// Polynomial least squares
// ---------------------------------------------------------------------------

/// Polynomial with coefficients in ascending powers: `c₀ + c₁x + c₂x² + …`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Coefficients in ascending powers.
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Nominal degree (number of coefficients − 1).
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Horner evaluation.
    pub fn eval(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }

    /// Real roots of a polynomial of effective degree ≤ 2, ascending.
    ///
    /// Leading coefficients that are negligible relative to the others are
    /// dropped first. Constant polynomials have no roots.
    ///
    /// # Returns
    ///
    /// `None` if the effective degree is above 2.
    pub fn real_roots(&self) -> Option<Vec<f64>> {
        let scale = self
            .coefficients
            .iter()
            .fold(0.0_f64, |m, c| m.max(c.abs()));
        if scale == 0.0 {
            return Some(Vec::new());
        }
        let mut trimmed: &[f64] = &self.coefficients;
        while let Some((&last, rest)) = trimmed.split_last() {
            if last.abs() > 1e-12 * scale {
                break;
            }
            trimmed = rest;
        }

        let mut roots = match *trimmed {
            [] | [_] => Vec::new(),
            [c, b] => vec![-c / b],
            [c, b, a] => {
                let disc = b * b - 4.0 * a * c;
                if disc < 0.0 {
                    Vec::new()
                } else {
                    // q form avoids cancellation between b and √disc.
                    let q = -0.5 * (b + b.signum() * disc.sqrt());
                    if q == 0.0 {
                        vec![0.0, 0.0]
                    } else {
                        vec![q / a, c / q]
                    }
                }
            }
            _ => return None,
        };
        roots.sort_by(f64::total_cmp);
        Some(roots)
    }
}

/// Least-squares polynomial of the given degree.
///
/// # Algorithm
///
/// 1. Center and scale x: t = (x − x̄) / max|x − x̄|.
/// 2. Solve the normal equations (VᵀV)c = Vᵀy for the Vandermonde matrix V
///    of t by Cholesky decomposition.
/// 3. Expand the polynomial in t back into powers of x.
///
/// # Returns
///
/// `None` if the slices differ in length, contain non-finite values, have
/// fewer than `degree + 1` distinct x values, or the system is singular.
///
/// # Examples
///
/// ```
/// use u_archery::regression::fit_polynomial;
///
/// let x = [10.0, 20.0, 30.0, 40.0];
/// let y: Vec<f64> = x.iter().map(|d| 0.01 * d * d - d + 30.0).collect();
/// let p = fit_polynomial(&x, &y, 2).unwrap();
/// assert!((p.coefficients()[2] - 0.01).abs() < 1e-9);
/// assert!((p.eval(25.0) - 11.25).abs() < 1e-9);
/// ```
pub fn fit_polynomial(x: &[f64], y: &[f64], degree: usize) -> Option<Polynomial> {
    let n = x.len();
    if n != y.len() || n < degree + 1 {
        return None;
    }
    if !all_finite(x) || !all_finite(y) || distinct_count(x) < degree + 1 {
        return None;
    }

    let center = stats::mean(x)?;
    let spread = x.iter().fold(0.0_f64, |m, &xi| m.max((xi - center).abs()));
    let scale = if spread > 0.0 { spread } else { 1.0 };

    let ncols = degree + 1;
    let mut v_data = Vec::with_capacity(n * ncols);
    for &xi in x {
        let t = (xi - center) / scale;
        let mut power = 1.0;
        for _ in 0..ncols {
            v_data.push(power);
            power *= t;
        }
    }
    let v = Matrix::new(n, ncols, v_data).ok()?;
    let vt = v.transpose();
    let vtv = vt.mul_mat(&v).ok()?;
    let vty = vt.mul_vec(y).ok()?;
    let scaled = vtv.cholesky_solve(&vty).ok()?;
    if scaled.iter().any(|c| !c.is_finite()) {
        return None;
    }

    Some(Polynomial::new(expand_shifted(&scaled, center, scale)))
}

/// Rewrites Σ cⱼ·((x − m)/s)ʲ as Σ aᵢ·xⁱ.
fn expand_shifted(c: &[f64], m: f64, s: f64) -> Vec<f64> {
    let mut a = vec![0.0; c.len()];
    for (j, &cj) in c.iter().enumerate() {
        let factor = cj / s.powi(j as i32);
        // (x − m)^j = Σᵢ C(j, i)·xⁱ·(−m)^(j−i)
        let mut binom = 1.0;
        for (i, ai) in a.iter_mut().enumerate().take(j + 1) {
            *ai += factor * binom * (-m).powi((j - i) as i32);
            binom = binom * (j - i) as f64 / (i + 1) as f64;
        }
    }
    a
}

fn distinct_count(x: &[f64]) -> usize {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn p_value_is_a_probability(
            points in prop::collection::vec((0.0_f64..100.0, -10.0_f64..10.0), 3..=25)
        ) {
            let (x, y): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
            if let Some(fit) = simple_linear_regression(&x, &y) {
                prop_assert!((0.0..=1.0).contains(&fit.slope_p));
                prop_assert!(fit.r_squared <= 1.0 + 1e-9);
            }
        }

        #[test]
        fn linear_fit_matches_simple_regression(
            points in prop::collection::vec((0.0_f64..100.0, -50.0_f64..50.0), 3..=20)
        ) {
            let (x, y): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
            if let (Some(simple), Some(poly)) =
                (simple_linear_regression(&x, &y), fit_polynomial(&x, &y, 1))
            {
                let c = poly.coefficients();
                let tol = 1e-6 * (1.0 + simple.intercept.abs() + simple.slope.abs());
                prop_assert!((c[0] - simple.intercept).abs() < tol * 100.0);
                prop_assert!((c[1] - simple.slope).abs() < tol);
            }
        }
    }
}
