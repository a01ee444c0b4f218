//! 2×2 covariance matrices.
//!
//! Shot groups are bivariate, so every matrix operation the group statistics
//! need (inverse, eigendecomposition, correlation) has a closed form. No
//! general linear-algebra routine is involved.

use serde::Serialize;
use u_numflow::stats;

/// Relative determinant below which a covariance matrix is treated as
/// singular.
const SINGULAR_TOLERANCE: f64 = 1e-10;

/// Symmetric 2×2 covariance matrix `[[xx, xy], [xy, yy]]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Covariance2 {
    pub xx: f64,
    pub xy: f64,
    pub yy: f64,
}

/// Eigendecomposition of a [`Covariance2`], eigenvalues in descending order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Eigen2 {
    pub major: f64,
    pub minor: f64,
    /// Unit eigenvector of the major eigenvalue.
    pub major_axis: (f64, f64),
}

impl Covariance2 {
    /// Sample covariance (n − 1 denominator) of paired coordinates.
    ///
    /// Returns `None` for fewer than 2 points or mismatched slices.
    pub fn sample(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.len() < 2 || xs.len() != ys.len() {
            return None;
        }
        Some(Self {
            xx: stats::variance(xs)?,
            xy: stats::covariance(xs, ys)?,
            yy: stats::variance(ys)?,
        })
    }

    /// Sample covariance of the points selected by `indices`.
    pub(crate) fn sample_of(xs: &[f64], ys: &[f64], indices: &[usize]) -> Option<Self> {
        let sx: Vec<f64> = indices.iter().map(|&i| xs[i]).collect();
        let sy: Vec<f64> = indices.iter().map(|&i| ys[i]).collect();
        Self::sample(&sx, &sy)
    }

    pub fn determinant(&self) -> f64 {
        self.xx * self.yy - self.xy * self.xy
    }

    /// Whether the matrix is (numerically) not invertible.
    pub fn is_singular(&self) -> bool {
        let scale = (self.xx * self.yy).abs();
        if !(self.xx > 0.0 && self.yy > 0.0) || scale < f64::MIN_POSITIVE {
            return true;
        }
        self.determinant() <= SINGULAR_TOLERANCE * scale
    }

    /// Squared Mahalanobis distance of the offset `(dx, dy)`.
    ///
    /// `None` when the matrix is singular.
    pub fn mahalanobis_squared(&self, dx: f64, dy: f64) -> Option<f64> {
        if self.is_singular() {
            return None;
        }
        let det = self.determinant();
        Some((self.yy * dx * dx - 2.0 * self.xy * dx * dy + self.xx * dy * dy) / det)
    }

    /// Returns the matrix multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            xx: self.xx * factor,
            xy: self.xy * factor,
            yy: self.yy * factor,
        }
    }

    /// Closed-form eigendecomposition.
    ///
    /// ```text
    /// λ = (a + c)/2 ± √(((a − c)/2)² + b²)
    /// ```
    ///
    /// The major eigenvector is taken from whichever row of `A − λI` is
    /// better conditioned; an isotropic matrix reports the x axis.
    pub fn eigen(&self) -> Eigen2 {
        let (a, b, c) = (self.xx, self.xy, self.yy);
        let mid = 0.5 * (a + c);
        let half_gap = 0.5 * (a - c);
        let radius = half_gap.hypot(b);
        let major = mid + radius;
        let minor = mid - radius;

        let (vx, vy) = if a >= c { (major - c, b) } else { (b, major - a) };
        let norm = vx.hypot(vy);
        let major_axis = if norm > 0.0 {
            (vx / norm, vy / norm)
        } else {
            (1.0, 0.0)
        };

        Eigen2 {
            major,
            minor,
            major_axis,
        }
    }

    /// Pearson correlation implied by the matrix; 0 when either axis has
    /// no spread.
    pub fn correlation(&self) -> f64 {
        if self.xx <= 0.0 || self.yy <= 0.0 {
            return 0.0;
        }
        let denom = (self.xx * self.yy).sqrt();
        if denom < 1e-300 {
            return 0.0;
        }
        (self.xy / denom).clamp(-1.0, 1.0)
    }
}
