//! Accuracy versus precision decomposition.
//!
//! Splits the mean squared distance from the center into a systematic part
//! (MPI offset, "trueness" in ISO 5725 terms) and a random part (spread
//! around the MPI):
//!
//! ```text
//! bias²    = MPIx² + MPIy²
//! variance = var(x) + var(y)      (population)
//! total    = bias² + variance
//! ```

use serde::Serialize;

use crate::distribution::population_variance;
use crate::error::Result;
use crate::group::dispersion::mpi;

/// Total error below which a group is considered perfect.
const NO_ERROR_THRESHOLD: f64 = 0.001;
/// Share (%) of the total error above which one component dominates.
const DOMINANCE_PCT: f64 = 60.0;

/// Which component dominates a group's error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ErrorSource {
    /// Total error is negligible.
    None,
    /// MPI offset dominates: an aiming or sight-mark problem.
    Aim,
    /// Spread dominates: a shot execution problem.
    Consistency,
    Mixed,
}

impl ErrorSource {
    pub fn interpretation(self) -> &'static str {
        match self {
            Self::None => "Perfect - no error detected",
            Self::Aim => "Aim-dominant error - adjust crawl marks or sight picture",
            Self::Consistency => "Consistency-dominant error - focus on shot execution",
            Self::Mixed => "Mixed error - both aim and consistency need attention",
        }
    }
}

/// Result of [`accuracy_precision`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AccuracyPrecision {
    pub bias_sq: f64,
    pub variance: f64,
    pub total_mspe: f64,
    /// Share of the total error caused by the MPI offset (%).
    pub accuracy_pct: f64,
    /// Share of the total error caused by spread (%).
    pub precision_pct: f64,
    pub source: ErrorSource,
}

/// Decomposes a group's error into aim bias and spread.
///
/// A group whose total error is below 0.001 cm² (including an empty group)
/// reports zeros and [`ErrorSource::None`].
///
/// # Examples
///
/// ```
/// use u_archery::group::{accuracy_precision, ErrorSource};
///
/// // Tight group far off center: aim problem.
/// let xs = [5.0, 5.1, 4.9, 5.0];
/// let ys = [5.0, 4.9, 5.1, 5.0];
/// let r = accuracy_precision(&xs, &ys).unwrap();
/// assert_eq!(r.source, ErrorSource::Aim);
/// assert!(r.accuracy_pct > 99.0);
/// ```
pub fn accuracy_precision(xs: &[f64], ys: &[f64]) -> Result<AccuracyPrecision> {
    let center = mpi(xs, ys)?;
    let bias_sq = center.x * center.x + center.y * center.y;
    let variance =
        population_variance(xs).unwrap_or(0.0) + population_variance(ys).unwrap_or(0.0);
    let total_mspe = bias_sq + variance;

    if total_mspe < NO_ERROR_THRESHOLD {
        return Ok(AccuracyPrecision {
            bias_sq: 0.0,
            variance: 0.0,
            total_mspe: 0.0,
            accuracy_pct: 0.0,
            precision_pct: 0.0,
            source: ErrorSource::None,
        });
    }

    let accuracy_pct = bias_sq / total_mspe * 100.0;
    let precision_pct = variance / total_mspe * 100.0;
    let source = if accuracy_pct > DOMINANCE_PCT {
        ErrorSource::Aim
    } else if precision_pct > DOMINANCE_PCT {
        ErrorSource::Consistency
    } else {
        ErrorSource::Mixed
    };

    Ok(AccuracyPrecision {
        bias_sq,
        variance,
        total_mspe,
        accuracy_pct,
        precision_pct,
        source,
    })
}
