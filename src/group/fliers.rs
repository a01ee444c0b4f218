//! Flier (outlier) detection.
//!
//! A shot is a flier when its squared Mahalanobis distance from the group's
//! location exceeds the χ²(2) quantile at 0.975 (≈ 7.38). Location and
//! scatter come from a pluggable [`CovarianceEstimator`]:
//!
//! - [`SampleCovariance`] — group mean and n − 1 covariance
//! - [`MinimumCovarianceDeterminant`] — robust concentration-step estimate
//!   that is not inflated by the fliers it is looking for
//!
//! When the robust estimator cannot produce a usable estimate the detector
//! falls back to the sample covariance and says so in
//! [`FlierReport::fell_back`].
//!
//! # References
//!
//! Rousseeuw, P.J. & Van Driessen, K. (1999). "A Fast Algorithm for the
//! Minimum Covariance Determinant Estimator", *Technometrics* 41(3),
//! pp. 212-223.

use serde::{Deserialize, Serialize};
use u_numflow::stats;

use crate::distribution::{chi_squared_quantile, mean_or_zero};
use crate::error::{ensure_coordinates, ensure_probability, AnalysisError, Result};
use crate::group::covariance::Covariance2;
use crate::group::dispersion::{drms_unchecked, Point};

/// Default χ²(2) quantile for the flier cut-off.
pub const DEFAULT_FLIER_QUANTILE: f64 = 0.975;
/// Groups smaller than this are not screened.
const MIN_SHOTS: usize = 5;
/// Shots that must remain for a clean sigma.
const MIN_CLEAN_SHOTS: usize = 3;

/// Which covariance estimator to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CovarianceMethod {
    Sample,
    Robust,
}

/// A location with the scatter matrix around it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationScatter {
    pub center: Point,
    pub covariance: Covariance2,
}

impl LocationScatter {
    /// Mean and sample covariance of the points selected by `indices`.
    fn of_subset(xs: &[f64], ys: &[f64], indices: &[usize]) -> Option<Self> {
        let covariance = Covariance2::sample_of(xs, ys, indices)?;
        let k = indices.len() as f64;
        let center = Point {
            x: indices.iter().map(|&i| xs[i]).sum::<f64>() / k,
            y: indices.iter().map(|&i| ys[i]).sum::<f64>() / k,
        };
        Some(Self { center, covariance })
    }

    /// Squared Mahalanobis distance of every point; `None` if singular.
    fn distances(&self, xs: &[f64], ys: &[f64]) -> Option<Vec<f64>> {
        xs.iter()
            .zip(ys)
            .map(|(&x, &y)| {
                self.covariance
                    .mahalanobis_squared(x - self.center.x, y - self.center.y)
            })
            .collect()
    }
}

/// Strategy producing the location and scatter used for flier screening.
pub trait CovarianceEstimator {
    fn method(&self) -> CovarianceMethod;

    /// Estimates location and scatter, or `None` when no non-singular
    /// estimate exists.
    fn estimate(&self, xs: &[f64], ys: &[f64]) -> Option<LocationScatter>;
}

/// Group mean with the ordinary sample covariance.
#[derive(Debug, Clone, Copy, Default)]
pub struct SampleCovariance;

impl CovarianceEstimator for SampleCovariance {
    fn method(&self) -> CovarianceMethod {
        CovarianceMethod::Sample
    }

    fn estimate(&self, xs: &[f64], ys: &[f64]) -> Option<LocationScatter> {
        let covariance = Covariance2::sample(xs, ys)?;
        if covariance.is_singular() {
            return None;
        }
        Some(LocationScatter {
            center: Point {
                x: mean_or_zero(xs),
                y: mean_or_zero(ys),
            },
            covariance,
        })
    }
}

/// Minimum Covariance Determinant estimator.
///
/// # Algorithm
///
/// 1. For each start subset (whole group, nearest to the coordinate-wise
///    median, nearest to a spread of individual shots) run concentration
///    steps: fit mean/covariance on the subset, keep the `h` shots with the
///    smallest distances, repeat until the determinant stops decreasing.
/// 2. Keep the subset with the smallest determinant.
/// 3. Consistency correction: scale by median(d²) / χ²₀.₅(2).
/// 4. Reweight: refit on the shots with d² ≤ χ²₀.₉₇₅(2).
#[derive(Debug, Clone, Copy)]
pub struct MinimumCovarianceDeterminant {
    /// Share of the group in the concentration subset. `None` uses
    /// h = ⌊(n + 3) / 2⌋, the maximal-breakdown choice.
    pub support_fraction: Option<f64>,
    /// Concentration steps per start.
    pub max_steps: usize,
    /// Upper bound on the number of single-shot starts.
    pub max_starts: usize,
}

impl Default for MinimumCovarianceDeterminant {
    fn default() -> Self {
        Self {
            support_fraction: None,
            max_steps: 30,
            max_starts: 20,
        }
    }
}

impl MinimumCovarianceDeterminant {
    fn subset_size(&self, n: usize) -> usize {
        let h = match self.support_fraction {
            Some(f) if f.is_finite() && f > 0.0 => (f * n as f64).ceil() as usize,
            _ => (n + 3) / 2,
        };
        h.clamp(MIN_CLEAN_SHOTS, n)
    }

    /// Runs concentration steps from `start`; returns the final determinant
    /// and subset.
    fn concentrate(
        &self,
        xs: &[f64],
        ys: &[f64],
        start: Vec<usize>,
        h: usize,
    ) -> Option<(f64, Vec<usize>)> {
        let mut subset = start;
        let mut fit = LocationScatter::of_subset(xs, ys, &subset)?;
        if fit.covariance.is_singular() {
            return None;
        }
        let mut det = fit.covariance.determinant();

        for _ in 0..self.max_steps {
            let distances = fit.distances(xs, ys)?;
            let next = smallest_indices(&distances, h);
            let Some(next_fit) = LocationScatter::of_subset(xs, ys, &next) else {
                break;
            };
            if next_fit.covariance.is_singular() {
                break;
            }
            let next_det = next_fit.covariance.determinant();
            if next_det >= det * (1.0 - 1e-12) {
                break;
            }
            subset = next;
            fit = next_fit;
            det = next_det;
        }
        Some((det, subset))
    }

    fn starts(&self, xs: &[f64], ys: &[f64], h: usize) -> Vec<Vec<usize>> {
        let n = xs.len();
        let mut starts = Vec::new();

        if let Some(full) = SampleCovariance.estimate(xs, ys) {
            if let Some(d) = full.distances(xs, ys) {
                starts.push(smallest_indices(&d, h));
            }
        }
        if let (Some(mx), Some(my)) = (stats::median(xs), stats::median(ys)) {
            starts.push(nearest_indices(xs, ys, mx, my, h));
        }
        let stride = (n / self.max_starts.max(1)).max(1);
        for i in (0..n).step_by(stride) {
            starts.push(nearest_indices(xs, ys, xs[i], ys[i], h));
        }
        starts
    }
}

impl CovarianceEstimator for MinimumCovarianceDeterminant {
    fn method(&self) -> CovarianceMethod {
        CovarianceMethod::Robust
    }

    fn estimate(&self, xs: &[f64], ys: &[f64]) -> Option<LocationScatter> {
        let n = xs.len();
        if n < MIN_SHOTS || n != ys.len() {
            return None;
        }
        let h = self.subset_size(n);

        let mut best: Option<(f64, Vec<usize>)> = None;
        for start in self.starts(xs, ys, h) {
            if let Some((det, subset)) = self.concentrate(xs, ys, start, h) {
                if best.as_ref().map_or(true, |(d, _)| det < *d) {
                    best = Some((det, subset));
                }
            }
        }
        let (_, subset) = best?;
        let raw = LocationScatter::of_subset(xs, ys, &subset)?;

        let raw_distances = raw.distances(xs, ys)?;
        let median = stats::median(&raw_distances)?;
        let chi2_median = chi_squared_quantile(0.5, 2.0)?;
        if !(median > 0.0) {
            return None;
        }
        let corrected = LocationScatter {
            center: raw.center,
            covariance: raw.covariance.scaled(median / chi2_median),
        };

        let cutoff = chi_squared_quantile(DEFAULT_FLIER_QUANTILE, 2.0)?;
        let inliers: Vec<usize> = corrected
            .distances(xs, ys)?
            .iter()
            .enumerate()
            .filter(|&(_, &d)| d <= cutoff)
            .map(|(i, _)| i)
            .collect();
        if inliers.len() < MIN_CLEAN_SHOTS {
            return Some(corrected);
        }
        let reweighted = LocationScatter::of_subset(xs, ys, &inliers)?;
        if reweighted.covariance.is_singular() {
            return Some(corrected);
        }
        Some(reweighted)
    }
}

/// Indices of the `h` smallest values.
fn smallest_indices(values: &[f64], h: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));
    order.truncate(h);
    order
}

/// Indices of the `h` points closest to `(cx, cy)`.
fn nearest_indices(xs: &[f64], ys: &[f64], cx: f64, cy: f64, h: usize) -> Vec<usize> {
    let d: Vec<f64> = xs
        .iter()
        .zip(ys)
        .map(|(&x, &y)| (x - cx).powi(2) + (y - cy).powi(2))
        .collect();
    smallest_indices(&d, h)
}

/// Outcome of a flier screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlierAssessment {
    /// Fewer than 5 shots; no screening performed.
    TooFewShots,
    /// Covariance matrix is singular (e.g. collinear shots).
    CannotCompute,
    NoneDetected,
    /// Under 5% of shots: isolated execution errors.
    Isolated,
    /// Under 15% of shots.
    Moderate,
    /// 15% or more: the group is uniformly large rather than having fliers.
    High,
}

/// Result of [`detect_fliers`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlierReport {
    pub n: usize,
    pub flier_indices: Vec<usize>,
    pub flier_count: usize,
    pub flier_pct: f64,
    /// DRMS without the fliers.
    pub clean_sigma: f64,
    /// DRMS of the whole group.
    pub full_sigma: f64,
    /// Squared-distance cut-off.
    pub threshold: f64,
    /// Estimator that produced the distances; `None` when screening did not run.
    pub estimator: Option<CovarianceMethod>,
    /// The requested robust estimator failed and the sample covariance was used.
    pub fell_back: bool,
    pub assessment: FlierAssessment,
}

impl FlierReport {
    pub fn interpretation(&self) -> String {
        match self.assessment {
            FlierAssessment::TooFewShots => "Too few shots for flier detection".to_string(),
            FlierAssessment::CannotCompute => "Cannot compute - singular covariance".to_string(),
            FlierAssessment::NoneDetected => "No statistical outliers detected".to_string(),
            FlierAssessment::Isolated => format!(
                "{} flier(s) detected - isolated execution errors",
                self.flier_count
            ),
            FlierAssessment::Moderate => format!(
                "{} fliers ({:.0}%) - consider form consistency drills",
                self.flier_count, self.flier_pct
            ),
            FlierAssessment::High => format!(
                "High flier rate ({:.0}%) - uniformly large group, not isolated errors",
                self.flier_pct
            ),
        }
    }

    fn unscreened(n: usize, full_sigma: f64, threshold: f64, assessment: FlierAssessment) -> Self {
        Self {
            n,
            flier_indices: Vec::new(),
            flier_count: 0,
            flier_pct: 0.0,
            clean_sigma: full_sigma,
            full_sigma,
            threshold,
            estimator: None,
            fell_back: false,
            assessment,
        }
    }
}

/// Screens a group for fliers with the [`MinimumCovarianceDeterminant`]
/// estimator and the default 0.975 cut-off.
///
/// Under the sample covariance no d² can exceed (n − 1)²/n, which stays
/// below 7.38 for groups of 8 or fewer.
///
/// # Examples
///
/// ```
/// use u_archery::group::{detect_fliers, FlierAssessment};
///
/// let mut xs = vec![0.1, -0.2, 0.3, -0.1, 0.0, 0.2, -0.3, 0.15, -0.05, 0.25, -0.15, 0.05];
/// let mut ys = vec![0.0, 0.2, -0.1, 0.3, -0.2, 0.1, 0.05, -0.25, 0.15, -0.05, -0.15, 0.25];
/// xs.push(12.0);
/// ys.push(9.0);
///
/// let report = detect_fliers(&xs, &ys).unwrap();
/// assert!(report.flier_indices.contains(&12));
/// assert!(report.clean_sigma < report.full_sigma);
/// ```
pub fn detect_fliers(xs: &[f64], ys: &[f64]) -> Result<FlierReport> {
    detect_fliers_with(
        xs,
        ys,
        &MinimumCovarianceDeterminant::default(),
        DEFAULT_FLIER_QUANTILE,
    )
}

/// Screens a group for fliers with an explicit estimator and cut-off
/// quantile.
///
/// # Errors
///
/// Mismatched or non-finite coordinates, `quantile` outside (0, 1).
pub fn detect_fliers_with<E>(xs: &[f64], ys: &[f64], estimator: &E, quantile: f64) -> Result<FlierReport>
where
    E: CovarianceEstimator + ?Sized,
{
    ensure_coordinates(xs, ys)?;
    ensure_probability("flier quantile", quantile)?;
    let threshold = chi_squared_quantile(quantile, 2.0)
        .ok_or_else(|| AnalysisError::invalid("flier quantile", quantile, "no χ² quantile"))?;

    let n = xs.len();
    let full_sigma = drms_unchecked(xs, ys);
    if n < MIN_SHOTS {
        tracing::debug!(n, "too few shots for flier detection");
        return Ok(FlierReport::unscreened(
            n,
            full_sigma,
            threshold,
            FlierAssessment::TooFewShots,
        ));
    }

    let mut method = estimator.method();
    let mut fell_back = false;
    let mut fit = estimator.estimate(xs, ys);
    if fit.is_none() && method != CovarianceMethod::Sample {
        tracing::debug!(n, ?method, "estimator failed, falling back to sample covariance");
        fit = SampleCovariance.estimate(xs, ys);
        method = CovarianceMethod::Sample;
        fell_back = true;
    }
    let Some(distances) = fit.and_then(|f| f.distances(xs, ys)) else {
        tracing::debug!(n, "singular covariance, flier detection skipped");
        return Ok(FlierReport::unscreened(
            n,
            full_sigma,
            threshold,
            FlierAssessment::CannotCompute,
        ));
    };

    let flier_indices: Vec<usize> = distances
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d > threshold)
        .map(|(i, _)| i)
        .collect();
    let flier_count = flier_indices.len();

    let clean_sigma = if flier_count > 0 && n - flier_count >= MIN_CLEAN_SHOTS {
        let (clean_x, clean_y): (Vec<f64>, Vec<f64>) = (0..n)
            .filter(|i| flier_indices.binary_search(i).is_err())
            .map(|i| (xs[i], ys[i]))
            .unzip();
        drms_unchecked(&clean_x, &clean_y)
    } else {
        full_sigma
    };

    let flier_pct = flier_count as f64 / n as f64 * 100.0;
    let assessment = if flier_count == 0 {
        FlierAssessment::NoneDetected
    } else if flier_pct < 5.0 {
        FlierAssessment::Isolated
    } else if flier_pct < 15.0 {
        FlierAssessment::Moderate
    } else {
        FlierAssessment::High
    };

    Ok(FlierReport {
        n,
        flier_indices,
        flier_count,
        flier_pct,
        clean_sigma,
        full_sigma,
        threshold,
        estimator: Some(method),
        fell_back,
        assessment,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tight_group() -> (Vec<f64>, Vec<f64>) {
        let xs = vec![
            0.1, -0.2, 0.3, -0.1, 0.0, 0.2, -0.3, 0.15, -0.05, 0.25, -0.15, 0.05, -0.25, 0.1, -0.1,
        ];
        let ys = vec![
            0.0, 0.2, -0.1, 0.3, -0.2, 0.1, 0.05, -0.25, 0.15, -0.05, -0.15, 0.25, -0.3, -0.1, 0.1,
        ];
        (xs, ys)
    }

    #[test]
    fn injected_outlier_is_flagged() {
        let (mut xs, mut ys) = tight_group();
        xs.push(15.0);
        ys.push(12.0);
        let r = detect_fliers_with(&xs, &ys, &SampleCovariance, DEFAULT_FLIER_QUANTILE)
            .expect("valid");
        assert!(r.flier_count >= 1);
        assert!(r.flier_indices.contains(&15));
        assert!(r.clean_sigma < r.full_sigma);
        assert_eq!(r.estimator, Some(CovarianceMethod::Sample));
        assert!(!r.fell_back);
        assert!((r.threshold - 7.3778).abs() < 1e-3);
    }

    #[test]
    fn robust_estimator_flags_outlier() {
        let (mut xs, mut ys) = tight_group();
        xs.push(15.0);
        ys.push(12.0);
        let r = detect_fliers_with(
            &xs,
            &ys,
            &MinimumCovarianceDeterminant::default(),
            DEFAULT_FLIER_QUANTILE,
        )
        .expect("valid");
        assert_eq!(r.estimator, Some(CovarianceMethod::Robust));
        assert!(r.flier_indices.contains(&15));
        assert!(r.clean_sigma < r.full_sigma);
    }

    #[test]
    fn robust_estimator_resists_masking() {
        // Two fliers close together inflate the sample covariance enough to
        // hide each other; the robust fit does not.
        let (mut xs, mut ys) = tight_group();
        xs.extend([8.0, 8.3]);
        ys.extend([7.5, 7.9]);
        let robust = detect_fliers_with(
            &xs,
            &ys,
            &MinimumCovarianceDeterminant::default(),
            DEFAULT_FLIER_QUANTILE,
        )
        .expect("valid");
        assert!(robust.flier_indices.contains(&15));
        assert!(robust.flier_indices.contains(&16));
    }

    #[test]
    fn robust_location_ignores_outlier() {
        let (mut xs, mut ys) = tight_group();
        xs.push(15.0);
        ys.push(12.0);
        let fit = MinimumCovarianceDeterminant::default()
            .estimate(&xs, &ys)
            .expect("non-singular");
        assert!(fit.center.x.abs() < 0.2, "center x = {}", fit.center.x);
        assert!(fit.center.y.abs() < 0.2, "center y = {}", fit.center.y);
    }

    #[test]
    fn default_detector_flags_outlier_in_an_end() {
        let xs = [0.1, -0.1, 0.2, -0.2, 0.0, 0.1, -0.1, 30.0];
        let ys = [0.0, 0.1, -0.1, 0.2, -0.2, 0.1, -0.1, 30.0];
        let r = detect_fliers(&xs, &ys).expect("valid");
        assert_eq!(r.estimator, Some(CovarianceMethod::Robust));
        assert!(!r.fell_back);
        assert_eq!(r.flier_indices, vec![7]);
        assert_eq!(r.assessment, FlierAssessment::Moderate);
        assert!(r.clean_sigma < r.full_sigma);

        // The sample covariance cannot reach the cut-off with 8 shots.
        let sample = detect_fliers_with(&xs, &ys, &SampleCovariance, DEFAULT_FLIER_QUANTILE)
            .expect("valid");
        assert_eq!(sample.flier_count, 0);
    }

    #[test]
    fn small_symmetric_group_has_no_fliers() {
        // With 8 shots the sample-covariance distance is at most 49/8 < 7.38.
        let xs = [1.0, -1.0, 0.0, 0.0, 0.7, -0.7, 0.7, -0.7];
        let ys = [0.0, 0.0, 1.0, -1.0, 0.7, 0.7, -0.7, -0.7];
        let r = detect_fliers_with(&xs, &ys, &SampleCovariance, DEFAULT_FLIER_QUANTILE)
            .expect("valid");
        assert_eq!(r.assessment, FlierAssessment::NoneDetected);
        assert_eq!(r.flier_count, 0);
        assert_eq!(r.clean_sigma, r.full_sigma);
    }

    #[test]
    fn too_few_shots() {
        let r = detect_fliers(&[0.0, 1.0, 2.0, 0.5], &[0.0, 1.0, 0.0, 0.3]).expect("valid");
        assert_eq!(r.assessment, FlierAssessment::TooFewShots);
        assert_eq!(r.estimator, None);
        assert_eq!(r.interpretation(), "Too few shots for flier detection");
    }

    #[test]
    fn collinear_group_cannot_compute() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [0.0, 0.5, 1.0, 1.5, 2.0, 2.5];
        let r = detect_fliers(&xs, &ys).expect("valid");
        assert_eq!(r.assessment, FlierAssessment::CannotCompute);
        assert_eq!(r.flier_count, 0);
        assert!(r.fell_back);
    }

    #[test]
    fn robust_falls_back_on_degenerate_core() {
        // More than half the shots share one hole: every h-subset is singular,
        // but the whole group is not.
        let xs = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, -1.0, 0.5];
        let ys = [0.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.8, -1.0];
        let r = detect_fliers_with(
            &xs,
            &ys,
            &MinimumCovarianceDeterminant::default(),
            DEFAULT_FLIER_QUANTILE,
        )
        .expect("valid");
        assert!(r.fell_back);
        assert_eq!(r.estimator, Some(CovarianceMethod::Sample));
    }

    /// Fixed location and scatter, so the tests decide who is far out.
    struct FixedScatter(LocationScatter);

    impl CovarianceEstimator for FixedScatter {
        fn method(&self) -> CovarianceMethod {
            CovarianceMethod::Sample
        }

        fn estimate(&self, _xs: &[f64], _ys: &[f64]) -> Option<LocationScatter> {
            Some(self.0)
        }
    }

    #[test]
    fn clean_sigma_needs_three_remaining_shots() {
        let estimator = FixedScatter(LocationScatter {
            center: Point { x: 0.0, y: 0.0 },
            covariance: Covariance2 {
                xx: 0.01,
                xy: 0.0,
                yy: 0.01,
            },
        });
        // Two shots at the centre, four far out: only 2 would remain.
        let xs = [0.0, 0.001, 5.0, -5.0, 5.0, -5.0];
        let ys = [0.0, 0.001, 5.0, 5.0, -5.0, -5.0];
        let r = detect_fliers_with(&xs, &ys, &estimator, DEFAULT_FLIER_QUANTILE).expect("valid");
        assert_eq!(r.flier_count, 4);
        assert_eq!(r.flier_indices, vec![2, 3, 4, 5]);
        assert_eq!(r.clean_sigma, r.full_sigma);

        // With three at the centre the clean sigma drops.
        let xs = [0.0, 0.001, -0.001, 5.0, -5.0, 5.0];
        let ys = [0.0, 0.001, 0.001, 5.0, 5.0, -5.0];
        let r = detect_fliers_with(&xs, &ys, &estimator, DEFAULT_FLIER_QUANTILE).expect("valid");
        assert_eq!(r.flier_count, 3);
        assert!(r.clean_sigma < 0.01);
        assert!(r.full_sigma > 1.0);
    }

    #[test]
    fn interpretation_tiers() {
        let mut r = FlierReport::unscreened(40, 1.0, 7.38, FlierAssessment::Isolated);
        r.flier_count = 1;
        r.flier_pct = 2.5;
        assert_eq!(r.interpretation(), "1 flier(s) detected - isolated execution errors");
        r.assessment = FlierAssessment::Moderate;
        r.flier_count = 4;
        r.flier_pct = 10.0;
        assert!(r.interpretation().starts_with("4 fliers (10%)"));
        r.assessment = FlierAssessment::High;
        r.flier_pct = 20.0;
        assert!(r.interpretation().starts_with("High flier rate (20%)"));
    }

    #[test]
    fn invalid_input() {
        assert!(detect_fliers(&[0.0; 5], &[0.0; 4]).is_err());
        assert!(detect_fliers_with(&[0.0; 5], &[0.0; 5], &SampleCovariance, 1.2).is_err());
    }
}
