//! EWMA chart for session-to-session drift.
//!
//! # Algorithm
//!
//! ```text
//! Z_0 = μ,   Z_t = λ·x_t + (1 − λ)·Z_{t−1}
//! UCL_t, LCL_t = μ ± L·σ·√(λ/(2 − λ) · (1 − (1 − λ)^{2t}))
//! ```
//!
//! μ and σ are estimated from the series itself (mean and sample standard
//! deviation), so the chart answers "which sessions drifted away from this
//! archer's usual level". λ = 0.2 suits scores, 0.3 suits group sigmas;
//! L defaults to 2.7.
//!
//! # Reference
//!
//! Roberts, S.W. (1959). "Control Chart Tests Based on Geometric Moving Averages",
//! *Technometrics* 1(3), pp. 239-250.

use serde::Serialize;
use u_numflow::stats;

use crate::config::EwmaConfig;
use crate::error::{ensure_finite_series, AnalysisError, Result};

/// Lower bound on σ so the limits never collapse onto the center line.
const SIGMA_FLOOR: f64 = 1e-6;

/// EWMA chart with a fixed center line and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ewma {
    target: f64,
    sigma: f64,
    lambda: f64,
    l_factor: f64,
}

/// One charted observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EwmaPoint {
    pub index: usize,
    pub value: f64,
    pub ewma: f64,
    pub ucl: f64,
    pub lcl: f64,
    /// The EWMA left the control limits.
    pub signal: bool,
}

/// Result of [`ewma_chart`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EwmaChart {
    pub points: Vec<EwmaPoint>,
    /// Center line μ.
    pub mean: f64,
    /// Process σ used for the limits; 0 when the series is too short to chart.
    pub sigma: f64,
    pub lambda: f64,
    pub l_factor: f64,
}

impl EwmaChart {
    pub fn ewma_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.ewma).collect()
    }

    pub fn signal_indices(&self) -> Vec<usize> {
        self.points
            .iter()
            .filter(|p| p.signal)
            .map(|p| p.index)
            .collect()
    }
}

impl Ewma {
    /// Creates a chart around `target` with scale `sigma`.
    ///
    /// `sigma` is floored at 1e-6.
    ///
    /// # Errors
    ///
    /// Non-finite `target` or `sigma`, negative `sigma`, `lambda` outside
    /// (0, 1], `l_factor` not positive.
    pub fn with_params(target: f64, sigma: f64, lambda: f64, l_factor: f64) -> Result<Self> {
        if !target.is_finite() {
            return Err(AnalysisError::NonFinite("EWMA target"));
        }
        if !sigma.is_finite() || sigma < 0.0 {
            return Err(AnalysisError::invalid("EWMA sigma", sigma, "must be finite and non-negative"));
        }
        if !(lambda > 0.0 && lambda <= 1.0) {
            return Err(AnalysisError::invalid("lambda", lambda, "must lie in (0, 1]"));
        }
        if !(l_factor.is_finite() && l_factor > 0.0) {
            return Err(AnalysisError::invalid("L factor", l_factor, "must be positive"));
        }
        Ok(Self {
            target,
            sigma: sigma.max(SIGMA_FLOOR),
            lambda,
            l_factor,
        })
    }

    /// Control limit half-width at 1-based observation `t`.
    fn control_limit_half_width(&self, t: usize) -> f64 {
        let asymptotic_var = self.lambda / (2.0 - self.lambda);
        let decay = (1.0 - self.lambda).powi((2 * t).min(i32::MAX as usize) as i32);
        self.l_factor * self.sigma * (asymptotic_var * (1.0 - decay)).sqrt()
    }

    /// Charts `data`, starting the EWMA at the target.
    ///
    /// # Complexity
    ///
    /// Time: O(n), Space: O(n)
    pub fn analyze(&self, data: &[f64]) -> Vec<EwmaPoint> {
        let mut z = self.target;
        data.iter()
            .enumerate()
            .map(|(i, &x)| {
                z = self.lambda * x + (1.0 - self.lambda) * z;
                let half_width = self.control_limit_half_width(i + 1);
                let ucl = self.target + half_width;
                let lcl = self.target - half_width;
                EwmaPoint {
                    index: i,
                    value: x,
                    ewma: z,
                    ucl,
                    lcl,
                    signal: z > ucl || z < lcl,
                }
            })
            .collect()
    }
}

/// EWMA chart of `series` with smoothing `lambda` and L = 2.7.
///
/// A series shorter than 2 is returned unchanged as EWMA and both limits,
/// with σ = 0.
///
/// # Errors
///
/// Non-finite values, `lambda` outside (0, 1].
///
/// # Examples
///
/// ```
/// use u_archery::trend::ewma_chart;
///
/// let scores = [8.1, 8.3, 8.0, 8.2, 8.1, 8.4, 8.2, 9.6, 9.8, 9.9];
/// let chart = ewma_chart(&scores, 0.2).unwrap();
/// assert!(chart.points.iter().all(|p| p.ucl > p.lcl));
/// assert!(chart.points.last().unwrap().ewma > chart.mean);
/// ```
pub fn ewma_chart(series: &[f64], lambda: f64) -> Result<EwmaChart> {
    ewma_chart_with(
        series,
        &EwmaConfig {
            lambda,
            ..EwmaConfig::default()
        },
    )
}

/// EWMA chart with explicit λ and L.
pub fn ewma_chart_with(series: &[f64], config: &EwmaConfig) -> Result<EwmaChart> {
    ensure_finite_series("EWMA series", series)?;
    if !(config.lambda > 0.0 && config.lambda <= 1.0) {
        return Err(AnalysisError::invalid("lambda", config.lambda, "must lie in (0, 1]"));
    }

    if series.len() < 2 {
        tracing::debug!(n = series.len(), "series too short for EWMA limits");
        let points = series
            .iter()
            .enumerate()
            .map(|(index, &v)| EwmaPoint {
                index,
                value: v,
                ewma: v,
                ucl: v,
                lcl: v,
                signal: false,
            })
            .collect();
        return Ok(EwmaChart {
            points,
            mean: series.first().copied().unwrap_or(0.0),
            sigma: 0.0,
            lambda: config.lambda,
            l_factor: config.l_factor,
        });
    }

    let mean = stats::mean(series).unwrap_or(0.0);
    let sigma = stats::std_dev(series).unwrap_or(0.0).max(SIGMA_FLOOR);
    let chart = Ewma::with_params(mean, sigma, config.lambda, config.l_factor)?;

    Ok(EwmaChart {
        points: chart.analyze(series),
        mean,
        sigma,
        lambda: config.lambda,
        l_factor: config.l_factor,
    })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn upper_limit_above_lower(
            data in proptest::collection::vec(-1e3_f64..1e3, 2..=60),
            lambda in 0.01_f64..=1.0,
        ) {
            let chart = ewma_chart(&data, lambda).unwrap();
            prop_assert_eq!(chart.points.len(), data.len());
            for p in &chart.points {
                prop_assert!(p.ucl > p.lcl, "ucl {} <= lcl {} at {}", p.ucl, p.lcl, p.index);
            }
        }
    }
}
