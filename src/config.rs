//! Analysis configuration.
//!
//! Every tunable constant used by [`crate::report::GroupReport`],
//! [`crate::comparison::compare_equipment_with`] and the trend helpers lives
//! in [`AnalysisConfig`]. Defaults: 95% Rayleigh interval, 90% ellipse,
//! robust χ²₀.₉₇₅ flier cut-off, α = 0.05, λ = 0.2 / L = 2.7 EWMA and
//! 50 000 seeded hit-probability draws.
//!
//! # Examples
//!
//! ```
//! use u_archery::config::AnalysisConfig;
//!
//! let config = AnalysisConfig::from_toml_str(r#"
//!     ellipse_coverage = 0.95
//!
//!     [ewma]
//!     lambda = 0.3
//! "#).unwrap();
//! assert_eq!(config.ellipse_coverage, 0.95);
//! assert_eq!(config.ewma.lambda, 0.3);
//! assert_eq!(config.ewma.l_factor, 2.7); // untouched fields keep defaults
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::group::CovarianceMethod;

/// Tunable parameters for group and trend analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Confidence level of the Rayleigh sigma interval.
    pub rayleigh_confidence: f64,
    /// Coverage probability of the confidence ellipse.
    pub ellipse_coverage: f64,
    /// χ²(2) quantile used as the flier cut-off.
    pub flier_quantile: f64,
    /// Covariance estimator used for flier detection.
    pub flier_estimator: CovarianceMethod,
    /// Significance level for equipment comparisons.
    pub significance_level: f64,
    pub ewma: EwmaConfig,
    pub hit_probability: HitProbabilityConfig,
}

/// EWMA chart parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EwmaConfig {
    /// Smoothing constant in (0, 1].
    pub lambda: f64,
    /// Control limit width in multiples of the EWMA standard error.
    pub l_factor: f64,
}

/// Monte Carlo hit-probability parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitProbabilityConfig {
    pub samples: usize,
    pub seed: u64,
    /// Per-axis sigma floor in cm.
    pub sigma_floor: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            rayleigh_confidence: 0.95,
            ellipse_coverage: 0.9,
            flier_quantile: 0.975,
            flier_estimator: CovarianceMethod::Robust,
            significance_level: 0.05,
            ewma: EwmaConfig::default(),
            hit_probability: HitProbabilityConfig::default(),
        }
    }
}

impl Default for EwmaConfig {
    fn default() -> Self {
        Self {
            lambda: 0.2,
            l_factor: 2.7,
        }
    }
}

impl Default for HitProbabilityConfig {
    fn default() -> Self {
        Self {
            samples: 50_000,
            seed: 42,
            sigma_floor: 0.01,
        }
    }
}

impl AnalysisConfig {
    /// Parses a TOML document and validates the result.
    ///
    /// Missing keys fall back to their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| AnalysisError::Config(e.to_string()))?;
        config.validate()?;
        tracing::debug!(?config, "loaded analysis config");
        Ok(config)
    }

    /// Checks every parameter against its admissible range.
    pub fn validate(&self) -> Result<()> {
        let open_unit = [
            ("rayleigh_confidence", self.rayleigh_confidence),
            ("ellipse_coverage", self.ellipse_coverage),
            ("flier_quantile", self.flier_quantile),
            ("significance_level", self.significance_level),
        ];
        for (name, value) in open_unit {
            if !(value > 0.0 && value < 1.0) {
                return Err(AnalysisError::Config(format!(
                    "{name} must lie in (0, 1), got {value}"
                )));
            }
        }
        if !(self.ewma.lambda > 0.0 && self.ewma.lambda <= 1.0) {
            return Err(AnalysisError::Config(format!(
                "ewma.lambda must lie in (0, 1], got {}",
                self.ewma.lambda
            )));
        }
        if !(self.ewma.l_factor.is_finite() && self.ewma.l_factor > 0.0) {
            return Err(AnalysisError::Config(format!(
                "ewma.l_factor must be positive, got {}",
                self.ewma.l_factor
            )));
        }
        if self.hit_probability.samples == 0 {
            return Err(AnalysisError::Config(
                "hit_probability.samples must be at least 1".to_string(),
            ));
        }
        if !(self.hit_probability.sigma_floor.is_finite() && self.hit_probability.sigma_floor > 0.0)
        {
            return Err(AnalysisError::Config(format!(
                "hit_probability.sigma_floor must be positive, got {}",
                self.hit_probability.sigma_floor
            )));
        }
        Ok(())
    }
}
