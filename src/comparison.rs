//! Statistical comparison of two equipment setups.
//!
//! Each setup contributes per-session average scores and per-session group
//! sigmas. Scores and sigmas are compared separately with Welch's t-test;
//! the score difference also gets Cohen's d.
//!
//! # Examples
//!
//! ```
//! use u_archery::comparison::{compare_equipment, SetupSeries};
//!
//! let carbon = SetupSeries { name: "Carbon", scores: &[8.5, 8.7, 8.6, 8.4, 8.8], sigmas: &[] };
//! let alloy = SetupSeries { name: "Alloy", scores: &[7.0, 7.2, 7.1, 6.9, 7.3], sigmas: &[] };
//! let cmp = compare_equipment(&carbon, &alloy).unwrap();
//! assert!(cmp.score_significant);
//! assert!(cmp.interpretation().starts_with("Carbon scores significantly higher than Alloy"));
//! ```

use serde::Serialize;
use u_numflow::special;
use u_numflow::stats;

use crate::config::AnalysisConfig;
use crate::error::{ensure_finite_series, ensure_probability, Result};

/// Pooled standard deviation below which Cohen's d is reported as 0.
const POOLED_STD_FLOOR: f64 = 0.001;
const DEFAULT_ALPHA: f64 = 0.05;

/// Result of a hypothesis test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestResult {
    pub statistic: f64,
    /// Degrees of freedom (fractional for Welch).
    pub df: f64,
    /// Two-tailed p-value.
    pub p_value: f64,
}

/// Two-sample Welch t-test: H₀: μ₁ = μ₂ (unequal variances).
///
/// # Algorithm
///
/// t = (x̄₁ - x̄₂) / √(s₁²/n₁ + s₂²/n₂)
/// df = Welch-Satterthwaite approximation.
///
/// # Returns
///
/// `None` if either sample has fewer than 2 observations, contains
/// non-finite values, or both samples have zero variance.
///
/// # References
///
/// Welch (1947). "The generalization of Student's problem when several
/// different population variances are involved". Biometrika, 34, 28–35.
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Option<TestResult> {
    let n1 = a.len();
    let n2 = b.len();
    if n1 < 2 || n2 < 2 {
        return None;
    }
    if a.iter().any(|v| !v.is_finite()) || b.iter().any(|v| !v.is_finite()) {
        return None;
    }

    let v1 = stats::variance(a)? / n1 as f64;
    let v2 = stats::variance(b)? / n2 as f64;
    let se_sq = v1 + v2;
    if se_sq < 1e-300 {
        return None;
    }

    let t = (stats::mean(a)? - stats::mean(b)?) / se_sq.sqrt();
    let df = se_sq.powi(2) / (v1 * v1 / (n1 as f64 - 1.0) + v2 * v2 / (n2 as f64 - 1.0));
    let p_value = 2.0 * (1.0 - special::t_distribution_cdf(t.abs(), df));

    Some(TestResult {
        statistic: t,
        df,
        p_value: p_value.clamp(0.0, 1.0),
    })
}

/// Cohen's d with the average-variance pooled standard deviation,
/// `(x̄_a − x̄_b) / √((s_a² + s_b²) / 2)`.
///
/// `None` for fewer than 2 values in either sample; 0 when the pooled
/// standard deviation is at most 0.001.
pub fn cohens_d(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() < 2 || b.len() < 2 {
        return None;
    }
    let diff = stats::mean(a)? - stats::mean(b)?;
    let pooled = ((stats::variance(a)? + stats::variance(b)?) / 2.0).sqrt();
    Some(if pooled > POOLED_STD_FLOOR {
        diff / pooled
    } else {
        0.0
    })
}

/// Session history of one equipment setup.
#[derive(Debug, Clone, Copy)]
pub struct SetupSeries<'a> {
    pub name: &'a str,
    /// Average arrow score per session.
    pub scores: &'a [f64],
    /// Group sigma (cm) per session.
    pub sigmas: &'a [f64],
}

/// Result of [`compare_equipment`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EquipmentComparison {
    pub setup_a: String,
    pub setup_b: String,
    /// Both setups have at least 2 scored sessions.
    pub sufficient_data: bool,
    /// mean(A) − mean(B).
    pub score_diff: f64,
    pub score_p_value: f64,
    pub score_cohens_d: f64,
    /// mean sigma(A) − mean sigma(B); negative means A groups tighter.
    pub sigma_diff: f64,
    pub sigma_p_value: f64,
    pub score_significant: bool,
    pub sigma_significant: bool,
    pub alpha: f64,
}

impl EquipmentComparison {
    pub fn interpretation(&self) -> String {
        if !self.sufficient_data {
            return "Need at least 2 sessions with each setup for comparison".to_string();
        }
        let (a, b) = (&self.setup_a, &self.setup_b);
        let mut text = if self.score_significant && self.score_diff > 0.0 {
            format!(
                "{a} scores significantly higher than {b} (p={:.3}, d={:.2})",
                self.score_p_value, self.score_cohens_d
            )
        } else if self.score_significant && self.score_diff < 0.0 {
            format!(
                "{b} scores significantly higher than {a} (p={:.3}, d={:.2})",
                self.score_p_value,
                self.score_cohens_d.abs()
            )
        } else {
            format!(
                "No significant scoring difference between {a} and {b} (p={:.3})",
                self.score_p_value
            )
        };
        if self.sigma_significant {
            let tighter = if self.sigma_diff < 0.0 { a } else { b };
            text.push_str(&format!(
                ". {tighter} produces tighter groups (p={:.3}).",
                self.sigma_p_value
            ));
        }
        text
    }
}

/// Compares two setups at α = 0.05.
///
/// # Errors
///
/// Non-finite scores or sigmas.
pub fn compare_equipment(a: &SetupSeries<'_>, b: &SetupSeries<'_>) -> Result<EquipmentComparison> {
    compare_equipment_at(a, b, DEFAULT_ALPHA)
}

/// Compares two setups at the configured `significance_level`.
///
/// # Errors
///
/// An invalid `config`, non-finite scores or sigmas.
pub fn compare_equipment_with(
    a: &SetupSeries<'_>,
    b: &SetupSeries<'_>,
    config: &AnalysisConfig,
) -> Result<EquipmentComparison> {
    config.validate()?;
    compare_equipment_at(a, b, config.significance_level)
}

/// Compares two setups at significance level `alpha`.
///
/// # Errors
///
/// Non-finite scores or sigmas, `alpha` outside (0, 1).
pub fn compare_equipment_at(
    a: &SetupSeries<'_>,
    b: &SetupSeries<'_>,
    alpha: f64,
) -> Result<EquipmentComparison> {
    ensure_probability("significance level", alpha)?;
    for series in [a, b] {
        ensure_finite_series("setup scores", series.scores)?;
        ensure_finite_series("setup sigmas", series.sigmas)?;
    }

    let mut result = EquipmentComparison {
        setup_a: a.name.to_string(),
        setup_b: b.name.to_string(),
        sufficient_data: false,
        score_diff: 0.0,
        score_p_value: 1.0,
        score_cohens_d: 0.0,
        sigma_diff: 0.0,
        sigma_p_value: 1.0,
        score_significant: false,
        sigma_significant: false,
        alpha,
    };
    if a.scores.len() < 2 || b.scores.len() < 2 {
        tracing::debug!(
            a = a.scores.len(),
            b = b.scores.len(),
            "not enough sessions for equipment comparison"
        );
        return Ok(result);
    }

    result.sufficient_data = true;
    result.score_diff = stats::mean(a.scores).unwrap_or(0.0) - stats::mean(b.scores).unwrap_or(0.0);
    result.score_p_value = welch_t_test(a.scores, b.scores).map_or(1.0, |t| t.p_value);
    result.score_cohens_d = cohens_d(a.scores, b.scores).unwrap_or(0.0);

    if let (Some(ma), Some(mb)) = (stats::mean(a.sigmas), stats::mean(b.sigmas)) {
        result.sigma_diff = ma - mb;
    }
    result.sigma_p_value = welch_t_test(a.sigmas, b.sigmas).map_or(1.0, |t| t.p_value);

    result.score_significant = result.score_p_value < alpha;
    result.sigma_significant = result.sigma_p_value < alpha;
    Ok(result)
}
