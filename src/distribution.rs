//! Distribution helpers.
//!
//! Chi-squared quantiles, empirical percentiles and population moments used
//! by the group and trend modules. CDFs and sample moments come from
//! `u_numflow`; this module only inverts and rescales them.
//!
//! # Examples
//!
//! ```
//! use u_archery::distribution::chi_squared_quantile;
//!
//! // The 97.5% point of χ²(2) is the flier cut-off.
//! let q = chi_squared_quantile(0.975, 2.0).unwrap();
//! assert!((q - 7.3778).abs() < 1e-3);
//! ```

use u_numflow::special;
use u_numflow::stats;

/// Relative bracket width at which bisection stops.
const QUANTILE_TOLERANCE: f64 = 1e-12;
const MAX_BISECTION_STEPS: usize = 200;
const MAX_BRACKET_DOUBLINGS: usize = 64;

/// Quantile (inverse CDF) of the chi-squared distribution with `df` degrees
/// of freedom.
///
/// # Algorithm
///
/// For 2 dof the distribution is exponential with mean 2, so
/// q = −2·ln(1 − p). Otherwise the upper bracket starts at max(df, 1) and is
/// doubled until CDF(hi) ≥ p, after which the bracket is bisected against
/// `u_numflow::special::chi_squared_cdf`.
///
/// # Returns
///
/// `None` if `p` is outside (0, 1) or `df` is not positive and finite.
pub fn chi_squared_quantile(p: f64, df: f64) -> Option<f64> {
    if !(p > 0.0 && p < 1.0) || !df.is_finite() || df <= 0.0 {
        return None;
    }
    if (df - 2.0).abs() < 1e-12 {
        return Some(-2.0 * (-p).ln_1p());
    }

    let mut lo = 0.0;
    let mut hi = df.max(1.0);
    let mut doublings = 0;
    while special::chi_squared_cdf(hi, df) < p {
        lo = hi;
        hi *= 2.0;
        doublings += 1;
        if doublings > MAX_BRACKET_DOUBLINGS {
            return None;
        }
    }

    for _ in 0..MAX_BISECTION_STEPS {
        let mid = 0.5 * (lo + hi);
        if special::chi_squared_cdf(mid, df) < p {
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo <= QUANTILE_TOLERANCE * hi.max(1.0) {
            break;
        }
    }
    Some(0.5 * (lo + hi))
}

/// Empirical percentile with linear interpolation between order statistics.
///
/// `q` is a fraction in [0, 1]. Returns `None` for empty data.
pub fn percentile(data: &[f64], q: f64) -> Option<f64> {
    if data.is_empty() {
        return None;
    }
    if data.len() == 1 {
        return Some(data[0]);
    }
    stats::quantile(data, q.clamp(0.0, 1.0))
}

/// Population variance (divides by n).
///
/// `None` for empty data; a single observation has zero variance.
pub fn population_variance(data: &[f64]) -> Option<f64> {
    let n = data.len();
    match n {
        0 => None,
        1 => Some(0.0),
        _ => {
            let sample = stats::variance(data)?;
            Some((sample * (n - 1) as f64 / n as f64).max(0.0))
        }
    }
}

/// Population standard deviation (divides by n).
pub fn population_std_dev(data: &[f64]) -> Option<f64> {
    population_variance(data).map(f64::sqrt)
}

/// Arithmetic mean, 0 for empty data.
pub(crate) fn mean_or_zero(data: &[f64]) -> f64 {
    stats::mean(data).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chi2_two_dof_closed_form() {
        let q = chi_squared_quantile(0.975, 2.0).expect("valid");
        assert!((q - 7.377_758_908).abs() < 1e-6, "q = {q}");

        let q = chi_squared_quantile(0.9, 2.0).expect("valid");
        assert!((q - 4.605_170_186).abs() < 1e-6, "q = {q}");

        let q = chi_squared_quantile(0.5, 2.0).expect("valid");
        assert!((q - 2.0 * std::f64::consts::LN_2).abs() < 1e-9, "q = {q}");
    }

    #[test]
    fn chi2_table_values() {
        // Standard χ² table entries.
        let cases: &[(f64, f64, f64)] = &[
            (0.95, 10.0, 18.307),
            (0.975, 8.0, 17.535),
            (0.025, 8.0, 2.180),
            (0.025, 20.0, 9.591),
            (0.975, 20.0, 34.170),
            (0.95, 1.0, 3.841),
        ];
        for &(p, df, expected) in cases {
            let q = chi_squared_quantile(p, df).expect("valid");
            assert!(
                (q - expected).abs() < 5e-3,
                "χ²({df}) quantile at {p}: expected {expected}, got {q}"
            );
        }
    }

    #[test]
    fn chi2_quantile_inverts_cdf() {
        for &df in &[3.0, 6.0, 12.0, 40.0] {
            for &p in &[0.01, 0.25, 0.5, 0.9, 0.99] {
                let q = chi_squared_quantile(p, df).expect("valid");
                let back = special::chi_squared_cdf(q, df);
                assert!((back - p).abs() < 1e-6, "df={df}, p={p}, cdf(q)={back}");
            }
        }
    }

    #[test]
    fn chi2_quantile_rejects_bad_input() {
        assert!(chi_squared_quantile(0.0, 2.0).is_none());
        assert!(chi_squared_quantile(1.0, 2.0).is_none());
        assert!(chi_squared_quantile(0.5, 0.0).is_none());
        assert!(chi_squared_quantile(f64::NAN, 4.0).is_none());
        assert!(chi_squared_quantile(0.5, f64::INFINITY).is_none());
    }

    #[test]
    fn percentile_bounds() {
        let data = [3.0, 1.0, 4.0, 1.5, 9.0, 2.6];
        let p95 = percentile(&data, 0.95).expect("non-empty");
        assert!((1.0..=9.0).contains(&p95));
        let p50 = percentile(&data, 0.5).expect("non-empty");
        assert!(p50 <= p95);
        assert!(percentile(&[], 0.5).is_none());
        assert_eq!(percentile(&[2.5], 0.95), Some(2.5));
    }

    #[test]
    fn population_variance_known_value() {
        let data = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let v = population_variance(&data).expect("non-empty");
        assert!((v - 4.0).abs() < 1e-12, "v = {v}");
        let s = population_std_dev(&data).expect("non-empty");
        assert!((s - 2.0).abs() < 1e-12);
    }

    #[test]
    fn population_variance_degenerate() {
        assert!(population_variance(&[]).is_none());
        assert_eq!(population_variance(&[7.0]), Some(0.0));
        assert_eq!(mean_or_zero(&[]), 0.0);
    }
}
