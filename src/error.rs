//! Error type for caller mistakes.
//!
//! Degenerate inputs (empty groups, too few sessions) are not errors: every
//! statistic defines a fallback result for them. `AnalysisError` is reserved
//! for inputs that cannot describe a real shot group or series, such as
//! mismatched coordinate slices or a negative face diameter.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("coordinate slices differ in length: {x} x-values vs {y} y-values")]
    LengthMismatch { x: usize, y: usize },

    #[error("non-finite value in {0}")]
    NonFinite(&'static str),

    #[error("invalid {name}: {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{what} needs at least {required} points, got {got}")]
    InsufficientPoints {
        what: &'static str,
        required: usize,
        got: usize,
    },

    #[error("calibration points are degenerate: {0}")]
    DegenerateCalibration(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn invalid(name: &'static str, value: f64, reason: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            reason,
        }
    }
}

/// Rejects a value that is not finite and strictly positive.
pub(crate) fn ensure_positive(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(AnalysisError::NonFinite(name));
    }
    if value <= 0.0 {
        return Err(AnalysisError::invalid(name, value, "must be positive"));
    }
    Ok(value)
}

/// Rejects a value that is not finite or is negative.
pub(crate) fn ensure_non_negative(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(AnalysisError::NonFinite(name));
    }
    if value < 0.0 {
        return Err(AnalysisError::invalid(name, value, "must not be negative"));
    }
    Ok(value)
}

/// Rejects a probability outside the open interval (0, 1).
pub(crate) fn ensure_probability(name: &'static str, value: f64) -> Result<f64> {
    if !value.is_finite() {
        return Err(AnalysisError::NonFinite(name));
    }
    if value <= 0.0 || value >= 1.0 {
        return Err(AnalysisError::invalid(name, value, "must lie in (0, 1)"));
    }
    Ok(value)
}

/// Rejects a series containing NaN or infinities.
pub(crate) fn ensure_finite_series(name: &'static str, data: &[f64]) -> Result<()> {
    if data.iter().any(|v| !v.is_finite()) {
        return Err(AnalysisError::NonFinite(name));
    }
    Ok(())
}

/// Validates a pair of coordinate slices: equal length, all finite.
pub(crate) fn ensure_coordinates(xs: &[f64], ys: &[f64]) -> Result<()> {
    if xs.len() != ys.len() {
        return Err(AnalysisError::LengthMismatch {
            x: xs.len(),
            y: ys.len(),
        });
    }
    ensure_finite_series("x coordinates", xs)?;
    ensure_finite_series("y coordinates", ys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_length_mismatch() {
        let err = ensure_coordinates(&[1.0, 2.0], &[1.0]).unwrap_err();
        assert_eq!(err, AnalysisError::LengthMismatch { x: 2, y: 1 });
    }

    #[test]
    fn coordinates_reject_nan() {
        let err = ensure_coordinates(&[1.0, f64::NAN], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, AnalysisError::NonFinite("x coordinates"));
    }

    #[test]
    fn positive_guard() {
        assert!(ensure_positive("face diameter", 40.0).is_ok());
        assert!(ensure_positive("face diameter", 0.0).is_err());
        assert!(ensure_positive("face diameter", f64::INFINITY).is_err());
    }

    #[test]
    fn probability_guard() {
        assert!(ensure_probability("confidence", 0.95).is_ok());
        assert!(ensure_probability("confidence", 1.0).is_err());
        assert!(ensure_probability("confidence", 0.0).is_err());
    }

    #[test]
    fn error_messages_name_the_parameter() {
        let err = AnalysisError::invalid("lambda", 1.5, "must lie in (0, 1]");
        assert_eq!(err.to_string(), "invalid lambda: 1.5 (must lie in (0, 1])");
    }
}
