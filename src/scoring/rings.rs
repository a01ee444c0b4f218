//! Ring scoring for WA and IFAA Flint faces.
//!
//! # WA faces
//!
//! ```text
//! w           = D / 20
//! ring_index  = ceil(r / w)
//! score       = 10            if ring_index <= 1   (11 for the X when enabled)
//!             = 11 - index    if 2 <= ring_index <= 10
//!             = 0             otherwise (miss)
//! ```
//!
//! # Flint faces
//!
//! Zone radii are 0.1·D (5), 0.2·D (4) and 0.3·D (3); anything outside scores 0.
//!
//! # Examples
//!
//! ```
//! use u_archery::scoring::{ring_score, flint_score};
//!
//! // 40 cm face: ring width 2 cm.
//! assert_eq!(ring_score(0.0, 40.0, false).unwrap(), 10);
//! assert_eq!(ring_score(3.0, 40.0, false).unwrap(), 9);
//! assert_eq!(ring_score(0.5, 40.0, true).unwrap(), 11);
//! assert_eq!(ring_score(25.0, 40.0, false).unwrap(), 0);
//!
//! assert_eq!(flint_score(3.0, 35.0).unwrap(), 5);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, ensure_positive, AnalysisError, Result};

/// Ring system used to score a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoringSystem {
    /// Ten-ring WA face.
    Wa {
        /// Score the inner half of the 10 ring as 11.
        inner_ring_as_11: bool,
    },
    /// IFAA Flint 5/4/3 face.
    Flint,
}

/// A scored impact, coordinates in cm from the face center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Shot {
    pub x: f64,
    pub y: f64,
    pub score: u8,
    /// Whether the impact lies inside the innermost (X) zone.
    pub is_x: bool,
}

impl Shot {
    /// Scores an impact at `(x, y)` on a face of `face_diameter` cm.
    ///
    /// The X zone is half the 10 ring on WA faces and half the 5 zone on
    /// Flint faces.
    pub fn score(x: f64, y: f64, face_diameter: f64, system: ScoringSystem) -> Result<Self> {
        if !x.is_finite() || !y.is_finite() {
            return Err(AnalysisError::NonFinite("shot coordinates"));
        }
        let radius = x.hypot(y);
        let (score, x_radius) = match system {
            ScoringSystem::Wa { inner_ring_as_11 } => (
                ring_score(radius, face_diameter, inner_ring_as_11)?,
                ring_width(face_diameter)? / 2.0,
            ),
            ScoringSystem::Flint => (flint_score(radius, face_diameter)?, 0.05 * face_diameter),
        };
        Ok(Self {
            x,
            y,
            score,
            is_x: radius <= x_radius,
        })
    }

    /// Distance from the face center.
    pub fn radius(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// Width of one WA scoring ring: D / 20.
pub fn ring_width(face_diameter: f64) -> Result<f64> {
    Ok(ensure_positive("face diameter", face_diameter)? / 20.0)
}

/// WA ring score for an impact `radius` cm from the center.
///
/// # Errors
///
/// Negative or non-finite radius, non-positive face diameter.
pub fn ring_score(radius: f64, face_diameter: f64, inner_ring_as_11: bool) -> Result<u8> {
    let radius = ensure_non_negative("radius", radius)?;
    let width = ring_width(face_diameter)?;

    let ring_index = (radius / width).ceil();
    let score = if ring_index <= 1.0 {
        if inner_ring_as_11 && radius <= width / 2.0 {
            11
        } else {
            10
        }
    } else if ring_index <= 10.0 {
        // ring_index is an integer in [2, 10] here
        11 - ring_index as u8
    } else {
        0
    };
    Ok(score)
}

/// IFAA Flint score (5, 4, 3 or 0) for an impact `radius` cm from the center.
///
/// # Errors
///
/// Negative or non-finite radius, non-positive face diameter.
pub fn flint_score(radius: f64, face_diameter: f64) -> Result<u8> {
    let radius = ensure_non_negative("radius", radius)?;
    let d = ensure_positive("face diameter", face_diameter)?;

    let r5 = 0.1 * d;
    let r4 = 0.2 * d;
    let r3 = 0.3 * d;

    let score = if radius <= r5 {
        5
    } else if radius <= r4 {
        4
    } else if radius <= r3 {
        3
    } else {
        0
    };
    Ok(score)
}
