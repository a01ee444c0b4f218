//! Directional bias of a group.
//!
//! Reports where the MPI sits relative to the face (as a compass sector and
//! as a fraction of the face radius) and whether the spread is elongated
//! horizontally or vertically.

use serde::Serialize;

use crate::distribution::population_std_dev;
use crate::error::{ensure_positive, Result};
use crate::group::dispersion::{mpi, Point};

/// Normalized MPI offset below which a group counts as centered.
const CENTERED_FRACTION: f64 = 0.02;
/// H/V ratio above which a group is horizontal-dominant (inverse below).
const HV_IMBALANCE: f64 = 1.2;
const HV_IMBALANCE_LOW: f64 = 0.8;
const FACE_RADIUS_FLOOR: f64 = 1e-9;

/// Compass sector of the MPI; north is up on the face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BiasDirection {
    Center,
    N,
    NE,
    E,
    SE,
    S,
    SW,
    W,
    NW,
}

impl BiasDirection {
    /// Sector containing the direction of `(x, y)`, 45° wide and centered on
    /// the compass points.
    fn from_offset(x: f64, y: f64) -> Self {
        const SECTORS: [BiasDirection; 8] = [
            BiasDirection::E,
            BiasDirection::NE,
            BiasDirection::N,
            BiasDirection::NW,
            BiasDirection::W,
            BiasDirection::SW,
            BiasDirection::S,
            BiasDirection::SE,
        ];
        let angle = y.atan2(x);
        let sector = (angle / std::f64::consts::FRAC_PI_4).round() as i64;
        SECTORS[sector.rem_euclid(8) as usize]
    }
}

/// Horizontal versus vertical spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HvBalance {
    Balanced,
    HorizontalDominant,
    VerticalDominant,
}

/// Result of [`directional_bias`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DirectionalBias {
    pub n: usize,
    pub mpi: Point,
    /// MPI divided by the face radius, roughly in [-1, 1].
    pub mpi_normalized: Point,
    pub direction: BiasDirection,
    pub magnitude_cm: f64,
    pub magnitude_normalized: f64,
    /// Population standard deviations per axis.
    pub sigma_x: f64,
    pub sigma_y: f64,
    /// σx / σy, 1 when σy is 0 or there are fewer than 2 shots.
    pub hv_ratio: f64,
    pub hv_balance: HvBalance,
}

/// Computes the directional bias of a group on a face of `face_diameter` cm.
///
/// An empty group is centered and balanced.
pub fn directional_bias(xs: &[f64], ys: &[f64], face_diameter: f64) -> Result<DirectionalBias> {
    let face_radius = (ensure_positive("face diameter", face_diameter)? / 2.0).max(FACE_RADIUS_FLOOR);
    let center = mpi(xs, ys)?;
    let n = xs.len();

    let magnitude_cm = center.x.hypot(center.y);
    let magnitude_normalized = magnitude_cm / face_radius;
    let direction = if magnitude_normalized < CENTERED_FRACTION {
        BiasDirection::Center
    } else {
        BiasDirection::from_offset(center.x, center.y)
    };

    let (sigma_x, sigma_y, hv_ratio) = if n > 1 {
        let sx = population_std_dev(xs).unwrap_or(0.0);
        let sy = population_std_dev(ys).unwrap_or(0.0);
        let ratio = if sy > 0.0 { sx / sy } else { 1.0 };
        (sx, sy, ratio)
    } else {
        (0.0, 0.0, 1.0)
    };
    let hv_balance = if hv_ratio > HV_IMBALANCE {
        HvBalance::HorizontalDominant
    } else if hv_ratio < HV_IMBALANCE_LOW {
        HvBalance::VerticalDominant
    } else {
        HvBalance::Balanced
    };

    Ok(DirectionalBias {
        n,
        mpi: center,
        mpi_normalized: Point {
            x: center.x / face_radius,
            y: center.y / face_radius,
        },
        direction,
        magnitude_cm,
        magnitude_normalized,
        sigma_x,
        sigma_y,
        hv_ratio,
        hv_balance,
    })
}
