//! Shot-group statistics.
//!
//! Everything here operates on paired x/y coordinates in cm relative to the
//! face center, either as raw slices or through a [`ShotGroup`].
//!
//! # Location and spread
//!
//! - [`mpi`] — mean point of impact
//! - [`drms`], [`radial_sigma`] — distance root mean square (population)
//! - [`r95`] — 95th percentile radial error
//! - [`extreme_spread`] — widest pair of shots
//! - [`rayleigh_sigma`] — Rayleigh scale with chi-squared confidence interval
//!
//! # Error structure
//!
//! - [`accuracy_precision`] — aim bias versus spread
//! - [`directional_bias`] — compass direction of the MPI, H/V balance
//! - [`confidence_ellipse`] — coverage ellipse from the sample covariance
//! - [`detect_fliers`] — Mahalanobis outlier screen with a pluggable
//!   [`CovarianceEstimator`]
//!
//! # References
//!
//! - Grubbs, F.E. (1964). *Statistical Measures of Accuracy for Riflemen and
//!   Missile Engineers*.
//! - ISO 5725-1:1994 — Accuracy (trueness and precision) of measurement
//!   methods and results.

mod bias;
mod covariance;
mod decomposition;
mod dispersion;
mod ellipse;
mod fliers;

pub use bias::{directional_bias, BiasDirection, DirectionalBias, HvBalance};
pub use covariance::{Covariance2, Eigen2};
pub use decomposition::{accuracy_precision, AccuracyPrecision, ErrorSource};
pub use dispersion::{
    drms, extreme_spread, mpi, r95, radial_sigma, radii_from_mpi, rayleigh_confidence_interval,
    rayleigh_sigma, Point, RayleighEstimate,
};
pub use ellipse::{confidence_ellipse, ConfidenceEllipse};
pub use fliers::{
    detect_fliers, detect_fliers_with, CovarianceEstimator, CovarianceMethod, FlierAssessment,
    FlierReport, LocationScatter, MinimumCovarianceDeterminant, SampleCovariance,
    DEFAULT_FLIER_QUANTILE,
};

use crate::error::{ensure_coordinates, ensure_positive, Result};
use crate::scoring::{ScoringSystem, Shot};

/// Scored shots on one face.
#[derive(Debug, Clone, PartialEq)]
pub struct ShotGroup {
    shots: Vec<Shot>,
    face_diameter: f64,
}

impl ShotGroup {
    /// Groups already-scored shots.
    ///
    /// # Errors
    ///
    /// `face_diameter` not finite and positive.
    pub fn new(shots: Vec<Shot>, face_diameter: f64) -> Result<Self> {
        ensure_positive("face diameter", face_diameter)?;
        Ok(Self {
            shots,
            face_diameter,
        })
    }

    /// Scores every `(xs[i], ys[i])` impact and groups the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_archery::group::ShotGroup;
    /// use u_archery::scoring::ScoringSystem;
    ///
    /// let system = ScoringSystem::Wa { inner_ring_as_11: false };
    /// let group = ShotGroup::from_coordinates(&[0.0, 3.0], &[0.5, 0.0], 40.0, system).unwrap();
    /// let scores: Vec<u8> = group.shots().iter().map(|s| s.score).collect();
    /// assert_eq!(scores, vec![10, 9]);
    /// ```
    pub fn from_coordinates(
        xs: &[f64],
        ys: &[f64],
        face_diameter: f64,
        system: ScoringSystem,
    ) -> Result<Self> {
        ensure_coordinates(xs, ys)?;
        let shots = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| Shot::score(x, y, face_diameter, system))
            .collect::<Result<Vec<_>>>()?;
        Self::new(shots, face_diameter)
    }

    pub fn shots(&self) -> &[Shot] {
        &self.shots
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn face_diameter(&self) -> f64 {
        self.face_diameter
    }

    pub fn xs(&self) -> Vec<f64> {
        self.shots.iter().map(|s| s.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.shots.iter().map(|s| s.y).collect()
    }

    pub fn total_score(&self) -> u32 {
        self.shots.iter().map(|s| u32::from(s.score)).sum()
    }

    pub fn x_count(&self) -> usize {
        self.shots.iter().filter(|s| s.is_x).count()
    }
}
