//! One-call analysis of a scored shot group.
//!
//! [`GroupReport::analyze`] runs every group statistic with the parameters
//! in an [`AnalysisConfig`] and collects the results in one serializable
//! record.
//!
//! # Examples
//!
//! ```
//! use u_archery::config::AnalysisConfig;
//! use u_archery::group::ShotGroup;
//! use u_archery::report::GroupReport;
//! use u_archery::scoring::ScoringSystem;
//!
//! let xs = [0.4, -1.1, 2.0, 0.3, -0.6, 1.2, -0.2, 0.9];
//! let ys = [0.8, 0.2, -1.4, 1.7, -0.5, 0.1, -1.0, 0.6];
//! let system = ScoringSystem::Wa { inner_ring_as_11: false };
//! let group = ShotGroup::from_coordinates(&xs, &ys, 40.0, system).unwrap();
//!
//! let report = GroupReport::analyze(&group, &AnalysisConfig::default()).unwrap();
//! assert_eq!(report.n, 8);
//! assert!(report.r95 > 0.0);
//! assert!(report.ellipse.semi_major >= report.ellipse.semi_minor);
//! ```

use serde::Serialize;
use tracing::debug;

use crate::config::AnalysisConfig;
use crate::distribution::population_std_dev;
use crate::error::Result;
use crate::group::{
    accuracy_precision, confidence_ellipse, detect_fliers_with, directional_bias, drms,
    extreme_spread, mpi, r95, rayleigh_sigma, AccuracyPrecision, ConfidenceEllipse,
    CovarianceEstimator, CovarianceMethod, DirectionalBias, FlierReport,
    MinimumCovarianceDeterminant, Point, RayleighEstimate, SampleCovariance, ShotGroup,
};
use crate::trend::{hit_probability, HitProbability, ImpactModel};

/// Every group statistic for one [`ShotGroup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupReport {
    pub n: usize,
    pub face_diameter: f64,
    pub total_score: u32,
    pub x_count: usize,
    pub mpi: Point,
    pub drms: f64,
    pub r95: f64,
    pub extreme_spread: f64,
    pub rayleigh: RayleighEstimate,
    pub accuracy_precision: AccuracyPrecision,
    pub directional_bias: DirectionalBias,
    pub ellipse: ConfidenceEllipse,
    pub fliers: FlierReport,
    /// Simulated ring probabilities; `None` for an empty group.
    pub hit_probability: Option<HitProbability>,
}

impl GroupReport {
    /// Analyzes `group` with the parameters in `config`.
    ///
    /// # Errors
    ///
    /// An invalid `config` (see [`AnalysisConfig::validate`]).
    pub fn analyze(group: &ShotGroup, config: &AnalysisConfig) -> Result<Self> {
        config.validate()?;
        let xs = group.xs();
        let ys = group.ys();
        let face = group.face_diameter();

        let center = mpi(&xs, &ys)?;
        let fliers = match config.flier_estimator {
            CovarianceMethod::Sample => screen(&xs, &ys, &SampleCovariance, config)?,
            CovarianceMethod::Robust => {
                screen(&xs, &ys, &MinimumCovarianceDeterminant::default(), config)?
            }
        };

        let hit_probability = if group.is_empty() {
            None
        } else {
            let model = ImpactModel {
                mpi: center,
                sigma_x: population_std_dev(&xs).unwrap_or(0.0),
                sigma_y: population_std_dev(&ys).unwrap_or(0.0),
            };
            Some(hit_probability(&model, face, &config.hit_probability)?)
        };

        debug!(
            n = group.len(),
            flier_count = fliers.flier_count,
            "group report built"
        );

        Ok(Self {
            n: group.len(),
            face_diameter: face,
            total_score: group.total_score(),
            x_count: group.x_count(),
            mpi: center,
            drms: drms(&xs, &ys)?,
            r95: r95(&xs, &ys)?,
            extreme_spread: extreme_spread(&xs, &ys)?,
            rayleigh: rayleigh_sigma(&xs, &ys, config.rayleigh_confidence)?,
            accuracy_precision: accuracy_precision(&xs, &ys)?,
            directional_bias: directional_bias(&xs, &ys, face)?,
            ellipse: confidence_ellipse(&xs, &ys, config.ellipse_coverage)?,
            fliers,
            hit_probability,
        })
    }
}

fn screen<E: CovarianceEstimator>(
    xs: &[f64],
    ys: &[f64],
    estimator: &E,
    config: &AnalysisConfig,
) -> Result<FlierReport> {
    detect_fliers_with(xs, ys, estimator, config.flier_quantile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HitProbabilityConfig;
    use crate::group::FlierAssessment;
    use crate::scoring::ScoringSystem;

    const WA: ScoringSystem = ScoringSystem::Wa {
        inner_ring_as_11: false,
    };

    fn quick_config() -> AnalysisConfig {
        AnalysisConfig {
            hit_probability: HitProbabilityConfig {
                samples: 5_000,
                ..HitProbabilityConfig::default()
            },
            ..AnalysisConfig::default()
        }
    }

    #[test]
    fn four_shot_scenario() {
        let xs = [0.0, 0.5, -0.3, 1.2];
        let ys = [0.0, 0.3, -0.2, -0.8];
        let group = ShotGroup::from_coordinates(&xs, &ys, 40.0, WA).expect("valid");
        let report = GroupReport::analyze(&group, &quick_config()).expect("valid");

        assert_eq!(report.total_score, 40);
        assert_eq!(report.x_count, 3);
        assert!((report.mpi.x - 0.35).abs() < 1e-12);
        assert!((report.mpi.y + 0.175).abs() < 1e-12);
        // (−0.3, −0.2) to (1.2, −0.8)
        assert!((report.extreme_spread - 1.5_f64.hypot(0.6)).abs() < 1e-12);
        assert!(report.r95 >= report.drms);
        // Four shots are too few to screen.
        assert_eq!(report.fliers.assessment, FlierAssessment::TooFewShots);
        let hp = report.hit_probability.expect("non-empty group");
        assert!(hp.probability_of(10) > 90.0);
    }

    #[test]
    fn robust_estimator_is_used_when_configured() {
        let xs = [0.1, -0.3, 0.4, -0.2, 0.0, 0.3, -0.1, 0.2, -0.4, 0.1, 15.0];
        let ys = [0.2, 0.1, -0.3, 0.4, -0.1, 0.0, 0.3, -0.2, 0.1, -0.4, 14.0];
        let group = ShotGroup::from_coordinates(&xs, &ys, 122.0, WA).expect("valid");
        let config = AnalysisConfig {
            flier_estimator: CovarianceMethod::Robust,
            ..quick_config()
        };
        let report = GroupReport::analyze(&group, &config).expect("valid");
        assert!(report.fliers.flier_indices.contains(&10));
        assert!(report.fliers.clean_sigma < report.fliers.full_sigma);
    }

    #[test]
    fn empty_group_reports_fallbacks() {
        let group = ShotGroup::new(Vec::new(), 40.0).expect("valid");
        let report = GroupReport::analyze(&group, &quick_config()).expect("valid");
        assert_eq!(report.n, 0);
        assert_eq!(report.drms, 0.0);
        assert_eq!(report.rayleigh.n, 0);
        assert!(report.hit_probability.is_none());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let group = ShotGroup::from_coordinates(&[0.0], &[0.0], 40.0, WA).expect("valid");
        let config = AnalysisConfig {
            ellipse_coverage: 1.5,
            ..AnalysisConfig::default()
        };
        assert!(GroupReport::analyze(&group, &config).is_err());
    }

    #[test]
    fn report_serializes() {
        let group =
            ShotGroup::from_coordinates(&[0.5, -0.5, 1.0], &[0.2, 0.4, -0.6], 80.0, WA)
                .expect("valid");
        let report = GroupReport::analyze(&group, &quick_config()).expect("valid");
        let text = toml::to_string(&report.mpi).expect("serializable");
        assert!(text.contains("x ="));
    }
}
