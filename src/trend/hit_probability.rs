//! Ring hit probabilities by Monte Carlo simulation.
//!
//! Impacts are modeled as an independent bivariate normal centered on the
//! MPI with per-axis sigmas. Each simulated impact is binned into ring
//! `10 − ⌊r / w⌋` (w = D/20) when r < 10·w and counted as a miss otherwise.
//!
//! The sampler takes any [`rand::Rng`]; [`hit_probability`] wraps it with a
//! [`ChaCha8Rng`] seeded from the configuration so repeated calls agree.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::Serialize;

use crate::config::HitProbabilityConfig;
use crate::error::{ensure_positive, AnalysisError, Result};
use crate::group::Point;
use crate::scoring::ring_width;

/// Bivariate normal impact model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactModel {
    pub mpi: Point,
    pub sigma_x: f64,
    pub sigma_y: f64,
}

/// Probability of landing in one ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RingProbability {
    /// Ring value, 0 for a miss.
    pub ring: u8,
    /// Percent of simulated impacts.
    pub probability: f64,
}

/// Result of [`hit_probability`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HitProbability {
    /// Rings 10 down to 1, then the miss bucket (ring 0).
    pub rings: Vec<RingProbability>,
    /// Expected points per arrow.
    pub expected_score: f64,
    pub samples: usize,
}

impl HitProbability {
    /// Probability (%) of scoring `ring`; 0 for ring values above 10.
    pub fn probability_of(&self, ring: u8) -> f64 {
        self.rings
            .iter()
            .find(|r| r.ring == ring)
            .map_or(0.0, |r| r.probability)
    }
}

/// Simulates `samples` impacts with `rng`.
///
/// Sigmas are floored at `sigma_floor` cm.
///
/// # Errors
///
/// Zero samples, non-positive face diameter or sigma floor, non-finite
/// model parameters.
pub fn simulate_hit_probability<R>(
    model: &ImpactModel,
    face_diameter: f64,
    samples: usize,
    sigma_floor: f64,
    rng: &mut R,
) -> Result<HitProbability>
where
    R: Rng + ?Sized,
{
    if samples == 0 {
        return Err(AnalysisError::InsufficientPoints {
            what: "hit-probability simulation",
            required: 1,
            got: 0,
        });
    }
    let w = ring_width(face_diameter)?;
    let floor = ensure_positive("sigma floor", sigma_floor)?;
    if !(model.mpi.x.is_finite() && model.mpi.y.is_finite()) {
        return Err(AnalysisError::NonFinite("MPI"));
    }
    let sx = finite_sigma("sigma x", model.sigma_x)?.max(floor);
    let sy = finite_sigma("sigma y", model.sigma_y)?.max(floor);

    let normal_x = Normal::new(model.mpi.x, sx)
        .map_err(|_| AnalysisError::invalid("sigma x", sx, "not a valid normal scale"))?;
    let normal_y = Normal::new(model.mpi.y, sy)
        .map_err(|_| AnalysisError::invalid("sigma y", sy, "not a valid normal scale"))?;

    // counts[0] is the miss bucket, counts[k] ring k.
    let mut counts = [0usize; 11];
    for _ in 0..samples {
        let x: f64 = rng.sample(normal_x);
        let y: f64 = rng.sample(normal_y);
        let band = (x.hypot(y) / w).floor();
        if band < 10.0 {
            counts[10 - band as usize] += 1;
        } else {
            counts[0] += 1;
        }
    }

    let total = samples as f64;
    let rings: Vec<RingProbability> = (1..=10u8)
        .rev()
        .chain(std::iter::once(0))
        .map(|ring| RingProbability {
            ring,
            probability: counts[usize::from(ring)] as f64 / total * 100.0,
        })
        .collect();
    let expected_score = rings
        .iter()
        .map(|r| f64::from(r.ring) * r.probability / 100.0)
        .sum();

    Ok(HitProbability {
        rings,
        expected_score,
        samples,
    })
}

/// Hit probabilities with the configured sample count, seed and sigma floor.
///
/// # Examples
///
/// ```
/// use u_archery::config::HitProbabilityConfig;
/// use u_archery::group::Point;
/// use u_archery::trend::{hit_probability, ImpactModel};
///
/// let model = ImpactModel { mpi: Point { x: 0.0, y: 0.0 }, sigma_x: 2.0, sigma_y: 2.0 };
/// let hp = hit_probability(&model, 40.0, &HitProbabilityConfig::default()).unwrap();
/// let total: f64 = hp.rings.iter().map(|r| r.probability).sum();
/// assert!((total - 100.0).abs() < 1e-6);
/// assert!(hp.probability_of(10) > hp.probability_of(5));
/// ```
pub fn hit_probability(
    model: &ImpactModel,
    face_diameter: f64,
    config: &HitProbabilityConfig,
) -> Result<HitProbability> {
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    simulate_hit_probability(
        model,
        face_diameter,
        config.samples,
        config.sigma_floor,
        &mut rng,
    )
}

fn finite_sigma(name: &'static str, sigma: f64) -> Result<f64> {
    if !sigma.is_finite() {
        return Err(AnalysisError::NonFinite(name));
    }
    Ok(sigma)
}
