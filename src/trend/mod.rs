//! Performance over time.
//!
//! # Across sessions
//!
//! - [`practice_consistency`] — coefficient of variation of session scores
//! - [`ewma_chart`] — EWMA with time-varying control limits
//!
//! # Within a session
//!
//! - [`within_end_trend`] — average score by shot position in the end
//! - [`first_arrow_effect`] — first shot of the end versus the rest
//! - [`end_fatigue`] — average end score against end number
//!
//! # Simulation
//!
//! - [`hit_probability`] — ring probabilities for a bivariate normal group
//!
//! # References
//!
//! - Roberts, S.W. (1959). "Control Chart Tests Based on Geometric Moving Averages",
//!   *Technometrics* 1(3), pp. 239-250.
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*, 8th ed.

mod consistency;
mod ewma;
mod fatigue;
mod hit_probability;
mod position;

pub use consistency::{practice_consistency, ConsistencyLevel, PracticeConsistency};
pub use ewma::{ewma_chart, ewma_chart_with, Ewma, EwmaChart, EwmaPoint};
pub use fatigue::{end_fatigue, EndFatigue, EndScore, FatigueLevel};
pub use hit_probability::{
    hit_probability, simulate_hit_probability, HitProbability, ImpactModel, RingProbability,
};
pub use position::{
    first_arrow_effect, within_end_trend, FirstArrowAnalysis, FirstArrowEffect, PositionPattern,
    PositionScore, WithinEndTrend,
};
