//! # u-archery
//!
//! Shot-group statistics, performance trends, equipment comparison and
//! cross-distance projection for target archery.
//!
//! Impacts are `(x, y)` coordinates in cm relative to the face center on a
//! standard ten-ring face (ring width = face diameter / 20). Every function
//! works on plain slices and returns serializable records; nothing here
//! stores sessions or talks to a network.
//!
//! ## Modules
//!
//! - [`scoring`] — ring width, WA / Flint scoring, round presets
//! - [`group`] — MPI, DRMS, R95, Rayleigh sigma, ellipse, bias, fliers
//! - [`trend`] — consistency, EWMA chart, within-end and fatigue trends,
//!   hit probabilities
//! - [`comparison`] — Welch t-test comparison of two equipment setups
//! - [`projection`] — Park model, drag loss, score goals, angular profile
//! - [`crawl`] — string-walking crawl calibration
//! - [`report`] — one-call group analysis driven by [`config::AnalysisConfig`]
//! - [`regression`], [`distribution`] — numeric support
//!
//! ## Design Philosophy
//!
//! - **Degenerate input is data**: empty groups and short series return
//!   documented fallback records carrying their counts
//! - **Caller mistakes are errors**: mismatched slices, non-finite values and
//!   impossible parameters return [`AnalysisError`]
//! - **Numerical stability**: leverages `u-numflow` for statistics and
//!   special functions
//! - **Reproducible**: the only randomness is an explicitly seeded sampler

pub mod comparison;
pub mod config;
pub mod crawl;
pub mod distribution;
pub mod error;
pub mod group;
pub mod projection;
pub mod regression;
pub mod report;
pub mod scoring;
pub mod trend;

pub use error::{AnalysisError, Result};
