//! Target geometry and scoring.
//!
//! Converts a radial distance on a target face into a ring score.
//!
//! # Ring systems
//!
//! - **WA** — ten concentric rings of width D/20, optional inner-10 "X"
//!   counted as 11
//! - **Flint** — IFAA 5/4/3 zones with diameters 0.2·D, 0.4·D and 0.6·D
//!
//! # Rounds
//!
//! - [`round_preset`] — standard round definitions (arrows, distance, face)
//! - [`max_score`], [`score_percentage`] — normalizing a round total

mod rings;
mod rounds;

pub use rings::{flint_score, ring_score, ring_width, ScoringSystem, Shot};
pub use rounds::{
    max_score, round_preset, round_presets, score_percentage, RoundPreset, ScoringKind,
};
