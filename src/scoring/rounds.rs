//! Standard round definitions.
//!
//! Round totals are only comparable once normalized against the round's
//! maximum. The table below covers common WA, national and IFAA rounds plus
//! legacy aliases kept for old session records.

use serde::Serialize;

/// How arrows in a round are scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ScoringKind {
    /// WA ten-ring scoring.
    Wa,
    /// Field scoring, 5 points maximum.
    Field,
    /// IFAA Flint scoring, 5 points maximum.
    Flint,
}

impl ScoringKind {
    /// Highest score a single arrow can earn.
    pub fn max_per_arrow(self) -> u32 {
        match self {
            Self::Wa => 10,
            Self::Field | Self::Flint => 5,
        }
    }
}

/// A standard round configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RoundPreset {
    pub name: &'static str,
    pub arrow_count: u32,
    pub ends: u32,
    pub arrows_per_end: u32,
    /// Shooting distance in metres (0 for multi-distance rounds).
    pub distance_m: f64,
    /// Face diameter in cm (0 for multi-face rounds).
    pub face_cm: f64,
    pub max_score: u32,
    pub kind: ScoringKind,
    pub multi_distance: bool,
}

#[allow(clippy::too_many_arguments)]
const fn preset(
    name: &'static str,
    arrow_count: u32,
    ends: u32,
    arrows_per_end: u32,
    distance_m: f64,
    face_cm: f64,
    max_score: u32,
    kind: ScoringKind,
) -> RoundPreset {
    RoundPreset {
        name,
        arrow_count,
        ends,
        arrows_per_end,
        distance_m,
        face_cm,
        max_score,
        kind,
        multi_distance: false,
    }
}

static ROUND_PRESETS: [RoundPreset; 21] = [
    // Indoor
    preset("WA 18m (Indoor)", 60, 20, 3, 18.0, 40.0, 600, ScoringKind::Wa),
    preset("WA 25m (Indoor)", 60, 20, 3, 25.0, 60.0, 600, ScoringKind::Wa),
    preset("Portsmouth", 60, 20, 3, 18.0, 60.0, 600, ScoringKind::Wa),
    preset("Bray I", 30, 10, 3, 18.0, 40.0, 300, ScoringKind::Wa),
    preset("Bray II", 30, 10, 3, 25.0, 60.0, 300, ScoringKind::Wa),
    preset("Lancaster Quali", 60, 20, 3, 18.0, 40.0, 600, ScoringKind::Wa),
    preset("IFAA Flint (Indoor)", 56, 14, 4, 20.0, 35.0, 280, ScoringKind::Flint),
    // Outdoor
    preset("WA 30m", 36, 6, 6, 30.0, 80.0, 360, ScoringKind::Wa),
    preset("WA 40m", 36, 6, 6, 40.0, 80.0, 360, ScoringKind::Wa),
    preset("WA 50m (Barebow)", 72, 12, 6, 50.0, 122.0, 720, ScoringKind::Wa),
    preset("WA 60m", 36, 6, 6, 60.0, 122.0, 360, ScoringKind::Wa),
    preset("WA 70m (Recurve)", 72, 12, 6, 70.0, 122.0, 720, ScoringKind::Wa),
    preset("Half WA 50m", 36, 6, 6, 50.0, 122.0, 360, ScoringKind::Wa),
    // National / practice
    preset("National (Barebow)", 48, 8, 6, 50.0, 122.0, 480, ScoringKind::Wa),
    preset("Short National", 48, 8, 6, 40.0, 122.0, 480, ScoringKind::Wa),
    preset("Practice (30 arrows)", 30, 10, 3, 18.0, 40.0, 300, ScoringKind::Wa),
    // Legacy aliases
    preset("WA 18m", 60, 20, 3, 18.0, 40.0, 600, ScoringKind::Wa),
    preset("WA 25m", 60, 20, 3, 25.0, 60.0, 600, ScoringKind::Wa),
    preset("WA 50m", 72, 12, 6, 50.0, 122.0, 720, ScoringKind::Wa),
    preset("Indoor Field", 60, 20, 3, 18.0, 40.0, 300, ScoringKind::Field),
    RoundPreset {
        name: "Flint",
        arrow_count: 56,
        ends: 14,
        arrows_per_end: 4,
        distance_m: 0.0,
        face_cm: 0.0,
        max_score: 280,
        kind: ScoringKind::Flint,
        multi_distance: true,
    },
];

/// Looks up a round by name, ignoring ASCII case.
pub fn round_preset(name: &str) -> Option<&'static RoundPreset> {
    ROUND_PRESETS
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
}

/// All known rounds, in display order.
pub fn round_presets() -> &'static [RoundPreset] {
    &ROUND_PRESETS
}

/// Maximum possible score for `arrow_count` arrows of `round_type`.
///
/// Uses the preset maximum when the arrow count matches the preset, scales by
/// the per-arrow maximum otherwise, and assumes WA scoring for unknown rounds.
pub fn max_score(round_type: &str, arrow_count: u32) -> u32 {
    match round_preset(round_type) {
        Some(p) if p.arrow_count == arrow_count => p.max_score,
        Some(p) => arrow_count.saturating_mul(p.kind.max_per_arrow()),
        None => arrow_count.saturating_mul(ScoringKind::Wa.max_per_arrow()),
    }
}

/// Total score as a percentage of the round maximum (0 when the maximum is 0).
pub fn score_percentage(total_score: u32, round_type: &str, arrow_count: u32) -> f64 {
    let max = max_score(round_type, arrow_count);
    if max == 0 {
        return 0.0;
    }
    f64::from(total_score) / f64::from(max) * 100.0
}
