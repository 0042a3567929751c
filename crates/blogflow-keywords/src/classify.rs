//! Display tiers and formatting for competition, difficulty and volume.

use blogflow_core::Difficulty;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Competition below this is `Low`.
const COMPETITION_LOW_THRESHOLD: f64 = 0.33;
/// Competition below this is `Medium`, anything above is `High`.
const COMPETITION_MEDIUM_THRESHOLD: f64 = 0.66;

/// Numeric difficulty (0..100) below this maps to `Easy`.
const DIFFICULTY_EASY_BELOW: f64 = 34.0;
/// Numeric difficulty (0..100) below this maps to `Medium`, otherwise `Hard`.
const DIFFICULTY_MEDIUM_BELOW: f64 = 67.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompetitionTier {
    Low,
    Medium,
    High,
    /// The upstream reported `0`, which doubles as "no data".
    Unknown,
}

impl std::fmt::Display for CompetitionTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompetitionTier::Low => write!(f, "low"),
            CompetitionTier::Medium => write!(f, "medium"),
            CompetitionTier::High => write!(f, "high"),
            CompetitionTier::Unknown => write!(f, "unknown"),
        }
    }
}

/// Map a raw competition score in `[0, 1]` to a display tier.
#[must_use]
pub fn competition_tier(competition: f64) -> CompetitionTier {
    if competition.is_nan() || competition <= 0.0 {
        CompetitionTier::Unknown
    } else if competition < COMPETITION_LOW_THRESHOLD {
        CompetitionTier::Low
    } else if competition < COMPETITION_MEDIUM_THRESHOLD {
        CompetitionTier::Medium
    } else {
        CompetitionTier::High
    }
}

/// Format competition as a whole percentage, or `N/A` for the unknown sentinel.
#[must_use]
pub fn format_competition(competition: f64) -> String {
    if competition_tier(competition) == CompetitionTier::Unknown {
        return "N/A".to_string();
    }
    format!("{:.0}%", competition.min(1.0) * 100.0)
}

/// Map a numeric difficulty score to the categorical scale.
///
/// Scores at or below `1.0` are read as fractions and scaled to `0..100`.
#[must_use]
pub fn difficulty_from_score(score: f64) -> Difficulty {
    if score.is_nan() {
        return Difficulty::Medium;
    }
    let scaled = if score <= 1.0 { score * 100.0 } else { score };
    if scaled < DIFFICULTY_EASY_BELOW {
        Difficulty::Easy
    } else if scaled < DIFFICULTY_MEDIUM_BELOW {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}

/// Format a search volume: `—` when unknown, compact `K`/`M` suffixes otherwise.
#[must_use]
pub fn format_volume(volume: Option<u64>) -> String {
    match volume {
        None => "—".to_string(),
        Some(v) if v >= 1_000_000 => compact(v, 1_000_000, "M"),
        Some(v) if v >= 1_000 => compact(v, 1_000, "K"),
        Some(v) => v.to_string(),
    }
}

#[allow(clippy::cast_precision_loss)]
fn compact(value: u64, unit: u64, suffix: &str) -> String {
    let scaled = value as f64 / unit as f64;
    let rendered = format!("{scaled:.1}");
    let rendered = rendered.strip_suffix(".0").unwrap_or(&rendered);
    format!("{rendered}{suffix}")
}

/// Format a CPC as dollars with two decimals, or `—` when unknown.
#[must_use]
pub fn format_cpc(cpc: Option<Decimal>) -> String {
    match cpc {
        None => "—".to_string(),
        Some(value) => format!(
            "${:.2}",
            value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
    }
}
