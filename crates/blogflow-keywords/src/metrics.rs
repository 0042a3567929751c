//! Summary metrics across a keyword set.

use blogflow_core::{Difficulty, KeywordMetric};
use rust_decimal::Decimal;
use serde::Serialize;

/// Assumed click-through share used for traffic potential. Not calibrated
/// against any CTR curve.
const TRAFFIC_CTR: f64 = 0.1;
/// Competition assumed for keywords whose competition is unknown.
const FALLBACK_COMPETITION: f64 = 0.5;

/// Mean weight below this buckets as `Easy`.
const AVG_DIFFICULTY_EASY_BELOW: f64 = 0.495;
/// Mean weight below this buckets as `Medium`, otherwise `Hard`.
const AVG_DIFFICULTY_MEDIUM_BELOW: f64 = 0.83;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordSummary {
    /// Sum over keywords with a known volume.
    pub total_search_volume: u64,
    /// `None` when no keyword carries a global volume.
    pub total_global_volume: Option<u64>,
    pub avg_difficulty: Difficulty,
    /// Mean over competition values above zero.
    pub avg_competition: f64,
    /// Mean over keywords with a known CPC.
    pub avg_cpc: Decimal,
    /// Rough monthly visits; see [`aggregate`].
    pub traffic_potential: f64,
}

impl Default for KeywordSummary {
    fn default() -> Self {
        Self {
            total_search_volume: 0,
            total_global_volume: None,
            avg_difficulty: Difficulty::Medium,
            avg_competition: 0.0,
            avg_cpc: Decimal::ZERO,
            traffic_potential: 0.0,
        }
    }
}

/// Compute summary metrics for a keyword set.
///
/// Missing values are skipped rather than counted as zero, and competition
/// `0` is treated as unknown. Traffic potential sums
/// `volume * (1 - competition) * 0.1` over keywords with a known volume,
/// assuming competition `0.5` where it is unknown. An empty input yields
/// [`KeywordSummary::default`].
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(keywords: &[KeywordMetric]) -> KeywordSummary {
    if keywords.is_empty() {
        return KeywordSummary::default();
    }

    let total_search_volume: u64 = keywords.iter().filter_map(|k| k.search_volume).sum();

    let global: Vec<u64> = keywords
        .iter()
        .filter_map(|k| k.global_search_volume)
        .collect();
    let total_global_volume = (!global.is_empty()).then(|| global.iter().sum());

    let weights: Vec<f64> = keywords.iter().map(|k| k.difficulty.weight()).collect();
    let avg_weight = weights.iter().sum::<f64>() / weights.len() as f64;
    let avg_difficulty = bucket_difficulty(avg_weight);

    let known_competition: Vec<f64> = keywords
        .iter()
        .filter(|k| k.has_known_competition())
        .map(|k| k.competition)
        .collect();
    let avg_competition = if known_competition.is_empty() {
        0.0
    } else {
        known_competition.iter().sum::<f64>() / known_competition.len() as f64
    };

    let cpcs: Vec<Decimal> = keywords.iter().filter_map(|k| k.cpc).collect();
    let avg_cpc = if cpcs.is_empty() {
        Decimal::ZERO
    } else {
        cpcs.iter().sum::<Decimal>() / Decimal::from(cpcs.len())
    };

    let traffic_potential = keywords
        .iter()
        .filter_map(|k| {
            k.search_volume.map(|volume| {
                let competition = if k.has_known_competition() {
                    k.competition.min(1.0)
                } else {
                    FALLBACK_COMPETITION
                };
                volume as f64 * (1.0 - competition) * TRAFFIC_CTR
            })
        })
        .sum();

    KeywordSummary {
        total_search_volume,
        total_global_volume,
        avg_difficulty,
        avg_competition,
        avg_cpc,
        traffic_potential,
    }
}

fn bucket_difficulty(mean_weight: f64) -> Difficulty {
    if mean_weight < AVG_DIFFICULTY_EASY_BELOW {
        Difficulty::Easy
    } else if mean_weight < AVG_DIFFICULTY_MEDIUM_BELOW {
        Difficulty::Medium
    } else {
        Difficulty::Hard
    }
}
