//! Boundary validation of loosely-typed metric objects.
//!
//! Upstream values may be numbers or numeric strings, difficulty may be a
//! label or a score, and any field may be missing. Everything is mapped onto
//! [`KeywordMetric`] here so nothing downstream sees raw JSON.

use std::str::FromStr;

use blogflow_core::{CategoryType, Difficulty, KeywordMetric};
use blogflow_keywords::difficulty_from_score;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

/// Competition assumed for the `LOW` / `MEDIUM` / `HIGH` labels when no
/// numeric index accompanies them.
const LABEL_COMPETITION_LOW: f64 = 0.25;
const LABEL_COMPETITION_MEDIUM: f64 = 0.5;
const LABEL_COMPETITION_HIGH: f64 = 0.75;

/// Convert an analysis map into keyword records, preserving payload order.
///
/// Entries whose value is not an object, or whose key is blank, are skipped.
#[must_use]
pub fn normalize_analysis(analysis: &Map<String, Value>) -> Vec<KeywordMetric> {
    analysis
        .iter()
        .filter_map(|(keyword, raw)| {
            let metric = normalize_metric(keyword, raw);
            if metric.is_none() {
                tracing::warn!(keyword = %keyword, "skipping malformed keyword metrics entry");
            }
            metric
        })
        .collect()
}

/// Validate one metrics object into a [`KeywordMetric`].
///
/// Returns `None` for a blank keyword or a non-object value.
#[must_use]
pub fn normalize_metric(keyword: &str, raw: &Value) -> Option<KeywordMetric> {
    let keyword = keyword.trim();
    let obj = raw.as_object()?;
    if keyword.is_empty() {
        return None;
    }

    let field = |names: &[&str]| names.iter().find_map(|n| obj.get(*n).filter(|v| !v.is_null()));

    Some(KeywordMetric {
        keyword: keyword.to_string(),
        search_volume: field(&["search_volume", "volume"]).and_then(as_u64),
        global_search_volume: field(&["global_search_volume", "global_volume"]).and_then(as_u64),
        difficulty: field(&["difficulty", "keyword_difficulty", "difficulty_score"])
            .and_then(as_difficulty)
            .unwrap_or_default(),
        competition: as_competition(obj),
        cpc: field(&["cpc"]).and_then(as_decimal),
        trend_score: field(&["trend_score", "trend"]).and_then(as_f64),
        parent_topic: field(&["parent_topic"]).and_then(as_text),
        related_to: field(&["related_to"]).and_then(as_text),
        cluster_score: field(&["cluster_score"]).and_then(as_f64),
        category_type: field(&["category_type", "category"])
            .and_then(Value::as_str)
            .and_then(CategoryType::from_label),
        related_keywords: field(&["related_keywords", "related"])
            .map(as_terms)
            .unwrap_or_default(),
        long_tail_keywords: field(&["long_tail_keywords"])
            .map(as_terms)
            .unwrap_or_default(),
        serp_features: field(&["serp_features"]).map(as_terms).unwrap_or_default(),
    })
}

fn as_f64(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn as_u64(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    as_f64(value)
        .filter(|v| *v >= 0.0)
        .map(|v| v.round() as u64)
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    let parsed = match value {
        Value::Number(n) => n.as_f64().and_then(|f| Decimal::try_from(f).ok()),
        Value::String(s) => Decimal::from_str(s.trim().trim_start_matches('$')).ok(),
        _ => None,
    };
    parsed.filter(|d| !d.is_sign_negative())
}

fn as_text(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn as_difficulty(value: &Value) -> Option<Difficulty> {
    match value {
        Value::String(s) => Difficulty::from_label(s).or_else(|| {
            s.trim()
                .parse::<f64>()
                .ok()
                .map(difficulty_from_score)
        }),
        Value::Number(n) => n.as_f64().map(difficulty_from_score),
        _ => None,
    }
}

/// Competition in `[0, 1]`; values on a `0..100` scale are divided down and
/// labels are used only when no positive numeric index is present. A `0`
/// means unknown and never hides a later key. `0.0` when unknown.
fn as_competition(obj: &Map<String, Value>) -> f64 {
    let numeric = ["competition", "competition_index"]
        .iter()
        .filter_map(|k| obj.get(*k))
        .filter_map(as_f64)
        .find(|v| *v > 0.0);

    let value = numeric.or_else(|| {
        let label = ["competition", "competition_level"]
            .iter()
            .filter_map(|k| obj.get(*k))
            .find_map(Value::as_str)?;
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(LABEL_COMPETITION_LOW),
            "medium" => Some(LABEL_COMPETITION_MEDIUM),
            "high" => Some(LABEL_COMPETITION_HIGH),
            _ => None,
        }
    });

    match value {
        Some(v) if v > 1.0 => (v / 100.0).min(1.0),
        Some(v) if v > 0.0 => v,
        _ => 0.0,
    }
}

fn as_terms(value: &Value) -> Vec<String> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Object(o) => o
                .get("keyword")
                .and_then(Value::as_str)
                .map(|s| s.trim().to_string()),
            _ => None,
        })
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn full_entry_maps_every_field() {
        let metric = normalize_metric(
            "pet grooming",
            &json!({
                "search_volume": 5400,
                "global_search_volume": 22000,
                "difficulty": "hard",
                "competition": 0.72,
                "cpc": 2.35,
                "trend_score": -0.1,
                "parent_topic": "Pet Care",
                "cluster_score": 55.5,
                "category_type": "topic",
                "related_keywords": ["mobile pet grooming"],
                "long_tail_keywords": ["pet grooming near me open now"],
                "serp_features": ["featured_snippet", "people_also_ask"]
            }),
        )
        .unwrap();

        assert_eq!(metric.search_volume, Some(5400));
        assert_eq!(metric.global_search_volume, Some(22000));
        assert_eq!(metric.difficulty, Difficulty::Hard);
        assert!((metric.competition - 0.72).abs() < 1e-9);
        assert_eq!(metric.cpc, Some(Decimal::new(235, 2)));
        assert_eq!(metric.trend_score, Some(-0.1));
        assert_eq!(metric.parent_topic.as_deref(), Some("Pet Care"));
        assert_eq!(metric.category_type, Some(CategoryType::Topic));
        assert_eq!(metric.related_keywords, vec!["mobile pet grooming"]);
        assert_eq!(metric.long_tail_keywords.len(), 1);
        assert_eq!(metric.serp_features.len(), 2);
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let metric = normalize_metric(
            "dog grooming",
            &json!({"search_volume": "1,200", "cpc": "$0.80", "competition": "0.3"}),
        )
        .unwrap();
        assert_eq!(metric.search_volume, Some(1200));
        assert_eq!(metric.cpc, Some(Decimal::new(80, 2)));
        assert!((metric.competition - 0.3).abs() < 1e-9);
    }

    #[test]
    fn null_volume_stays_unknown() {
        let metric = normalize_metric("dog grooming", &json!({"search_volume": null})).unwrap();
        assert_eq!(metric.search_volume, None);
        assert_eq!(metric.difficulty, Difficulty::Medium);
        assert_eq!(metric.competition, 0.0);
    }

    #[test]
    fn numeric_difficulty_maps_to_category() {
        let easy = normalize_metric("a b", &json!({"keyword_difficulty": 12})).unwrap();
        assert_eq!(easy.difficulty, Difficulty::Easy);
        let hard = normalize_metric("a b", &json!({"difficulty": "81"})).unwrap();
        assert_eq!(hard.difficulty, Difficulty::Hard);
    }

    #[test]
    fn competition_index_on_hundred_scale_is_scaled() {
        let metric = normalize_metric("a b", &json!({"competition_index": 64})).unwrap();
        assert!((metric.competition - 0.64).abs() < 1e-9);
    }

    #[test]
    fn competition_label_used_without_index() {
        let metric = normalize_metric("a b", &json!({"competition": "HIGH"})).unwrap();
        assert!((metric.competition - 0.75).abs() < 1e-9);

        let indexed =
            normalize_metric("a b", &json!({"competition": "HIGH", "competition_index": 90}))
                .unwrap();
        assert!((indexed.competition - 0.9).abs() < 1e-9);
    }

    #[test]
    fn zero_competition_does_not_hide_index_or_level() {
        let indexed =
            normalize_metric("a b", &json!({"competition": 0, "competition_index": 42})).unwrap();
        assert!((indexed.competition - 0.42).abs() < 1e-9);

        let labelled =
            normalize_metric("a b", &json!({"competition": 0, "competition_level": "LOW"}))
                .unwrap();
        assert!((labelled.competition - 0.25).abs() < 1e-9);

        let unknown = normalize_metric("a b", &json!({"competition": 0})).unwrap();
        assert!(unknown.competition.abs() < f64::EPSILON);
    }

    #[test]
    fn negative_values_are_rejected() {
        let metric =
            normalize_metric("a b", &json!({"search_volume": -5, "cpc": -1.0})).unwrap();
        assert_eq!(metric.search_volume, None);
        assert_eq!(metric.cpc, None);
    }

    #[test]
    fn non_object_and_blank_entries_are_skipped() {
        assert!(normalize_metric("a b", &json!("oops")).is_none());
        assert!(normalize_metric("  ", &json!({})).is_none());
    }

    #[test]
    fn analysis_preserves_payload_order() {
        let map = json!({
            "zebra grooming": {},
            "alpha grooming": {},
            "bad": 3
        });
        let metrics = normalize_analysis(map.as_object().unwrap());
        let names: Vec<&str> = metrics.iter().map(|m| m.keyword.as_str()).collect();
        assert_eq!(names, vec!["zebra grooming", "alpha grooming"]);
    }

    #[test]
    fn related_terms_accept_objects() {
        let metric = normalize_metric(
            "a b",
            &json!({"related": [{"keyword": "c d"}, "e f", 3]}),
        )
        .unwrap();
        assert_eq!(metric.related_keywords, vec!["c d", "e f"]);
    }
}
