//! Keyword record shared by every crate in the workspace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Categorical keyword difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Normalized weight used by cluster averaging: easy 0.33, medium 0.66, hard 1.0.
    #[must_use]
    pub fn weight(self) -> f64 {
        match self {
            Difficulty::Easy => 0.33,
            Difficulty::Medium => 0.66,
            Difficulty::Hard => 1.0,
        }
    }

    /// Parse a label case-insensitively. Returns `None` for anything else.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" | "low" => Some(Difficulty::Easy),
            "medium" | "moderate" => Some(Difficulty::Medium),
            "hard" | "high" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "easy"),
            Difficulty::Medium => write!(f, "medium"),
            Difficulty::Hard => write!(f, "hard"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Topic,
    Question,
    Action,
    Entity,
}

impl CategoryType {
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "topic" => Some(CategoryType::Topic),
            "question" => Some(CategoryType::Question),
            "action" => Some(CategoryType::Action),
            "entity" => Some(CategoryType::Entity),
            _ => None,
        }
    }
}

/// One researched keyword.
///
/// `search_volume: None` means the upstream had no data and must not be
/// confused with a volume of zero. `competition == 0.0` is the upstream
/// "unknown" sentinel and is excluded from every average.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordMetric {
    pub keyword: String,
    #[serde(default)]
    pub search_volume: Option<u64>,
    #[serde(default)]
    pub global_search_volume: Option<u64>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub competition: f64,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cpc: Option<Decimal>,
    #[serde(default)]
    pub trend_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_type: Option<CategoryType>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub related_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub long_tail_keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub serp_features: Vec<String>,
}

impl KeywordMetric {
    /// A record with no metrics yet: unknown volume, medium difficulty,
    /// unknown competition.
    #[must_use]
    pub fn bare(keyword: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            search_volume: None,
            global_search_volume: None,
            difficulty: Difficulty::Medium,
            competition: 0.0,
            cpc: None,
            trend_score: None,
            parent_topic: None,
            related_to: None,
            cluster_score: None,
            category_type: None,
            related_keywords: Vec::new(),
            long_tail_keywords: Vec::new(),
            serp_features: Vec::new(),
        }
    }

    /// Whether the upstream reported a competition value (non-zero).
    #[must_use]
    pub fn has_known_competition(&self) -> bool {
        self.competition > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_labels_parse_case_insensitively() {
        assert_eq!(Difficulty::from_label("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_label(" high "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_label("extreme"), None);
    }

    #[test]
    fn missing_volume_serializes_as_null_not_zero() {
        let metric = KeywordMetric::bare("pet grooming");
        let json = serde_json::to_value(&metric).unwrap();
        assert!(json["search_volume"].is_null());
        assert_eq!(json["difficulty"], "medium");
    }

    #[test]
    fn cpc_reads_back_from_json_number() {
        let metric: KeywordMetric = serde_json::from_value(serde_json::json!({
            "keyword": "dog grooming",
            "search_volume": 1200,
            "difficulty": "hard",
            "competition": 0.4,
            "cpc": 1.25
        }))
        .unwrap();
        assert_eq!(metric.cpc, Some(Decimal::new(125, 2)));
        assert_eq!(metric.difficulty, Difficulty::Hard);
        assert!(metric.parent_topic.is_none());
    }
}
