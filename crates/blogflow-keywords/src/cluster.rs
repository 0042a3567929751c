//! Grouping of a flat keyword list into scored parent-topic clusters.

use std::collections::HashMap;

use blogflow_core::KeywordMetric;
use serde::Serialize;

use crate::scorer::cluster_score;
use crate::topic::extract_parent_topic;

/// Keywords sharing a parent topic, with aggregate metrics.
///
/// Derived only; rebuilt from the full keyword list on every search or load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCluster {
    pub parent_topic: String,
    pub keywords: Vec<KeywordMetric>,
    pub total_volume: u64,
    /// Mean of easy 0.33 / medium 0.66 / hard 1.0.
    pub avg_difficulty: f64,
    /// Mean over competition values above zero; `0.0` when none are known.
    pub avg_competition: f64,
    pub cluster_score: f64,
    pub keyword_count: usize,
}

impl KeywordCluster {
    fn from_group(parent_topic: String, keywords: Vec<KeywordMetric>) -> Self {
        let keyword_count = keywords.len();
        let total_volume: u64 = keywords.iter().filter_map(|k| k.search_volume).sum();
        let avg_difficulty = mean(keywords.iter().map(|k| k.difficulty.weight())).unwrap_or(0.0);
        let avg_competition = mean(
            keywords
                .iter()
                .filter(|k| k.has_known_competition())
                .map(|k| k.competition),
        )
        .unwrap_or(0.0);

        let score = keywords
            .first()
            .and_then(|k| k.cluster_score)
            .unwrap_or_else(|| {
                cluster_score(total_volume, avg_difficulty, avg_competition, keyword_count)
            });

        Self {
            parent_topic,
            keywords,
            total_volume,
            avg_difficulty,
            avg_competition,
            cluster_score: score,
            keyword_count,
        }
    }

    /// Whether `avg_competition` reflects real data rather than the sentinel.
    #[must_use]
    pub fn has_known_competition(&self) -> bool {
        self.avg_competition > 0.0
    }
}

/// Group keywords by parent topic and rank the groups.
///
/// A keyword's own `parent_topic` wins; otherwise one is extracted from the
/// keyword text. Every input keyword lands in exactly one cluster. Clusters
/// are sorted by descending score, ties keeping first-appearance order.
#[must_use]
pub fn build_clusters(keywords: &[KeywordMetric]) -> Vec<KeywordCluster> {
    let mut order: Vec<(String, Vec<KeywordMetric>)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for keyword in keywords {
        let topic = keyword
            .parent_topic
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| extract_parent_topic(&keyword.keyword));

        if let Some(&slot) = index.get(&topic) {
            order[slot].1.push(keyword.clone());
        } else {
            index.insert(topic.clone(), order.len());
            order.push((topic, vec![keyword.clone()]));
        }
    }

    let mut clusters: Vec<KeywordCluster> = order
        .into_iter()
        .map(|(topic, members)| KeywordCluster::from_group(topic, members))
        .collect();

    clusters.sort_by(|a, b| b.cluster_score.total_cmp(&a.cluster_score));
    clusters
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0_f64, 0_usize), |(s, n), v| (s + v, n + 1));
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use blogflow_core::Difficulty;

    use super::*;

    fn kw(keyword: &str, volume: Option<u64>, competition: f64) -> KeywordMetric {
        KeywordMetric {
            search_volume: volume,
            competition,
            ..KeywordMetric::bare(keyword)
        }
    }

    #[test]
    fn zero_competition_is_excluded_from_average() {
        let keywords = vec![
            KeywordMetric {
                parent_topic: Some("Grooming".into()),
                ..kw("dog grooming", Some(10), 0.0)
            },
            KeywordMetric {
                parent_topic: Some("Grooming".into()),
                ..kw("cat grooming", Some(10), 0.0)
            },
            KeywordMetric {
                parent_topic: Some("Grooming".into()),
                ..kw("horse grooming", Some(10), 0.4)
            },
        ];
        let clusters = build_clusters(&keywords);
        assert_eq!(clusters.len(), 1);
        assert!((clusters[0].avg_competition - 0.4).abs() < 1e-9);
    }

    #[test]
    fn all_zero_competition_averages_to_zero() {
        let clusters = build_clusters(&[kw("pet grooming", Some(5), 0.0)]);
        assert_eq!(clusters[0].avg_competition, 0.0);
        assert!(!clusters[0].has_known_competition());
    }

    #[test]
    fn groups_by_extracted_topic_when_parent_missing() {
        let keywords = vec![
            kw("best pet grooming near me", Some(100), 0.2),
            kw("pet grooming", Some(300), 0.3),
            kw("dog training", Some(50), 0.5),
        ];
        let clusters = build_clusters(&keywords);
        let grooming = clusters
            .iter()
            .find(|c| c.parent_topic == "Pet Grooming")
            .expect("pet grooming cluster");
        assert_eq!(grooming.keyword_count, 2);
        assert_eq!(grooming.total_volume, 400);
    }

    #[test]
    fn missing_volume_counts_as_zero_in_total() {
        let keywords = vec![
            KeywordMetric {
                parent_topic: Some("x".into()),
                ..kw("alpha keyword", None, 0.0)
            },
            KeywordMetric {
                parent_topic: Some("x".into()),
                ..kw("beta keyword", Some(70), 0.0)
            },
        ];
        assert_eq!(build_clusters(&keywords)[0].total_volume, 70);
    }

    #[test]
    fn difficulty_average_uses_weights() {
        let keywords = vec![
            KeywordMetric {
                difficulty: Difficulty::Easy,
                parent_topic: Some("t".into()),
                ..kw("one keyword", None, 0.0)
            },
            KeywordMetric {
                difficulty: Difficulty::Hard,
                parent_topic: Some("t".into()),
                ..kw("two keyword", None, 0.0)
            },
        ];
        let cluster = &build_clusters(&keywords)[0];
        assert!((cluster.avg_difficulty - 0.665).abs() < 1e-9);
    }

    #[test]
    fn upstream_cluster_score_on_first_keyword_wins() {
        let keywords = vec![KeywordMetric {
            cluster_score: Some(12.5),
            ..kw("pet grooming", Some(100_000), 0.1)
        }];
        assert_eq!(build_clusters(&keywords)[0].cluster_score, 12.5);
    }

    #[test]
    fn sorted_by_descending_score() {
        let keywords = vec![
            kw("tiny niche topic", Some(10), 0.9),
            kw("huge popular topic", Some(90_000), 0.1),
        ];
        let clusters = build_clusters(&keywords);
        assert_eq!(clusters[0].parent_topic, "Huge Popular");
        assert!(clusters[0].cluster_score >= clusters[1].cluster_score);
    }

    #[test]
    fn clusters_partition_the_input() {
        let keywords = vec![
            kw("pet grooming", Some(1), 0.1),
            kw("pet grooming tips", Some(2), 0.2),
            kw("dog walking", Some(3), 0.3),
            KeywordMetric {
                parent_topic: Some("pet grooming".into()),
                ..kw("mobile pet grooming", None, 0.0)
            },
            kw("a", None, 0.0),
        ];
        let clusters = build_clusters(&keywords);

        let mut seen: Vec<&str> = clusters
            .iter()
            .flat_map(|c| c.keywords.iter().map(|k| k.keyword.as_str()))
            .collect();
        seen.sort_unstable();
        let mut expected: Vec<&str> = keywords.iter().map(|k| k.keyword.as_str()).collect();
        expected.sort_unstable();
        assert_eq!(seen, expected);
        assert!(clusters.iter().all(|c| c.keyword_count == c.keywords.len()));
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(build_clusters(&[]).is_empty());
    }
}
