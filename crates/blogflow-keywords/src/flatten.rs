//! Flattening of nested related/long-tail terms into one keyword list.
//!
//! The analysis payload maps each searched keyword to its metrics, and each
//! metrics object may name further related and long-tail terms. Those nested
//! terms become placeholder entries that inherit the parent's difficulty and
//! competition until a single batched follow-up fetch fills in real numbers.

use std::collections::{HashMap, HashSet};

use blogflow_core::KeywordMetric;

/// Flat keyword list plus the placeholder terms still waiting on metrics.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlattenedKeywords {
    pub keywords: Vec<KeywordMetric>,
    /// Terms queued for the batched follow-up request, in insertion order.
    pub pending: Vec<String>,
}

fn key(keyword: &str) -> String {
    keyword.trim().to_lowercase()
}

/// Build the flat list from top-level entries (in payload order).
///
/// Top-level entries come first; duplicates are resolved first-writer-wins.
/// Nested `related_keywords` and `long_tail_keywords` absent from the list
/// are appended as placeholders with `search_volume: None` and a
/// back-reference to their parent keyword. `discovered` terms (upstream
/// suggestions) not yet present are appended last as bare placeholders.
/// Every placeholder is queued in `pending`.
#[must_use]
pub fn flatten_keywords(entries: Vec<KeywordMetric>, discovered: &[String]) -> FlattenedKeywords {
    let mut seen: HashSet<String> = HashSet::new();
    let mut keywords: Vec<KeywordMetric> = Vec::with_capacity(entries.len());

    for entry in entries {
        if entry.keyword.trim().is_empty() {
            continue;
        }
        if seen.insert(key(&entry.keyword)) {
            keywords.push(entry);
        }
    }

    let mut placeholders: Vec<KeywordMetric> = Vec::new();
    for parent in &keywords {
        for term in parent
            .related_keywords
            .iter()
            .chain(parent.long_tail_keywords.iter())
        {
            let term = term.trim();
            if term.is_empty() || !seen.insert(key(term)) {
                continue;
            }
            placeholders.push(KeywordMetric {
                difficulty: parent.difficulty,
                competition: parent.competition,
                parent_topic: Some(parent.keyword.clone()),
                related_to: Some(parent.keyword.clone()),
                ..KeywordMetric::bare(term)
            });
        }
    }

    for term in discovered {
        let term = term.trim();
        if term.is_empty() || !seen.insert(key(term)) {
            continue;
        }
        placeholders.push(KeywordMetric::bare(term));
    }

    let pending = placeholders.iter().map(|p| p.keyword.clone()).collect();
    keywords.extend(placeholders);

    FlattenedKeywords { keywords, pending }
}

/// Merge follow-up metrics into the matching placeholders.
///
/// Only queued terms are updated. Metric fields are overwritten; the
/// placeholder's back-reference and parent topic are kept. Returns the
/// number of placeholders that received data.
pub fn apply_follow_up(flat: &mut FlattenedKeywords, fetched: Vec<KeywordMetric>) -> usize {
    let pending: HashSet<String> = flat.pending.iter().map(|p| key(p)).collect();
    let mut by_key: HashMap<String, KeywordMetric> = HashMap::new();
    for metric in fetched {
        let k = key(&metric.keyword);
        if pending.contains(&k) {
            by_key.entry(k).or_insert(metric);
        }
    }

    let mut merged = 0;
    for entry in &mut flat.keywords {
        let Some(found) = by_key.remove(&key(&entry.keyword)) else {
            continue;
        };
        entry.search_volume = found.search_volume;
        entry.global_search_volume = found.global_search_volume;
        entry.difficulty = found.difficulty;
        entry.competition = found.competition;
        entry.cpc = found.cpc;
        entry.trend_score = found.trend_score;
        entry.cluster_score = found.cluster_score;
        entry.category_type = found.category_type;
        entry.serp_features = found.serp_features;
        if entry.parent_topic.is_none() {
            entry.parent_topic = found.parent_topic;
        }
        merged += 1;
    }
    merged
}

/// Drop single-token keywords of `min_single_token_len` characters or fewer.
///
/// A relevance heuristic that removes noise such as "the" or "app"; multi-word
/// phrases always pass.
#[must_use]
pub fn relevance_filter(
    keywords: Vec<KeywordMetric>,
    min_single_token_len: usize,
) -> Vec<KeywordMetric> {
    keywords
        .into_iter()
        .filter(|k| {
            let mut tokens = k.keyword.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (None, _) => false,
                (Some(only), None) => only.chars().count() > min_single_token_len,
                (Some(_), Some(_)) => true,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use blogflow_core::Difficulty;

    use super::*;

    fn entry(keyword: &str, volume: u64, related: &[&str]) -> KeywordMetric {
        KeywordMetric {
            search_volume: Some(volume),
            difficulty: Difficulty::Hard,
            competition: 0.7,
            related_keywords: related.iter().map(|s| (*s).to_string()).collect(),
            ..KeywordMetric::bare(keyword)
        }
    }

    #[test]
    fn nested_related_term_becomes_trailing_placeholder() {
        let flat = flatten_keywords(
            vec![
                entry("pet grooming", 5_000, &["mobile pet grooming"]),
                entry("dog grooming", 3_000, &[]),
            ],
            &[],
        );

        assert_eq!(flat.keywords.len(), 3);
        let third = &flat.keywords[2];
        assert_eq!(third.keyword, "mobile pet grooming");
        assert_eq!(third.parent_topic.as_deref(), Some("pet grooming"));
        assert_eq!(third.related_to.as_deref(), Some("pet grooming"));
        assert_eq!(third.search_volume, None);
        assert_eq!(third.difficulty, Difficulty::Hard);
        assert!((third.competition - 0.7).abs() < 1e-9);
        assert_eq!(flat.pending, vec!["mobile pet grooming".to_string()]);
    }

    #[test]
    fn nested_term_already_top_level_is_not_duplicated() {
        let flat = flatten_keywords(
            vec![
                entry("pet grooming", 1, &["dog grooming"]),
                entry("dog grooming", 2, &[]),
            ],
            &[],
        );
        assert_eq!(flat.keywords.len(), 2);
        assert!(flat.pending.is_empty());
    }

    #[test]
    fn first_writer_wins_on_duplicates() {
        let flat = flatten_keywords(
            vec![
                entry("pet grooming", 1, &["grooming tips"]),
                entry("Pet Grooming", 2, &[]),
                entry("dog care", 3, &["grooming tips"]),
            ],
            &[],
        );
        assert_eq!(flat.keywords.len(), 3);
        assert_eq!(flat.keywords[0].search_volume, Some(1));
        let tips = flat
            .keywords
            .iter()
            .find(|k| k.keyword == "grooming tips")
            .unwrap();
        assert_eq!(tips.related_to.as_deref(), Some("pet grooming"));
    }

    #[test]
    fn long_tail_terms_are_flattened_too() {
        let mut parent = entry("pet grooming", 1, &[]);
        parent.long_tail_keywords = vec!["affordable pet grooming services".to_string()];
        let flat = flatten_keywords(vec![parent], &[]);
        assert_eq!(flat.keywords.len(), 2);
        assert_eq!(flat.pending.len(), 1);
    }

    #[test]
    fn discovered_terms_are_queued_without_back_reference() {
        let flat = flatten_keywords(
            vec![entry("pet grooming", 1, &[])],
            &["pet spa".to_string(), "pet grooming".to_string()],
        );
        assert_eq!(flat.keywords.len(), 2);
        assert_eq!(flat.keywords[1].keyword, "pet spa");
        assert!(flat.keywords[1].related_to.is_none());
        assert_eq!(flat.pending, vec!["pet spa".to_string()]);
    }

    #[test]
    fn follow_up_fills_placeholder_and_keeps_back_reference() {
        let mut flat = flatten_keywords(
            vec![entry("pet grooming", 5_000, &["mobile pet grooming"])],
            &[],
        );
        let fetched = vec![
            KeywordMetric {
                search_volume: Some(880),
                competition: 0.3,
                difficulty: Difficulty::Easy,
                ..KeywordMetric::bare("mobile pet grooming")
            },
            KeywordMetric {
                search_volume: Some(1),
                ..KeywordMetric::bare("pet grooming")
            },
        ];

        let merged = apply_follow_up(&mut flat, fetched);

        assert_eq!(merged, 1);
        let placeholder = &flat.keywords[1];
        assert_eq!(placeholder.search_volume, Some(880));
        assert_eq!(placeholder.difficulty, Difficulty::Easy);
        assert_eq!(placeholder.parent_topic.as_deref(), Some("pet grooming"));
        assert_eq!(flat.keywords[0].search_volume, Some(5_000));
    }

    #[test]
    fn follow_up_without_match_keeps_placeholder_values() {
        let mut flat = flatten_keywords(
            vec![entry("pet grooming", 5_000, &["mobile pet grooming"])],
            &[],
        );
        assert_eq!(apply_follow_up(&mut flat, Vec::new()), 0);
        assert_eq!(flat.keywords[1].search_volume, None);
    }

    #[test]
    fn relevance_filter_drops_short_single_tokens() {
        let keywords = vec![
            KeywordMetric::bare("the"),
            KeywordMetric::bare("app"),
            KeywordMetric::bare("grooming"),
            KeywordMetric::bare("pet spa"),
            KeywordMetric::bare("   "),
        ];
        let kept: Vec<String> = relevance_filter(keywords, 5)
            .into_iter()
            .map(|k| k.keyword)
            .collect();
        assert_eq!(kept, vec!["grooming".to_string(), "pet spa".to_string()]);
    }

    #[test]
    fn relevance_threshold_is_tunable() {
        let kept = relevance_filter(vec![KeywordMetric::bare("app")], 2);
        assert_eq!(kept.len(), 1);
    }
}
