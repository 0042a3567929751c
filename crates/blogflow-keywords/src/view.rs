//! Display-side filtering, sorting and paging of an already-computed list.

use std::cmp::Ordering;

use blogflow_core::{Difficulty, KeywordMetric};
use serde::Serialize;

pub const DEFAULT_PER_PAGE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Keyword,
    #[default]
    SearchVolume,
    Competition,
    Cpc,
    Difficulty,
    ClusterScore,
}

impl std::str::FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "keyword" => Ok(SortField::Keyword),
            "volume" | "search_volume" => Ok(SortField::SearchVolume),
            "competition" => Ok(SortField::Competition),
            "cpc" => Ok(SortField::Cpc),
            "difficulty" => Ok(SortField::Difficulty),
            "score" | "cluster_score" => Ok(SortField::ClusterScore),
            other => Err(format!("unknown sort field '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct KeywordQuery {
    /// Case-insensitive substring match on the keyword.
    pub text: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub min_volume: Option<u64>,
    pub sort: SortField,
    pub direction: SortDirection,
    /// 1-based.
    pub page: usize,
    pub per_page: usize,
}

impl Default for KeywordQuery {
    fn default() -> Self {
        Self {
            text: None,
            difficulty: None,
            min_volume: None,
            sort: SortField::default(),
            direction: SortDirection::default(),
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matches before paging.
    pub total: usize,
    pub page: usize,
    pub total_pages: usize,
}

/// Filter, sort and page a keyword list for display.
///
/// Keywords without a value for the sort field (unknown volume, unknown
/// competition, missing CPC or score) always sort last regardless of
/// direction. Out-of-range pages return an empty `items` list.
#[must_use]
pub fn apply_query(keywords: &[KeywordMetric], query: &KeywordQuery) -> Page<KeywordMetric> {
    let needle = query
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);

    let mut matched: Vec<&KeywordMetric> = keywords
        .iter()
        .filter(|k| {
            needle
                .as_deref()
                .is_none_or(|n| k.keyword.to_lowercase().contains(n))
        })
        .filter(|k| query.difficulty.is_none_or(|d| k.difficulty == d))
        .filter(|k| {
            query
                .min_volume
                .is_none_or(|min| k.search_volume.is_some_and(|v| v >= min))
        })
        .collect();

    matched.sort_by(|a, b| compare(a, b, query.sort, query.direction));

    let per_page = query.per_page.max(1);
    let page = query.page.max(1);
    let total = matched.len();
    let total_pages = total.div_ceil(per_page);

    let items = matched
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();

    Page {
        items,
        total,
        page,
        total_pages,
    }
}

fn compare(a: &KeywordMetric, b: &KeywordMetric, field: SortField, dir: SortDirection) -> Ordering {
    match field {
        SortField::Keyword => directed(a.keyword.cmp(&b.keyword), dir),
        SortField::Difficulty => directed(
            a.difficulty.weight().total_cmp(&b.difficulty.weight()),
            dir,
        ),
        SortField::SearchVolume => missing_last(a.search_volume, b.search_volume, dir),
        SortField::Competition => missing_last(
            a.has_known_competition().then_some(a.competition),
            b.has_known_competition().then_some(b.competition),
            dir,
        ),
        SortField::Cpc => missing_last(a.cpc, b.cpc, dir),
        SortField::ClusterScore => missing_last(a.cluster_score, b.cluster_score, dir),
    }
}

fn directed(ordering: Ordering, dir: SortDirection) -> Ordering {
    match dir {
        SortDirection::Ascending => ordering,
        SortDirection::Descending => ordering.reverse(),
    }
}

fn missing_last<T: PartialOrd>(a: Option<T>, b: Option<T>, dir: SortDirection) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => directed(x.partial_cmp(&y).unwrap_or(Ordering::Equal), dir),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kw(keyword: &str, volume: Option<u64>) -> KeywordMetric {
        KeywordMetric {
            search_volume: volume,
            ..KeywordMetric::bare(keyword)
        }
    }

    fn names(page: &Page<KeywordMetric>) -> Vec<&str> {
        page.items.iter().map(|k| k.keyword.as_str()).collect()
    }

    #[test]
    fn missing_volume_sorts_last_in_both_directions() {
        let keywords = vec![kw("a", None), kw("b", Some(10)), kw("c", Some(30))];

        let desc = apply_query(&keywords, &KeywordQuery::default());
        assert_eq!(names(&desc), vec!["c", "b", "a"]);

        let asc = apply_query(
            &keywords,
            &KeywordQuery {
                direction: SortDirection::Ascending,
                ..KeywordQuery::default()
            },
        );
        assert_eq!(names(&asc), vec!["b", "c", "a"]);
    }

    #[test]
    fn text_filter_is_case_insensitive() {
        let keywords = vec![kw("Pet Grooming", Some(1)), kw("dog walking", Some(2))];
        let page = apply_query(
            &keywords,
            &KeywordQuery {
                text: Some("GROOM".into()),
                ..KeywordQuery::default()
            },
        );
        assert_eq!(names(&page), vec!["Pet Grooming"]);
    }

    #[test]
    fn min_volume_excludes_unknown_volume() {
        let keywords = vec![kw("a", None), kw("b", Some(100)), kw("c", Some(5))];
        let page = apply_query(
            &keywords,
            &KeywordQuery {
                min_volume: Some(10),
                ..KeywordQuery::default()
            },
        );
        assert_eq!(names(&page), vec!["b"]);
    }

    #[test]
    fn paging_reports_totals() {
        let keywords: Vec<KeywordMetric> = (0..7_u64)
            .map(|i| kw(&format!("kw{i}"), Some(i)))
            .collect();
        let page = apply_query(
            &keywords,
            &KeywordQuery {
                page: 3,
                per_page: 3,
                ..KeywordQuery::default()
            },
        );
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
        assert_eq!(names(&page), vec!["kw0"]);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let page = apply_query(
            &[kw("a", Some(1))],
            &KeywordQuery {
                page: 9,
                ..KeywordQuery::default()
            },
        );
        assert!(page.items.is_empty());
        assert_eq!(page.total, 1);
    }

    #[test]
    fn sort_field_parses_aliases() {
        assert_eq!("volume".parse::<SortField>(), Ok(SortField::SearchVolume));
        assert_eq!("cluster-score".parse::<SortField>(), Ok(SortField::ClusterScore));
        assert!("nope".parse::<SortField>().is_err());
    }
}
