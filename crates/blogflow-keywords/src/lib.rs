//! Keyword intelligence for the blog workflow.
//!
//! Pure functions over [`KeywordMetric`](blogflow_core::KeywordMetric)
//! lists: parent-topic extraction, competition/difficulty display tiers,
//! cluster aggregation and scoring, summary metrics, flattening of nested
//! related/long-tail terms, and display filtering/sorting/paging. Nothing
//! here performs I/O.

pub mod classify;
pub mod cluster;
pub mod flatten;
pub mod metrics;
pub mod scorer;
pub mod topic;
pub mod view;

pub use classify::{
    competition_tier, difficulty_from_score, format_competition, format_cpc, format_volume,
    CompetitionTier,
};
pub use cluster::{build_clusters, KeywordCluster};
pub use flatten::{apply_follow_up, flatten_keywords, relevance_filter, FlattenedKeywords};
pub use metrics::{aggregate, KeywordSummary};
pub use scorer::cluster_score;
pub use topic::extract_parent_topic;
pub use view::{apply_query, KeywordQuery, Page, SortDirection, SortField};
