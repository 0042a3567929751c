//! One keyword research run, end to end.

use std::collections::HashSet;

use blogflow_core::{KeywordMetric, ResearchProfile};
use blogflow_keywords::{
    aggregate, apply_follow_up, build_clusters, flatten_keywords, relevance_filter,
    KeywordCluster, KeywordSummary,
};
use serde::Serialize;
use serde_json::Value;

use crate::client::{KeywordApiClient, ResponseSource};
use crate::error::ResearchError;
use crate::types::{AnalyzeRequest, StreamProgressEvent};

/// What happened to the batched metrics fetch for placeholder terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FollowUpStatus {
    NotNeeded,
    Completed { requested: usize, merged: usize },
    /// Placeholders were kept with unknown volume.
    Failed { requested: usize, error: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    /// Seeds joined with `", "`, as stored on the collection.
    pub query: String,
    pub keywords: Vec<KeywordMetric>,
    pub clusters: Vec<KeywordCluster>,
    pub summary: KeywordSummary,
    pub source: ResponseSource,
    pub follow_up: FollowUpStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_search_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
}

/// Trimmed, case-insensitively de-duplicated seeds in input order.
fn clean_seeds(seeds: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    seeds
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && seen.insert(s.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Run keyword research for `seeds`.
///
/// Flow: analysis request (stream first when the profile allows it) →
/// flatten nested terms → one batched follow-up for placeholders →
/// relevance filter → clusters and summary. The follow-up completes, or its
/// failure is logged and tolerated, before the list is returned.
///
/// # Errors
///
/// - [`ResearchError::EmptyQuery`] if no seed survives trimming.
/// - Any error from the primary analysis request. Follow-up failures are
///   reported in [`ResearchOutcome::follow_up`] instead.
pub async fn run_keyword_research(
    client: &KeywordApiClient,
    profile: &ResearchProfile,
    seeds: &[String],
    on_progress: impl FnMut(&StreamProgressEvent),
) -> Result<ResearchOutcome, ResearchError> {
    let seeds = clean_seeds(seeds);
    if seeds.is_empty() {
        return Err(ResearchError::EmptyQuery);
    }
    let query = seeds.join(", ");
    tracing::info!(query = %query, streaming = profile.capabilities.streaming, "starting keyword research");

    let request = AnalyzeRequest::from_profile(seeds, profile);
    let (response, source) = client
        .analyze_with_fallback(&request, profile.capabilities.streaming, on_progress)
        .await?;

    let mut entries = response.metrics();
    if !profile.capabilities.serp_details {
        for entry in &mut entries {
            entry.serp_features.clear();
        }
    }
    let discovered = if profile.capabilities.discovery_terms {
        response.suggested_terms()
    } else {
        Vec::new()
    };

    let mut flat = flatten_keywords(entries, &discovered);
    let follow_up = if flat.pending.is_empty() {
        FollowUpStatus::NotNeeded
    } else {
        let requested = flat.pending.len();
        let follow_request = request.with_keywords(flat.pending.clone());
        match client.analyze(&follow_request).await {
            Ok(fetched) => {
                let merged = apply_follow_up(&mut flat, fetched.metrics());
                tracing::debug!(requested, merged, "follow-up metrics merged");
                FollowUpStatus::Completed { requested, merged }
            }
            Err(e) => {
                tracing::warn!(requested, error = %e, "follow-up metrics fetch failed; keeping placeholders");
                FollowUpStatus::Failed {
                    requested,
                    error: e.to_string(),
                }
            }
        }
    };

    let keywords = relevance_filter(flat.keywords, profile.min_single_token_len);
    let clusters = build_clusters(&keywords);
    let summary = aggregate(&keywords);

    tracing::info!(
        keywords = keywords.len(),
        clusters = clusters.len(),
        source = ?source,
        "keyword research complete"
    );

    Ok(ResearchOutcome {
        query,
        keywords,
        clusters,
        summary,
        source,
        follow_up,
        saved_search_id: response.saved_search_id(),
        location: response.location.clone(),
    })
}
