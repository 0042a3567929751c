//! Keyword research against the keyword-analysis API.
//!
//! [`KeywordApiClient`] wraps the plain and SSE analysis endpoints,
//! [`ProgressReducer`] turns the SSE byte stream into a single result, and
//! [`run_keyword_research`] drives a full research run: request, flatten,
//! one batched follow-up, relevance filter, clusters and summary.

pub mod client;
pub mod error;
pub mod normalize;
pub mod pipeline;
pub mod sse;
pub mod types;

pub use client::{KeywordApiClient, ResponseSource, StreamOutcome};
pub use error::ResearchError;
pub use normalize::{normalize_analysis, normalize_metric};
pub use pipeline::{run_keyword_research, FollowUpStatus, ResearchOutcome};
pub use sse::{FallbackReason, ProgressReducer, ReducerState};
pub use types::{AnalyzeRequest, AnalyzeResponse, StreamProgressEvent};
