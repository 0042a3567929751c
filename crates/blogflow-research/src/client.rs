//! HTTP client for the keyword-analysis endpoints.
//!
//! Two `reqwest` clients are kept: one with the normal request timeout for
//! `POST /api/keywords/analyze`, and one with the longer stream timeout for
//! the SSE variant, which can legitimately run for minutes.

use std::time::Duration;

use futures::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, Url};
use serde_json::Value;

use crate::error::ResearchError;
use crate::sse::{FallbackReason, ProgressReducer, ReducerState};
use crate::types::{AnalyzeRequest, AnalyzeResponse, StreamProgressEvent};

const ANALYZE_PATH: &str = "api/keywords/analyze";
const ANALYZE_STREAM_PATH: &str = "api/keywords/analyze/stream";

/// Result of one streaming attempt.
#[derive(Debug)]
pub enum StreamOutcome {
    Resolved(AnalyzeResponse),
    /// The caller should re-issue the request on the non-streaming path.
    Fallback(FallbackReason),
}

/// Which path produced an [`AnalyzeResponse`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseSource {
    Stream,
    Request,
}

pub struct KeywordApiClient {
    client: Client,
    stream_client: Client,
    base_url: Url,
}

impl KeywordApiClient {
    /// Build a client rooted at the application's base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Http`] if a `reqwest::Client` cannot be
    /// constructed, or [`ResearchError::InvalidBaseUrl`] if `base_url` does
    /// not parse.
    pub fn new(
        base_url: &str,
        timeout_secs: u64,
        stream_timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, ResearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        let stream_client = Client::builder()
            .timeout(Duration::from_secs(stream_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // One trailing slash so `join` appends instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| ResearchError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            stream_client,
            base_url,
        })
    }

    /// Request/response analysis.
    ///
    /// # Errors
    ///
    /// - [`ResearchError::Http`] on network failure.
    /// - [`ResearchError::Api`] on a non-2xx status, carrying the body's message.
    /// - [`ResearchError::Deserialize`] if the body is not the expected shape.
    pub async fn analyze(&self, request: &AnalyzeRequest) -> Result<AnalyzeResponse, ResearchError> {
        let url = self.endpoint(ANALYZE_PATH)?;
        tracing::debug!(keywords = request.keywords.len(), "requesting keyword analysis");

        let response = self.client.post(url).json(request).send().await?;
        let body = read_success_body(response).await?;
        serde_json::from_str(&body).map_err(|e| ResearchError::Deserialize {
            context: ANALYZE_PATH.to_string(),
            source: e,
        })
    }

    /// Streaming analysis. `on_progress` sees every decoded frame in order.
    ///
    /// Transport failures, non-2xx statuses and malformed frames come back as
    /// [`StreamOutcome::Fallback`] rather than errors.
    ///
    /// # Errors
    ///
    /// Returns [`ResearchError::Stream`] when the stream delivers an `error` frame.
    pub async fn analyze_stream(
        &self,
        request: &AnalyzeRequest,
        mut on_progress: impl FnMut(&StreamProgressEvent),
    ) -> Result<StreamOutcome, ResearchError> {
        let url = self.endpoint(ANALYZE_STREAM_PATH)?;

        let response = match self
            .stream_client
            .post(url)
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                return Ok(StreamOutcome::Fallback(FallbackReason::Transport(
                    e.to_string(),
                )))
            }
        };
        if !response.status().is_success() {
            return Ok(StreamOutcome::Fallback(FallbackReason::Transport(format!(
                "status {}",
                response.status().as_u16()
            ))));
        }

        let mut reducer = ProgressReducer::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(bytes) => {
                    for event in reducer.push_chunk(&bytes) {
                        on_progress(&event);
                    }
                }
                Err(e) => reducer.abort(e.to_string()),
            }
            if reducer.is_terminal() {
                break;
            }
        }
        // Dropping the body stream here closes the connection early.
        drop(stream);

        let frames = reducer.frames_seen();
        match reducer.finish() {
            ReducerState::Resolved(payload) => match serde_json::from_value(payload) {
                Ok(parsed) => {
                    tracing::debug!(frames, "stream resolved");
                    Ok(StreamOutcome::Resolved(parsed))
                }
                Err(e) => Ok(StreamOutcome::Fallback(FallbackReason::MalformedFrame(
                    e.to_string(),
                ))),
            },
            ReducerState::Failed(message) => Err(ResearchError::Stream(message)),
            ReducerState::FallbackRequested(reason) => Ok(StreamOutcome::Fallback(reason)),
            ReducerState::Idle | ReducerState::Streaming => {
                Ok(StreamOutcome::Fallback(FallbackReason::NoPayload))
            }
        }
    }

    /// Try the stream first when `streaming` is set, re-issuing the same
    /// request on the plain endpoint if the stream yields nothing usable.
    ///
    /// # Errors
    ///
    /// Propagates [`ResearchError::Stream`] from an `error` frame, and any
    /// error from [`KeywordApiClient::analyze`].
    pub async fn analyze_with_fallback(
        &self,
        request: &AnalyzeRequest,
        streaming: bool,
        on_progress: impl FnMut(&StreamProgressEvent),
    ) -> Result<(AnalyzeResponse, ResponseSource), ResearchError> {
        if streaming {
            match self.analyze_stream(request, on_progress).await? {
                StreamOutcome::Resolved(response) => {
                    return Ok((response, ResponseSource::Stream))
                }
                StreamOutcome::Fallback(reason) => {
                    tracing::warn!(reason = %reason, "stream unusable, falling back to plain analysis");
                }
            }
        }
        let response = self.analyze(request).await?;
        Ok((response, ResponseSource::Request))
    }

    fn endpoint(&self, path: &str) -> Result<Url, ResearchError> {
        self.base_url
            .join(path)
            .map_err(|e| ResearchError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }
}

async fn read_success_body(response: Response) -> Result<String, ResearchError> {
    let status = response.status();
    let body = response.text().await?;
    if status.is_success() {
        return Ok(body);
    }
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
    Err(ResearchError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Message from an error body's `error`, `message` or `detail` field.
pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(o) => o.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        })
}
