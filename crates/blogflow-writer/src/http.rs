//! Shared plumbing for the writer and content clients.

use std::time::Duration;

use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::WriterError;

pub(crate) fn build_client(timeout_secs: u64, user_agent: &str) -> Result<Client, WriterError> {
    Ok(Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent)
        .build()?)
}

/// Parse `base_url` with exactly one trailing slash so `join` appends paths.
pub(crate) fn parse_base_url(base_url: &str) -> Result<Url, WriterError> {
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    Url::parse(&normalised).map_err(|e| WriterError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })
}

pub(crate) fn join(base: &Url, path: &str) -> Result<Url, WriterError> {
    base.join(path).map_err(|e| WriterError::InvalidBaseUrl {
        url: base.to_string(),
        reason: e.to_string(),
    })
}

/// Read a 2xx body as `T`, or turn a non-2xx answer into [`WriterError::Api`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    service: &'static str,
    context: &str,
) -> Result<T, WriterError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        let message = error_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        return Err(WriterError::Api {
            service,
            status: status.as_u16(),
            message,
        });
    }
    serde_json::from_str(&body).map_err(|e| WriterError::Deserialize {
        context: context.to_string(),
        source: e,
    })
}

/// Message from an error body's `error`, `message` or `detail` field.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message", "detail"]
        .iter()
        .filter_map(|key| value.get(*key))
        .find_map(|v| match v {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Object(o) => o.get("message").and_then(Value::as_str).map(str::to_string),
            // FastAPI validation errors: `{"detail": [{"msg": ...}]}`
            Value::Array(items) => items
                .first()
                .and_then(|i| i.get("msg"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
}
