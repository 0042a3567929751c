//! Request/response shapes for the keyword-analysis endpoints.

use blogflow_core::{KeywordMetric, ResearchProfile};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::normalize::normalize_analysis;

/// Body for `POST /api/keywords/analyze` and its `/stream` variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzeRequest {
    pub keywords: Vec<String>,
    pub location: String,
    pub language: String,
    pub search_type: String,
    pub include_serp: bool,
    pub max_suggestions_per_keyword: u32,
    /// Advanced options passed through verbatim.
    #[serde(flatten)]
    pub advanced: Map<String, Value>,
}

impl AnalyzeRequest {
    /// Build a request for `keywords` using the profile's defaults.
    #[must_use]
    pub fn from_profile(keywords: Vec<String>, profile: &ResearchProfile) -> Self {
        Self {
            keywords,
            location: profile.location.clone(),
            language: profile.language.clone(),
            search_type: profile.search_type.clone(),
            include_serp: profile.capabilities.serp_details,
            max_suggestions_per_keyword: profile.max_suggestions_per_keyword,
            advanced: Map::new(),
        }
    }

    /// Same parameters, different keyword list. Used for the batched
    /// follow-up so placeholders are measured under the original settings.
    #[must_use]
    pub fn with_keywords(&self, keywords: Vec<String>) -> Self {
        Self {
            keywords,
            ..self.clone()
        }
    }
}

/// Response from the analysis endpoints.
///
/// The keyword map arrives under `enhanced_analysis` or, from older
/// deployments, `keyword_analysis`. Values are loosely typed and only
/// become [`KeywordMetric`]s through [`AnalyzeResponse::metrics`].
///
/// Envelope fields are read leniently: a `null` or wrongly typed field
/// degrades to its default instead of rejecting the payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalyzeResponse {
    #[serde(default, deserialize_with = "lenient_map")]
    pub enhanced_analysis: Option<Map<String, Value>>,
    #[serde(default, deserialize_with = "lenient_map")]
    pub keyword_analysis: Option<Map<String, Value>>,
    #[serde(default)]
    pub clusters: Option<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub suggested_keywords: Vec<Value>,
    #[serde(default)]
    pub location: Option<Value>,
    #[serde(default)]
    pub saved_search_id: Option<Value>,
}

impl AnalyzeResponse {
    /// The keyword map, preferring a non-empty `enhanced_analysis`.
    #[must_use]
    pub fn analysis(&self) -> Option<&Map<String, Value>> {
        match (&self.enhanced_analysis, &self.keyword_analysis) {
            (Some(enhanced), _) if !enhanced.is_empty() => Some(enhanced),
            (_, Some(basic)) => Some(basic),
            (Some(enhanced), None) => Some(enhanced),
            (None, None) => None,
        }
    }

    /// Validated keyword records in payload order.
    #[must_use]
    pub fn metrics(&self) -> Vec<KeywordMetric> {
        self.analysis().map(normalize_analysis).unwrap_or_default()
    }

    /// Suggested terms, accepting plain strings or `{ "keyword": ... }` objects.
    #[must_use]
    pub fn suggested_terms(&self) -> Vec<String> {
        self.suggested_keywords
            .iter()
            .filter_map(|v| match v {
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

    /// `saved_search_id` rendered as a string whether it arrived as a number or text.
    #[must_use]
    pub fn saved_search_id(&self) -> Option<String> {
        match self.saved_search_id.as_ref()? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// An object, or a string holding a JSON object; anything else is `None`.
fn lenient_map<'de, D>(deserializer: D) -> Result<Option<Map<String, Value>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(match raw {
        Value::Object(map) => Some(map),
        Value::String(s) => serde_json::from_str::<Map<String, Value>>(&s).ok(),
        Value::Null => None,
        other => {
            tracing::warn!(kind = value_kind(&other), "ignoring non-object analysis map");
            None
        }
    })
}

/// An array; `null` and other shapes read as empty.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        _ => Ok(Vec::new()),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// One decoded SSE frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamProgressEvent {
    /// The frame's `type` field, lower-cased. `None` for plain progress frames.
    pub kind: Option<String>,
    pub stage: Option<String>,
    /// Percentage in `0..=100`.
    pub progress: Option<f64>,
    pub details: Option<String>,
    pub message: Option<String>,
    pub data: Option<Value>,
    pub result: Option<Value>,
    pub error: Option<Value>,
}

impl StreamProgressEvent {
    /// Read a frame leniently; fields with unexpected types are dropped.
    #[must_use]
    pub fn from_value(frame: &Value) -> Self {
        let text = |key: &str| {
            frame
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        let progress = frame.get("progress").and_then(|p| match p {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
            _ => None,
        });

        Self {
            kind: text("type").map(|t| t.to_ascii_lowercase()),
            stage: text("stage"),
            progress: progress.map(|p| p.clamp(0.0, 100.0)),
            details: text("details"),
            message: text("message"),
            data: frame.get("data").filter(|d| !d.is_null()).cloned(),
            result: frame.get("result").filter(|d| !d.is_null()).cloned(),
            error: frame.get("error").filter(|d| !d.is_null()).cloned(),
        }
    }

    /// Best human-readable error text carried by the frame.
    #[must_use]
    pub fn error_message(&self) -> String {
        let from_error = self.error.as_ref().and_then(|e| match e {
            Value::String(s) => Some(s.clone()),
            Value::Object(o) => o.get("message").and_then(Value::as_str).map(str::to_string),
            _ => None,
        });
        from_error
            .or_else(|| self.message.clone())
            .or_else(|| self.details.clone())
            .unwrap_or_else(|| "stream reported an error".to_string())
    }
}
