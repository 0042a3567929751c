//! Workflow session blob and the explicit per-handler session context.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::keywords::KeywordMetric;

/// Identity every workflow step operates under.
///
/// Resolved once per command from the `users` and `workflow_sessions`
/// tables and passed down explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub org_id: Uuid,
}

/// Content strategy chosen in the strategy step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentStrategy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Free-form JSON stored in `workflow_sessions.workflow_data`.
///
/// Only the documented keys are typed; everything else round-trips through
/// `extra` so that one step never drops keys written by another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub saved_keywords: Vec<KeywordMetric>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selected_topics: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_strategy: Option<ContentStrategy>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl WorkflowData {
    /// Decode a stored blob, falling back to an empty blob for `null` or
    /// shapes that do not match the documented keys.
    #[must_use]
    pub fn from_value(value: serde_json::Value) -> Self {
        if value.is_null() {
            return Self::default();
        }
        serde_json::from_value(value).unwrap_or_default()
    }
}
