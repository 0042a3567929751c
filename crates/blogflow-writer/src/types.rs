//! Request and response shapes for the blog-writer and content endpoints.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body for `POST /api/v1/blog/generate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogGenerationParams {
    pub topic: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quality_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

/// Generated post. Fields beyond the documented ones are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedBlog {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_score: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityLevel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Generation settings the preset applies (tone, length, and so on).
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

/// List endpoints answer with either a bare array or `{ "<key>": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Bare(Vec<T>),
    Wrapped(Map<String, Value>),
}

impl<T: serde::de::DeserializeOwned> ListEnvelope<T> {
    pub(crate) fn into_items(self, key: &str) -> Result<Vec<T>, serde_json::Error> {
        match self {
            Self::Bare(items) => Ok(items),
            Self::Wrapped(mut map) => {
                let inner = map
                    .remove(key)
                    .or_else(|| map.remove("data"))
                    .unwrap_or(Value::Array(Vec::new()));
                serde_json::from_value(inner)
            }
        }
    }
}

/// Body for `POST /api/blog-approvals`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApprovalRequest {
    pub queue_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body for `POST /api/blog-publishing`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublishingRequest {
    pub post_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

/// Record returned by the create endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UploadResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn params_omit_unset_options() {
        let params = BlogGenerationParams {
            topic: "Pet Grooming".into(),
            keywords: vec!["dog grooming".into()],
            ..BlogGenerationParams::default()
        };
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(body, json!({"topic": "Pet Grooming", "keywords": ["dog grooming"]}));
    }

    #[test]
    fn generated_blog_keeps_unknown_fields() {
        let blog: GeneratedBlog = serde_json::from_value(json!({
            "title": "Grooming 101",
            "content": "...",
            "readability": {"grade": 7}
        }))
        .unwrap();
        assert_eq!(blog.title, "Grooming 101");
        assert_eq!(blog.extra["readability"]["grade"], 7);
    }

    #[test]
    fn list_envelope_accepts_bare_and_wrapped() {
        let bare: ListEnvelope<QualityLevel> =
            serde_json::from_value(json!([{"id": "draft", "name": "Draft"}])).unwrap();
        assert_eq!(bare.into_items("quality_levels").unwrap().len(), 1);

        let wrapped: ListEnvelope<Preset> = serde_json::from_value(json!({
            "presets": [{"id": "howto", "name": "How-to", "tone": "friendly"}]
        }))
        .unwrap();
        let presets = wrapped.into_items("presets").unwrap();
        assert_eq!(presets[0].settings["tone"], "friendly");
    }
}
