//! Building generation parameters from the workflow blob.

use blogflow_core::WorkflowData;

use crate::error::WriterError;
use crate::types::BlogGenerationParams;

/// Keywords sent with a generation request.
pub const MAX_GENERATION_KEYWORDS: usize = 10;

/// Explicit choices made in the editor form. Any field set here wins over
/// what the workflow session carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorOverrides {
    pub topic: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub tone: Option<String>,
    pub length: Option<u32>,
    pub target_audience: Option<String>,
    pub quality_level: Option<String>,
    pub preset: Option<String>,
    pub custom_instructions: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Derive generation parameters for the editor step.
///
/// Topic: override, else first selected topic, else the search query.
/// Keywords: override, else the saved keywords with the highest known
/// volume (at most [`MAX_GENERATION_KEYWORDS`]). Tone, length and audience
/// come from the content strategy unless overridden.
///
/// # Errors
///
/// Returns [`WriterError::MissingTopic`] when no topic can be found.
pub fn build_generation_params(
    data: &WorkflowData,
    overrides: &EditorOverrides,
) -> Result<BlogGenerationParams, WriterError> {
    let topic = non_blank(overrides.topic.as_deref())
        .or_else(|| {
            data.selected_topics
                .iter()
                .find_map(|t| non_blank(Some(t)))
        })
        .or_else(|| non_blank(data.search_query.as_deref()))
        .ok_or(WriterError::MissingTopic)?;

    let keywords = match &overrides.keywords {
        Some(explicit) => explicit
            .iter()
            .filter_map(|k| non_blank(Some(k)))
            .take(MAX_GENERATION_KEYWORDS)
            .collect(),
        None => {
            let mut saved: Vec<_> = data.saved_keywords.iter().collect();
            // Stable: equal volumes keep saved order, unknown volume last.
            saved.sort_by(|a, b| b.search_volume.cmp(&a.search_volume));
            saved
                .into_iter()
                .map(|k| k.keyword.clone())
                .take(MAX_GENERATION_KEYWORDS)
                .collect()
        }
    };

    let strategy = data.content_strategy.as_ref();
    Ok(BlogGenerationParams {
        topic,
        keywords,
        tone: non_blank(overrides.tone.as_deref())
            .or_else(|| non_blank(strategy.and_then(|s| s.tone.as_deref()))),
        length: overrides
            .length
            .or_else(|| strategy.and_then(|s| s.word_count)),
        target_audience: non_blank(overrides.target_audience.as_deref())
            .or_else(|| non_blank(strategy.and_then(|s| s.target_audience.as_deref()))),
        quality_level: non_blank(overrides.quality_level.as_deref()),
        preset: non_blank(overrides.preset.as_deref()),
        custom_instructions: non_blank(overrides.custom_instructions.as_deref()),
    })
}
