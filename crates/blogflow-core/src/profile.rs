use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const DEFAULT_MIN_SINGLE_TOKEN_LEN: usize = 5;
const MAX_SUGGESTIONS_CEILING: u32 = 200;

/// Optional research behaviours. Each one used to be a separate page
/// variant; here they are switched on per profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    /// Use the SSE endpoint first, falling back to the plain request.
    #[serde(default = "default_true")]
    pub streaming: bool,
    /// Ask the upstream for SERP features and keep them on each keyword.
    #[serde(default)]
    pub serp_details: bool,
    /// Queue upstream `suggested_keywords` for the follow-up metrics fetch.
    #[serde(default)]
    pub discovery_terms: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            streaming: true,
            serp_details: false,
            discovery_terms: false,
        }
    }
}

/// Request defaults and relevance tuning for keyword research runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResearchProfile {
    #[serde(default = "default_location")]
    pub location: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_search_type")]
    pub search_type: String,
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions_per_keyword: u32,
    /// Single-token keywords at or below this length are dropped as noise.
    #[serde(default = "default_min_single_token_len")]
    pub min_single_token_len: usize,
    #[serde(default)]
    pub capabilities: Capabilities,
}

impl Default for ResearchProfile {
    fn default() -> Self {
        Self {
            location: default_location(),
            language: default_language(),
            search_type: default_search_type(),
            max_suggestions_per_keyword: default_max_suggestions(),
            min_single_token_len: DEFAULT_MIN_SINGLE_TOKEN_LEN,
            capabilities: Capabilities::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_location() -> String {
    "United States".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_search_type() -> String {
    "explore_topic".to_string()
}

fn default_max_suggestions() -> u32 {
    20
}

fn default_min_single_token_len() -> usize {
    DEFAULT_MIN_SINGLE_TOKEN_LEN
}

/// Load and validate a research profile from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_research_profile(path: &Path) -> Result<ResearchProfile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ProfileFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let profile: ResearchProfile = serde_yaml::from_str(&content)?;
    validate_profile(&profile)?;
    Ok(profile)
}

/// Validate a parsed profile.
///
/// # Errors
///
/// Returns `ConfigError::InvalidProfile` for blank location or language,
/// or a suggestion count outside `1..=200`.
pub fn validate_profile(profile: &ResearchProfile) -> Result<(), ConfigError> {
    if profile.location.trim().is_empty() {
        return Err(ConfigError::InvalidProfile(
            "location must not be empty".to_string(),
        ));
    }
    if profile.language.trim().is_empty() {
        return Err(ConfigError::InvalidProfile(
            "language must not be empty".to_string(),
        ));
    }
    if profile.max_suggestions_per_keyword == 0
        || profile.max_suggestions_per_keyword > MAX_SUGGESTIONS_CEILING
    {
        return Err(ConfigError::InvalidProfile(format!(
            "max_suggestions_per_keyword must be between 1 and {MAX_SUGGESTIONS_CEILING}, got {}",
            profile.max_suggestions_per_keyword
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_mapping_yields_defaults() {
        let profile: ResearchProfile = serde_yaml::from_str("{}").unwrap();
        assert_eq!(profile, ResearchProfile::default());
        assert!(profile.capabilities.streaming);
        assert_eq!(profile.min_single_token_len, 5);
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "location: Canada\nmin_single_token_len: 3\ncapabilities:\n  discovery_terms: true\n";
        let profile: ResearchProfile = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(profile.location, "Canada");
        assert_eq!(profile.language, "en");
        assert_eq!(profile.min_single_token_len, 3);
        assert!(profile.capabilities.streaming);
        assert!(profile.capabilities.discovery_terms);
        assert!(!profile.capabilities.serp_details);
    }

    #[test]
    fn validate_rejects_blank_location() {
        let profile = ResearchProfile {
            location: "  ".to_string(),
            ..ResearchProfile::default()
        };
        assert!(matches!(
            validate_profile(&profile),
            Err(ConfigError::InvalidProfile(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_suggestions() {
        let profile = ResearchProfile {
            max_suggestions_per_keyword: 0,
            ..ResearchProfile::default()
        };
        assert!(validate_profile(&profile).is_err());
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = load_research_profile(Path::new("/nonexistent/research.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ProfileFileIo { .. }));
    }
}
