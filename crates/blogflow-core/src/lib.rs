pub mod app_config;
pub mod config;
pub mod keywords;
pub mod profile;
pub mod workflow;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use keywords::{CategoryType, Difficulty, KeywordMetric};
pub use profile::{load_research_profile, Capabilities, ResearchProfile};
pub use workflow::{ContentStrategy, SessionContext, WorkflowData};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read research profile {path}: {source}")]
    ProfileFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse research profile: {0}")]
    ProfileFileParse(#[from] serde_yaml::Error),

    #[error("invalid research profile: {0}")]
    InvalidProfile(String),
}
