use std::path::PathBuf;

use crate::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub env: Environment,
    pub log_level: String,
    /// Base URL of the web app that fronts `/api/keywords/*`, `/api/images/*`
    /// and the approval/publishing endpoints.
    pub app_base_url: String,
    pub writer_api_url: String,
    pub writer_api_key: Option<String>,
    /// Acting user for CLI commands; identity is otherwise resolved per command.
    pub user_id: Option<String>,
    pub research_profile_path: PathBuf,
    pub request_timeout_secs: u64,
    pub stream_timeout_secs: u64,
    pub user_agent: String,
    pub writer_max_retries: u32,
    pub writer_retry_backoff_base_ms: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
}

impl AppConfig {
    /// The database URL, for commands that open a pool.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnvVar`] when `DATABASE_URL` is unset or blank.
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("database_url", &self.database_url.as_ref().map(|_| "[redacted]"))
            .field("app_base_url", &self.app_base_url)
            .field("writer_api_url", &self.writer_api_url)
            .field(
                "writer_api_key",
                &self.writer_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("user_id", &self.user_id)
            .field("research_profile_path", &self.research_profile_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("stream_timeout_secs", &self.stream_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("writer_max_retries", &self.writer_max_retries)
            .field(
                "writer_retry_backoff_base_ms",
                &self.writer_retry_backoff_base_ms,
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .finish()
    }
}
