use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        let trimmed = raw.trim().trim_end_matches('/');
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            Ok(trimmed.to_string())
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected an http(s) URL, got '{raw}'"),
            })
        }
    };

    // Only database commands need it; see `AppConfig::require_database_url`.
    let database_url = lookup("DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty());

    let env = parse_environment(&or_default("BLOGFLOW_ENV", "development"))?;
    let log_level = or_default("BLOGFLOW_LOG_LEVEL", "info");

    let app_base_url = parse_url("BLOGFLOW_APP_BASE_URL", "http://localhost:3000")?;
    let writer_api_url = parse_url("BLOGFLOW_WRITER_API_URL", "http://localhost:8000")?;
    let writer_api_key = lookup("BLOGFLOW_WRITER_API_KEY")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let user_id = lookup("BLOGFLOW_USER_ID")
        .ok()
        .filter(|k| !k.trim().is_empty());
    let research_profile_path = PathBuf::from(or_default(
        "BLOGFLOW_RESEARCH_PROFILE_PATH",
        "./config/research.yaml",
    ));

    let request_timeout_secs = parse_u64("BLOGFLOW_REQUEST_TIMEOUT_SECS", "120")?;
    let stream_timeout_secs = parse_u64("BLOGFLOW_STREAM_TIMEOUT_SECS", "600")?;
    let user_agent = or_default("BLOGFLOW_USER_AGENT", "blogflow/0.1 (content-workflow)");
    let writer_max_retries = parse_u32("BLOGFLOW_WRITER_MAX_RETRIES", "3")?;
    let writer_retry_backoff_base_ms = parse_u64("BLOGFLOW_WRITER_RETRY_BACKOFF_BASE_MS", "1000")?;

    let db_max_connections = parse_u32("BLOGFLOW_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BLOGFLOW_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BLOGFLOW_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    Ok(AppConfig {
        database_url,
        env,
        log_level,
        app_base_url,
        writer_api_url,
        writer_api_key,
        user_id,
        research_profile_path,
        request_timeout_secs,
        stream_timeout_secs,
        user_agent,
        writer_max_retries,
        writer_retry_backoff_base_ms,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BLOGFLOW_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
