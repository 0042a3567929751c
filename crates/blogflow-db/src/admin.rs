//! Platform-wide counters for the admin dashboard.

use serde::Serialize;
use sqlx::PgPool;

use crate::DbError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct AdminStats {
    pub total_users: i64,
    pub total_organizations: i64,
    pub total_sessions: i64,
    pub sessions_last_7_days: i64,
    pub total_collections: i64,
    /// Sum of keyword array lengths across all collections.
    pub total_saved_keywords: i64,
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn admin_stats(pool: &PgPool) -> Result<AdminStats, DbError> {
    let stats = sqlx::query_as::<_, AdminStats>(
        "SELECT \
           (SELECT COUNT(*) FROM users) AS total_users, \
           (SELECT COUNT(*) FROM organizations) AS total_organizations, \
           (SELECT COUNT(*) FROM workflow_sessions) AS total_sessions, \
           (SELECT COUNT(*) FROM workflow_sessions \
              WHERE created_at >= NOW() - INTERVAL '7 days') AS sessions_last_7_days, \
           (SELECT COUNT(*) FROM keyword_collections) AS total_collections, \
           (SELECT COALESCE(SUM(jsonb_array_length(keywords)), 0)::BIGINT \
              FROM keyword_collections \
              WHERE jsonb_typeof(keywords) = 'array') AS total_saved_keywords",
    )
    .fetch_one(pool)
    .await?;

    tracing::debug!(?stats, "admin stats loaded");
    Ok(stats)
}
