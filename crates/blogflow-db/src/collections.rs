//! Database operations for `keyword_collections`.
//!
//! A session owns at most one collection. Saving again replaces the stored
//! keywords instead of failing on the existing row.

use blogflow_core::{KeywordMetric, SessionContext};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `keyword_collections` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct KeywordCollectionRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    pub keywords: Value,
    pub search_query: Option<String>,
    pub niche: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KeywordCollectionRow {
    /// Stored keywords; entries that no longer decode are skipped.
    #[must_use]
    pub fn keyword_metrics(&self) -> Vec<KeywordMetric> {
        let Some(items) = self.keywords.as_array() else {
            return Vec::new();
        };
        items
            .iter()
            .filter_map(|item| serde_json::from_value(item.clone()).ok())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewKeywordCollection {
    pub name: String,
    pub keywords: Vec<KeywordMetric>,
    pub search_query: Option<String>,
    pub niche: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

/// Save the session's collection, updating the existing row if there is one.
///
/// # Errors
///
/// - [`DbError::InvalidInput`] if `name` is blank.
/// - [`DbError::Encode`] if the keywords cannot be serialized.
/// - [`DbError::Sqlx`] if the update or insert fails.
pub async fn upsert_keyword_collection(
    pool: &PgPool,
    ctx: &SessionContext,
    collection: &NewKeywordCollection,
) -> Result<UpsertOutcome, DbError> {
    let name = collection.name.trim();
    if name.is_empty() {
        return Err(DbError::InvalidInput("collection name is empty".to_string()));
    }
    let keywords = serde_json::to_value(&collection.keywords).map_err(|e| DbError::Encode {
        context: "keyword collection",
        source: e,
    })?;

    let updated = sqlx::query(
        "UPDATE keyword_collections \
         SET name = $3, keywords = $4, search_query = $5, niche = $6, updated_at = NOW() \
         WHERE session_id = $1 AND org_id = $2",
    )
    .bind(ctx.session_id)
    .bind(ctx.org_id)
    .bind(name)
    .bind(&keywords)
    .bind(collection.search_query.as_deref())
    .bind(collection.niche.as_deref())
    .execute(pool)
    .await?;

    if updated.rows_affected() > 0 {
        tracing::info!(session_id = %ctx.session_id, count = collection.keywords.len(), "keyword collection updated");
        return Ok(UpsertOutcome::Updated);
    }

    sqlx::query(
        "INSERT INTO keyword_collections \
         (id, session_id, org_id, name, keywords, search_query, niche) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(Uuid::new_v4())
    .bind(ctx.session_id)
    .bind(ctx.org_id)
    .bind(name)
    .bind(&keywords)
    .bind(collection.search_query.as_deref())
    .bind(collection.niche.as_deref())
    .execute(pool)
    .await?;

    tracing::info!(session_id = %ctx.session_id, count = collection.keywords.len(), "keyword collection inserted");
    Ok(UpsertOutcome::Inserted)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_keyword_collection(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Option<KeywordCollectionRow>, DbError> {
    let row = sqlx::query_as::<_, KeywordCollectionRow>(
        "SELECT id, session_id, org_id, name, keywords, search_query, niche, \
                created_at, updated_at \
         FROM keyword_collections WHERE session_id = $1 \
         ORDER BY updated_at DESC LIMIT 1",
    )
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn stored_keywords_skip_undecodable_entries() {
        let row = KeywordCollectionRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            name: "Grooming".into(),
            keywords: json!([
                {"keyword": "pet grooming", "search_volume": 5400, "competition": 0.5},
                "garbage",
                {"keyword": "dog grooming", "search_volume": null, "competition": 0.0}
            ]),
            search_query: Some("pet grooming".into()),
            niche: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let metrics = row.keyword_metrics();
        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].search_volume, Some(5400));
        assert_eq!(metrics[1].search_volume, None);
    }

    #[test]
    fn non_array_blob_is_empty() {
        let row = KeywordCollectionRow {
            id: Uuid::new_v4(),
            session_id: Uuid::new_v4(),
            org_id: Uuid::new_v4(),
            name: "x".into(),
            keywords: json!({}),
            search_query: None,
            niche: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(row.keyword_metrics().is_empty());
    }
}
