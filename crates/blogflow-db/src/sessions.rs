//! Database operations for `workflow_sessions`.

use blogflow_core::{SessionContext, WorkflowData};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::get_user;
use crate::DbError;

const SESSION_COLUMNS: &str =
    "id, user_id, org_id, current_step, workflow_data, created_at, updated_at";

/// A row from the `workflow_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkflowSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub org_id: Uuid,
    pub current_step: Option<i32>,
    /// Free-form `jsonb`; may be `NULL` on rows created by older clients.
    pub workflow_data: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkflowSessionRow {
    /// Typed view of `workflow_data`; an empty blob for `NULL` or unexpected shapes.
    #[must_use]
    pub fn data(&self) -> WorkflowData {
        self.workflow_data
            .clone()
            .map(WorkflowData::from_value)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn context(&self) -> SessionContext {
        SessionContext {
            session_id: self.id,
            user_id: self.user_id,
            org_id: self.org_id,
        }
    }
}

/// Result of resolving a session id for a user.
#[derive(Debug, Clone)]
pub enum SessionLookup {
    Found {
        context: SessionContext,
        session: WorkflowSessionRow,
    },
    /// The id is unknown; callers start a new session instead.
    NotFound,
}

/// Resolve `session_id` for `user_id` into an explicit [`SessionContext`].
///
/// # Errors
///
/// - [`DbError::Unauthorized`] if the user does not exist, has no
///   organization, or the session belongs to another organization.
/// - [`DbError::Sqlx`] on query failure.
pub async fn resolve_session_context(
    pool: &PgPool,
    user_id: Uuid,
    session_id: Uuid,
) -> Result<SessionLookup, DbError> {
    let user = match get_user(pool, user_id).await {
        Ok(user) => user,
        Err(DbError::NotFound) => {
            return Err(DbError::Unauthorized(format!("unknown user {user_id}")))
        }
        Err(e) => return Err(e),
    };
    let org_id = user
        .org_id
        .ok_or_else(|| DbError::Unauthorized(format!("user {user_id} has no organization")))?;

    let Some(session) = get_workflow_session(pool, session_id).await? else {
        tracing::info!(%session_id, "workflow session not found");
        return Ok(SessionLookup::NotFound);
    };
    if session.org_id != org_id {
        return Err(DbError::Unauthorized(format!(
            "session {session_id} belongs to another organization"
        )));
    }

    Ok(SessionLookup::Found {
        context: SessionContext {
            session_id: session.id,
            user_id,
            org_id,
        },
        session,
    })
}

/// Create an empty session for the user's organization.
///
/// # Errors
///
/// - [`DbError::Unauthorized`] if the user does not exist or has no organization.
/// - [`DbError::Sqlx`] if the insert fails.
pub async fn create_workflow_session(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<WorkflowSessionRow, DbError> {
    let user = get_user(pool, user_id).await.map_err(|e| match e {
        DbError::NotFound => DbError::Unauthorized(format!("unknown user {user_id}")),
        other => other,
    })?;
    let org_id = user
        .org_id
        .ok_or_else(|| DbError::Unauthorized(format!("user {user_id} has no organization")))?;

    let row = sqlx::query_as::<_, WorkflowSessionRow>(&format!(
        "INSERT INTO workflow_sessions (id, user_id, org_id, current_step, workflow_data) \
         VALUES ($1, $2, $3, 1, '{{}}'::jsonb) \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(org_id)
    .fetch_one(pool)
    .await?;

    tracing::info!(session_id = %row.id, %org_id, "workflow session created");
    Ok(row)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_workflow_session(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Option<WorkflowSessionRow>, DbError> {
    let row = sqlx::query_as::<_, WorkflowSessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM workflow_sessions WHERE id = $1"
    ))
    .bind(session_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Shallow-merge `patch` into the stored blob: top-level keys in `patch`
/// replace stored ones, other stored keys are kept.
///
/// # Errors
///
/// - [`DbError::InvalidInput`] if `patch` is not a JSON object.
/// - [`DbError::NotFound`] if the session does not exist in `ctx`'s organization.
/// - [`DbError::Sqlx`] if the update fails.
pub async fn merge_workflow_data(
    pool: &PgPool,
    ctx: &SessionContext,
    patch: &Value,
) -> Result<(), DbError> {
    if !patch.is_object() {
        return Err(DbError::InvalidInput(
            "workflow_data patch must be a JSON object".to_string(),
        ));
    }

    let result = sqlx::query(
        "UPDATE workflow_sessions \
         SET workflow_data = COALESCE(workflow_data, '{}'::jsonb) || $3::jsonb, \
             updated_at = NOW() \
         WHERE id = $1 AND org_id = $2",
    )
    .bind(ctx.session_id)
    .bind(ctx.org_id)
    .bind(patch)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if the session does not exist in `ctx`'s
/// organization, or [`DbError::Sqlx`].
pub async fn set_current_step(
    pool: &PgPool,
    ctx: &SessionContext,
    step: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE workflow_sessions SET current_step = $3, updated_at = NOW() \
         WHERE id = $1 AND org_id = $2",
    )
    .bind(ctx.session_id)
    .bind(ctx.org_id)
    .bind(step)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
