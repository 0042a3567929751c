//! Read-only access to `users` and `organizations`.

use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    /// `NULL` until the user joins or creates an organization.
    pub org_id: Option<Uuid>,
    pub role: Option<String>,
}

impl UserRow {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case("admin"))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no user has this id, or [`DbError::Sqlx`].
pub async fn get_user(pool: &PgPool, user_id: Uuid) -> Result<UserRow, DbError> {
    sqlx::query_as::<_, UserRow>("SELECT id, email, org_id, role FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

/// # Errors
///
/// Returns [`DbError::NotFound`] if no organization has this id, or [`DbError::Sqlx`].
pub async fn get_organization(pool: &PgPool, org_id: Uuid) -> Result<OrganizationRow, DbError> {
    sqlx::query_as::<_, OrganizationRow>("SELECT id, name FROM organizations WHERE id = $1")
        .bind(org_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_role_is_case_insensitive() {
        let user = UserRow {
            id: Uuid::new_v4(),
            email: "a@example.com".into(),
            org_id: None,
            role: Some("Admin".into()),
        };
        assert!(user.is_admin());
        assert!(!UserRow { role: None, ..user }.is_admin());
    }
}
