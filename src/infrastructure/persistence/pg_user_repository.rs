//! PostgreSQL implementation of user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{Permission, User};
use crate::domain::repositories::UserRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on;
use serde_json::json;

/// Users with their granted permission codenames aggregated into an array.
const USER_SELECT: &str = r#"
    SELECT
        u.id,
        u.username,
        u.password_hash,
        u.is_active,
        u.created_at,
        COALESCE(
            ARRAY_AGG(p.codename::TEXT ORDER BY p.codename) FILTER (WHERE p.codename IS NOT NULL),
            '{}'
        ) AS permissions
    FROM users u
    LEFT JOIN user_permissions p ON p.user_id = u.id
"#;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    permissions: Vec<String>,
}

impl From<UserRow> for User {
    fn from(r: UserRow) -> Self {
        User {
            permissions: parse_permissions(r.permissions),
            id: r.id,
            username: r.username,
            password_hash: r.password_hash,
            is_active: r.is_active,
            created_at: r.created_at,
        }
    }
}

/// Converts stored codenames, skipping any this build does not know.
pub(crate) fn parse_permissions(codenames: Vec<String>) -> Vec<Permission> {
    codenames
        .into_iter()
        .filter_map(|c| match c.parse::<Permission>() {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::warn!("Ignoring stored permission: {}", e);
                None
            }
        })
        .collect()
}

/// PostgreSQL repository for users and permissions.
pub struct PgUserRepository {
    pool: Arc<PgPool>,
}

impl PgUserRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, password_hash)
            VALUES ($1, $2)
            RETURNING id, username, password_hash, is_active, created_at,
                      '{}'::TEXT[] AS permissions
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "users_username_key") {
                AppError::conflict("Username already taken", json!({ "username": username }))
            } else {
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let sql = format!("{USER_SELECT} WHERE u.username = $1 GROUP BY u.id");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("{USER_SELECT} WHERE u.id = $1 GROUP BY u.id");
        let row: Option<UserRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("{USER_SELECT} GROUP BY u.id ORDER BY u.username");
        let rows: Vec<UserRow> = sqlx::query_as(&sql)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn grant_permission(
        &self,
        user_id: i64,
        permission: Permission,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO user_permissions (user_id, codename)
            VALUES ($1, $2)
            ON CONFLICT (user_id, codename) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(permission.codename())
        .execute(self.pool.as_ref())
        .await?;

        Ok(())
    }

    async fn revoke_permission(
        &self,
        user_id: i64,
        permission: Permission,
    ) -> Result<bool, AppError> {
        let result =
            sqlx::query("DELETE FROM user_permissions WHERE user_id = $1 AND codename = $2")
                .bind(user_id)
                .bind(permission.codename())
                .execute(self.pool.as_ref())
                .await?;

        Ok(result.rows_affected() > 0)
    }
}
