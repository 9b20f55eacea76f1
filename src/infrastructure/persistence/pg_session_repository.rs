//! PostgreSQL implementation of session repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewSession, Session};
use crate::domain::repositories::SessionRepository;
use crate::error::AppError;
use crate::infrastructure::persistence::pg_user_repository::parse_permissions;

/// Resolves a session (`s`) to its active user and that user's permissions.
/// Sessions of deactivated users resolve as anonymous.
const SESSION_SELECT: &str = r#"
    SELECT
        s.id,
        u.id AS user_id,
        u.username,
        s.num_visits,
        s.csrf_token,
        s.expires_at,
        COALESCE(
            ARRAY_AGG(p.codename::TEXT ORDER BY p.codename) FILTER (WHERE p.codename IS NOT NULL),
            '{}'
        ) AS permissions
    FROM sessions s
    LEFT JOIN users u ON u.id = s.user_id AND u.is_active
    LEFT JOIN user_permissions p ON p.user_id = u.id
"#;

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: i64,
    user_id: Option<i64>,
    username: Option<String>,
    num_visits: i64,
    csrf_token: String,
    expires_at: DateTime<Utc>,
    permissions: Vec<String>,
}

impl From<SessionRow> for Session {
    fn from(r: SessionRow) -> Self {
        Session {
            permissions: parse_permissions(r.permissions),
            id: r.id,
            user_id: r.user_id,
            username: r.username,
            num_visits: r.num_visits,
            csrf_token: r.csrf_token,
            expires_at: r.expires_at,
        }
    }
}

/// PostgreSQL repository for browser sessions.
pub struct PgSessionRepository {
    pool: Arc<PgPool>,
}

impl PgSessionRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PgSessionRepository {
    async fn create(&self, new_session: NewSession) -> Result<Session, AppError> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id_hash, user_id, num_visits, csrf_token, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&new_session.id_hash)
        .bind(new_session.user_id)
        .bind(new_session.num_visits)
        .bind(&new_session.csrf_token)
        .bind(new_session.expires_at)
        .execute(self.pool.as_ref())
        .await?;

        let sql = format!("{SESSION_SELECT} WHERE s.id_hash = $1 GROUP BY s.id, u.id");
        let row: SessionRow = sqlx::query_as(&sql)
            .bind(&new_session.id_hash)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::internal("Created session vanished", json!({})))?;

        Ok(row.into())
    }

    async fn find_active(
        &self,
        id_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AppError> {
        let sql = format!(
            "{SESSION_SELECT} WHERE s.id_hash = $1 AND s.expires_at > $2 GROUP BY s.id, u.id"
        );
        let row: Option<SessionRow> = sqlx::query_as(&sql)
            .bind(id_hash)
            .bind(now)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Session::from))
    }

    async fn set_visits(&self, session_id: i64, num_visits: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE sessions SET num_visits = $2 WHERE id = $1")
            .bind(session_id)
            .bind(num_visits)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn delete(&self, id_hash: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM sessions WHERE id_hash = $1")
            .bind(id_hash)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
