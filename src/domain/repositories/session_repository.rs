//! Repository trait for server-side browser sessions.

use crate::domain::entities::{NewSession, Session};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Repository interface for sessions.
///
/// Sessions are looked up by the HMAC of their id; raw ids never reach the
/// database.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores a new session.
    async fn create(&self, new_session: NewSession) -> Result<Session, AppError>;

    /// Finds a session that has not expired at `now`.
    ///
    /// The session's user and permissions are resolved in the same lookup.
    async fn find_active(
        &self,
        id_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Session>, AppError>;

    /// Stores the visit counter of a session.
    async fn set_visits(&self, session_id: i64, num_visits: i64) -> Result<(), AppError>;

    /// Deletes a session by id hash. Deleting an unknown session is a no-op.
    async fn delete(&self, id_hash: &str) -> Result<(), AppError>;

    /// Removes every session that expired before `now`. Returns the count.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64, AppError>;
}
