//! Server-side browser sessions.

use chrono::{DateTime, Duration, Utc};
use serde_json::json;
use std::sync::Arc;

use crate::domain::entities::{NewSession, Session};
use crate::domain::repositories::SessionRepository;
use crate::error::AppError;
use crate::utils::signer::Signer;
use crate::utils::token::generate_token;

/// A freshly stored session and the raw id to hand to the browser.
///
/// The raw id exists only here and in the cookie.
#[derive(Debug, Clone)]
pub struct StartedSession {
    pub raw_id: String,
    pub session: Session,
}

/// Service for creating, resolving and rotating sessions.
pub struct SessionService<S: SessionRepository> {
    sessions: Arc<S>,
    signer: Signer,
    ttl: Duration,
}

impl<S: SessionRepository> SessionService<S> {
    /// Creates a new session service.
    ///
    /// # Arguments
    ///
    /// - `sessions` - session repository
    /// - `signer` - keyed MAC used to hash session ids
    /// - `ttl_seconds` - lifetime of a session from its creation
    pub fn new(sessions: Arc<S>, signer: Signer, ttl_seconds: i64) -> Self {
        Self {
            sessions,
            signer,
            ttl: Duration::seconds(ttl_seconds),
        }
    }

    /// Session lifetime in seconds, used for the cookie's `Max-Age`.
    pub fn ttl_seconds(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Hashes a raw session id with the server secret.
    ///
    /// Returns a 64-character lowercase hex-encoded MAC.
    pub fn hash_id(&self, raw_id: &str) -> String {
        self.signer.sign_hex(&[raw_id.as_bytes()])
    }

    async fn create(
        &self,
        user_id: Option<i64>,
        num_visits: i64,
        now: DateTime<Utc>,
    ) -> Result<StartedSession, AppError> {
        let raw_id = generate_token()?;
        let session = self
            .sessions
            .create(NewSession {
                id_hash: self.hash_id(&raw_id),
                user_id,
                num_visits,
                csrf_token: generate_token()?,
                expires_at: now + self.ttl,
            })
            .await?;

        Ok(StartedSession { raw_id, session })
    }

    /// Prepares an anonymous session without storing it.
    ///
    /// The session has `id` 0 until [`Self::save`] stores it. Requests that
    /// never need it leave nothing behind.
    pub fn begin(&self) -> Result<StartedSession, AppError> {
        Ok(StartedSession {
            raw_id: generate_token()?,
            session: Session {
                id: 0,
                user_id: None,
                username: None,
                permissions: Vec::new(),
                num_visits: 0,
                csrf_token: generate_token()?,
                expires_at: Utc::now() + self.ttl,
            },
        })
    }

    /// Stores a session prepared by [`Self::begin`], keeping its id and CSRF token.
    pub async fn save(&self, raw_id: &str, session: &Session) -> Result<Session, AppError> {
        self.sessions
            .create(NewSession {
                id_hash: self.hash_id(raw_id),
                user_id: session.user_id,
                num_visits: session.num_visits,
                csrf_token: session.csrf_token.clone(),
                expires_at: session.expires_at,
            })
            .await
    }

    /// Starts and stores an anonymous session.
    pub async fn start(&self) -> Result<StartedSession, AppError> {
        let started = self.begin()?;
        let session = self.save(&started.raw_id, &started.session).await?;
        Ok(StartedSession {
            raw_id: started.raw_id,
            session,
        })
    }

    /// Resolves a raw id from a cookie to an active session.
    ///
    /// Returns `Ok(None)` for unknown or expired ids.
    pub async fn load(&self, raw_id: &str) -> Result<Option<Session>, AppError> {
        if raw_id.is_empty() {
            return Ok(None);
        }
        self.sessions
            .find_active(&self.hash_id(raw_id), Utc::now())
            .await
    }

    /// Binds a user to a new session, discarding the current one.
    ///
    /// The visit counter carries over; the id and CSRF token do not.
    pub async fn login(
        &self,
        current_raw_id: Option<&str>,
        num_visits: i64,
        user_id: i64,
    ) -> Result<StartedSession, AppError> {
        if let Some(raw_id) = current_raw_id {
            self.sessions.delete(&self.hash_id(raw_id)).await?;
        }

        let started = self.create(Some(user_id), num_visits, Utc::now()).await?;
        tracing::info!(user_id, "User logged in");

        Ok(started)
    }

    /// Ends a session.
    pub async fn logout(&self, raw_id: &str) -> Result<(), AppError> {
        self.sessions.delete(&self.hash_id(raw_id)).await
    }

    /// Counts a visit and returns the count from before it.
    pub async fn record_visit(&self, session: &Session) -> Result<i64, AppError> {
        let previous = session.num_visits;
        self.sessions.set_visits(session.id, previous + 1).await?;
        Ok(previous)
    }

    /// Checks a submitted CSRF token against the session's.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Forbidden`] on mismatch.
    pub fn verify_csrf(&self, session: &Session, submitted: &str) -> Result<(), AppError> {
        if submitted.is_empty() || submitted != session.csrf_token {
            return Err(AppError::forbidden(
                "CSRF verification failed. Request aborted.",
                json!({}),
            ));
        }
        Ok(())
    }

    /// Deletes expired sessions. Returns how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, AppError> {
        self.sessions.purge_expired(Utc::now()).await
    }
}
