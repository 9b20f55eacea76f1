//! Shared application state injected into every handler.

use sqlx::PgPool;
use std::sync::Arc;

use crate::application::services::{AuthService, CatalogService, LoanService, SessionService};
use crate::error::AppError;
use crate::infrastructure::persistence::{
    PgAuthorRepository, PgBookInstanceRepository, PgBookRepository, PgGenreRepository,
    PgLanguageRepository, PgSessionRepository, PgUserRepository,
};
use crate::utils::signer::Signer;

pub type Catalog = CatalogService<
    PgBookRepository,
    PgAuthorRepository,
    PgBookInstanceRepository,
    PgGenreRepository,
    PgLanguageRepository,
>;
pub type Loans = LoanService<PgBookInstanceRepository, PgUserRepository>;
pub type Auth = AuthService<PgUserRepository>;
pub type Sessions = SessionService<PgSessionRepository>;

/// Session and cookie settings taken from the configuration.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Server secret keying session id hashes and password hashes.
    pub secret: String,
    pub ttl_seconds: i64,
    /// Adds `Secure` to the session cookie.
    pub secure_cookies: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<PgPool>,
    pub catalog_service: Arc<Catalog>,
    pub loan_service: Arc<Loans>,
    pub auth_service: Arc<Auth>,
    pub session_service: Arc<Sessions>,
    pub secure_cookies: bool,
}

impl AppState {
    /// Wires the PostgreSQL repositories into the services.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the session secret cannot key a MAC.
    pub fn new(pool: Arc<PgPool>, settings: &SessionSettings) -> Result<Self, AppError> {
        let signer = Signer::new(&settings.secret)?;

        let books = Arc::new(PgBookRepository::new(pool.clone()));
        let authors = Arc::new(PgAuthorRepository::new(pool.clone()));
        let copies = Arc::new(PgBookInstanceRepository::new(pool.clone()));
        let genres = Arc::new(PgGenreRepository::new(pool.clone()));
        let languages = Arc::new(PgLanguageRepository::new(pool.clone()));
        let users = Arc::new(PgUserRepository::new(pool.clone()));
        let sessions = Arc::new(PgSessionRepository::new(pool.clone()));

        Ok(Self {
            catalog_service: Arc::new(CatalogService::new(
                books,
                authors,
                copies.clone(),
                genres,
                languages,
            )),
            loan_service: Arc::new(LoanService::new(copies, users.clone())),
            auth_service: Arc::new(AuthService::new(users, signer.clone())),
            session_service: Arc::new(SessionService::new(
                sessions,
                signer,
                settings.ttl_seconds,
            )),
            secure_cookies: settings.secure_cookies,
            db: pool,
        })
    }
}
