//! Per-request data every page layout needs.

use axum::{extract::FromRequestParts, http::request::Parts};
use serde_json::json;

use crate::domain::entities::{Permission, Session};
use crate::error::AppError;
use crate::web::middleware::access::login_url;

/// Sidebar and form context shared by all site templates.
///
/// Extracted from the [`Session`] placed in request extensions by the
/// session middleware.
#[derive(Debug, Clone)]
pub struct Nav {
    pub username: Option<String>,
    pub is_authenticated: bool,
    pub is_librarian: bool,
    pub csrf_token: String,
    /// Login link that comes back to the current page.
    pub login_url: String,
    permissions: Vec<Permission>,
}

impl Nav {
    pub fn new(session: &Session, path: &str) -> Self {
        Self {
            username: session.username.clone(),
            is_authenticated: session.is_authenticated(),
            is_librarian: session.is_librarian(),
            csrf_token: session.csrf_token.clone(),
            login_url: login_url(path),
            permissions: if session.is_authenticated() {
                session.permissions.clone()
            } else {
                Vec::new()
            },
        }
    }

    /// Whether the user holds a permission, by codename.
    pub fn can(&self, codename: &str) -> bool {
        self.permissions.iter().any(|p| p.codename() == codename)
    }

    pub fn display_username(&self) -> &str {
        self.username.as_deref().unwrap_or("")
    }
}

impl<S: Send + Sync> FromRequestParts<S> for Nav {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts.extensions.get::<Session>().ok_or_else(|| {
            AppError::internal("Session middleware not installed", json!({}))
        })?;
        Ok(Nav::new(session, parts.uri.path()))
    }
}
