//! Cookie-backed session middleware.
//!
//! Every request to the site gets a [`Session`] in its extensions: the one
//! named by the `sessionid` cookie if it is still active, otherwise a fresh
//! anonymous session held in memory. Handlers that need the anonymous session
//! to outlive the request store it with [`store_session`]; only then is its
//! cookie set on the response.

use axum::{
    Extension,
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
    },
    middleware::Next,
    response::Response,
};

use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "sessionid";

/// Raw session id of the current request, for rotation and logout.
#[derive(Debug, Clone)]
pub struct SessionId(pub String);

/// Response marker: the handler stored the request's new session.
#[derive(Debug, Clone, Copy)]
pub struct SessionSaved;

/// Stores the request's session if it only exists in memory.
///
/// Returns the stored session and, when it was stored just now, the
/// [`SessionSaved`] marker the response must carry for the cookie to be set.
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the session store is unreachable.
pub async fn store_session(
    st: &AppState,
    raw_id: &str,
    session: Session,
) -> Result<(Session, Option<Extension<SessionSaved>>), AppError> {
    if session.is_stored() {
        return Ok((session, None));
    }

    let stored = st.session_service.save(raw_id, &session).await?;
    Ok((stored, Some(Extension(SessionSaved))))
}

/// Reads a cookie value from the `Cookie` header.
///
/// Handles multiple cookies separated by semicolons and ignores the rest.
pub fn read_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|cookies| cookies.split(';'))
        .find_map(|cookie| {
            let (key, value) = cookie.trim().split_once('=')?;
            (key == name).then_some(value)
        })
}

/// `Set-Cookie` value that stores a session id in the browser.
pub fn session_cookie(raw_id: &str, max_age: i64, secure: bool) -> String {
    let mut cookie =
        format!("{SESSION_COOKIE}={raw_id}; Path=/; Max-Age={max_age}; HttpOnly; SameSite=Lax");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Loads or starts the session and exposes it to handlers.
///
/// # Session Flow
///
/// 1. Extract `sessionid` cookie from request
/// 2. Resolve it via [`crate::application::services::SessionService::load`]
/// 3. Prepare an in-memory anonymous session if it is missing, unknown or expired
/// 4. Insert [`Session`] and [`SessionId`] into request extensions
/// 5. Set the cookie for a new session the handler stored, unless the
///    handler already set one
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the session store is unreachable.
pub async fn layer(
    State(st): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let service = &st.session_service;

    let cookie = read_cookie(req.headers(), SESSION_COOKIE).map(str::to_owned);

    let existing = match cookie {
        Some(raw_id) => service
            .load(&raw_id)
            .await?
            .map(|session| (raw_id, session)),
        None => None,
    };

    let (raw_id, session, is_new) = match existing {
        Some((raw_id, session)) => (raw_id, session, false),
        None => {
            let started = service.begin()?;
            (started.raw_id, started.session, true)
        }
    };

    req.extensions_mut().insert::<Session>(session);
    req.extensions_mut().insert(SessionId(raw_id.clone()));

    let mut response = next.run(req).await;

    let stored = response.extensions().get::<SessionSaved>().is_some();
    if is_new && stored && !response.headers().contains_key(SET_COOKIE) {
        let cookie = session_cookie(&raw_id, service.ttl_seconds(), st.secure_cookies);
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().insert(SET_COOKIE, value);
            }
            Err(e) => tracing::error!("Invalid session cookie header: {}", e),
        }
    }

    Ok(response)
}
