//! Login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension, Form,
    extract::{Query, State},
    http::header::SET_COOKIE,
    response::{IntoResponse, Redirect, Response},
};

use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::context::Nav;
use crate::web::forms::{CsrfForm, FormErrors, LoginForm, NextParam, safe_next};
use crate::web::middleware::session::{
    SessionId, clear_session_cookie, session_cookie, store_session,
};

const LOGIN_FAILED: &str = "Your username and password didn't match. Please try again.";

/// Template for the login page.
///
/// Renders `templates/registration/login.html` with the username typed so
/// far, the `next` target and any error.
#[derive(Template, WebTemplate)]
#[template(path = "registration/login.html")]
pub struct LoginTemplate {
    pub nav: Nav,
    pub username: String,
    pub next: String,
    pub errors: FormErrors,
}

/// Renders the login page.
///
/// # Endpoint
///
/// `GET /accounts/login/?next=/path`
///
/// Stores an anonymous session so the form's CSRF token can be checked when
/// it is posted back.
pub async fn login_form_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(SessionId(raw_id)): Extension<SessionId>,
    Query(params): Query<NextParam>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let (_, saved) = store_session(&st, &raw_id, session).await?;

    Ok((
        saved,
        LoginTemplate {
            nav,
            username: String::new(),
            next: params.next.unwrap_or_default(),
            errors: FormErrors::new(),
        },
    ))
}

/// Checks credentials and starts an authenticated session.
///
/// # Endpoint
///
/// `POST /accounts/login/`
///
/// # Session Rotation
///
/// The anonymous session is replaced by a new one bound to the user, so an
/// id planted before login is useless afterwards. The visit counter carries
/// over. On success the browser is sent to `next` if it is a local path,
/// otherwise to the catalog home page.
pub async fn login_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(SessionId(raw_id)): Extension<SessionId>,
    nav: Nav,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;

    let user = match st
        .auth_service
        .authenticate(&form.username, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AppError::Unauthorized { .. }) => {
            return Ok(LoginTemplate {
                nav,
                username: form.username,
                next: form.next,
                errors: FormErrors::non_field(LOGIN_FAILED),
            }
            .into_response());
        }
        Err(e) => return Err(e),
    };

    let started = st
        .session_service
        .login(Some(&raw_id), session.num_visits, user.id)
        .await?;
    let cookie = session_cookie(
        &started.raw_id,
        st.session_service.ttl_seconds(),
        st.secure_cookies,
    );

    Ok((
        [(SET_COOKIE, cookie)],
        Redirect::to(&safe_next(&form.next)),
    )
        .into_response())
}

/// Ends the session and returns to the catalog.
///
/// # Endpoint
///
/// `POST /accounts/logout/`
pub async fn logout_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(SessionId(raw_id)): Extension<SessionId>,
    Form(form): Form<CsrfForm>,
) -> Result<Response, AppError> {
    st.session_service
        .verify_csrf(&session, &form.csrf_token)?;
    st.session_service.logout(&raw_id).await?;

    if let Some(user_id) = session.user_id {
        tracing::info!(user_id, "User logged out");
    }

    Ok((
        [(SET_COOKIE, clear_session_cookie(st.secure_cookies))],
        Redirect::to("/catalog/"),
    )
        .into_response())
}
