//! Login and permission gates for site routes.
//!
//! Both run after [`super::session::layer`] and read the [`Session`] it
//! inserted. Anonymous visitors are sent to the login page with a `next`
//! parameter; signed-in users lacking a permission get a 403 page.

use axum::{
    extract::{Request, State},
    http::Uri,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use serde_json::json;

use crate::domain::entities::{Permission, Session};
use crate::error::AppError;

/// Path of the login page.
pub const LOGIN_PATH: &str = "/accounts/login/";

/// Login URL that returns to `next` after signing in.
pub fn login_url(next: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={encoded}")
}

fn redirect_to_login(uri: &Uri) -> Response {
    let next = uri.path_and_query().map_or("/", |pq| pq.as_str());
    Redirect::to(&login_url(next)).into_response()
}

/// Lets only signed-in users through.
///
/// # Example
///
/// ```rust,ignore
/// Router::new().route(
///     "/catalog/mybooks",
///     get(my_loans_handler).route_layer(middleware::from_fn(access::login_required)),
/// );
/// ```
pub async fn login_required(req: Request, next: Next) -> Response {
    let authenticated = req
        .extensions()
        .get::<Session>()
        .is_some_and(Session::is_authenticated);

    if authenticated {
        next.run(req).await
    } else {
        redirect_to_login(req.uri())
    }
}

/// Lets only users holding the permission in state through.
///
/// # Example
///
/// ```rust,ignore
/// Router::new().route(
///     "/catalog/borrowed",
///     get(all_loans_handler).route_layer(middleware::from_fn_with_state(
///         Permission::CanMarkReturned,
///         access::permission_required,
///     )),
/// );
/// ```
pub async fn permission_required(
    State(permission): State<Permission>,
    req: Request,
    next: Next,
) -> Response {
    let Some(session) = req.extensions().get::<Session>() else {
        return redirect_to_login(req.uri());
    };

    if !session.is_authenticated() {
        return redirect_to_login(req.uri());
    }

    if !session.has_permission(permission) {
        tracing::info!(
            user_id = ?session.user_id,
            permission = %permission,
            path = %req.uri().path(),
            "Permission denied"
        );
        return AppError::forbidden(
            "You do not have permission to view this page.",
            json!({ "permission": permission.codename() }),
        )
        .into_response();
    }

    next.run(req).await
}
