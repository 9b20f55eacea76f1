//! Top-level router combining the site, the API and static files.
//!
//! # Route Structure
//!
//! - `GET  /`            - Redirect to `/catalog/`
//! - `/catalog/*`        - Catalog pages (session, some login or permission gated)
//! - `/accounts/*`       - Login and logout (session, stricter rate limit)
//! - `GET  /health`      - Health check (public, no session)
//! - `/static/*`         - Static assets
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket (configurable for proxy deployments)
//! - **Session** - Cookie-backed session for site routes
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::state::AppState;
use crate::web;
use crate::web::handlers::root_handler;
use crate::web::middleware::{rate_limit, session, tracing};
use axum::routing::get;
use axum::{Router, middleware};
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::services::ServeDir;

fn with_session(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes.layer(middleware::from_fn_with_state(state.clone(), session::layer))
}

fn assemble(site: Router<AppState>, state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .merge(api::routes::public_routes())
        .merge(site)
        .nest_service("/static", ServeDir::new(static_dir))
        .with_state(state)
}

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `behind_proxy` - when `true`, rate limiting reads client IP from
///   `X-Forwarded-For` / `X-Real-IP` headers instead of the peer socket address;
///   enable only when the service runs behind a trusted reverse proxy
/// - `static_dir` - directory served under `/static`
pub fn app_router(state: AppState, behind_proxy: bool, static_dir: &str) -> NormalizePath<Router> {
    let catalog = with_session(web::routes::catalog_routes(), &state)
        .layer(rate_limit::layer(behind_proxy));

    let accounts = with_session(web::routes::account_routes(), &state)
        .layer(rate_limit::secure_layer(behind_proxy));

    let router = assemble(catalog.merge(accounts), state, static_dir).layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

/// The same routes without rate limiting, tracing or path normalization.
///
/// Rate limiting keys on the peer address, which in-process test clients do
/// not provide.
pub fn site_router(state: AppState, static_dir: &str) -> Router {
    let site = with_session(
        web::routes::catalog_routes().merge(web::routes::account_routes()),
        &state,
    );
    assemble(site, state, static_dir)
}
