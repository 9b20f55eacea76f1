//! API route configuration.

use crate::api::handlers::health_handler;
use crate::state::AppState;
use axum::{Router, routing::get};

/// Public API routes.
///
/// # Endpoints
///
/// - `GET /health` - Database connectivity and catalog counts
pub fn public_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_handler))
}
