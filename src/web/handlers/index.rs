//! Catalog home page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Extension,
    extract::State,
    response::{IntoResponse, Redirect},
};

use crate::application::services::catalog_service::CatalogSummary;
use crate::domain::entities::Session;
use crate::error::AppError;
use crate::state::AppState;
use crate::web::context::Nav;
use crate::web::middleware::session::{SessionId, store_session};

/// Template for the home page.
///
/// Renders `templates/index.html` with:
/// - Counts of books, copies, available copies, authors and genres
/// - How many times this browser visited the page before
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub nav: Nav,
    pub summary: CatalogSummary,
    pub num_visits: i64,
}

/// Renders the home page and counts the visit.
///
/// The visit counter is the one thing that makes an anonymous session worth
/// storing.
///
/// # Endpoint
///
/// `GET /catalog/`
pub async fn index_handler(
    State(st): State<AppState>,
    Extension(session): Extension<Session>,
    Extension(SessionId(raw_id)): Extension<SessionId>,
    nav: Nav,
) -> Result<impl IntoResponse, AppError> {
    let summary = st.catalog_service.summary().await?;
    let (session, saved) = store_session(&st, &raw_id, session).await?;
    let num_visits = st.session_service.record_visit(&session).await?;

    Ok((
        saved,
        IndexTemplate {
            nav,
            summary,
            num_visits,
        },
    ))
}

/// `GET /` sends visitors to the catalog.
pub async fn root_handler() -> Redirect {
    Redirect::permanent("/catalog/")
}
