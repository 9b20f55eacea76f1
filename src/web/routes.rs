//! Site route configuration.
//!
//! Paths are declared without trailing slashes; the top-level router trims
//! them from requests, so `/catalog/books/` and `/catalog/books` both match.

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{MethodRouter, get, post},
};

use crate::domain::entities::Permission;
use crate::state::AppState;
use crate::web::handlers::*;
use crate::web::middleware::access::{login_required, permission_required};

/// Gates a route on a permission.
fn requires(permission: Permission, route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.route_layer(from_fn_with_state(permission, permission_required))
}

/// Catalog pages.
///
/// # Endpoints
///
/// Public:
/// - `GET /catalog` - Home page with counts and visit counter
/// - `GET /catalog/books` - Paginated book list
/// - `GET /catalog/book/{id}` - Book detail with copies
/// - `GET /catalog/authors` - Author list
/// - `GET /catalog/author/{id}` - Author detail with books
///
/// Login required:
/// - `GET /catalog/mybooks` - Current user's loans
///
/// Permission required:
/// - `GET /catalog/borrowed` - All loans (`can_mark_returned`)
/// - `GET|POST /catalog/book/{id}/renew` - Renewal form (`can_mark_returned`)
/// - `GET|POST /catalog/author/create`, `/{id}/update`, `/{id}/delete`
/// - `GET|POST /catalog/book/create`, `/{id}/update`, `/{id}/delete`
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/catalog", get(index_handler))
        .route("/catalog/books", get(book_list_handler))
        .route("/catalog/book/{id}", get(book_detail_handler))
        .route("/catalog/authors", get(author_list_handler))
        .route("/catalog/author/{id}", get(author_detail_handler))
        .route(
            "/catalog/mybooks",
            get(my_loans_handler).route_layer(from_fn(login_required)),
        )
        .route(
            "/catalog/borrowed",
            requires(Permission::CanMarkReturned, get(all_loans_handler)),
        )
        .route(
            "/catalog/book/{id}/renew",
            requires(
                Permission::CanMarkReturned,
                get(renew_form_handler).post(renew_handler),
            ),
        )
        .route(
            "/catalog/author/create",
            requires(
                Permission::AddAuthor,
                get(author_create_form_handler).post(author_create_handler),
            ),
        )
        .route(
            "/catalog/author/{id}/update",
            requires(
                Permission::ChangeAuthor,
                get(author_update_form_handler).post(author_update_handler),
            ),
        )
        .route(
            "/catalog/author/{id}/delete",
            requires(
                Permission::DeleteAuthor,
                get(author_delete_form_handler).post(author_delete_handler),
            ),
        )
        .route(
            "/catalog/book/create",
            requires(
                Permission::AddBook,
                get(book_create_form_handler).post(book_create_handler),
            ),
        )
        .route(
            "/catalog/book/{id}/update",
            requires(
                Permission::ChangeBook,
                get(book_update_form_handler).post(book_update_handler),
            ),
        )
        .route(
            "/catalog/book/{id}/delete",
            requires(
                Permission::DeleteBook,
                get(book_delete_form_handler).post(book_delete_handler),
            ),
        )
}

/// Login and logout.
///
/// # Endpoints
///
/// - `GET|POST /accounts/login` - Login form
/// - `POST /accounts/logout` - End the session
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/accounts/login",
            get(login_form_handler).post(login_handler),
        )
        .route("/accounts/logout", post(logout_handler))
}
