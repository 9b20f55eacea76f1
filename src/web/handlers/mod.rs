//! HTML page handlers for the catalog site.
//!
//! Each handler pairs with an Askama template under `templates/`. Form
//! handlers re-render their template with [`FormErrors`] on invalid input
//! and redirect with `303 See Other` on success.

mod accounts;
mod authors;
mod books;
mod index;
mod loans;

pub use accounts::{login_form_handler, login_handler, logout_handler};
pub use authors::{
    author_create_form_handler, author_create_handler, author_delete_form_handler,
    author_delete_handler, author_detail_handler, author_list_handler,
    author_update_form_handler, author_update_handler,
};
pub use books::{
    book_create_form_handler, book_create_handler, book_delete_form_handler, book_delete_handler,
    book_detail_handler, book_list_handler, book_update_form_handler, book_update_handler,
};
pub use index::{index_handler, root_handler};
pub use loans::{all_loans_handler, my_loans_handler, renew_form_handler, renew_handler};

use crate::error::AppError;
use crate::web::forms::FormErrors;

/// Separates validation failures, which re-render a form, from errors that
/// should become an error page.
pub(crate) fn validation_outcome<T>(
    result: Result<T, AppError>,
) -> Result<Result<T, FormErrors>, AppError> {
    match result {
        Ok(value) => Ok(Ok(value)),
        Err(e) => FormErrors::from_app_error(e).map(Err),
    }
}
