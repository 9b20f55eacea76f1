//! HTML form payloads and their validation.
//!
//! Forms keep the raw strings the browser sent so an invalid submission can
//! be re-rendered as typed, with [`FormErrors`] next to each field.

pub mod author;
pub mod book;
pub mod errors;
pub mod login;
pub mod pagination;
pub mod renew;

pub use author::AuthorForm;
pub use book::BookForm;
pub use errors::FormErrors;
pub use login::{LoginForm, NextParam, safe_next};
pub use pagination::PaginationParams;
pub use renew::RenewForm;

use serde::Deserialize;

/// Body of forms that carry nothing but the CSRF token, such as delete
/// confirmations and logout.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CsrfForm {
    pub csrf_token: String,
}
