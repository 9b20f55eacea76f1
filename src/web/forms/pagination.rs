//! `?page=` query parameter.

use serde::Deserialize;
use serde_json::json;
use serde_with::{NoneAsEmptyString, serde_as};

use crate::application::pagination::PageRequest;
use crate::error::AppError;

/// An empty `?page=` is treated as absent.
#[serde_as]
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    pub page: Option<String>,
}

impl PaginationParams {
    /// Interprets the parameter: absent means page 1, `last` the last page.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for anything that is not a page number.
    pub fn page_request(&self) -> Result<PageRequest, AppError> {
        match self.page.as_deref().map(str::trim) {
            None | Some("") => Ok(PageRequest::default()),
            Some("last") => Ok(PageRequest::Last),
            Some(raw) => raw.parse::<u32>().map(PageRequest::Number).map_err(|_| {
                AppError::not_found("Invalid page", json!({ "page": raw }))
            }),
        }
    }
}
