//! Librarian loan renewal form.

use chrono::NaiveDate;
use serde::Deserialize;

use super::errors::FormErrors;
use crate::utils::dates::parse_optional_date;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RenewForm {
    pub renewal_date: String,
    pub csrf_token: String,
}

impl RenewForm {
    /// Form proposing `date` as the new due date.
    pub fn initial(date: NaiveDate) -> Self {
        Self {
            renewal_date: date.format("%Y-%m-%d").to_string(),
            csrf_token: String::new(),
        }
    }

    /// Parses the submitted date. Range checks happen in the loan service.
    pub fn renewal_date(&self) -> Result<NaiveDate, FormErrors> {
        let mut errors = FormErrors::new();
        match parse_optional_date(&self.renewal_date) {
            Ok(Some(date)) => return Ok(date),
            Ok(None) => errors.add("renewal_date", "This field is required."),
            Err(_) => errors.add("renewal_date", "Enter a valid date."),
        }
        Err(errors)
    }
}
