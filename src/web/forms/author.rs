//! Author create/update form.

use chrono::NaiveDate;
use serde::Deserialize;
use validator::Validate;

use super::errors::FormErrors;
use crate::domain::entities::{Author, AuthorInput};
use crate::utils::dates::parse_optional_date;

/// Initial date of death offered by the create form.
pub const INITIAL_DATE_OF_DEATH: &str = "2016-12-10";

const INVALID_DATE: &str = "Enter a valid date.";

/// Raw author form fields, kept as strings so they can be re-rendered.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct AuthorForm {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters."))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters."))]
    pub last_name: String,
    pub date_of_birth: String,
    pub date_of_death: String,
    pub csrf_token: String,
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

impl AuthorForm {
    /// Blank form for creating an author.
    pub fn initial() -> Self {
        Self {
            date_of_death: INITIAL_DATE_OF_DEATH.to_string(),
            ..Self::default()
        }
    }

    /// Form pre-filled with an existing author.
    pub fn from_author(author: &Author) -> Self {
        Self {
            first_name: author.first_name.clone(),
            last_name: author.last_name.clone(),
            date_of_birth: format_date(author.date_of_birth),
            date_of_death: format_date(author.date_of_death),
            csrf_token: String::new(),
        }
    }

    /// Checks the fields and converts them to service input.
    ///
    /// All problems are collected, not just the first.
    pub fn to_input(&self) -> Result<AuthorInput, FormErrors> {
        let trimmed = Self {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            ..self.clone()
        };

        let mut errors = trimmed
            .validate()
            .map_or_else(FormErrors::from, |_| FormErrors::new());

        let date_of_birth = parse_optional_date(&self.date_of_birth).unwrap_or_else(|_| {
            errors.add("date_of_birth", INVALID_DATE);
            None
        });
        let date_of_death = parse_optional_date(&self.date_of_death).unwrap_or_else(|_| {
            errors.add("date_of_death", INVALID_DATE);
            None
        });

        errors.into_result(AuthorInput {
            first_name: trimmed.first_name,
            last_name: trimmed.last_name,
            date_of_birth,
            date_of_death,
        })
    }
}
