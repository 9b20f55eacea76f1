//! Field-level validation messages for re-rendered forms.

use std::collections::BTreeMap;
use validator::ValidationErrors;

use crate::error::AppError;

/// Key under which errors that belong to no single field are stored.
pub const NON_FIELD: &str = "__all__";

/// Validation messages keyed by form field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Single non-field error, as shown above a form.
    pub fn non_field(message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(NON_FIELD, message);
        errors
    }

    /// Messages for one field; empty if it is valid.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map_or(&[], Vec::as_slice)
    }

    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    pub fn non_field_errors(&self) -> &[String] {
        self.get(NON_FIELD)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `Ok(value)` when no errors were collected.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }

    /// Extracts field messages from a service validation error.
    ///
    /// Other errors are handed back so the caller can propagate them.
    pub fn from_app_error(err: AppError) -> Result<Self, AppError> {
        let AppError::Validation { message, details } = err else {
            return Err(err);
        };

        let mut errors = Self::new();
        match details.get("fields").and_then(|f| f.as_object()) {
            Some(fields) => {
                for (field, messages) in fields {
                    for msg in messages.as_array().into_iter().flatten() {
                        errors.add(field, msg.as_str().unwrap_or(&message));
                    }
                }
            }
            None => errors.add(NON_FIELD, message),
        }

        if errors.is_empty() {
            errors.add(NON_FIELD, "Please correct the errors below.");
        }
        Ok(errors)
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errs: ValidationErrors) -> Self {
        let mut errors = Self::new();
        for (field, field_errors) in errs.field_errors() {
            for e in field_errors {
                match &e.message {
                    Some(msg) => errors.add(field.as_ref(), msg.to_string()),
                    None => errors.add(field.as_ref(), e.code.to_string()),
                }
            }
        }
        errors
    }
}
