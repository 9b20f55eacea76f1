//! Parsing of dates typed into HTML forms.

use chrono::{NaiveDate, ParseError};

/// Parses an optional form date as `YYYY-MM-DD` or `MM/DD/YYYY`.
///
/// Blank input is `Ok(None)`.
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, ParseError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%m/%d/%Y"))
        .map(Some)
}
