//! Author entity.

use chrono::NaiveDate;

/// A book author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}

impl Author {
    /// Creates a new Author instance.
    pub fn new(
        id: i64,
        first_name: String,
        last_name: String,
        date_of_birth: Option<NaiveDate>,
        date_of_death: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            date_of_birth,
            date_of_death,
        }
    }

    /// Name as shown in lists and select boxes: `"Last, First"`.
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Birth and death dates joined with a dash; unknown dates are left blank.
    pub fn lifespan(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%b %-d, %Y").to_string());
        match (fmt(self.date_of_birth), fmt(self.date_of_death)) {
            (None, None) => String::new(),
            (born, died) => format!(
                "{} - {}",
                born.unwrap_or_default(),
                died.unwrap_or_default()
            ),
        }
    }
}

/// Validated input for creating or updating an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInput {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
}
