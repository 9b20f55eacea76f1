//! Physical copies of books and their loan status.

use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Availability of a single copy. Persisted as a one-letter code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoanStatus {
    #[default]
    Maintenance,
    OnLoan,
    Available,
    Reserved,
}

impl LoanStatus {
    pub const ALL: [LoanStatus; 4] = [
        LoanStatus::Maintenance,
        LoanStatus::OnLoan,
        LoanStatus::Available,
        LoanStatus::Reserved,
    ];

    pub fn code(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "m",
            LoanStatus::OnLoan => "o",
            LoanStatus::Available => "a",
            LoanStatus::Reserved => "r",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LoanStatus::Maintenance => "Maintenance",
            LoanStatus::OnLoan => "On loan",
            LoanStatus::Available => "Available",
            LoanStatus::Reserved => "Reserved",
        }
    }

    /// CSS class used by the templates to colour the status.
    pub fn css_class(self) -> &'static str {
        match self {
            LoanStatus::Available => "text-success",
            LoanStatus::Maintenance => "text-danger",
            LoanStatus::OnLoan | LoanStatus::Reserved => "text-warning",
        }
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "m" | "maintenance" => Ok(LoanStatus::Maintenance),
            "o" | "on-loan" | "on_loan" => Ok(LoanStatus::OnLoan),
            "a" | "available" => Ok(LoanStatus::Available),
            "r" | "reserved" => Ok(LoanStatus::Reserved),
            other => Err(format!("unknown loan status '{other}'")),
        }
    }
}

/// A physical copy of a book that can be borrowed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookInstance {
    pub id: i64,
    pub book_id: i64,
    pub book_title: String,
    pub imprint: String,
    pub due_back: Option<NaiveDate>,
    pub status: LoanStatus,
    pub borrower_id: Option<i64>,
    pub borrower_username: Option<String>,
}

impl BookInstance {
    /// True when the copy has a due date strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.due_back.is_some_and(|due| due < today)
    }

    /// Due date as `YYYY-MM-DD`, or empty when none is set.
    pub fn due_back_display(&self) -> String {
        self.due_back
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }

    pub fn borrower_display(&self) -> &str {
        self.borrower_username.as_deref().unwrap_or("")
    }
}

/// Input for registering a new copy.
#[derive(Debug, Clone)]
pub struct NewBookInstance {
    pub book_id: i64,
    pub imprint: String,
    pub status: LoanStatus,
    pub due_back: Option<NaiveDate>,
}
