//! Repository trait for physical copies and loans.

use crate::domain::entities::{BookInstance, LoanStatus, NewBookInstance};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Repository interface for book copies.
///
/// Loan queries always filter on status `o` (on loan) and order by `due_back`.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBookInstanceRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookInstanceRepository: Send + Sync {
    /// Registers a new copy of a book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the book does not exist.
    async fn create(&self, new_copy: NewBookInstance) -> Result<BookInstance, AppError>;

    /// Finds a copy by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<BookInstance>, AppError>;

    /// Lists all copies of a book.
    async fn list_for_book(&self, book_id: i64) -> Result<Vec<BookInstance>, AppError>;

    /// Counts all copies.
    async fn count(&self) -> Result<i64, AppError>;

    /// Counts copies with the given status.
    async fn count_by_status(&self, status: LoanStatus) -> Result<i64, AppError>;

    /// Lists one page of copies currently on loan, ordered by due date.
    ///
    /// When `borrower_id` is set only that user's loans are returned.
    async fn list_on_loan(
        &self,
        borrower_id: Option<i64>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<BookInstance>, AppError>;

    /// Counts copies currently on loan, optionally for one borrower.
    async fn count_on_loan(&self, borrower_id: Option<i64>) -> Result<i64, AppError>;

    /// Sets the due date of a copy.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no copy has this id.
    async fn update_due_back(&self, id: i64, due_back: NaiveDate)
    -> Result<BookInstance, AppError>;

    /// Marks a copy as on loan to a borrower until `due_back`.
    async fn lend(
        &self,
        id: i64,
        borrower_id: i64,
        due_back: NaiveDate,
    ) -> Result<BookInstance, AppError>;

    /// Marks a copy as available and clears the borrower and due date.
    async fn mark_returned(&self, id: i64) -> Result<BookInstance, AppError>;
}
