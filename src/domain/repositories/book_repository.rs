//! Repository trait for book data access.

use crate::domain::entities::{Book, BookInput};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing catalog books.
///
/// Books are returned with author name, language name and genres resolved.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgBookRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Creates a book and links it to its genres in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the author, language or a genre
    /// does not exist.
    async fn create(&self, input: BookInput) -> Result<Book, AppError>;

    /// Finds a book by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Book>, AppError>;

    /// Lists one page of books ordered by title, then id.
    async fn list(&self, offset: i64, limit: i64) -> Result<Vec<Book>, AppError>;

    /// Counts all books.
    async fn count(&self) -> Result<i64, AppError>;

    /// Replaces all editable fields and the genre set of a book.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no book has this id.
    async fn update(&self, id: i64, input: BookInput) -> Result<Book, AppError>;

    /// Deletes a book.
    ///
    /// Returns `Ok(false)` if the book did not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] while copies of the book still exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}
