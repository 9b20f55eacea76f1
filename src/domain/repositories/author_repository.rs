//! Repository trait for author data access.

use crate::domain::entities::{Author, AuthorInput, Book};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for managing authors.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgAuthorRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Creates a new author.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn create(&self, input: AuthorInput) -> Result<Author, AppError>;

    /// Finds an author by id.
    async fn find_by_id(&self, id: i64) -> Result<Option<Author>, AppError>;

    /// Lists all authors ordered by last name, then first name.
    async fn list(&self) -> Result<Vec<Author>, AppError>;

    /// Counts all authors.
    async fn count(&self) -> Result<i64, AppError>;

    /// Replaces all editable fields of an author.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no author has this id.
    async fn update(&self, id: i64, input: AuthorInput) -> Result<Author, AppError>;

    /// Deletes an author. Their books keep existing with no author.
    ///
    /// Returns `Ok(false)` if the author did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Lists the books written by an author, ordered by title.
    async fn books_by_author(&self, author_id: i64) -> Result<Vec<Book>, AppError>;
}
