//! Repository traits for genre and language reference data.

use crate::domain::entities::{Genre, Language};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for book genres.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenreRepository: Send + Sync {
    /// Creates a genre.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name is already taken.
    async fn create(&self, name: &str) -> Result<Genre, AppError>;

    /// Finds a genre by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Genre>, AppError>;

    /// Lists all genres ordered by name.
    async fn list(&self) -> Result<Vec<Genre>, AppError>;

    /// Counts all genres.
    async fn count(&self) -> Result<i64, AppError>;
}

/// Repository interface for book languages.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LanguageRepository: Send + Sync {
    /// Creates a language.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the name is already taken.
    async fn create(&self, name: &str) -> Result<Language, AppError>;

    /// Finds a language by exact name.
    async fn find_by_name(&self, name: &str) -> Result<Option<Language>, AppError>;

    /// Lists all languages ordered by name.
    async fn list(&self) -> Result<Vec<Language>, AppError>;
}
