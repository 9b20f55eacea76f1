//! Repository trait definitions for the domain layer.
//!
//! These traits abstract data access following the Repository pattern. They
//! are implemented by concrete repositories in the infrastructure layer.
//!
//! # Architecture
//!
//! - Traits define the contract for data operations
//! - Implementations live in `crate::infrastructure::persistence`
//! - Mock implementations are auto-generated via `mockall` for testing
//!
//! # Available Repositories
//!
//! - [`AuthorRepository`] - Author CRUD
//! - [`BookRepository`] - Book CRUD with genre links
//! - [`BookInstanceRepository`] - Copies and loans
//! - [`GenreRepository`] / [`LanguageRepository`] - Reference data
//! - [`UserRepository`] - Accounts and permissions
//! - [`SessionRepository`] - Browser sessions
//!
//! # Testing
//!
//! See integration tests in `tests/repository_*.rs` for usage examples.

pub mod author_repository;
pub mod book_instance_repository;
pub mod book_repository;
pub mod genre_repository;
pub mod session_repository;
pub mod user_repository;

pub use author_repository::AuthorRepository;
pub use book_instance_repository::BookInstanceRepository;
pub use book_repository::BookRepository;
pub use genre_repository::{GenreRepository, LanguageRepository};
pub use session_repository::SessionRepository;
pub use user_repository::UserRepository;

#[cfg(test)]
pub use author_repository::MockAuthorRepository;
#[cfg(test)]
pub use book_instance_repository::MockBookInstanceRepository;
#[cfg(test)]
pub use book_repository::MockBookRepository;
#[cfg(test)]
pub use genre_repository::{MockGenreRepository, MockLanguageRepository};
#[cfg(test)]
pub use session_repository::MockSessionRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
