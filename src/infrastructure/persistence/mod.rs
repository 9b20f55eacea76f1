//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime
//! queries mapped through `FromRow` row structs.
//!
//! # Repositories
//!
//! - [`PgAuthorRepository`] - Authors
//! - [`PgBookRepository`] - Books and their genre links
//! - [`PgBookInstanceRepository`] - Copies and loans
//! - [`PgGenreRepository`] / [`PgLanguageRepository`] - Reference data
//! - [`PgUserRepository`] - Users and permissions
//! - [`PgSessionRepository`] - Browser sessions

pub mod pg_author_repository;
pub mod pg_book_instance_repository;
pub mod pg_book_repository;
pub mod pg_genre_repository;
pub mod pg_session_repository;
pub mod pg_user_repository;

pub use pg_author_repository::PgAuthorRepository;
pub use pg_book_instance_repository::PgBookInstanceRepository;
pub use pg_book_repository::PgBookRepository;
pub use pg_genre_repository::{PgGenreRepository, PgLanguageRepository};
pub use pg_session_repository::PgSessionRepository;
pub use pg_user_repository::PgUserRepository;
