//! Core domain entities representing the catalog data model.
//!
//! Entities are plain data structures. Queries and persistence live behind the
//! repository traits in [`crate::domain::repositories`].
//!
//! # Entity Types
//!
//! - [`Book`] - A title in the catalog
//! - [`Author`] - A book author
//! - [`BookInstance`] - A physical, borrowable copy of a book
//! - [`Genre`] / [`Language`] - Reference data attached to books
//! - [`User`] / [`Session`] - Accounts and browser sessions
//!
//! Input types (`AuthorInput`, `BookInput`, `NewBookInstance`, `NewSession`)
//! carry already-validated data into the repositories.

pub mod author;
pub mod book;
pub mod book_instance;
pub mod genre;
pub mod user;

pub use author::{Author, AuthorInput};
pub use book::{Book, BookInput};
pub use book_instance::{BookInstance, LoanStatus, NewBookInstance};
pub use genre::{Genre, Language};
pub use user::{NewSession, Permission, Session, User};
