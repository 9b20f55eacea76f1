//! Application layer services implementing catalog behaviour.
//!
//! This layer orchestrates domain operations by coordinating repository calls,
//! validation, and business rules. Services consume repository traits and provide
//! a clean API for HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::catalog_service::CatalogService`] - Books, authors and index counts
//! - [`services::loan_service::LoanService`] - Loan listings and renewals
//! - [`services::auth_service::AuthService`] - Passwords, users and permissions
//! - [`services::session_service::SessionService`] - Browser sessions

pub mod pagination;
pub mod services;
