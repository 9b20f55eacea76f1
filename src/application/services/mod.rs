//! Business logic services for the application layer.

pub mod auth_service;
pub mod catalog_service;
pub mod loan_service;
pub mod session_service;

pub use auth_service::AuthService;
pub use catalog_service::CatalogService;
pub use loan_service::LoanService;
pub use session_service::{SessionService, StartedSession};
