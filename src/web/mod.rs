//! Server-rendered HTML site.
//!
//! Uses Askama templates for rendering and a database-backed session for
//! authentication, CSRF protection and the visit counter.
//!
//! # Modules
//!
//! - [`context`] - Layout data shared by every page
//! - [`forms`] - Form payloads and validation
//! - [`handlers`] - Template rendering handlers
//! - [`middleware`] - Session, access control, rate limiting and tracing
//! - [`routes`] - Site route configuration

pub mod context;
pub mod forms;
pub mod handlers;
pub mod middleware;
pub mod routes;
