//! Middleware for the HTML site.
//!
//! - [`session`] - Loads or starts the browser session
//! - [`access`] - Login and permission gates
//! - [`rate_limit`] - Per-client token buckets
//! - [`tracing`] - Request spans and response logging

pub mod access;
pub mod rate_limit;
pub mod session;
pub mod tracing;
