//! JSON API layer.
//!
//! The HTML site lives in [`crate::web`]; this layer only serves
//! machine-readable endpoints for load balancers and monitoring.
//!
//! # Modules
//!
//! - [`dto`] - Response serialization types
//! - [`handlers`] - HTTP request handlers
//! - [`routes`] - Route configuration

pub mod dto;
pub mod handlers;
pub mod routes;
