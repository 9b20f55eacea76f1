//! Small helpers shared by the services and the web layer.
//!
//! - [`token`] - Random session ids, CSRF tokens and salts
//! - [`signer`] - HMAC-SHA256 keyed by the server secret
//! - [`dates`] - Form date parsing
//! - [`db_error`] - Database error inspection

pub mod dates;
pub mod db_error;
pub mod signer;
pub mod token;
