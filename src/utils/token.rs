//! Random token generation for session ids, CSRF tokens and password salts.

use crate::error::AppError;
use base64::Engine as _;
use serde_json::json;

/// Random bytes behind a session id or CSRF token.
pub const TOKEN_LENGTH_BYTES: usize = 32;

/// Random bytes behind a password salt.
pub const SALT_LENGTH_BYTES: usize = 16;

fn random_bytes<const N: usize>() -> Result<[u8; N], AppError> {
    let mut buffer = [0u8; N];
    getrandom::fill(&mut buffer).map_err(|e| {
        AppError::internal(
            "Random number generator failed",
            json!({ "reason": e.to_string() }),
        )
    })?;
    Ok(buffer)
}

/// Generates a URL-safe base64 token without padding (43 characters).
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system RNG is unavailable.
pub fn generate_token() -> Result<String, AppError> {
    let bytes = random_bytes::<TOKEN_LENGTH_BYTES>()?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Generates a hex-encoded salt (32 characters).
///
/// # Errors
///
/// Returns [`AppError::Internal`] if the system RNG is unavailable.
pub fn generate_salt() -> Result<String, AppError> {
    Ok(hex::encode(random_bytes::<SALT_LENGTH_BYTES>()?))
}
