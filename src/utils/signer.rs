//! HMAC-SHA256 keyed by the server secret.
//!
//! Used to hash session ids before storage and to derive password hashes.
//! Without the secret, stored values can be neither verified nor forged.

use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// A keyed MAC that can be cloned cheaply per message.
#[derive(Clone)]
pub struct Signer {
    mac: HmacSha256,
}

impl Signer {
    /// Creates a signer keyed by `secret`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if the key is rejected.
    pub fn new(secret: &str) -> Result<Self, AppError> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes()).map_err(|e| {
            AppError::internal("Invalid signing key", json!({ "reason": e.to_string() }))
        })?;
        Ok(Self { mac })
    }

    fn keyed(&self, parts: &[&[u8]]) -> HmacSha256 {
        let mut mac = self.mac.clone();
        for part in parts {
            mac.update(part);
        }
        mac
    }

    /// MAC over the concatenated parts as 64 lowercase hex characters.
    pub fn sign_hex(&self, parts: &[&[u8]]) -> String {
        hex::encode(self.keyed(parts).finalize().into_bytes())
    }

    /// Constant-time check of a hex MAC over the concatenated parts.
    pub fn verify_hex(&self, parts: &[&[u8]], expected_hex: &str) -> bool {
        let Ok(expected) = hex::decode(expected_hex) else {
            return false;
        };
        self.keyed(parts).verify_slice(&expected).is_ok()
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Signer(..)")
    }
}
