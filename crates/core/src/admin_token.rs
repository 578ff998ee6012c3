//! Admin token verification.
//!
//! The configured secret is never compared byte-by-byte against the token a
//! caller presents. Instead both are run through HMAC-SHA256 under a random
//! per-process key and the tags are compared with [`Mac::verify_slice`],
//! which is constant-time. Tags are fixed-length, so the comparison also
//! reveals nothing about the length of the secret.

use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::CoreError;

type HmacSha256 = Hmac<Sha256>;

/// Message returned for every rejected token, whatever the reason.
pub const UNAUTHORIZED_MESSAGE: &str = "Invalid admin token";

/// Proof that an admin token was verified.
///
/// Only [`AdminSecret::authorize`] can create one, so any operation taking
/// an `&AdminAccess` runs after authentication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminAccess {
    _verified: (),
}

/// The configured admin secret, held only as an HMAC tag.
pub struct AdminSecret {
    key: [u8; 32],
    expected_tag: Vec<u8>,
}

impl AdminSecret {
    /// Build a verifier for `secret`. Empty secrets are rejected.
    pub fn new(secret: &str) -> Result<Self, CoreError> {
        if secret.is_empty() {
            return Err(CoreError::Validation(
                "Admin token must not be empty".into(),
            ));
        }

        let key: [u8; 32] = rand::random();
        let mut mac = keyed_mac(&key);
        mac.update(secret.as_bytes());
        let expected_tag = mac.finalize().into_bytes().to_vec();

        Ok(Self { key, expected_tag })
    }

    /// Constant-time check of a presented token.
    pub fn verify(&self, presented: &str) -> bool {
        let mut mac = keyed_mac(&self.key);
        mac.update(presented.as_bytes());
        mac.verify_slice(&self.expected_tag).is_ok()
    }

    /// Authorize an optional token, as read from a request header.
    ///
    /// A missing token and a wrong token produce the same error.
    pub fn authorize(&self, presented: Option<&str>) -> Result<AdminAccess, CoreError> {
        match presented {
            Some(token) if self.verify(token) => Ok(AdminAccess { _verified: () }),
            _ => Err(CoreError::Unauthorized(UNAUTHORIZED_MESSAGE.into())),
        }
    }
}

impl fmt::Debug for AdminSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AdminSecret(<redacted>)")
    }
}

fn keyed_mac(key: &[u8]) -> HmacSha256 {
    HmacSha256::new_from_slice(key).expect("HMAC accepts any key length")
}
