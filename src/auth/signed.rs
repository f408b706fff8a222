//! HMAC request signing over the bulk body.
//!
//! The string to sign is `METHOD\nPATH\nDATE\nCONTENT_SHA256`, where the date
//! is also sent in `X-Shipper-Date` and the body hash in `X-Content-SHA256`,
//! letting the receiver recompute the signature from what it was sent.

use std::fmt;

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::{AuthError, Authentication};
use crate::transport::OutgoingRequest;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_ALGORITHM: &str = "HMAC-SHA256";
pub const DATE_HEADER: &str = "X-Shipper-Date";
pub const CONTENT_HASH_HEADER: &str = "X-Content-SHA256";
const DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// Signs each request with a shared secret.
#[derive(Clone)]
pub struct SignedAuthentication {
    key_id: String,
    secret: String,
    clock: fn() -> DateTime<Utc>,
}

impl SignedAuthentication {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret: secret.into(),
            clock: Utc::now,
        }
    }

    /// Replace the time source used for `X-Shipper-Date`.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }
}

impl Authentication for SignedAuthentication {
    fn apply(&self, request: &mut OutgoingRequest, body: &str) -> Result<(), AuthError> {
        let date = (self.clock)().format(DATE_FORMAT).to_string();
        let content_hash = content_sha256(body);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            request.method(),
            request.path(),
            date,
            content_hash
        );
        let signature = sign(self.secret.as_bytes(), &string_to_sign)?;

        request.set_header(DATE_HEADER, date);
        request.set_header(CONTENT_HASH_HEADER, content_hash);
        request.set_header(
            "Authorization",
            format!(
                "{SIGNATURE_ALGORITHM} KeyId={}, Signature={signature}",
                self.key_id
            ),
        );
        Ok(())
    }
}

impl fmt::Debug for SignedAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedAuthentication")
            .field("key_id", &self.key_id)
            .field("secret", &"<redacted>")
            .finish()
    }
}

fn content_sha256(body: &str) -> String {
    hex::encode(Sha256::digest(body.as_bytes()))
}

fn sign(secret: &[u8], message: &str) -> Result<String, AuthError> {
    let mut mac =
        HmacSha256::new_from_slice(secret).map_err(|e| AuthError::Signing(e.to_string()))?;
    mac.update(message.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}
