//! Pluggable request authentication.
//!
//! An [`Authentication`] strategy sees the outgoing request and the exact
//! body that will be written, so schemes that sign the payload can be
//! expressed alongside static credentials.

mod signed;

use std::fmt;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use thiserror::Error;

use crate::transport::OutgoingRequest;

pub use signed::SignedAuthentication;

/// Errors raised while authenticating a request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("failed to sign request: {0}")]
    Signing(String),
}

/// Adds credentials to an outgoing request before its body is sent.
pub trait Authentication: Send + Sync + fmt::Debug {
    fn apply(&self, request: &mut OutgoingRequest, body: &str) -> Result<(), AuthError>;
}

/// HTTP Basic authentication.
#[derive(Clone)]
pub struct BasicAuthentication {
    username: String,
    password: String,
}

impl BasicAuthentication {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl Authentication for BasicAuthentication {
    fn apply(&self, request: &mut OutgoingRequest, _body: &str) -> Result<(), AuthError> {
        let credentials = format!("{}:{}", self.username, self.password);
        let encoded = BASE64_STANDARD.encode(credentials.as_bytes());
        request.set_header("Authorization", format!("Basic {encoded}"));
        Ok(())
    }
}

impl fmt::Debug for BasicAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuthentication")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Bearer token authentication.
#[derive(Clone)]
pub struct BearerAuthentication {
    token: String,
}

impl BearerAuthentication {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Authentication for BearerAuthentication {
    fn apply(&self, request: &mut OutgoingRequest, _body: &str) -> Result<(), AuthError> {
        request.set_header("Authorization", format!("Bearer {}", self.token));
        Ok(())
    }
}

impl fmt::Debug for BearerAuthentication {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerAuthentication")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> OutgoingRequest {
        OutgoingRequest::post("http://localhost:9200/_bulk")
    }

    #[test]
    fn basic_auth_sets_encoded_header() {
        let mut req = request();
        BasicAuthentication::new("user", "pass")
            .apply(&mut req, "body")
            .expect("basic auth");
        // "user:pass" base64 encoded is "dXNlcjpwYXNz"
        assert_eq!(req.header("authorization"), Some("Basic dXNlcjpwYXNz"));
    }

    #[test]
    fn bearer_auth_sets_token() {
        let mut req = request();
        BearerAuthentication::new("my-secret-token")
            .apply(&mut req, "body")
            .expect("bearer auth");
        assert_eq!(req.header("Authorization"), Some("Bearer my-secret-token"));
    }

    #[test]
    fn auth_replaces_configured_authorization_header() {
        let mut req = request();
        req.add_header("Authorization", "stale");
        BearerAuthentication::new("fresh")
            .apply(&mut req, "")
            .expect("bearer auth");
        assert_eq!(req.header_values("authorization"), vec!["Bearer fresh"]);
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let basic = format!("{:?}", BasicAuthentication::new("user", "hunter2"));
        let bearer = format!("{:?}", BearerAuthentication::new("tok-123"));
        assert!(basic.contains("user"));
        assert!(!basic.contains("hunter2"));
        assert!(!bearer.contains("tok-123"));
    }
}
