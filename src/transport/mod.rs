//! Synchronous bulk transport.
//!
//! [`BulkWriter`] owns the [`SendBuffer`](crate::buffer::SendBuffer) and ships
//! its whole content as one `POST` per [`BulkWriter::flush`]. There is no
//! retry: a flush makes at most one HTTP exchange and reports the outcome.
//!
//! # Response handling
//!
//! - **200**: success.
//! - **Anything else**: the response body is drained (up to 64 KiB) and
//!   returned in [`TransportError::Status`].
//! - **Network errors**: [`TransportError::Connect`] when nothing reached the
//!   server, [`TransportError::Io`] when the exchange broke off midway.
//!
//! Whether the buffer survives a failure is governed by
//! [`BufferRetention`](crate::config::BufferRetention).

mod connector;
mod request;
mod writer;


use thiserror::Error;

use crate::auth::AuthError;

pub use request::OutgoingRequest;
pub use writer::BulkWriter;

/// Status code that marks a bulk write as accepted.
pub const SUCCESS_STATUS: u16 = 200;
/// Placeholder used when a failed response carries no body.
pub const NO_DATA: &str = "<no data>";

/// Failure of a flush.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with something other than 200.
    #[error("got response code [{status}] from server with data {body}")]
    Status { status: u16, body: String },
    /// No exchange took place: DNS, connect, or proxy handshake failure.
    #[error("could not reach {url}: {message}")]
    Connect { url: String, message: String },
    /// The exchange started but writing or reading failed.
    #[error("request to {url} failed: {message}")]
    Io { url: String, message: String },
    /// The proxy settings are unusable.
    #[error("invalid proxy configuration: {0}")]
    Proxy(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("failed to initialise TLS: {0}")]
    Tls(#[from] native_tls::Error),
}

impl TransportError {
    /// HTTP status returned by the server, if it answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a flush failed before anything reached the server.
    pub fn is_connect_failure(&self) -> bool {
        matches!(self, Self::Connect { .. } | Self::Proxy(_) | Self::Auth(_))
    }

    pub(crate) fn from_transport(url: &str, err: ureq::Transport) -> Self {
        use ureq::ErrorKind;

        let message = err.to_string();
        let url = url.to_string();
        match err.kind() {
            ErrorKind::InvalidUrl
            | ErrorKind::UnknownScheme
            | ErrorKind::Dns
            | ErrorKind::InsecureRequestHttpsOnly
            | ErrorKind::ConnectionFailed
            | ErrorKind::InvalidProxyUrl
            | ErrorKind::ProxyConnect
            | ErrorKind::ProxyUnauthorized => Self::Connect { url, message },
            _ => Self::Io { url, message },
        }
    }
}
