//! Buffered bulk log shipping over HTTP.
//!
//! Encoded log records are appended to a bounded [`SendBuffer`] and shipped
//! as one request body by [`BulkWriter::flush`]. Once the buffer reaches its
//! configured size further appends are dropped until the next flush clears
//! it, so memory stays bounded while the endpoint is slow or unavailable.
//! [`Shipper`] wraps the writer with a lock and a background thread that
//! flushes on an interval.

pub mod auth;
pub mod buffer;
pub mod config;
pub mod error_reporter;
pub mod shipper;
pub mod transport;

#[cfg(any(test, feature = "test-util"))]
pub mod test_support;

pub use auth::{
    AuthError, Authentication, BasicAuthentication, BearerAuthentication, SignedAuthentication,
};
pub use buffer::SendBuffer;
pub use config::{
    BufferRetention, ConfigError, HttpHeader, HttpRequestHeaders, ProxyConfig,
    ProxyCredentialProvider, ProxyCredentials, ShipperConfig, ShipperConfigBuilder,
};
pub use error_reporter::{ErrorReporter, LogErrorReporter};
pub use shipper::Shipper;
pub use transport::{BulkWriter, OutgoingRequest, TransportError};
