//! Connection parameters consumed by the transport.
//!
//! [`ShipperConfig`] is normally produced by [`ShipperConfigBuilder`], either
//! programmatically or from an INI file, and is read-only once handed to a
//! [`BulkWriter`](crate::transport::BulkWriter).

mod builder;
mod headers;
mod ini;
mod proxy;


use std::{io, path::PathBuf, sync::Arc, time::Duration};

use thiserror::Error;

use crate::auth::Authentication;

pub use builder::ShipperConfigBuilder;
pub use headers::{HttpHeader, HttpRequestHeaders};
pub use proxy::{ProxyConfig, ProxyCredentialProvider, ProxyCredentials};

/// Default timeout for establishing a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default timeout for reading the response.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);
/// Default buffer threshold in bytes (100 MiB).
pub const DEFAULT_MAX_QUEUE_SIZE: usize = 100 * 1024 * 1024;
/// Default interval between scheduled flushes.
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(250);

/// What happens to buffered data when a flush fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BufferRetention {
    /// Clear the buffer after every attempt, successful or not.
    #[default]
    DiscardOnFailure,
    /// Keep the buffer when nothing reached the server (DNS, connect, proxy
    /// or authentication failures). Rejections and I/O failures after the
    /// connection was established still clear it.
    RetainOnConnectFailure,
}

impl BufferRetention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DiscardOnFailure => "discard",
            Self::RetainOnConnectFailure => "retain-on-connect-failure",
        }
    }
}

impl std::str::FromStr for BufferRetention {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "discard" => Ok(Self::DiscardOnFailure),
            "retain-on-connect-failure" => Ok(Self::RetainOnConnectFailure),
            other => Err(ConfigError::Invalid(format!(
                "invalid retention '{other}'. Valid options are: discard, retain-on-connect-failure"
            ))),
        }
    }
}

/// Errors raised while building or loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A value failed validation.
    #[error("invalid shipper configuration: {0}")]
    Invalid(String),
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The configuration text is not valid INI.
    #[error("{origin} is invalid: {message}")]
    Parse { origin: String, message: String },
    /// The requested text encoding is not known.
    #[error("unknown encoding {0}")]
    UnknownEncoding(String),
    /// The file bytes are not valid in the requested encoding.
    #[error("{path} could not be decoded as {encoding}")]
    Decode { path: PathBuf, encoding: String },
}

/// Everything the transport needs to reach the ingestion endpoint.
#[derive(Clone, Debug)]
pub struct ShipperConfig {
    /// Endpoint receiving the bulk payload.
    pub url: String,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    /// Buffer threshold in bytes.
    pub max_queue_size: usize,
    /// Interval used by [`Shipper`](crate::shipper::Shipper) between flushes.
    pub flush_interval: Duration,
    pub proxy: Option<ProxyConfig>,
    /// Static headers applied to every request, in order.
    pub headers: HttpRequestHeaders,
    pub auth: Option<Arc<dyn Authentication>>,
    pub retention: BufferRetention,
}

impl ShipperConfig {
    /// Proxy to route through, ignoring settings with an empty host.
    pub fn active_proxy(&self) -> Option<&ProxyConfig> {
        self.proxy.as_ref().filter(|p| !p.host.trim().is_empty())
    }
}

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_queue_size: DEFAULT_MAX_QUEUE_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            proxy: None,
            headers: HttpRequestHeaders::default(),
            auth: None,
            retention: BufferRetention::default(),
        }
    }
}
