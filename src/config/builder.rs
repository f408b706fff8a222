//! Builder for [`ShipperConfig`].
//!
//! Validation happens once, in [`ShipperConfigBuilder::build`], so partially
//! configured builders can be passed around and extended freely.

use std::{sync::Arc, time::Duration};

use super::{
    BufferRetention, ConfigError, HttpHeader, HttpRequestHeaders, ProxyConfig,
    ProxyCredentialProvider, ProxyCredentials, ShipperConfig,
};
use crate::auth::{
    Authentication, BasicAuthentication, BearerAuthentication, SignedAuthentication,
};

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(ConfigError::Invalid(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing a validated [`ShipperConfig`].
#[derive(Clone, Debug, Default)]
pub struct ShipperConfigBuilder {
    url: Option<String>,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
    max_queue_size: Option<usize>,
    flush_interval_ms: Option<u64>,
    proxy_host: Option<String>,
    proxy_port: Option<u16>,
    proxy_credentials: Option<Arc<dyn ProxyCredentialProvider>>,
    headers: HttpRequestHeaders,
    auth: Option<Arc<dyn Authentication>>,
    retention: BufferRetention,
}

impl ShipperConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint URL (required).
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    option_setter!(
        #[doc = "Set the connect timeout in milliseconds."]
        with_connect_timeout_ms,
        connect_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the read timeout in milliseconds."]
        with_read_timeout_ms,
        read_timeout_ms,
        u64
    );
    option_setter!(
        #[doc = "Set the buffer threshold in bytes."]
        with_max_queue_size,
        max_queue_size,
        usize
    );
    option_setter!(
        #[doc = "Set the interval between scheduled flushes in milliseconds."]
        with_flush_interval_ms,
        flush_interval_ms,
        u64
    );

    /// Route requests through an HTTP proxy. An empty host disables the proxy.
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port);
        self
    }

    /// Present fixed credentials when the proxy asks for them.
    pub fn with_proxy_credentials(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.with_proxy_credential_provider(Arc::new(ProxyCredentials::new(username, password)))
    }

    /// Resolve proxy credentials through `provider` on each connection.
    pub fn with_proxy_credential_provider(
        mut self,
        provider: Arc<dyn ProxyCredentialProvider>,
    ) -> Self {
        self.proxy_credentials = Some(provider);
        self
    }

    /// Add a static header. Repeated names are all sent.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(HttpHeader::new(name, value));
        self
    }

    pub fn with_basic_auth(
        self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.with_authentication(Arc::new(BasicAuthentication::new(username, password)))
    }

    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_authentication(Arc::new(BearerAuthentication::new(token)))
    }

    pub fn with_signed_auth(self, key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        self.with_authentication(Arc::new(SignedAuthentication::new(key_id, secret)))
    }

    /// Use a custom authentication strategy.
    pub fn with_authentication(mut self, auth: Arc<dyn Authentication>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_retention(mut self, retention: BufferRetention) -> Self {
        self.retention = retention;
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_url()?;
        self.validate_sizes()?;
        self.validate_proxy()?;
        self.validate_headers()?;
        Ok(())
    }

    fn validate_url(&self) -> Result<(), ConfigError> {
        match &self.url {
            None => Err(ConfigError::Invalid("shipper requires a URL".into())),
            Some(url) if url.trim().is_empty() => {
                Err(ConfigError::Invalid("URL must not be empty".into()))
            }
            Some(url) if !(url.starts_with("http://") || url.starts_with("https://")) => Err(
                ConfigError::Invalid(format!("URL '{url}' must use http or https")),
            ),
            _ => Ok(()),
        }
    }

    fn validate_sizes(&self) -> Result<(), ConfigError> {
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.read_timeout_ms {
            ensure_positive!(timeout, "read_timeout_ms")?;
        }
        if let Some(size) = self.max_queue_size {
            ensure_positive!(size, "max_queue_size")?;
        }
        if let Some(interval) = self.flush_interval_ms {
            ensure_positive!(interval, "flush_interval_ms")?;
        }
        Ok(())
    }

    fn validate_proxy(&self) -> Result<(), ConfigError> {
        let host_set = self
            .proxy_host
            .as_deref()
            .is_some_and(|h| !h.trim().is_empty());
        if host_set {
            ensure_positive!(self.proxy_port.unwrap_or(0), "proxy port")?;
        }
        if let Some(creds) = self
            .proxy_credentials
            .as_ref()
            .and_then(|p| p.proxy_credentials())
        {
            creds.validate()?;
        }
        Ok(())
    }

    fn validate_headers(&self) -> Result<(), ConfigError> {
        match self.headers.iter().find(|h| h.name.trim().is_empty()) {
            Some(header) => Err(ConfigError::Invalid(format!(
                "header with value '{}' has an empty name",
                header.value
            ))),
            None => Ok(()),
        }
    }

    /// Validate the settings and produce a [`ShipperConfig`].
    pub fn build(&self) -> Result<ShipperConfig, ConfigError> {
        self.validate()?;

        let defaults = ShipperConfig::default();
        let proxy = self.proxy_host.as_ref().map(|host| ProxyConfig {
            host: host.clone(),
            port: self.proxy_port.unwrap_or(0),
            credentials: self.proxy_credentials.clone(),
        });

        Ok(ShipperConfig {
            url: self.url.clone().unwrap_or_default(),
            connect_timeout: self
                .connect_timeout_ms
                .map_or(defaults.connect_timeout, Duration::from_millis),
            read_timeout: self
                .read_timeout_ms
                .map_or(defaults.read_timeout, Duration::from_millis),
            max_queue_size: self.max_queue_size.unwrap_or(defaults.max_queue_size),
            flush_interval: self
                .flush_interval_ms
                .map_or(defaults.flush_interval, Duration::from_millis),
            proxy,
            headers: self.headers.clone(),
            auth: self.auth.clone(),
            retention: self.retention,
        })
    }
}
