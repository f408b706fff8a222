//! Proxy settings and the credentials offered during proxy negotiation.
//!
//! Credentials are looked up through a [`ProxyCredentialProvider`] each time a
//! connection is opened, so two writers with different proxies never share
//! authentication state. One lookup serves both the `CONNECT` handshake used
//! for `https` endpoints and the `Proxy-Authorization` header sent with
//! plain `http` requests.

use std::{fmt, sync::Arc};

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};

use super::ConfigError;

/// Username and password presented to the proxy.
#[derive(Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    password: String,
}

impl ProxyCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// `Proxy-Authorization` value for the Basic scheme.
    pub fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{}", self.username, self.password);
        format!("Basic {}", BASE64_STANDARD.encode(credentials.as_bytes()))
    }

    /// Reject characters that cannot be carried in a proxy URL userinfo.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() {
            return Err(ConfigError::Invalid(
                "proxy username must not be empty".into(),
            ));
        }
        if self.username.contains([':', '@']) {
            return Err(ConfigError::Invalid(
                "proxy username must not contain ':' or '@'".into(),
            ));
        }
        if self.password.contains('@') {
            return Err(ConfigError::Invalid(
                "proxy password must not contain '@'".into(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ProxyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Supplies credentials when a proxy asks for them.
pub trait ProxyCredentialProvider: Send + Sync + fmt::Debug {
    /// Credentials for the next connection, or `None` to connect anonymously.
    fn proxy_credentials(&self) -> Option<ProxyCredentials>;
}

impl ProxyCredentialProvider for ProxyCredentials {
    fn proxy_credentials(&self) -> Option<ProxyCredentials> {
        Some(self.clone())
    }
}

/// HTTP proxy used to reach the endpoint.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Option<Arc<dyn ProxyCredentialProvider>>,
}

impl ProxyConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            credentials: None,
        }
    }

    pub fn with_credentials(mut self, provider: Arc<dyn ProxyCredentialProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Ask the provider for the credentials of the next connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the provider hands back credentials
    /// that cannot be carried in a proxy URL.
    pub fn resolve_credentials(&self) -> Result<Option<ProxyCredentials>, ConfigError> {
        let credentials = self.credentials.as_ref().and_then(|p| p.proxy_credentials());
        if let Some(creds) = &credentials {
            creds.validate()?;
        }
        Ok(credentials)
    }

    /// Proxy URL for the next connection, embedding credentials if the
    /// provider returns any.
    pub fn proxy_url(&self) -> Result<String, ConfigError> {
        let credentials = self.resolve_credentials()?;
        Ok(self.proxy_url_with(credentials.as_ref()))
    }

    /// Proxy URL carrying already resolved `credentials`.
    pub fn proxy_url_with(&self, credentials: Option<&ProxyCredentials>) -> String {
        let host = self.host.trim();
        let host = if host.contains(':') && !host.starts_with('[') {
            format!("[{host}]")
        } else {
            host.to_string()
        };

        match credentials {
            Some(creds) => format!(
                "http://{}:{}@{}:{}",
                creds.username,
                creds.password(),
                host,
                self.port
            ),
            None => format!("http://{}:{}", host, self.port),
        }
    }
}
