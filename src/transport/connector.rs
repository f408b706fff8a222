//! Opens the connection used for a single flush.

use std::{sync::Arc, time::Duration};

use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder, Proxy};

use super::TransportError;
use crate::config::{ProxyConfig, ProxyCredentials, ShipperConfig};

/// Builds one-shot agents sharing a TLS connector and timeouts.
pub(crate) struct Connector {
    tls: Arc<TlsConnector>,
    connect_timeout: Duration,
    read_timeout: Duration,
}

impl Connector {
    pub(crate) fn new(config: &ShipperConfig) -> Result<Self, TransportError> {
        Ok(Self {
            tls: Arc::new(TlsConnector::new()?),
            connect_timeout: config.connect_timeout,
            read_timeout: config.read_timeout,
        })
    }

    /// Agent for one exchange, routed through `proxy` when given.
    ///
    /// Idle pooling is disabled so the socket closes as soon as the response
    /// is dropped. `credentials` are the ones resolved for this connection;
    /// they travel in the proxy URL, which ureq uses for `CONNECT`.
    pub(crate) fn open(
        &self,
        proxy: Option<&ProxyConfig>,
        credentials: Option<&ProxyCredentials>,
    ) -> Result<Agent, TransportError> {
        let mut builder = AgentBuilder::new()
            .timeout_connect(self.connect_timeout)
            .timeout_read(self.read_timeout)
            .redirects(0)
            .max_idle_connections(0)
            .tls_connector(Arc::clone(&self.tls));

        if let Some(proxy) = proxy {
            let url = proxy.proxy_url_with(credentials);
            let proxy = Proxy::new(url).map_err(|e| TransportError::Proxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder.build())
    }
}
