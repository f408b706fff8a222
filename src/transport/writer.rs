//! Buffer-and-flush writer.

use std::{io::Read, sync::Arc};

use log::debug;

use super::{
    NO_DATA, SUCCESS_STATUS, TransportError, connector::Connector, request::OutgoingRequest,
};
use crate::{
    buffer::SendBuffer,
    config::{BufferRetention, ShipperConfig},
    error_reporter::ErrorReporter,
};

/// Largest error body read back from a failed response.
const MAX_ERROR_BODY: u64 = 64 * 1024;

/// Accumulates encoded records and ships them as one bulk request.
///
/// The writer is not synchronised. [`Shipper`](crate::shipper::Shipper) puts
/// it behind a lock when appends and flushes come from different threads.
pub struct BulkWriter {
    config: ShipperConfig,
    buffer: SendBuffer,
    connector: Connector,
}

impl BulkWriter {
    /// Create a writer with an empty buffer sized from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Tls`] if the TLS connector cannot be built.
    pub fn new(
        config: ShipperConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, TransportError> {
        let connector = Connector::new(&config)?;
        let buffer = SendBuffer::new(config.max_queue_size, reporter);
        Ok(Self {
            config,
            buffer,
            connector,
        })
    }

    /// Append encoded text to the buffer, subject to its overflow policy.
    pub fn append(&mut self, text: &str) {
        self.buffer.append(text);
    }

    pub fn has_pending_data(&self) -> bool {
        self.buffer.has_pending_data()
    }

    pub fn buffer(&self) -> &SendBuffer {
        &self.buffer
    }

    pub fn config(&self) -> &ShipperConfig {
        &self.config
    }

    /// Send the buffered text as one `POST` and clear the buffer.
    ///
    /// Does nothing when the buffer is empty. The buffer is cleared once the
    /// exchange has finished, whatever its outcome, unless the retention
    /// policy keeps it after a connect failure.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when the server answers with a status other
    /// than 200 or the request cannot be completed.
    pub fn flush(&mut self) -> Result<(), TransportError> {
        if !self.buffer.has_pending_data() {
            return Ok(());
        }

        let result = self.send(self.buffer.as_str());

        if self.retains_after(&result) {
            debug!(
                "keeping {} buffered bytes after connect failure to {}",
                self.buffer.len(),
                self.config.url
            );
        } else {
            self.buffer.clear();
        }
        result
    }

    fn retains_after(&self, result: &Result<(), TransportError>) -> bool {
        match (self.config.retention, result) {
            (BufferRetention::RetainOnConnectFailure, Err(err)) => err.is_connect_failure(),
            _ => false,
        }
    }

    /// One complete exchange. The agent and response are dropped on return,
    /// releasing the connection on every path.
    fn send(&self, body: &str) -> Result<(), TransportError> {
        let proxy = self.config.active_proxy();
        let proxy_credentials = match proxy {
            Some(proxy) => proxy
                .resolve_credentials()
                .map_err(|e| TransportError::Proxy(e.to_string()))?,
            None => None,
        };
        let agent = self.connector.open(proxy, proxy_credentials.as_ref())?;

        let mut request = OutgoingRequest::post(self.config.url.as_str());
        for header in &self.config.headers {
            request.add_header(header.name.as_str(), header.value.as_str());
        }
        if let Some(auth) = &self.config.auth {
            auth.apply(&mut request, body)?;
        }

        let mut call = request.to_ureq(&agent);
        // Plain http goes to the proxy in absolute form without a CONNECT,
        // so the credentials must ride on the request itself.
        if let Some(creds) = proxy_credentials.filter(|_| is_plain_http(&self.config.url)) {
            call = call.set("Proxy-Authorization", &creds.basic_authorization());
        }

        debug!("sending {} bytes to {}", body.len(), self.config.url);
        let response = match call.send_bytes(body.as_bytes()) {
            Ok(response) => response,
            Err(ureq::Error::Status(_, response)) => response,
            Err(ureq::Error::Transport(err)) => {
                return Err(TransportError::from_transport(&self.config.url, err));
            }
        };

        let status = response.status();
        debug!("{} answered with status {status}", self.config.url);
        if status == SUCCESS_STATUS {
            return Ok(());
        }
        let body = drain_error_body(response);
        Err(TransportError::Status { status, body })
    }
}

impl std::fmt::Debug for BulkWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkWriter")
            .field("url", &self.config.url)
            .field("buffer", &self.buffer)
            .finish()
    }
}

fn is_plain_http(url: &str) -> bool {
    url.get(..7)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("http://"))
}

/// Read the diagnostic body of a failed response.
///
/// Never fails: an empty body yields [`NO_DATA`] and a read error yields a
/// placeholder describing it.
fn drain_error_body(response: ureq::Response) -> String {
    let mut bytes = Vec::new();
    match response
        .into_reader()
        .take(MAX_ERROR_BODY)
        .read_to_end(&mut bytes)
    {
        Ok(0) => NO_DATA.to_string(),
        Ok(_) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(err) => format!("<error retrieving data: {err}>"),
    }
}
