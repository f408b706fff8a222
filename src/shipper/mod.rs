//! Scheduled shipping on a background thread.
//!
//! [`Shipper`] shares one [`BulkWriter`] between producers and a flush
//! thread. Every call takes the same lock, so an append never interleaves
//! with the read-send-clear sequence of a flush. Producers block for the
//! duration of an in-flight flush, which the configured timeouts bound.

mod worker;


use std::{sync::Arc, thread::JoinHandle, time::Duration};

use crossbeam_channel::{Sender, bounded};
use log::warn;
use parking_lot::Mutex;

use crate::{
    config::ShipperConfig,
    error_reporter::{ErrorReporter, LogErrorReporter},
    transport::{BulkWriter, TransportError},
};

use worker::{WorkerCommand, spawn_worker};

/// Thread-safe front end flushing a [`BulkWriter`] on an interval.
pub struct Shipper {
    writer: Arc<Mutex<BulkWriter>>,
    tx: Option<Sender<WorkerCommand>>,
    handle: Option<JoinHandle<()>>,
    /// Upper bound on waiting for the final flush during shutdown.
    shutdown_timeout: Duration,
}

impl Shipper {
    /// Build the writer and start the flush thread.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Tls`] if the TLS connector cannot be built.
    pub fn start(
        config: ShipperConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Result<Self, TransportError> {
        let interval = config.flush_interval;
        let shutdown_timeout = config.connect_timeout + config.read_timeout + interval;
        let writer = Arc::new(Mutex::new(BulkWriter::new(config, Arc::clone(&reporter))?));
        let (tx, handle) = spawn_worker(Arc::clone(&writer), reporter, interval);
        Ok(Self {
            writer,
            tx: Some(tx),
            handle: Some(handle),
            shutdown_timeout,
        })
    }

    /// Start with notifications routed to the `log` crate.
    pub fn with_log_reporter(config: ShipperConfig) -> Result<Self, TransportError> {
        Self::start(config, Arc::new(LogErrorReporter::new()))
    }

    /// Append encoded text for the next flush.
    pub fn append(&self, text: &str) {
        self.writer.lock().append(text);
    }

    pub fn has_pending_data(&self) -> bool {
        self.writer.lock().has_pending_data()
    }

    /// Flush on the calling thread and return the outcome.
    pub fn flush(&self) -> Result<(), TransportError> {
        self.writer.lock().flush()
    }

    /// Whether the flush thread is still running.
    pub fn is_running(&self) -> bool {
        self.tx.is_some()
    }

    /// Stop the flush thread after a final flush.
    ///
    /// Idempotent. Appends made afterwards are only sent by an explicit
    /// [`Shipper::flush`].
    pub fn close(&mut self) {
        self.request_shutdown();
        self.join_worker();
    }

    fn request_shutdown(&mut self) {
        let Some(tx) = self.tx.take() else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(WorkerCommand::Shutdown(ack_tx)).is_err() {
            return;
        }
        if ack_rx.recv_timeout(self.shutdown_timeout).is_err() {
            warn!("Shipper: flush thread did not acknowledge shutdown in time");
        }
    }

    fn join_worker(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("Shipper: flush thread panicked");
        }
    }
}

impl Drop for Shipper {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for Shipper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shipper")
            .field("running", &self.is_running())
            .field("shutdown_timeout", &self.shutdown_timeout)
            .finish()
    }
}
