//! Background thread driving scheduled flushes.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use parking_lot::Mutex;

use crate::{error_reporter::ErrorReporter, transport::BulkWriter};

/// Commands processed by the flush thread.
#[derive(Debug)]
pub(super) enum WorkerCommand {
    /// Flush what is left, acknowledge, and exit.
    Shutdown(Sender<()>),
}

/// Spawns the thread that flushes `writer` every `interval`.
pub(super) fn spawn_worker(
    writer: Arc<Mutex<BulkWriter>>,
    reporter: Arc<dyn ErrorReporter>,
    interval: Duration,
) -> (Sender<WorkerCommand>, JoinHandle<()>) {
    let (tx, rx) = bounded(1);
    let worker = Worker {
        writer,
        reporter,
        interval,
    };
    let handle = thread::spawn(move || worker.run(rx));
    (tx, handle)
}

struct Worker {
    writer: Arc<Mutex<BulkWriter>>,
    reporter: Arc<dyn ErrorReporter>,
    interval: Duration,
}

impl Worker {
    fn run(self, rx: Receiver<WorkerCommand>) {
        loop {
            match rx.recv_timeout(self.interval) {
                Err(RecvTimeoutError::Timeout) => self.flush(),
                Ok(WorkerCommand::Shutdown(ack)) => {
                    self.flush();
                    // Ignore send error: if the receiver has dropped, there's nothing to do.
                    let _ = ack.send(());
                    break;
                }
                Err(RecvTimeoutError::Disconnected) => {
                    self.flush();
                    break;
                }
            }
        }
    }

    fn flush(&self) {
        flush_and_report(&self.writer, self.reporter.as_ref());
    }
}

/// Flush `writer` and turn a failure into a warning.
///
/// The lock is released before the reporter runs.
fn flush_and_report(writer: &Mutex<BulkWriter>, reporter: &dyn ErrorReporter) {
    let (url, result) = {
        let mut guard = writer.lock();
        let result = guard.flush();
        (guard.config().url.clone(), result)
    };
    if let Err(err) = result {
        reporter.log_warning(&format!("Failed to send events to {url}: {err}"));
    }
}
