//! Sink for the shipper's own diagnostic notifications.
//!
//! The shipper cannot log through itself, so buffer overflow and flush
//! failures are reported to an [`ErrorReporter`] instead. The default
//! implementation forwards to the `log` facade.

use log::{info, warn};

/// Target used by [`LogErrorReporter`] for every notification.
pub const REPORTER_TARGET: &str = "bulk_shipper";

/// Receives human-readable notifications about shipper state changes.
///
/// Both methods are fire-and-forget: implementations must not block for long
/// and must not call back into the shipper that reported the event.
pub trait ErrorReporter: Send + Sync {
    /// Report a condition that loses or risks losing log data.
    fn log_warning(&self, message: &str);

    /// Report recovery from an earlier warning.
    fn log_info(&self, message: &str);
}

/// Reporter forwarding notifications to the `log` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogErrorReporter;

impl LogErrorReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ErrorReporter for LogErrorReporter {
    fn log_warning(&self, message: &str) {
        warn!(target: REPORTER_TARGET, "{message}");
    }

    fn log_info(&self, message: &str) {
        info!(target: REPORTER_TARGET, "{message}");
    }
}
