//! Helpers shared by unit and integration tests.
//!
//! Compiled for unit tests and, through the `test-util` feature, for the
//! integration tests under `tests/`.

mod mock_server;

use std::sync::Arc;

use parking_lot::Mutex;

use crate::error_reporter::ErrorReporter;

pub use mock_server::{CapturedRequest, MockResponse, MockServer};

/// Severity of a collected notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationLevel {
    Warning,
    Info,
}

/// Reporter that stores every notification it receives for later inspection.
#[derive(Clone, Default)]
pub struct CollectingReporter {
    notifications: Arc<Mutex<Vec<(NotificationLevel, String)>>>,
}

impl CollectingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications in the order they were reported.
    pub fn collected(&self) -> Vec<(NotificationLevel, String)> {
        self.notifications.lock().clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.messages(NotificationLevel::Warning)
    }

    pub fn infos(&self) -> Vec<String> {
        self.messages(NotificationLevel::Info)
    }

    fn messages(&self, level: NotificationLevel) -> Vec<String> {
        self.notifications
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl ErrorReporter for CollectingReporter {
    fn log_warning(&self, message: &str) {
        self.notifications
            .lock()
            .push((NotificationLevel::Warning, message.to_owned()));
    }

    fn log_info(&self, message: &str) {
        self.notifications
            .lock()
            .push((NotificationLevel::Info, message.to_owned()));
    }
}
