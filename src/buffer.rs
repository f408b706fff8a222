//! Bounded accumulator for encoded log records.
//!
//! [`SendBuffer`] collects already-formatted text until the transport ships
//! it. The append that reaches `max_size` is kept and later appends are
//! dropped until [`SendBuffer::clear`] is called.

use std::{fmt, mem, sync::Arc};

use log::debug;

use crate::error_reporter::ErrorReporter;

/// Warning emitted when the buffer crosses its size threshold.
pub const OVERFLOW_WARNING: &str =
    "Send queue maximum size exceeded - log messages will be lost until the buffer is cleared";
/// Info emitted when an overflowed buffer is cleared.
pub const OVERFLOW_CLEARED: &str = "Send queue cleared - log messages will no longer be lost";

/// Append-only text buffer with an overflow flag.
///
/// Sizes are measured in UTF-8 bytes. The buffer is not synchronised; callers
/// sharing it between a producer and a flusher must lock around it.
pub struct SendBuffer {
    contents: String,
    max_size: usize,
    overflowed: bool,
    dropped: u64,
    reporter: Arc<dyn ErrorReporter>,
}

impl SendBuffer {
    /// Create an empty buffer that overflows once it holds `max_size` bytes.
    pub fn new(max_size: usize, reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            contents: String::new(),
            max_size,
            overflowed: false,
            dropped: 0,
            reporter,
        }
    }

    /// Append `text` unless the buffer has already overflowed.
    ///
    /// The append that brings the length to `max_size` or beyond is retained
    /// and raises the overflow flag, emitting [`OVERFLOW_WARNING`] once.
    pub fn append(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if self.overflowed {
            self.dropped += 1;
            return;
        }

        self.contents.push_str(text);

        if self.contents.len() >= self.max_size {
            self.overflowed = true;
            self.reporter.log_warning(OVERFLOW_WARNING);
        }
    }

    /// Whether there is anything to flush.
    pub fn has_pending_data(&self) -> bool {
        !self.contents.is_empty()
    }

    /// Discard all buffered text and leave the overflow state.
    ///
    /// Recovery from overflow is only announced here, so capacity is restored
    /// whether or not the preceding send succeeded.
    pub fn clear(&mut self) {
        self.contents.clear();
        if self.overflowed {
            self.overflowed = false;
            let dropped = mem::take(&mut self.dropped);
            debug!("send buffer cleared after dropping {dropped} fragments");
            self.reporter.log_info(OVERFLOW_CLEARED);
        }
    }

    /// Buffered text, ready to be sent as one body.
    pub fn as_str(&self) -> &str {
        &self.contents
    }

    /// Buffered size in bytes.
    pub fn len(&self) -> usize {
        self.contents.len()
    }

    /// Whether nothing is buffered.
    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Byte threshold at which the buffer overflows.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Whether appends are currently being dropped.
    pub fn is_overflowed(&self) -> bool {
        self.overflowed
    }

    /// Number of non-empty appends dropped since the buffer overflowed.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Lets formatting code `write!` straight into the buffer.
impl fmt::Write for SendBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.append(s);
        Ok(())
    }
}

impl fmt::Debug for SendBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SendBuffer")
            .field("len", &self.contents.len())
            .field("max_size", &self.max_size)
            .field("overflowed", &self.overflowed)
            .field("dropped", &self.dropped)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;

    use rstest::{fixture, rstest};

    use super::*;
    use crate::test_support::CollectingReporter;

    #[fixture]
    fn reporter() -> CollectingReporter {
        CollectingReporter::new()
    }

    fn buffer(max_size: usize, reporter: &CollectingReporter) -> SendBuffer {
        SendBuffer::new(max_size, Arc::new(reporter.clone()))
    }

    #[rstest]
    fn new_buffer_has_no_pending_data(reporter: CollectingReporter) {
        let buf = buffer(10, &reporter);
        assert!(!buf.has_pending_data());
        assert!(!buf.is_overflowed());
    }

    #[rstest]
    fn append_accumulates_text(reporter: CollectingReporter) {
        let mut buf = buffer(100, &reporter);
        buf.append("first\n");
        buf.append("second\n");
        assert_eq!(buf.as_str(), "first\nsecond\n");
        assert!(buf.has_pending_data());
        assert!(reporter.warnings().is_empty());
    }

    #[rstest]
    fn empty_append_has_no_effect(reporter: CollectingReporter) {
        let mut buf = buffer(0, &reporter);
        buf.append("");
        assert!(!buf.has_pending_data());
        assert!(!buf.is_overflowed());
        assert!(reporter.warnings().is_empty());
    }

    #[rstest]
    fn crossing_append_is_retained_and_later_ones_dropped(reporter: CollectingReporter) {
        let mut buf = buffer(50, &reporter);
        buf.append("short message\n");
        assert!(!buf.is_overflowed());

        let forty = "x".repeat(40);
        buf.append(&forty);
        assert!(buf.is_overflowed());
        assert_eq!(buf.len(), 54);

        buf.append("more\n");
        assert_eq!(buf.len(), 54);
        assert_eq!(buf.dropped(), 1);
        assert_eq!(reporter.warnings(), vec![OVERFLOW_WARNING.to_string()]);
    }

    #[rstest]
    fn reaching_threshold_exactly_overflows(reporter: CollectingReporter) {
        let mut buf = buffer(4, &reporter);
        buf.append("abcd");
        assert!(buf.is_overflowed());
    }

    #[rstest]
    fn warning_is_emitted_once_per_overflow(reporter: CollectingReporter) {
        let mut buf = buffer(1, &reporter);
        buf.append("a");
        buf.append("b");
        buf.append("c");
        assert_eq!(reporter.warnings().len(), 1);
    }

    #[rstest]
    fn clear_after_overflow_restores_capacity(reporter: CollectingReporter) {
        let mut buf = buffer(3, &reporter);
        buf.append("abc");
        buf.append("dropped");
        buf.clear();

        assert!(!buf.has_pending_data());
        assert!(!buf.is_overflowed());
        assert_eq!(buf.dropped(), 0);
        assert_eq!(reporter.infos(), vec![OVERFLOW_CLEARED.to_string()]);

        buf.append("x");
        assert_eq!(buf.as_str(), "x");
    }

    #[rstest]
    fn clear_without_overflow_is_silent(reporter: CollectingReporter) {
        let mut buf = buffer(100, &reporter);
        buf.append("abc");
        buf.clear();
        assert!(buf.is_empty());
        assert!(reporter.infos().is_empty());
    }

    #[rstest]
    fn write_macro_appends(reporter: CollectingReporter) {
        let mut buf = buffer(100, &reporter);
        writeln!(buf, "{}={}", "level", "INFO").expect("write into buffer");
        assert_eq!(buf.as_str(), "level=INFO\n");
    }

    #[rstest]
    fn length_counts_utf8_bytes(reporter: CollectingReporter) {
        let mut buf = buffer(4, &reporter);
        buf.append("é");
        assert_eq!(buf.len(), 2);
        assert!(!buf.is_overflowed());
        buf.append("é");
        assert!(buf.is_overflowed());
    }
}
