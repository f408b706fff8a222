//! Property tests for the buffer overflow policy.

use std::sync::Arc;

use bulk_shipper::{SendBuffer, test_support::CollectingReporter};
use proptest::prelude::*;

fn fragments() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(".{0,16}", 0..40)
}

proptest! {
    #[test]
    fn overflowed_buffer_ignores_appends(max in 1usize..64, parts in fragments(), extra in ".{1,8}") {
        let reporter = CollectingReporter::new();
        let mut buffer = SendBuffer::new(max, Arc::new(reporter.clone()));
        for part in &parts {
            buffer.append(part);
        }
        prop_assume!(buffer.is_overflowed());

        let before = buffer.as_str().to_owned();
        buffer.append(&extra);
        prop_assert_eq!(buffer.as_str(), before.as_str());
        prop_assert_eq!(reporter.warnings().len(), 1);
    }

    #[test]
    fn content_is_a_prefix_of_the_input(max in 1usize..64, parts in fragments()) {
        let reporter = CollectingReporter::new();
        let mut buffer = SendBuffer::new(max, Arc::new(reporter));
        for part in &parts {
            buffer.append(part);
        }

        let all: String = parts.concat();
        prop_assert!(all.starts_with(buffer.as_str()));
        prop_assert_eq!(buffer.is_overflowed(), buffer.len() >= max);
        if !buffer.is_overflowed() {
            prop_assert_eq!(buffer.as_str(), all.as_str());
        }
    }

    #[test]
    fn clear_always_restores_capacity(max in 1usize..64, parts in fragments(), next in ".{1,8}") {
        let reporter = CollectingReporter::new();
        let mut buffer = SendBuffer::new(max, Arc::new(reporter.clone()));
        for part in &parts {
            buffer.append(part);
        }
        let was_overflowed = buffer.is_overflowed();

        buffer.clear();
        prop_assert!(!buffer.has_pending_data());
        prop_assert!(!buffer.is_overflowed());
        prop_assert_eq!(reporter.infos().len(), usize::from(was_overflowed));

        buffer.append(&next);
        prop_assert_eq!(buffer.as_str(), next.as_str());
    }
}
