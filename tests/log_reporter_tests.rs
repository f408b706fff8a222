//! `LogErrorReporter` forwards notifications to the `log` facade.
//!
//! `Logger::start` installs the global logger, so this binary holds a single
//! test that starts it once.

use std::sync::Arc;

use bulk_shipper::{ErrorReporter, LogErrorReporter, SendBuffer, error_reporter::REPORTER_TARGET};
use logtest::Logger;
use serial_test::serial;

fn drain(logger: &mut Logger) -> Vec<logtest::Record> {
    std::iter::from_fn(|| logger.pop()).collect()
}

fn reporter_records(logger: &mut Logger) -> Vec<logtest::Record> {
    drain(logger)
        .into_iter()
        .filter(|r| r.target() == REPORTER_TARGET)
        .collect()
}

#[test]
#[serial]
fn reporter_notifications_reach_log_facade() {
    let mut logger = Logger::start();
    drain(&mut logger);

    let reporter = LogErrorReporter::new();
    reporter.log_warning("queue full");
    reporter.log_info("queue drained");

    let records = reporter_records(&mut logger);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].level(), log::Level::Warn);
    assert_eq!(records[0].args(), "queue full");
    assert_eq!(records[1].level(), log::Level::Info);
    assert_eq!(records[1].args(), "queue drained");

    let mut buffer = SendBuffer::new(8, Arc::new(LogErrorReporter::new()));
    buffer.append("12345678");
    buffer.append("dropped");
    buffer.clear();

    let records = reporter_records(&mut logger);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].level(), log::Level::Warn);
    assert!(records[0].args().contains("maximum size exceeded"));
    assert_eq!(records[1].level(), log::Level::Info);
    assert!(records[1].args().contains("no longer be lost"));
}
