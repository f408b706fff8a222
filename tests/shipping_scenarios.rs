//! End-to-end flushes through the public API.

use std::sync::Arc;
use std::time::Duration;

use bulk_shipper::{
    BulkWriter, ShipperConfigBuilder, TransportError,
    buffer::{OVERFLOW_CLEARED, OVERFLOW_WARNING},
    test_support::{CollectingReporter, MockResponse, MockServer},
};
use rstest::rstest;

const WAIT: Duration = Duration::from_secs(5);

fn writer_for(server: &MockServer, max_queue_size: usize) -> (BulkWriter, CollectingReporter) {
    let config = ShipperConfigBuilder::new()
        .with_url(server.url("/_bulk"))
        .with_connect_timeout_ms(5_000)
        .with_read_timeout_ms(5_000)
        .with_max_queue_size(max_queue_size)
        .with_header("Content-Type", "application/x-ndjson")
        .build()
        .expect("valid config");
    let reporter = CollectingReporter::new();
    let writer = BulkWriter::new(config, Arc::new(reporter.clone())).expect("build writer");
    (writer, reporter)
}

#[rstest]
fn overflow_then_successful_flush() {
    let server = MockServer::start(vec![MockResponse::status(200)]);
    let (mut writer, reporter) = writer_for(&server, 50);

    writer.append("short message\n");
    assert!(writer.has_pending_data());
    assert!(!writer.buffer().is_overflowed());

    let long = "0123456789012345678901234567890123456789";
    writer.append(long);
    assert!(writer.buffer().is_overflowed());
    assert_eq!(reporter.warnings(), vec![OVERFLOW_WARNING.to_string()]);
    let retained = writer.buffer().as_str().to_owned();

    writer.append("more\n");
    assert_eq!(writer.buffer().as_str(), retained);

    writer.flush().expect("200 succeeds");

    let captured = server.next_request(WAIT).expect("request");
    assert_eq!(captured.body, retained);
    assert_eq!(captured.header("content-type"), Some("application/x-ndjson"));
    assert!(!writer.has_pending_data());
    assert!(!writer.buffer().is_overflowed());
    assert_eq!(reporter.infos(), vec![OVERFLOW_CLEARED.to_string()]);

    writer.append("accepted again\n");
    assert_eq!(writer.buffer().as_str(), "accepted again\n");
}

#[rstest]
fn service_unavailable_fails_and_clears() {
    let server = MockServer::start(vec![MockResponse::with_body(503, "service unavailable")]);
    let (mut writer, _reporter) = writer_for(&server, 1024);
    writer.append("{\"msg\":\"lost\"}\n");

    let err = writer.flush().expect_err("503 fails");

    assert!(matches!(err, TransportError::Status { status: 503, .. }));
    let message = err.to_string();
    assert!(message.contains("503"));
    assert!(message.contains("service unavailable"));
    assert!(!writer.has_pending_data());
}

#[rstest]
fn each_flush_is_one_exchange() {
    let server = MockServer::start(vec![MockResponse::status(200), MockResponse::status(200)]);
    let (mut writer, _reporter) = writer_for(&server, 1024);

    writer.append("batch one\n");
    writer.flush().expect("first flush");
    writer.flush().expect("empty flush is a no-op");
    writer.append("batch two\n");
    writer.flush().expect("second flush");

    assert_eq!(server.next_request(WAIT).expect("first").body, "batch one\n");
    assert_eq!(server.next_request(WAIT).expect("second").body, "batch two\n");
    assert!(server.next_request(Duration::from_millis(100)).is_none());
}
