//! Send/Sync guarantees for core types.

use bulk_shipper::{
    BasicAuthentication, BearerAuthentication, BulkWriter, LogErrorReporter, SendBuffer, Shipper,
    ShipperConfig, ShipperConfigBuilder, SignedAuthentication,
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn configuration_is_send_sync() {
    assert_impl_all!(ShipperConfig: Send, Sync, Clone);
    assert_impl_all!(ShipperConfigBuilder: Send, Sync, Clone);
    assert_impl_all!(BasicAuthentication: Send, Sync);
    assert_impl_all!(BearerAuthentication: Send, Sync);
    assert_impl_all!(SignedAuthentication: Send, Sync);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(SendBuffer: Send, Sync);
    assert_impl_all!(BulkWriter: Send, Sync);
    assert_impl_all!(Shipper: Send, Sync);
    assert_impl_all!(LogErrorReporter: Send, Sync);
}
