//! Shared helpers for the integration tests.

use common::test_helpers::{RecordingConnection, RecordingProtocol};
use common::Protocol;
use std::sync::Arc;

/// Build a recording connection/protocol pair plus the trait-object handle
/// the pool API takes.
#[allow(dead_code)]
pub fn mk_protocol() -> (
    Arc<RecordingConnection>,
    Arc<RecordingProtocol>,
    Arc<dyn Protocol>,
) {
    let connection = RecordingConnection::new();
    let protocol = RecordingProtocol::new(connection.clone());
    let dyn_protocol: Arc<dyn Protocol> = protocol.clone();
    (connection, protocol, dyn_protocol)
}

/// A protocol that never had a connection.
#[allow(dead_code)]
pub fn mk_disconnected_protocol() -> (Arc<RecordingProtocol>, Arc<dyn Protocol>) {
    let protocol = RecordingProtocol::disconnected();
    let dyn_protocol: Arc<dyn Protocol> = protocol.clone();
    (protocol, dyn_protocol)
}
