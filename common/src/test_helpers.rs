//! Recording mocks for the transport seam, used by unit tests, integration
//! tests and benches in downstream crates.

use crate::transport::{Connection, Delivery, MessageId, Protocol};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Connection mock that records every frame and can be told to refuse sends.
#[derive(Default)]
pub struct RecordingConnection {
    frames: Mutex<Vec<Vec<u8>>>,
    refuse: AtomicBool,
}

impl RecordingConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following `send` report failure, as a closed socket would.
    pub fn set_refuse(&self, refuse: bool) {
        self.refuse.store(refuse, Ordering::SeqCst);
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.frames.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.frames.lock().unwrap().len()
    }
}

impl Connection for RecordingConnection {
    fn send(&self, frame: &[u8]) -> bool {
        if self.refuse.load(Ordering::SeqCst) {
            return false;
        }
        self.frames.lock().unwrap().push(frame.to_vec());
        true
    }
}

/// Protocol mock that hands out an injected connection and records every
/// completion notification.
pub struct RecordingProtocol {
    connection: Mutex<Option<Arc<dyn Connection>>>,
    completions: Mutex<Vec<(MessageId, Delivery)>>,
}

impl RecordingProtocol {
    pub fn new(connection: Arc<dyn Connection>) -> Arc<Self> {
        Arc::new(Self {
            connection: Mutex::new(Some(connection)),
            completions: Mutex::new(Vec::new()),
        })
    }

    /// Protocol that never had a connection, for the missing-connection paths.
    pub fn disconnected() -> Arc<Self> {
        Arc::new(Self {
            connection: Mutex::new(None),
            completions: Mutex::new(Vec::new()),
        })
    }

    /// Drop the connection reference, as when a peer goes away mid-flight.
    /// The pool only holds a weak reference, so once the caller's clones are
    /// gone too the upgrade inside the pool starts failing.
    pub fn drop_connection(&self) {
        *self.connection.lock().unwrap() = None;
    }

    pub fn completions(&self) -> Vec<(MessageId, Delivery)> {
        self.completions.lock().unwrap().clone()
    }

    pub fn completion_count(&self) -> usize {
        self.completions.lock().unwrap().len()
    }
}

impl Protocol for RecordingProtocol {
    fn connection(&self) -> Option<Arc<dyn Connection>> {
        self.connection.lock().unwrap().clone()
    }

    fn message_sent(&self, id: MessageId, outcome: Delivery) {
        self.completions.lock().unwrap().push((id, outcome));
    }
}
