//! Reusable outbound message buffer.
//!
//! A buffer carries one protocol message's bytes plus a small lifecycle tag.
//! It has no synchronization of its own: every access goes through the
//! pool's lock.

use bytes::BytesMut;
use common::{Connection, Protocol};
use std::sync::Weak;

use crate::error::WriteError;

/// Reserved header space at the front of every frame for the little-endian
/// u16 length prefix, written just before transmission.
pub const LENGTH_PREFIX_BYTES: usize = 2;

/// Lifecycle tag of a pooled buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Unused; available for acquisition.
    Free,
    /// In use; eligible for the automatic flush sweep.
    Allocated,
    /// In use; the caller takes responsibility for sending it explicitly.
    AllocatedNoAutosend,
    /// Handed to transport; awaiting the completion confirmation.
    Waiting,
}

impl BufferState {
    /// Payload may only be mutated in the two allocated states.
    pub fn is_writable(self) -> bool {
        matches!(self, Self::Allocated | Self::AllocatedNoAutosend)
    }
}

pub(crate) struct MessageBuffer {
    /// Frame bytes: the reserved prefix region followed by the payload.
    payload: BytesMut,
    /// Maximum payload bytes, prefix excluded.
    capacity: usize,
    pub(crate) state: BufferState,
    /// Pool tick at acquisition time, for the age-based flush decision.
    pub(crate) created_at_tick: u64,
    /// Non-owning back-references to the collaborators using this buffer.
    /// A failed upgrade is the "peer went away" signal.
    pub(crate) protocol: Option<Weak<dyn Protocol>>,
    pub(crate) connection: Option<Weak<dyn Connection>>,
}

impl MessageBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        let mut buffer = Self {
            payload: BytesMut::with_capacity(capacity + LENGTH_PREFIX_BYTES),
            capacity,
            state: BufferState::Free,
            created_at_tick: 0,
            protocol: None,
            connection: None,
        };
        buffer.reset();
        buffer
    }

    /// Recycle: payload truncated back to the reserved prefix region, state
    /// back to `Free`, collaborator references dropped.
    pub(crate) fn reset(&mut self) {
        self.payload.clear();
        self.payload.extend_from_slice(&[0u8; LENGTH_PREFIX_BYTES]);
        self.state = BufferState::Free;
        self.protocol = None;
        self.connection = None;
    }

    /// Payload bytes written so far, prefix excluded.
    pub(crate) fn payload_len(&self) -> usize {
        self.payload.len() - LENGTH_PREFIX_BYTES
    }

    pub(crate) fn remaining(&self) -> usize {
        self.capacity - self.payload_len()
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) -> Result<(), WriteError> {
        if !self.state.is_writable() {
            return Err(WriteError::InvalidState { state: self.state });
        }
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(WriteError::Overflow {
                requested: bytes.len(),
                remaining,
            });
        }
        self.payload.extend_from_slice(bytes);
        Ok(())
    }

    /// Write the final payload length into the reserved header region.
    /// Called exactly once per send, after all payload writes are complete.
    /// The cast is safe: configuration caps the capacity at `u16::MAX`.
    pub(crate) fn write_length_prefix(&mut self) {
        let len = self.payload_len() as u16;
        self.payload[..LENGTH_PREFIX_BYTES].copy_from_slice(&len.to_le_bytes());
    }

    /// Complete frame as handed to the transport: prefix plus payload.
    pub(crate) fn frame(&self) -> &[u8] {
        &self.payload
    }
}
