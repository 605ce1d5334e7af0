//! Pool of reusable outbound message buffers.
//!
//! The pool owns every buffer, decides when auto-send buffers are flushed
//! to their transport, and recycles buffers for reuse. One mutex serializes
//! every operation; nothing here blocks on I/O while holding it, so
//! [`Connection::send`](common::Connection::send) implementations must not
//! block either.

use crate::buffer::{BufferState, MessageBuffer};
use crate::config::{GrowthPolicy, PoolConfig};
use crate::error::{AcquireError, ConfigError, ReleaseError, SendError, WriteError};
use crate::metrics;
use common::{Delivery, MessageId, Protocol};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

pub struct MessagePool {
    config: PoolConfig,
    inner: Mutex<PoolInner>,
}

struct PoolInner {
    /// Full owned collection; grows on demand, never shrinks.
    buffers: Vec<MessageBuffer>,
    /// Ids of exactly the buffers in `Allocated` state, in acquisition order.
    auto_send: VecDeque<MessageId>,
    /// Logical clock in milliseconds, advanced once per server tick so age
    /// comparisons within one sweep share a stable time base.
    tick_ms: u64,
}

impl MessagePool {
    pub fn new(config: PoolConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let buffers = (0..config.initial_buffers)
            .map(|_| MessageBuffer::new(config.buffer_capacity))
            .collect();
        Ok(Self {
            config,
            inner: Mutex::new(PoolInner {
                buffers,
                auto_send: VecDeque::new(),
                tick_ms: 0,
            }),
        })
    }

    pub fn with_defaults() -> Self {
        Self::new(PoolConfig::default()).expect("default pool config is valid")
    }

    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner> {
        self.inner.lock().unwrap()
    }

    /// Hand out a buffer for `protocol` to fill. Reuses the first free
    /// buffer, growing the pool per [`GrowthPolicy`] when none exists.
    /// Auto-send buffers join the flush queue immediately; the caller of a
    /// non-auto-send buffer sends via [`send_now`](Self::send_now).
    pub fn acquire(
        &self,
        protocol: &Arc<dyn Protocol>,
        auto_send: bool,
    ) -> Result<MessageId, AcquireError> {
        let mut inner = self.lock();

        let free_slot = inner
            .buffers
            .iter()
            .position(|b| b.state == BufferState::Free);
        let index = match free_slot {
            Some(index) => index,
            None => {
                if let GrowthPolicy::Bounded(bound) = self.config.growth {
                    if inner.buffers.len() >= bound {
                        tracing::warn!(
                            in_use = inner.buffers.len(),
                            bound,
                            "buffer pool exhausted"
                        );
                        return Err(AcquireError::Exhausted {
                            in_use: inner.buffers.len(),
                            bound,
                        });
                    }
                }
                inner
                    .buffers
                    .push(MessageBuffer::new(self.config.buffer_capacity));
                metrics::inc_grown();
                tracing::debug!(pool_size = inner.buffers.len(), "buffer pool grew");
                inner.buffers.len() - 1
            }
        };

        let id = MessageId::new(index);
        let connection = protocol.connection();
        if connection.is_none() {
            tracing::warn!(%id, "acquiring a buffer for a protocol with no connection");
        }

        let tick = inner.tick_ms;
        let buffer = &mut inner.buffers[index];
        buffer.reset();
        buffer.state = if auto_send {
            BufferState::Allocated
        } else {
            BufferState::AllocatedNoAutosend
        };
        buffer.created_at_tick = tick;
        buffer.protocol = Some(Arc::downgrade(protocol));
        buffer.connection = connection.as_ref().map(Arc::downgrade);

        if auto_send {
            inner.auto_send.push_back(id);
        }
        metrics::inc_acquired();
        Ok(id)
    }

    /// Append payload bytes. Only legal while the buffer is allocated.
    pub fn write(&self, id: MessageId, bytes: &[u8]) -> Result<(), WriteError> {
        let mut inner = self.lock();
        let buffer = inner
            .buffers
            .get_mut(id.index())
            .ok_or(WriteError::UnknownMessage(id))?;
        buffer.append(bytes)
    }

    /// Immediately send a buffer acquired without auto-send. Any other
    /// state is refused: a queued or already-waiting buffer must never be
    /// resent or double-freed from here.
    pub fn send_now(&self, id: MessageId) -> Result<(), SendError> {
        let mut inner = self.lock();
        let buffer = inner
            .buffers
            .get_mut(id.index())
            .ok_or(SendError::UnknownMessage(id))?;
        if buffer.state != BufferState::AllocatedNoAutosend {
            metrics::inc_invalid_transition();
            tracing::warn!(%id, state = ?buffer.state, "explicit send refused");
            return Err(SendError::InvalidState {
                state: buffer.state,
            });
        }
        Self::dispatch(buffer, id);
        Ok(())
    }

    /// One flush sweep over the auto-send queue. A buffer is flushed once
    /// its payload outgrows `size_threshold` or it has aged past
    /// `max_latency_ms` on the logical clock; both comparisons are strict.
    /// Flushed buffers leave the queue whatever the transport said; the
    /// rest stay queued for a later sweep. Returns the number flushed.
    pub fn flush_eligible(&self) -> usize {
        let mut inner = self.lock();
        let tick = inner.tick_ms;
        let mut retained = VecDeque::with_capacity(inner.auto_send.len());
        let mut flushed = 0;

        while let Some(id) = inner.auto_send.pop_front() {
            let buffer = &mut inner.buffers[id.index()];
            debug_assert_eq!(buffer.state, BufferState::Allocated);

            let age_ms = tick.saturating_sub(buffer.created_at_tick);
            if buffer.payload_len() <= self.config.size_threshold
                && age_ms <= self.config.max_latency_ms
            {
                retained.push_back(id);
                continue;
            }

            Self::dispatch(buffer, id);
            flushed += 1;
        }

        inner.auto_send = retained;
        flushed
    }

    /// Return a buffer to the pool. `confirmed_sent` is required to release
    /// a `Waiting` buffer and triggers the delivered notification; buffers
    /// released before transmission are discarded silently.
    pub fn release(&self, id: MessageId, confirmed_sent: bool) -> Result<(), ReleaseError> {
        let mut inner = self.lock();
        let state = inner
            .buffers
            .get(id.index())
            .ok_or(ReleaseError::UnknownMessage(id))?
            .state;

        match state {
            BufferState::Allocated => {
                inner.auto_send.retain(|queued| *queued != id);
                inner.buffers[id.index()].reset();
                metrics::inc_recycled();
                Ok(())
            }
            BufferState::AllocatedNoAutosend => {
                inner.buffers[id.index()].reset();
                metrics::inc_recycled();
                Ok(())
            }
            BufferState::Waiting => {
                if confirmed_sent {
                    Self::complete(&mut inner.buffers[id.index()], id, Delivery::Delivered);
                    Ok(())
                } else {
                    metrics::inc_invalid_transition();
                    tracing::warn!(%id, "release of a buffer still awaiting transport");
                    Err(ReleaseError::StillPending)
                }
            }
            BufferState::Free => {
                metrics::inc_invalid_transition();
                tracing::warn!(%id, "double release of a free buffer");
                Err(ReleaseError::AlreadyFree)
            }
        }
    }

    /// Advance the logical clock. The clock never moves backwards, so a
    /// stale caller cannot make queued buffers look younger than they are.
    pub fn begin_tick(&self, now_ms: u64) {
        let mut inner = self.lock();
        inner.tick_ms = inner.tick_ms.max(now_ms);
    }

    /// Hand one finished buffer to its transport. Transport refusal and a
    /// vanished connection both take the synthesized-completion path: the
    /// message is treated as sent and the buffer recycled, with no retry.
    fn dispatch(buffer: &mut MessageBuffer, id: MessageId) {
        buffer.write_length_prefix();
        match buffer.connection.as_ref().and_then(Weak::upgrade) {
            Some(connection) => {
                if connection.send(buffer.frame()) {
                    buffer.state = BufferState::Waiting;
                    metrics::inc_sent();
                } else {
                    metrics::inc_send_failed();
                    tracing::debug!(%id, len = buffer.payload_len(), "transport refused frame, discarding");
                    Self::complete(buffer, id, Delivery::Discarded);
                }
            }
            None => {
                metrics::inc_send_failed();
                tracing::warn!(%id, "no connection for outbound buffer, discarding");
                Self::complete(buffer, id, Delivery::Discarded);
            }
        }
    }

    /// Notify the owning protocol exactly once and recycle the buffer.
    fn complete(buffer: &mut MessageBuffer, id: MessageId, outcome: Delivery) {
        if let Some(protocol) = buffer.protocol.as_ref().and_then(Weak::upgrade) {
            protocol.message_sent(id, outcome);
        } else {
            tracing::debug!(%id, "owning protocol gone before completion");
        }
        buffer.reset();
        metrics::inc_recycled();
    }

    pub fn len(&self) -> usize {
        self.lock().buffers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().buffers.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.lock()
            .buffers
            .iter()
            .filter(|b| b.state == BufferState::Free)
            .count()
    }

    /// Buffers currently queued for the automatic flush sweep.
    pub fn queued_count(&self) -> usize {
        self.lock().auto_send.len()
    }

    pub fn state(&self, id: MessageId) -> Option<BufferState> {
        self.lock().buffers.get(id.index()).map(|b| b.state)
    }

    pub fn payload_len(&self, id: MessageId) -> Option<usize> {
        self.lock().buffers.get(id.index()).map(|b| b.payload_len())
    }

    pub fn tick_ms(&self) -> u64 {
        self.lock().tick_ms
    }
}
