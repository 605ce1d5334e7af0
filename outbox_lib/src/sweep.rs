//! Periodic tick/flush driver for the pool.
//!
//! Worker threads fill buffers; this loop advances the pool's logical clock
//! and runs the flush sweep once per period. The clock is derived from a
//! tokio instant so paused-clock tests can drive it deterministically.

use crate::pool::MessagePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Spawn the flush loop. Runs until the returned handle is aborted.
pub fn spawn_flush_loop(pool: Arc<MessagePool>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let epoch = tokio::time::Instant::now();
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let now_ms = epoch.elapsed().as_millis() as u64;
            pool.begin_tick(now_ms);
            let flushed = pool.flush_eligible();
            if flushed > 0 {
                tracing::trace!(flushed, tick_ms = now_ms, "flush sweep");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::test_helpers::{RecordingConnection, RecordingProtocol};
    use common::Protocol;

    #[tokio::test(start_paused = true)]
    async fn loop_flushes_aged_buffer() {
        let pool = Arc::new(MessagePool::with_defaults());
        let connection = RecordingConnection::new();
        let protocol: Arc<dyn Protocol> = RecordingProtocol::new(connection.clone());

        let id = pool.acquire(&protocol, true).unwrap();
        pool.write(id, b"small").unwrap();

        let handle = spawn_flush_loop(pool.clone(), Duration::from_millis(10));

        // Well past the 50ms age threshold; the loop must have swept it out.
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(connection.sent_count(), 1);
        assert_eq!(pool.queued_count(), 0);

        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn loop_leaves_fresh_small_buffer_queued() {
        let pool = Arc::new(MessagePool::with_defaults());
        let connection = RecordingConnection::new();
        let protocol: Arc<dyn Protocol> = RecordingProtocol::new(connection.clone());

        let handle = spawn_flush_loop(pool.clone(), Duration::from_millis(10));

        // Let the loop establish its clock, then acquire so the buffer's
        // age stays below the threshold for the next couple of sweeps.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let id = pool.acquire(&protocol, true).unwrap();
        pool.write(id, b"tiny").unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(connection.sent_count(), 0);
        assert_eq!(pool.queued_count(), 1);

        handle.abort();
    }
}
