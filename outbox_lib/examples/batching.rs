//! Example demonstrating batched outbound sends through the message pool.
//!
//! Small messages sit in the auto-send queue until the age threshold moves
//! them; a large message leaves on the next sweep because of its size. A
//! channel-backed connection stands in for the socket writer.

use common::{ChannelConnection, Connection, Delivery, MessageId, Protocol};
use outbox_lib::{spawn_flush_loop, MessagePool, PoolConfig};
use std::sync::Arc;
use std::time::Duration;

struct LoggingProtocol {
    connection: Arc<ChannelConnection>,
}

impl Protocol for LoggingProtocol {
    fn connection(&self) -> Option<Arc<dyn Connection>> {
        Some(self.connection.clone())
    }

    fn message_sent(&self, id: MessageId, outcome: Delivery) {
        println!("  completion: {id} -> {outcome:?}");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    println!("=== Outbound batching example ===\n");

    let (connection, mut rx) = ChannelConnection::new();
    let connection = Arc::new(connection);
    let protocol: Arc<dyn Protocol> = Arc::new(LoggingProtocol {
        connection: connection.clone(),
    });

    let pool = Arc::new(MessagePool::new(PoolConfig::default())?);
    let sweeper = spawn_flush_loop(pool.clone(), Duration::from_millis(10));

    // Stand-in for the socket writer task: drains finished frames.
    let drain = tokio::spawn(async move {
        let mut frames = Vec::new();
        while let Some(frame) = rx.recv().await {
            let payload_len = u16::from_le_bytes([frame[0], frame[1]]);
            println!("  wire: {} bytes (payload {})", frame.len(), payload_len);
            frames.push(frame);
            if frames.len() == 3 {
                break;
            }
        }
        frames
    });

    let first = pool.acquire(&protocol, true).unwrap();
    pool.write(first, b"small update").unwrap();
    let second = pool.acquire(&protocol, true).unwrap();
    pool.write(second, b"another small update").unwrap();
    let large = pool.acquire(&protocol, true).unwrap();
    pool.write(large, &[0x42; 2000]).unwrap();

    let frames = drain.await?;
    println!("\ndrained {} frames", frames.len());

    // Confirm the in-flight buffers so the pool is fully reusable again.
    for id in [first, second, large] {
        pool.release(id, true).unwrap();
    }
    println!("free buffers: {}/{}", pool.free_count(), pool.len());

    sweeper.abort();
    Ok(())
}
