pub mod buffer;
pub mod config;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod sweep;

pub use buffer::{BufferState, LENGTH_PREFIX_BYTES};
pub use config::{GrowthPolicy, PoolConfig};
pub use pool::MessagePool;
pub use sweep::spawn_flush_loop;

/// Initialize a tracing subscriber for tests. Safe to call multiple times.
pub fn init_test_tracing() {
    use std::sync::Once;
    static START: Once = Once::new();
    START.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
