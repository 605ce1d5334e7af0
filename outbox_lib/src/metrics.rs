// Feature-gated metrics helpers for outbox_lib.
// When the "stats" feature is enabled this exposes lightweight atomics.

#[cfg(feature = "stats")]
mod with_stats {
    use std::sync::atomic::{AtomicU64, Ordering};

    static ACQUIRED_COUNT: AtomicU64 = AtomicU64::new(0);
    static GROWN_COUNT: AtomicU64 = AtomicU64::new(0);
    static SENT_COUNT: AtomicU64 = AtomicU64::new(0);
    static SEND_FAILED_COUNT: AtomicU64 = AtomicU64::new(0);
    static RECYCLED_COUNT: AtomicU64 = AtomicU64::new(0);
    static INVALID_TRANSITION_COUNT: AtomicU64 = AtomicU64::new(0);

    pub fn inc_acquired() {
        ACQUIRED_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    pub fn acquired_count() -> u64 {
        ACQUIRED_COUNT.load(Ordering::Relaxed)
    }

    pub fn inc_grown() {
        GROWN_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    pub fn grown_count() -> u64 {
        GROWN_COUNT.load(Ordering::Relaxed)
    }

    pub fn inc_sent() {
        SENT_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sent_count() -> u64 {
        SENT_COUNT.load(Ordering::Relaxed)
    }

    pub fn inc_send_failed() {
        SEND_FAILED_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    pub fn send_failed_count() -> u64 {
        SEND_FAILED_COUNT.load(Ordering::Relaxed)
    }

    pub fn inc_recycled() {
        RECYCLED_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    pub fn recycled_count() -> u64 {
        RECYCLED_COUNT.load(Ordering::Relaxed)
    }

    pub fn inc_invalid_transition() {
        INVALID_TRANSITION_COUNT.fetch_add(1, Ordering::Relaxed);
    }

    pub fn invalid_transition_count() -> u64 {
        INVALID_TRANSITION_COUNT.load(Ordering::Relaxed)
    }
}

#[cfg(not(feature = "stats"))]
mod without_stats {
    pub fn inc_acquired() {}
    pub fn acquired_count() -> u64 {
        0
    }
    pub fn inc_grown() {}
    pub fn grown_count() -> u64 {
        0
    }
    pub fn inc_sent() {}
    pub fn sent_count() -> u64 {
        0
    }
    pub fn inc_send_failed() {}
    pub fn send_failed_count() -> u64 {
        0
    }
    pub fn inc_recycled() {}
    pub fn recycled_count() -> u64 {
        0
    }
    pub fn inc_invalid_transition() {}
    pub fn invalid_transition_count() -> u64 {
        0
    }
}

#[cfg(feature = "stats")]
pub use with_stats::*;

#[cfg(not(feature = "stats"))]
pub use without_stats::*;
