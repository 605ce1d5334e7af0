use crate::buffer::BufferState;
use common::MessageId;
use thiserror::Error;

/// Errors from pool configuration validation
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("buffer capacity must be non-zero")]
    ZeroCapacity,

    #[error("buffer capacity {capacity} exceeds the length prefix range (max {max})")]
    CapacityTooLarge { capacity: usize, max: usize },

    #[error("bounded pool size must be non-zero")]
    ZeroBound,

    #[error("initial buffer count {initial} exceeds the pool bound {bound}")]
    InitialExceedsBound { initial: usize, bound: usize },
}

/// Errors from buffer acquisition
#[derive(Error, Debug, PartialEq, Eq)]
pub enum AcquireError {
    #[error("pool exhausted: {in_use} buffers in use, bounded at {bound}")]
    Exhausted { in_use: usize, bound: usize },
}

/// Errors from payload writes
#[derive(Error, Debug, PartialEq, Eq)]
pub enum WriteError {
    #[error("no buffer for {0}")]
    UnknownMessage(MessageId),

    #[error("buffer is not writable in state {state:?}")]
    InvalidState { state: BufferState },

    #[error("payload overflow: {requested} bytes requested, {remaining} remaining")]
    Overflow { requested: usize, remaining: usize },
}

/// Errors from explicit sends
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SendError {
    #[error("no buffer for {0}")]
    UnknownMessage(MessageId),

    #[error("explicit send requires an allocated no-autosend buffer, found {state:?}")]
    InvalidState { state: BufferState },
}

/// Errors from releasing a buffer back to the pool
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReleaseError {
    #[error("no buffer for {0}")]
    UnknownMessage(MessageId),

    #[error("buffer is already free (double release)")]
    AlreadyFree,

    #[error("buffer is awaiting transport completion; release requires confirmation")]
    StillPending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::CapacityTooLarge {
            capacity: 100_000,
            max: u16::MAX as usize,
        };
        let msg = err.to_string();
        assert!(msg.contains("100000"));
        assert!(msg.contains("65535"));
    }

    #[test]
    fn acquire_exhausted_display() {
        let err = AcquireError::Exhausted {
            in_use: 64,
            bound: 64,
        };
        let msg = err.to_string();
        assert!(msg.contains("64 buffers in use"));
        assert!(msg.contains("bounded at 64"));
    }

    #[test]
    fn write_overflow_display() {
        let err = WriteError::Overflow {
            requested: 2000,
            remaining: 96,
        };
        let msg = err.to_string();
        assert!(msg.contains("2000 bytes requested"));
        assert!(msg.contains("96 remaining"));
    }

    #[test]
    fn send_invalid_state_display() {
        let err = SendError::InvalidState {
            state: BufferState::Waiting,
        };
        assert!(err.to_string().contains("Waiting"));
    }

    #[test]
    fn release_error_display() {
        assert_eq!(
            ReleaseError::AlreadyFree.to_string(),
            "buffer is already free (double release)"
        );
        let err = ReleaseError::UnknownMessage(MessageId::new(3));
        assert_eq!(err.to_string(), "no buffer for msg#3");
    }
}
