use crate::buffer::LENGTH_PREFIX_BYTES;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Payload bytes above which an auto-send buffer is flushed by the sweep
pub const DEFAULT_SIZE_THRESHOLD: usize = 1024;

/// Milliseconds an auto-send buffer may age before the sweep flushes it
pub const DEFAULT_MAX_LATENCY_MS: u64 = 50;

/// Payload capacity of a single buffer, length prefix excluded
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// Buffers pre-allocated at pool construction
pub const DEFAULT_INITIAL_BUFFERS: usize = 32;

/// What the pool does when a buffer is requested and none are free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthPolicy {
    /// Always grow; a caller is never refused a buffer. Memory is unbounded
    /// under pathological load.
    Unbounded,
    /// Grow up to the given number of buffers, then refuse acquisition.
    Bounded(usize),
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::Unbounded
    }
}

/// Pool tuning knobs. The two flush thresholds are independent: size keeps
/// large messages moving, age bounds how long a small one can sit batched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Payload capacity in bytes of each buffer, length prefix excluded
    pub buffer_capacity: usize,
    /// Flush an auto-send buffer once its payload exceeds this many bytes
    pub size_threshold: usize,
    /// Flush an auto-send buffer once it has waited longer than this
    pub max_latency_ms: u64,
    /// Buffers created up front at pool construction
    pub initial_buffers: usize,
    /// Growth behavior when no free buffer exists
    pub growth: GrowthPolicy,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            size_threshold: DEFAULT_SIZE_THRESHOLD,
            max_latency_ms: DEFAULT_MAX_LATENCY_MS,
            initial_buffers: DEFAULT_INITIAL_BUFFERS,
            growth: GrowthPolicy::default(),
        }
    }
}

impl PoolConfig {
    /// Check the invariants the pool relies on. The payload length must fit
    /// the u16 length prefix, so the capacity is capped accordingly.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        let max = u16::MAX as usize;
        if self.buffer_capacity > max {
            return Err(ConfigError::CapacityTooLarge {
                capacity: self.buffer_capacity,
                max,
            });
        }
        if let GrowthPolicy::Bounded(bound) = self.growth {
            if bound == 0 {
                return Err(ConfigError::ZeroBound);
            }
            if self.initial_buffers > bound {
                return Err(ConfigError::InitialExceedsBound {
                    initial: self.initial_buffers,
                    bound,
                });
            }
        }
        Ok(())
    }

    /// Total bytes one buffer occupies, prefix included.
    pub fn frame_capacity(&self) -> usize {
        self.buffer_capacity + LENGTH_PREFIX_BYTES
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = PoolConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.size_threshold, 1024);
        assert_eq!(config.max_latency_ms, 50);
        assert_eq!(config.growth, GrowthPolicy::Unbounded);
    }

    #[test]
    fn zero_capacity_rejected() {
        let config = PoolConfig {
            buffer_capacity: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn capacity_beyond_prefix_range_rejected() {
        let config = PoolConfig {
            buffer_capacity: u16::MAX as usize + 1,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CapacityTooLarge { .. })
        ));
    }

    #[test]
    fn bounded_growth_validated() {
        let config = PoolConfig {
            growth: GrowthPolicy::Bounded(0),
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroBound));

        let config = PoolConfig {
            initial_buffers: 8,
            growth: GrowthPolicy::Bounded(4),
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InitialExceedsBound {
                initial: 8,
                bound: 4
            })
        );
    }

    #[test]
    fn frame_capacity_includes_prefix() {
        let config = PoolConfig {
            buffer_capacity: 100,
            ..Default::default()
        };
        assert_eq!(config.frame_capacity(), 102);
    }
}
