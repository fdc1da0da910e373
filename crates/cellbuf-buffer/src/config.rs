//! Buffer configuration parameters.

use cellbuf_core::error::ConfigError;

/// Configuration for a [`TaggedCellBuffer`](crate::TaggedCellBuffer).
///
/// Copied into each buffer at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BufferConfig {
    /// Fail reads past the end that directly follow an extending write.
    ///
    /// Default: `true`. Writing and then reading without rewinding is a
    /// common test bug; with detection off such reads return defaults like
    /// any other read past the end.
    pub detect_missing_reposition: bool,

    /// Largest capacity (in bytes) the buffer may grow to.
    ///
    /// Default: 64 MiB. Growth is clamped to this value; writes or size
    /// requests that cannot fit fail with `CapacityExceeded`.
    pub max_capacity: u32,
}

impl BufferConfig {
    /// Default maximum capacity: 64 MiB.
    pub const DEFAULT_MAX_CAPACITY: u32 = 64 * 1024 * 1024;

    /// Check structural invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_capacity == 0 {
            return Err(ConfigError::ZeroMaxCapacity);
        }
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            detect_missing_reposition: true,
            max_capacity: Self::DEFAULT_MAX_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let config = BufferConfig::default();
        assert!(config.detect_missing_reposition);
        assert_eq!(config.max_capacity, 64 * 1024 * 1024);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn zero_max_capacity_rejected() {
        let config = BufferConfig {
            max_capacity: 0,
            ..BufferConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroMaxCapacity));
    }
}
