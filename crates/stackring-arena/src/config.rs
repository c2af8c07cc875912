//! Arena configuration parameters.

use crate::error::ConfigError;

/// Configuration for a fixed-capacity [`Arena`](crate::Arena).
///
/// Both values are fixed when the arena is created. The arena never grows,
/// so `capacity` is the total number of bytes it will ever hand out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the backing buffer in bytes.
    ///
    /// Default: 65_536 (64 KiB). Must be non-zero.
    pub capacity: usize,

    /// Alignment of the start of the backing buffer in bytes.
    ///
    /// Default: 16, the alignment of `max_align_t` on mainstream targets.
    /// Requests with a larger alignment are still honoured; they just pay
    /// for the padding out of `capacity`. Must be a power of two.
    pub base_align: usize,
}

impl ArenaConfig {
    /// Default capacity: 64 KiB.
    pub const DEFAULT_CAPACITY: usize = 64 * 1024;

    /// Default base alignment.
    pub const DEFAULT_BASE_ALIGN: usize = 16;

    /// Create a config with the given capacity and the default base alignment.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            base_align: Self::DEFAULT_BASE_ALIGN,
        }
    }

    /// Check that the config describes a buffer that can be allocated.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if !self.base_align.is_power_of_two() {
            return Err(ConfigError::InvalidAlignment {
                align: self.base_align,
            });
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_64k() {
        let config = ArenaConfig::default();
        assert_eq!(config.capacity, 64 * 1024);
        assert_eq!(config.base_align, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            ArenaConfig::new(0).validate(),
            Err(ConfigError::ZeroCapacity)
        );
    }

    #[test]
    fn non_power_of_two_base_align_rejected() {
        let config = ArenaConfig {
            capacity: 128,
            base_align: 24,
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidAlignment { align: 24 })
        );
    }
}
