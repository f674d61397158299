use crate::QueueError;

/// Largest supported `ring_bits` (4G slots).
pub const MAX_RING_BITS: u8 = 32;

/// Configuration for `Queue` and `Duplex`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Ring size as power of 2 (default: 10 = 1024 slots)
    pub ring_bits: u8,
    /// Enable metrics collection (slight overhead)
    pub enable_metrics: bool,
    /// Assert that single-writer roles stay on one thread (default: debug builds)
    pub role_checks: bool,
}

impl Config {
    /// Creates a configuration for a ring of `2^ring_bits` slots.
    pub const fn new(ring_bits: u8) -> Self {
        Self {
            ring_bits,
            enable_metrics: false,
            role_checks: cfg!(debug_assertions),
        }
    }

    /// Creates a configuration from a slot count.
    ///
    /// The count must be a power of two greater than one.
    pub fn with_capacity(capacity: usize) -> Result<Self, QueueError> {
        if capacity <= 1 || !capacity.is_power_of_two() {
            return Err(QueueError::InvalidCapacity { capacity });
        }
        let config = Self::new(capacity.trailing_zeros() as u8);
        config.validate()?;
        Ok(config)
    }

    /// Enables or disables metrics.
    pub const fn with_metrics(mut self, enable: bool) -> Self {
        self.enable_metrics = enable;
        self
    }

    /// Enables or disables role-affinity assertions.
    pub const fn with_role_checks(mut self, enable: bool) -> Self {
        self.role_checks = enable;
        self
    }

    /// Checks `ring_bits` against the supported range.
    pub fn validate(&self) -> Result<(), QueueError> {
        if self.ring_bits == 0 || self.ring_bits > MAX_RING_BITS {
            return Err(QueueError::InvalidRingBits {
                bits: self.ring_bits,
                max: MAX_RING_BITS,
            });
        }
        Ok(())
    }

    /// Returns the capacity of the ring buffer.
    #[inline]
    pub const fn capacity(&self) -> usize {
        1 << self.ring_bits
    }

    /// Returns the mask for index wrapping.
    #[inline]
    pub const fn mask(&self) -> usize {
        self.capacity() - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(10)
    }
}

/// Small ring (16 slots): forces frequent wraparound, handy in tests.
pub const SMALL_CONFIG: Config = Config::new(4);

/// Worker-pool ring (4K slots): room for a few hundred registered workers.
pub const WORKER_POOL_CONFIG: Config = Config::new(12);
