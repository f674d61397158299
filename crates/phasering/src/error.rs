//! Precondition errors.
//!
//! Every variant describes a usage bug. The panicking entry points
//! (`Queue::new`, `add_producer`, `push`, ...) abort with the variant's
//! message; the `try_*` forms hand it back for callers that validate up front.
//! Transient contention (full, empty, lost race) is never an error.

use crate::Mode;
use thiserror::Error;

/// Fatal precondition violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueueError {
    /// Capacity is not a power of two, or is not greater than one.
    #[error("invalid capacity {capacity}: must be a power of two greater than 1")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// `ring_bits` outside the supported range.
    #[error("invalid ring_bits {bits}: must be in 1..={max}")]
    InvalidRingBits {
        /// The rejected bit count.
        bits: u8,
        /// Largest supported bit count.
        max: u8,
    },

    /// No admission slack left for another producer.
    #[error("capacity exhausted: queue of capacity {capacity} cannot admit another producer")]
    CapacityExhausted {
        /// Ring capacity.
        capacity: usize,
    },

    /// A second producer was registered on an MCSP queue.
    #[error("MCSP queue already has its single producer")]
    SingleProducerTaken,

    /// Push, or producer removal, with no registered producer.
    #[error("no producer registered on {mode:?} queue")]
    NoProducerRegistered {
        /// Mode of the queue.
        mode: Mode,
    },

    /// The pushed value collides with the phase bit.
    #[error("value {value:#x} has the phase bit set")]
    PhaseBitSet {
        /// The rejected word.
        value: u64,
    },

    /// A single-writer role was used from a second thread.
    #[error("{role} role used from a thread other than the one it is bound to")]
    RoleViolation {
        /// Name of the role.
        role: &'static str,
    },
}

impl QueueError {
    /// Returns `true` for errors caused by running out of admission slack.
    #[inline]
    pub fn is_capacity_error(&self) -> bool {
        matches!(self, Self::CapacityExhausted { .. } | Self::SingleProducerTaken)
    }
}
