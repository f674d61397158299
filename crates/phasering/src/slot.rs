use crate::sync::{AtomicU64, Ordering};

/// Top bit of a slot word: the phase tag.
pub const PHASE_BIT: u64 = 1 << 63;

/// Largest payload a slot can carry (63 bits).
pub const MAX_PAYLOAD: u64 = !PHASE_BIT;

/// Packs a phase (0 or 1) and a payload into one slot word.
#[inline]
pub const fn pack(phase: u64, payload: u64) -> u64 {
    (phase << 63) | (payload & MAX_PAYLOAD)
}

/// Extracts the phase (0 or 1) from a slot word.
#[inline]
pub const fn phase_of(word: u64) -> u64 {
    word >> 63
}

/// Extracts the payload from a slot word.
#[inline]
pub const fn payload_of(word: u64) -> u64 {
    word & MAX_PAYLOAD
}

/// One element position of the ring: a single atomically accessed
/// `{phase, payload}` word.
#[repr(transparent)]
pub(crate) struct Slot {
    word: AtomicU64,
}

impl Slot {
    pub(crate) fn new() -> Self {
        Self {
            word: AtomicU64::new(pack(0, 0)),
        }
    }

    #[inline]
    pub(crate) fn load(&self, order: Ordering) -> u64 {
        self.word.load(order)
    }

    #[inline]
    pub(crate) fn store(&self, phase: u64, payload: u64, order: Ordering) {
        self.word.store(pack(phase, payload), order);
    }
}
