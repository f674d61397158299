//! Pointer-sized payloads.
//!
//! A slot carries 63 bits of payload, so anything larger than an index or a
//! small integer should live in a pool owned by the caller and travel through
//! the queue as a handle into that pool.

/// A value that fits in the 63 payload bits of a slot.
///
/// `into_word` must never set bit 63; pushing such a word is a fatal error.
/// `from_word` receives exactly the word produced by `into_word`.
pub trait Handle: Copy + Send {
    /// Converts the handle into a slot payload.
    fn into_word(self) -> u64;

    /// Rebuilds the handle from a slot payload.
    fn from_word(word: u64) -> Self;
}

impl Handle for u64 {
    #[inline]
    fn into_word(self) -> u64 {
        self
    }

    #[inline]
    fn from_word(word: u64) -> Self {
        word
    }
}

impl Handle for usize {
    #[inline]
    fn into_word(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_word(word: u64) -> Self {
        word as usize
    }
}

impl Handle for u32 {
    #[inline]
    fn into_word(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn from_word(word: u64) -> Self {
        word as u32
    }
}
