//! Atomic types used by the queue.
//!
//! Under the `loom` feature every atomic the queue touches comes from loom so
//! the model checker can explore interleavings of the real push/pop code.

#[cfg(feature = "loom")]
pub(crate) use loom::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

#[cfg(not(feature = "loom"))]
pub(crate) use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
