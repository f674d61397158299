//! Debug assertion macros for queue invariants.
//!
//! Only active in debug builds (`#[cfg(debug_assertions)]`), so release
//! builds pay nothing. Each check only compares values whose ordering is
//! guaranteed at the call site; stale relaxed snapshots are never asserted on.

// =============================================================================
// Read never passes write
// =============================================================================

/// Assert that the read index does not pass the write index.
///
/// **Invariant**: `read ≤ write`
///
/// Used in: SCMP `pop()` after the slot acquire (the claim that produced the
/// slot happens-before it), MCSP `push()` (the producer owns `write`)
macro_rules! debug_assert_read_not_past_write {
    ($read:expr, $write:expr) => {
        debug_assert!(
            $read <= $write,
            "read index {} passed write index {}",
            $read,
            $write
        )
    };
}

// =============================================================================
// Monotonic indices
// =============================================================================

/// Assert that a logical index only moves forward by one.
///
/// Used in: SCMP `pop()` before publishing the next read index
macro_rules! debug_assert_single_step {
    ($name:literal, $old:expr, $new:expr) => {
        debug_assert!(
            $new == $old.wrapping_add(1),
            "{} must advance by exactly one: {} -> {}",
            $name,
            $old,
            $new
        )
    };
}

// =============================================================================
// Phase tags
// =============================================================================

/// Assert that a claimed slot carries the phase its writer stamped.
///
/// Used in: MCSP `pop()` after a successful claim
macro_rules! debug_assert_written_phase {
    ($index:expr, $found:expr, $expected:expr) => {
        debug_assert!(
            $found == $expected,
            "slot for index {} carries phase {} instead of written phase {}",
            $index,
            $found,
            $expected
        )
    };
}

// =============================================================================
// Admission accounting
// =============================================================================

/// Assert the slack slot is never handed out.
///
/// **Invariant**: `effective_capacity ≤ capacity - 1`
///
/// Used in: `try_remove_producer()`
macro_rules! debug_assert_slack_reserved {
    ($effective:expr, $capacity:expr) => {
        debug_assert!(
            $effective < $capacity,
            "effective capacity {} must stay below ring capacity {}",
            $effective,
            $capacity
        )
    };
}

// =============================================================================
// Re-exports for crate-internal use
// =============================================================================

pub(crate) use debug_assert_read_not_past_write;
pub(crate) use debug_assert_single_step;
pub(crate) use debug_assert_slack_reserved;
pub(crate) use debug_assert_written_phase;
