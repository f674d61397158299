//! Waiting helpers layered on top of the non-blocking queue.
//!
//! `Queue::push` and `Queue::pop` return immediately. Callers that want to
//! wait wrap them here; nothing in the queue itself spins or yields.

use std::hint;
use std::thread;
use std::time::Instant;

/// Exponential spin, then yield, then report exhaustion.
///
/// Each `snooze` below `spin_limit` spins `2^step` times; after that it yields
/// to the scheduler until `yield_limit` steps have passed. The limits are per
/// instance: a worker polling an input queue can afford a longer spin than an
/// orchestrator juggling both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    step: u32,
    spin_limit: u32,
    yield_limit: u32,
}

impl Backoff {
    /// Default spin exponent: up to 64 pause hints per snooze.
    pub const DEFAULT_SPIN_LIMIT: u32 = 6;
    /// Default step at which the backoff reports completion.
    pub const DEFAULT_YIELD_LIMIT: u32 = 10;

    #[inline]
    pub fn new() -> Self {
        Self::with_limits(Self::DEFAULT_SPIN_LIMIT, Self::DEFAULT_YIELD_LIMIT)
    }

    /// Backoff with caller-chosen limits. `yield_limit` is raised to
    /// `spin_limit` if lower, so spinning always ends before completion.
    #[inline]
    pub fn with_limits(spin_limit: u32, yield_limit: u32) -> Self {
        Self {
            step: 0,
            spin_limit,
            yield_limit: yield_limit.max(spin_limit),
        }
    }

    /// Waits one step: spin while below the spin limit, yield afterwards.
    #[inline]
    pub fn snooze(&mut self) {
        if self.step <= self.spin_limit {
            for _ in 0..1u64 << self.step.min(63) {
                hint::spin_loop();
            }
        } else {
            thread::yield_now();
        }
        if self.step <= self.yield_limit {
            self.step += 1;
        }
    }

    /// `true` once `yield_limit` steps have been spent.
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.step > self.yield_limit
    }

    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Retries `attempt` with backoff until it succeeds or patience runs out.
///
/// ```
/// use phasering::{retry, Config, Queue};
///
/// let queue = Queue::<u64>::scmp(Config::default());
/// queue.add_producer();
/// assert!(retry(|| queue.push(7).then_some(())).is_some());
/// assert_eq!(retry(|| queue.pop()), Some(7));
/// ```
pub fn retry<T>(attempt: impl FnMut() -> Option<T>) -> Option<T> {
    retry_with(Backoff::new(), attempt)
}

/// [`retry`] with a caller-tuned [`Backoff`].
pub fn retry_with<T>(mut backoff: Backoff, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    backoff.reset();
    loop {
        if let Some(value) = attempt() {
            return Some(value);
        }
        if backoff.is_completed() {
            return None;
        }
        backoff.snooze();
    }
}

/// Retries `attempt` until it succeeds or `deadline` passes.
///
/// Once the backoff is exhausted it keeps yielding between attempts rather
/// than giving up; the clock is the only exit besides success.
pub fn retry_until<T>(deadline: Instant, mut attempt: impl FnMut() -> Option<T>) -> Option<T> {
    let mut backoff = Backoff::new();
    loop {
        if let Some(value) = attempt() {
            return Some(value);
        }
        if Instant::now() >= deadline {
            return None;
        }
        if backoff.is_completed() {
            thread::yield_now();
        } else {
            backoff.snooze();
        }
    }
}
