use crate::sync::{AtomicU64, Ordering};

/// Optional counters for monitoring queue traffic.
///
/// Updated with relaxed `fetch_add` from every participating thread, and
/// only when `Config::enable_metrics` is set.
#[derive(Debug)]
pub(crate) struct Metrics {
    pushed: AtomicU64,
    popped: AtomicU64,
    push_rejections: AtomicU64,
    pop_misses: AtomicU64,
    claim_races: AtomicU64,
}

impl Metrics {
    pub(crate) fn new() -> Self {
        Self {
            pushed: AtomicU64::new(0),
            popped: AtomicU64::new(0),
            push_rejections: AtomicU64::new(0),
            pop_misses: AtomicU64::new(0),
            claim_races: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn add_pushed(&self) {
        self.pushed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_popped(&self) {
        self.popped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_push_rejection(&self) {
        self.push_rejections.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_pop_miss(&self) {
        self.pop_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn add_claim_race(&self) {
        self.claim_races.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.pushed.store(0, Ordering::Relaxed);
        self.popped.store(0, Ordering::Relaxed);
        self.push_rejections.store(0, Ordering::Relaxed);
        self.pop_misses.store(0, Ordering::Relaxed);
        self.claim_races.store(0, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            pushed: self.pushed.load(Ordering::Relaxed),
            popped: self.popped.load(Ordering::Relaxed),
            push_rejections: self.push_rejections.load(Ordering::Relaxed),
            pop_misses: self.pop_misses.load(Ordering::Relaxed),
            claim_races: self.claim_races.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of a queue's counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Successful pushes.
    pub pushed: u64,
    /// Successful pops.
    pub popped: u64,
    /// Pushes that returned `false` (full, or slot not yet released).
    pub push_rejections: u64,
    /// Pops that found nothing ready.
    pub pop_misses: u64,
    /// MCSP pops that lost the read-index CAS to another consumer. Not
    /// included in `pop_misses`.
    pub claim_races: u64,
}

impl MetricsSnapshot {
    /// Items pushed but not yet popped at snapshot time.
    pub fn in_flight(&self) -> u64 {
        self.pushed.saturating_sub(self.popped)
    }
}
