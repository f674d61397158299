use crate::affinity::{Role, RoleAffinity};
use crate::invariants::{
    debug_assert_read_not_past_write, debug_assert_single_step, debug_assert_slack_reserved,
    debug_assert_written_phase,
};
use crate::metrics::{Metrics, MetricsSnapshot};
use crate::slot::{payload_of, phase_of, Slot, PHASE_BIT};
use crate::sync::{AtomicU64, AtomicUsize, Ordering};
use crate::{Config, Handle, QueueError};
use crossbeam_utils::CachePadded;
use std::fmt;
use std::marker::PhantomData;

// =============================================================================
// PHASE PROTOCOL & MEMORY ORDERING
// =============================================================================
//
// `read_index` and `write_index` are unbounded u64 counters; the slot for a
// logical index `i` is `slots[i & mask]`. Each pass through the array flips
//
//     phase(i) = (i >> ring_bits) & 1
//
// and every slot word carries a phase bit next to its payload. `reset` writes
// phase 0 into every slot.
//
// ## SCMP (many producers, one consumer)
//
// Producers: relaxed `is_full` snapshot, `fetch_add` on `write_index` to
// claim a distinct index, then a Release store of `{!phase(i), payload}` into
// the slot. The slot store, not the index, is the publication point.
//
// Consumer: Relaxed load of its own `read_index`, Acquire load of the slot.
// A phase of `!phase(i)` means the claim for `i` has been written; anything
// else means the producer has not finished yet (spurious empty). The consumer
// then advances `read_index` with a plain store.
//
// ## MCSP (one producer, many consumers)
//
// Producer: Relaxed load of its own `write_index`, Acquire load of the target
// slot. The slot is free for index `i` only if it carries `phase(i)`; the
// previous pass's unconsumed value carries `!phase(i)` and the push fails.
// The payload goes in with `phase(i)` (Relaxed) and a Release store of
// `write_index` publishes it.
//
// Consumers: Acquire load of `write_index`, CAS on `read_index` to claim the
// next index, read the payload, then Release-store `!phase(i)` so the
// producer can reuse the slot on the next pass.
//
// ## Why one slack slot
//
// Readers may lag writers by at most one pass; `effective_capacity` starts at
// `capacity - 1`. In SCMP mode it loses one more per registered producer,
// which absorbs the claims that can be in flight past a stale `is_full`
// snapshot. The MCSP producer is alone and its slot phase check already
// refuses unconsumed slots, so it takes no slack.
//
// =============================================================================

/// Which side of the queue is shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single consumer, multiple producers.
    Scmp,
    /// Multiple consumers, single producer.
    Mcsp,
}

/// Why a pop came back empty-handed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PopMiss {
    /// Nothing published at the read index yet.
    NotReady,
    /// Another MCSP consumer claimed the index first.
    LostClaim,
}

impl Mode {
    fn single_role(self) -> Role {
        match self {
            Mode::Scmp => Role::Consumer,
            Mode::Mcsp => Role::Producer,
        }
    }
}

/// Fixed-capacity lock-free ring of pointer-sized handles.
///
/// The mode is fixed at construction. `reset` and producer (de)registration
/// belong to one orchestrator thread; the lone side of the queue (the SCMP
/// consumer or the MCSP producer) belongs to one thread that must stay on one
/// core for the queue's lifetime. Both bindings are asserted when
/// `Config::role_checks` is on.
///
/// `push` and `pop` never block. `false` / `None` mean "try again".
pub struct Queue<H = u64> {
    write_index: CachePadded<AtomicU64>,
    read_index: CachePadded<AtomicU64>,
    /// Admission bound; written only by the orchestrator
    effective_capacity: CachePadded<AtomicUsize>,
    producers: AtomicUsize,
    mode: Mode,
    config: Config,
    orchestrator: RoleAffinity,
    single_side: RoleAffinity,
    metrics: Metrics,
    slots: Box<[Slot]>,
    _handle: PhantomData<fn(H) -> H>,
}

impl<H: Handle> Queue<H> {
    /// Creates a queue in its reset state. Panics on an invalid config.
    pub fn new(config: Config, mode: Mode) -> Self {
        Self::try_new(config, mode).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Creates a single-consumer, multi-producer queue.
    pub fn scmp(config: Config) -> Self {
        Self::new(config, Mode::Scmp)
    }

    /// Creates a multi-consumer, single-producer queue.
    pub fn mcsp(config: Config) -> Self {
        Self::new(config, Mode::Mcsp)
    }

    /// Fallible form of [`new`](Self::new).
    pub fn try_new(config: Config, mode: Mode) -> Result<Self, QueueError> {
        config.validate()?;
        let capacity = config.capacity();
        let slots: Box<[Slot]> = (0..capacity).map(|_| Slot::new()).collect();

        log::debug!(
            "phasering: created {:?} queue (capacity={}, metrics={}, role_checks={})",
            mode,
            capacity,
            config.enable_metrics,
            config.role_checks
        );

        Ok(Self {
            write_index: CachePadded::new(AtomicU64::new(0)),
            read_index: CachePadded::new(AtomicU64::new(0)),
            effective_capacity: CachePadded::new(AtomicUsize::new(capacity - 1)),
            producers: AtomicUsize::new(0),
            mode,
            config,
            orchestrator: RoleAffinity::new(Role::Orchestrator, config.role_checks),
            single_side: RoleAffinity::new(mode.single_role(), config.role_checks),
            metrics: Metrics::new(),
            slots,
            _handle: PhantomData,
        })
    }

    // ---------------------------------------------------------------------
    // STATUS
    // ---------------------------------------------------------------------

    /// Number of slots in the ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Current admission bound: `capacity - 1 - registered producers`.
    #[inline]
    pub fn effective_capacity(&self) -> usize {
        self.effective_capacity.load(Ordering::Relaxed)
    }

    /// Number of registered producers.
    #[inline]
    pub fn producer_count(&self) -> usize {
        self.producers.load(Ordering::Relaxed)
    }

    /// The queue's mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The configuration the queue was built with.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Approximate number of claimed, not yet consumed indices.
    #[inline]
    pub fn len(&self) -> usize {
        let read = self.read_index.load(Ordering::Relaxed);
        let write = self.write_index.load(Ordering::Relaxed);
        write.saturating_sub(read) as usize
    }

    /// Approximate emptiness.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximate fullness from a relaxed snapshot.
    ///
    /// The loads may be stale under concurrent traffic. The worst outcome is
    /// a spurious `true` (an extra retry) or a `false` within the slack the
    /// admission bound already reserves.
    #[inline]
    pub fn is_full(&self) -> bool {
        let read = self.read_index.load(Ordering::Relaxed);
        let write = self.write_index.load(Ordering::Relaxed);
        let effective = self.effective_capacity.load(Ordering::Relaxed) as u64;
        write.saturating_sub(read) >= effective
    }

    /// Snapshot of the counters (all zero unless metrics are enabled).
    pub fn metrics(&self) -> MetricsSnapshot {
        if self.config.enable_metrics {
            self.metrics.snapshot()
        } else {
            MetricsSnapshot::default()
        }
    }

    #[inline]
    fn phase(&self, index: u64) -> u64 {
        (index >> self.config.ring_bits) & 1
    }

    #[inline]
    fn slot(&self, index: u64) -> &Slot {
        &self.slots[(index as usize) & self.config.mask()]
    }

    // ---------------------------------------------------------------------
    // ORCHESTRATOR API
    // ---------------------------------------------------------------------

    /// Returns the queue to its initial state.
    ///
    /// Exclusive access guarantees no push, pop or registration runs
    /// concurrently. Role bindings are dropped and the caller becomes the
    /// orchestrator.
    pub fn reset(&mut self) {
        self.write_index.store(0, Ordering::Relaxed);
        self.read_index.store(0, Ordering::Relaxed);
        for slot in self.slots.iter() {
            slot.store(0, 0, Ordering::Relaxed);
        }
        self.effective_capacity
            .store(self.capacity() - 1, Ordering::Relaxed);
        self.producers.store(0, Ordering::Relaxed);
        self.metrics.reset();

        self.single_side.clear();
        self.orchestrator.clear();
        self.orchestrator.assert();

        log::debug!(
            "phasering: reset {:?} queue (capacity={})",
            self.mode,
            self.capacity()
        );
    }

    /// Registers a producer. In SCMP mode it takes one slot of admission
    /// slack.
    ///
    /// Panics if the slack is exhausted or, in MCSP mode, a producer is
    /// already registered.
    pub fn add_producer(&self) {
        self.try_add_producer()
            .unwrap_or_else(|err| panic!("{err}"));
    }

    /// Fallible form of [`add_producer`](Self::add_producer).
    pub fn try_add_producer(&self) -> Result<(), QueueError> {
        self.orchestrator.check()?;

        let producers = self.producers.load(Ordering::Relaxed);
        let mut effective = self.effective_capacity.load(Ordering::Relaxed);
        match self.mode {
            Mode::Mcsp if producers > 0 => return Err(QueueError::SingleProducerTaken),
            // The lone MCSP producer never races itself past `is_full`.
            Mode::Mcsp => {}
            Mode::Scmp => {
                if effective == 0 {
                    return Err(QueueError::CapacityExhausted {
                        capacity: self.capacity(),
                    });
                }
                effective -= 1;
                self.effective_capacity.store(effective, Ordering::Relaxed);
            }
        }
        self.producers.store(producers + 1, Ordering::Relaxed);

        log::trace!(
            "phasering: producer registered on {:?} queue (producers={}, effective_capacity={})",
            self.mode,
            producers + 1,
            effective
        );
        Ok(())
    }

    /// Deregisters a producer, returning any admission slack it held.
    pub fn remove_producer(&self) {
        self.try_remove_producer()
            .unwrap_or_else(|err| panic!("{err}"));
    }

    /// Fallible form of [`remove_producer`](Self::remove_producer).
    pub fn try_remove_producer(&self) -> Result<(), QueueError> {
        self.orchestrator.check()?;

        let producers = self.producers.load(Ordering::Relaxed);
        if producers == 0 {
            return Err(QueueError::NoProducerRegistered { mode: self.mode });
        }

        let mut effective = self.effective_capacity.load(Ordering::Relaxed);
        if self.mode == Mode::Scmp {
            effective += 1;
            debug_assert_slack_reserved!(effective, self.capacity());
            self.effective_capacity.store(effective, Ordering::Relaxed);
        }
        self.producers.store(producers - 1, Ordering::Relaxed);

        log::trace!(
            "phasering: producer removed from {:?} queue (producers={}, effective_capacity={})",
            self.mode,
            producers - 1,
            effective
        );
        Ok(())
    }

    // ---------------------------------------------------------------------
    // PUSH / POP
    // ---------------------------------------------------------------------

    /// Enqueues a handle.
    ///
    /// Returns `true` once the value is visible to the consuming side and
    /// `false` if the queue was observed full or, in MCSP mode, the target
    /// slot has not been released by a consumer yet.
    ///
    /// Panics if the handle's word has bit 63 set or no producer is
    /// registered.
    #[inline]
    pub fn push(&self, value: H) -> bool {
        let word = value.into_word();
        assert!(
            word & PHASE_BIT == 0,
            "{}",
            QueueError::PhaseBitSet { value: word }
        );
        assert!(
            self.producers.load(Ordering::Relaxed) > 0,
            "{}",
            QueueError::NoProducerRegistered { mode: self.mode }
        );

        let pushed = match self.mode {
            Mode::Scmp => self.push_shared(word),
            Mode::Mcsp => self.push_single(word),
        };

        if self.config.enable_metrics {
            if pushed {
                self.metrics.add_pushed();
            } else {
                self.metrics.add_push_rejection();
            }
        }
        pushed
    }

    /// Dequeues a handle, or `None` if nothing is ready.
    #[inline]
    pub fn pop(&self) -> Option<H> {
        let popped = match self.mode {
            Mode::Scmp => self.pop_single(),
            Mode::Mcsp => self.pop_shared(),
        };

        if self.config.enable_metrics {
            match popped {
                Ok(_) => self.metrics.add_popped(),
                Err(PopMiss::NotReady) => self.metrics.add_pop_miss(),
                Err(PopMiss::LostClaim) => self.metrics.add_claim_race(),
            }
        }
        popped.ok().map(H::from_word)
    }

    /// SCMP producer path.
    fn push_shared(&self, word: u64) -> bool {
        if self.is_full() {
            return false;
        }

        // The claim alone serializes producers: every caller gets its own index.
        let index = self.write_index.fetch_add(1, Ordering::Relaxed);

        // Release: pairs with the consumer's Acquire load of this slot.
        self.slot(index)
            .store(self.phase(index) ^ 1, word, Ordering::Release);
        true
    }

    /// SCMP consumer path.
    fn pop_single(&self) -> Result<u64, PopMiss> {
        self.single_side.assert();

        // Only this thread writes read_index.
        let read = self.read_index.load(Ordering::Relaxed);
        if self.write_index.load(Ordering::Relaxed) <= read {
            return Err(PopMiss::NotReady);
        }

        let word = self.slot(read).load(Ordering::Acquire);
        if phase_of(word) != self.phase(read) ^ 1 {
            // Claimed but not yet written.
            return Err(PopMiss::NotReady);
        }

        let next = read.wrapping_add(1);
        debug_assert_single_step!("read_index", read, next);
        debug_assert_read_not_past_write!(next, self.write_index.load(Ordering::Relaxed));
        self.read_index.store(next, Ordering::Relaxed);

        Ok(payload_of(word))
    }

    /// MCSP producer path.
    fn push_single(&self, word: u64) -> bool {
        self.single_side.assert();

        // Only this thread writes write_index.
        let write = self.write_index.load(Ordering::Relaxed);
        debug_assert_read_not_past_write!(self.read_index.load(Ordering::Relaxed), write);
        if self.is_full() {
            return false;
        }

        let slot = self.slot(write);
        let phase = self.phase(write);
        // Acquire: pairs with the consumer's Release flip after it read the payload.
        if phase_of(slot.load(Ordering::Acquire)) != phase {
            // Previous pass not consumed yet.
            return false;
        }

        slot.store(phase, word, Ordering::Relaxed);
        // Release: publishes the slot to consumers.
        self.write_index
            .store(write.wrapping_add(1), Ordering::Release);
        true
    }

    /// MCSP consumer path.
    fn pop_shared(&self) -> Result<u64, PopMiss> {
        let read = self.read_index.load(Ordering::Relaxed);
        // Acquire: pairs with the producer's Release store of write_index.
        let write = self.write_index.load(Ordering::Acquire);
        if write <= read {
            return Err(PopMiss::NotReady);
        }

        if self
            .read_index
            .compare_exchange(read, read.wrapping_add(1), Ordering::AcqRel, Ordering::Relaxed)
            .is_err()
        {
            return Err(PopMiss::LostClaim);
        }

        let slot = self.slot(read);
        let phase = self.phase(read);
        let word = slot.load(Ordering::Relaxed);
        debug_assert_written_phase!(read, phase_of(word), phase);

        // Release: the producer may overwrite only after this read.
        slot.store(phase ^ 1, 0, Ordering::Release);
        Ok(payload_of(word))
    }
}

impl<H> fmt::Debug for Queue<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Queue")
            .field("mode", &self.mode)
            .field("capacity", &self.config.capacity())
            .field(
                "effective_capacity",
                &self.effective_capacity.load(Ordering::Relaxed),
            )
            .field("producers", &self.producers.load(Ordering::Relaxed))
            .field("read_index", &self.read_index.load(Ordering::Relaxed))
            .field("write_index", &self.write_index.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
