//! phasering - Lock-Free Phase-Tagged Ring Queues
//!
//! A fixed-capacity ring of 64-bit slots, each holding a phase bit and a
//! 63-bit payload, moved between threads without locks. Two variants:
//!
//! - **SCMP** (single consumer, multiple producers): producers claim indices
//!   with `fetch_add` and publish by storing into the slot.
//! - **MCSP** (multiple consumers, single producer): consumers claim indices
//!   with CAS and hand the slot back by flipping its phase.
//!
//! [`Duplex`] wires one of each into a request/response channel between an
//! orchestrator and a worker pool.
//!
//! # Key Features
//!
//! - Unbounded u64 indices; the phase bit tells passes through the array apart
//! - One slack slot, plus one per SCMP producer, keeps readers within a pass
//! - `push`/`pop` never block; waiting lives in [`retry`] / [`retry_until`]
//! - Payloads are pointer-sized [`Handle`]s into caller-owned pools
//!
//! # Example
//!
//! ```
//! use phasering::{Config, Duplex};
//! use std::thread;
//!
//! let duplex = Duplex::<u64, u64>::new(Config::default());
//! duplex.add_worker();
//!
//! thread::scope(|s| {
//!     s.spawn(|| {
//!         let mut done = 0;
//!         while done < 3 {
//!             if let Some(job) = duplex.pop_input() {
//!                 while !duplex.push_output(job * 10) {
//!                     std::hint::spin_loop();
//!                 }
//!                 done += 1;
//!             }
//!         }
//!     });
//!
//!     for job in 1..=3 {
//!         while !duplex.push_input(job) {
//!             std::hint::spin_loop();
//!         }
//!     }
//!
//!     let mut sum = 0;
//!     let mut received = 0;
//!     while received < 3 {
//!         if let Some(result) = duplex.pop_output() {
//!             sum += result;
//!             received += 1;
//!         }
//!     }
//!     assert_eq!(sum, 60);
//! });
//! ```

mod affinity;
mod backoff;
mod config;
mod duplex;
mod error;
mod handle;
mod invariants;
mod metrics;
mod queue;
mod slot;
mod sync;

pub use backoff::{retry, retry_until, retry_with, Backoff};
pub use config::{Config, MAX_RING_BITS, SMALL_CONFIG, WORKER_POOL_CONFIG};
pub use duplex::Duplex;
pub use error::QueueError;
pub use handle::Handle;
pub use metrics::MetricsSnapshot;
pub use queue::{Mode, Queue};
pub use slot::{pack, payload_of, phase_of, MAX_PAYLOAD, PHASE_BIT};
