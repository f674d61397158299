//! Orchestrator + worker pool over a duplex channel.
//!
//! Run with: `cargo run --release --example worker_pool`

use phasering::{Backoff, Config, Duplex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;

const WORKERS: usize = 8;
const JOBS: u64 = 2_000_000;

fn main() {
    println!("phasering worker pool");
    println!("=====================\n");

    // Orchestrator: this thread creates, resets and registers.
    let duplex = Duplex::<u64, u64>::new(Config::new(12));
    for _ in 0..WORKERS {
        duplex.add_worker();
    }
    let done = AtomicBool::new(false);

    println!("Configuration:");
    println!("  Workers: {}", WORKERS);
    println!("  Jobs: {}", JOBS);
    println!(
        "  Input capacity: {} (effective {})",
        duplex.inputs().capacity(),
        duplex.inputs().effective_capacity()
    );
    println!(
        "  Output capacity: {} (effective {})\n",
        duplex.outputs().capacity(),
        duplex.outputs().effective_capacity()
    );

    let start = Instant::now();

    let (sum, received) = thread::scope(|s| {
        for id in 0..WORKERS {
            let (duplex, done) = (&duplex, &done);
            s.spawn(move || {
                let mut handled = 0u64;
                let mut backoff = Backoff::new();
                loop {
                    if let Some(job) = duplex.pop_input() {
                        backoff.reset();
                        // Square the job and hand it back.
                        while !duplex.push_output(job * job) {
                            std::hint::spin_loop();
                        }
                        handled += 1;
                    } else if done.load(Ordering::Acquire) {
                        break;
                    } else if backoff.is_completed() {
                        thread::yield_now();
                    } else {
                        backoff.snooze();
                    }
                }
                println!("Worker {} handled {} jobs", id, handled);
            });
        }

        let mut next = 0u64;
        let mut received = 0u64;
        let mut sum = 0u64;
        while received < JOBS {
            // Keep the input side topped up, then drain results.
            while next < JOBS && duplex.push_input(next % 1000) {
                next += 1;
            }
            while let Some(result) = duplex.pop_output() {
                sum += result;
                received += 1;
            }
        }
        done.store(true, Ordering::Release);
        (sum, received)
    });

    for _ in 0..WORKERS {
        duplex.remove_worker();
    }

    let duration = start.elapsed();
    let expected: u64 = (0..JOBS).map(|j| (j % 1000) * (j % 1000)).sum();

    println!("\nResults:");
    println!("  Results received: {}", received);
    println!("  Sum of squares: {} (expected {})", sum, expected);
    println!("  Duration: {:.2?}", duration);
    println!(
        "  Throughput: {:.2} million round trips/sec",
        received as f64 / duration.as_secs_f64() / 1_000_000.0
    );
}
