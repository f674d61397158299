#![cfg(not(feature = "loom"))]

use phasering::{retry_until, Config, Duplex, Queue};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

#[test]
fn test_scmp_no_loss_multi_producer() {
    const N_PRODUCERS: u64 = 8;
    const ITEMS_PER_PRODUCER: u64 = 10_000;

    let queue = Queue::<u64>::scmp(Config::new(8));
    for _ in 0..N_PRODUCERS {
        queue.add_producer();
    }
    assert_eq!(queue.effective_capacity(), 255 - N_PRODUCERS as usize);

    let received = thread::scope(|s| {
        for producer_id in 0..N_PRODUCERS {
            let q = &queue;
            s.spawn(move || {
                for i in 0..ITEMS_PER_PRODUCER {
                    let value = producer_id * ITEMS_PER_PRODUCER + i;
                    while !q.push(value) {
                        thread::yield_now();
                    }
                }
            });
        }

        let total = (N_PRODUCERS * ITEMS_PER_PRODUCER) as usize;
        let mut received = Vec::with_capacity(total);
        while received.len() < total {
            match queue.pop() {
                Some(v) => received.push(v),
                None => thread::yield_now(),
            }
        }
        received
    });

    // Per-producer order survives: each producer's claims are increasing.
    let mut last_seen = vec![None; N_PRODUCERS as usize];
    for &v in &received {
        let producer_id = (v / ITEMS_PER_PRODUCER) as usize;
        let seq = v % ITEMS_PER_PRODUCER;
        if let Some(prev) = last_seen[producer_id] {
            assert!(seq > prev, "producer {} reordered: {} after {}", producer_id, seq, prev);
        }
        last_seen[producer_id] = Some(seq);
    }

    let mut sorted = received;
    sorted.sort_unstable();
    let expected: Vec<u64> = (0..N_PRODUCERS * ITEMS_PER_PRODUCER).collect();
    assert_eq!(sorted, expected);
    assert_eq!(queue.pop(), None);
}

#[test]
fn test_scmp_fifo_single_producer_small_ring() {
    const N: u64 = 1000;

    let queue = Queue::<u64>::scmp(Config::with_capacity(4).unwrap());
    queue.add_producer();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..N {
                while !queue.push(i) {
                    thread::yield_now();
                }
            }
        });

        let mut expected = 0;
        while expected < N {
            while let Some(v) = queue.pop() {
                assert_eq!(v, expected, "FIFO violation: expected {}, got {}", expected, v);
                expected += 1;
            }
            thread::yield_now();
        }
    });
}

#[test]
fn test_mcsp_aggregate_conservation() {
    const N: u64 = 100_000;
    const CONSUMERS: usize = 32;

    let queue = Queue::<u64>::mcsp(Config::with_capacity(16).unwrap());
    queue.add_producer();
    let consumed = AtomicUsize::new(0);

    let mut collected: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let (q, consumed) = (&queue, &consumed);
                s.spawn(move || {
                    let mut local = Vec::new();
                    loop {
                        if let Some(v) = q.pop() {
                            local.push(v);
                            consumed.fetch_add(1, Ordering::Relaxed);
                        } else if consumed.load(Ordering::Relaxed) >= N as usize {
                            break;
                        } else {
                            thread::yield_now();
                        }
                    }
                    local
                })
            })
            .collect();

        for i in 0..N {
            while !queue.push(i) {
                thread::yield_now();
            }
        }

        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    collected.sort_unstable();
    let expected: Vec<u64> = (0..N).collect();
    assert_eq!(collected, expected);
}

#[test]
fn test_mcsp_single_producer_order_per_consumer() {
    const N: u64 = 20_000;

    let queue = Queue::<u64>::mcsp(Config::new(6));
    queue.add_producer();
    let done = AtomicBool::new(false);

    thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let (q, done) = (&queue, &done);
                s.spawn(move || {
                    let mut last = None;
                    let mut count = 0u64;
                    loop {
                        if let Some(v) = q.pop() {
                            // One producer, claims in index order: each consumer sees increasing values.
                            assert!(last.map_or(true, |prev| v > prev));
                            last = Some(v);
                            count += 1;
                        } else if done.load(Ordering::Acquire) && q.is_empty() {
                            break;
                        } else {
                            thread::yield_now();
                        }
                    }
                    count
                })
            })
            .collect();

        for i in 0..N {
            while !queue.push(i) {
                thread::yield_now();
            }
        }
        done.store(true, Ordering::Release);

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, N);
    });
}

#[test]
fn test_duplex_echo_conservation() {
    const K: u64 = 200_000;
    const WORKERS: usize = 16;

    let duplex = Duplex::<u64, u64>::new(Config::new(10));
    for _ in 0..WORKERS {
        duplex.add_worker();
    }
    assert_eq!(duplex.worker_count(), WORKERS);

    let done = AtomicBool::new(false);

    let (sent_sum, received_sum, received) = thread::scope(|s| {
        for _ in 0..WORKERS {
            let (duplex, done) = (&duplex, &done);
            s.spawn(move || loop {
                if let Some(job) = duplex.pop_input() {
                    while !duplex.push_output(job) {
                        thread::yield_now();
                    }
                } else if done.load(Ordering::Acquire) {
                    break;
                } else {
                    thread::yield_now();
                }
            });
        }

        let mut sent = 0u64;
        let mut sent_sum = 0u64;
        let mut received = 0u64;
        let mut received_sum = 0u64;
        while received < K {
            if sent < K && duplex.push_input(sent + 1) {
                sent += 1;
                sent_sum += sent;
            }
            while let Some(result) = duplex.pop_output() {
                received += 1;
                received_sum += result;
            }
        }
        done.store(true, Ordering::Release);
        (sent_sum, received_sum, received)
    });

    for _ in 0..WORKERS {
        duplex.remove_worker();
    }

    let expected = K * (K + 1) / 2;
    assert_eq!(received, K);
    assert_eq!(sent_sum, expected);
    assert_eq!(received_sum, expected);
    assert_eq!(duplex.worker_count(), 0);
    assert_eq!(duplex.pop_output(), None);
}

#[test]
fn test_duplex_handles_into_pool() {
    // Payloads too wide for a slot stay in a pool; the channel carries indices.
    let pool: Vec<String> = (0..500).map(|i| "x".repeat(i % 17)).collect();

    let duplex = Duplex::<usize, u64>::new(Config::new(5));
    for _ in 0..4 {
        duplex.add_worker();
    }
    let done = AtomicBool::new(false);

    let total_len = thread::scope(|s| {
        for _ in 0..4 {
            let (duplex, done, pool) = (&duplex, &done, &pool);
            s.spawn(move || loop {
                if let Some(idx) = duplex.pop_input() {
                    let len = pool[idx].len() as u64;
                    while !duplex.push_output(len) {
                        thread::yield_now();
                    }
                } else if done.load(Ordering::Acquire) {
                    break;
                } else {
                    thread::yield_now();
                }
            });
        }

        let mut next = 0;
        let mut received = 0;
        let mut total = 0u64;
        while received < pool.len() {
            if next < pool.len() && duplex.push_input(next) {
                next += 1;
            }
            if let Some(len) = duplex.pop_output() {
                total += len;
                received += 1;
            }
        }
        done.store(true, Ordering::Release);
        total
    });

    let expected: u64 = pool.iter().map(|s| s.len() as u64).sum();
    assert_eq!(total_len, expected);
}

#[test]
fn test_retry_until_waits_for_producer() {
    let queue = Queue::<u64>::scmp(Config::default());
    queue.add_producer();

    thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(10));
            assert!(queue.push(99));
        });

        let deadline = Instant::now() + Duration::from_secs(10);
        assert_eq!(retry_until(deadline, || queue.pop()), Some(99));
    });
}

#[test]
fn test_remove_worker_returns_admission_slot() {
    let duplex = Duplex::<u64, u64>::new(Config::new(4));
    duplex.add_worker();
    duplex.add_worker();
    assert_eq!(duplex.outputs().effective_capacity(), 13);

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..10 {
                assert!(duplex.push_output(i));
            }
        });
    });

    // The worker has stopped; its slack slot comes back while results are still queued.
    duplex.remove_worker();
    assert_eq!(duplex.outputs().effective_capacity(), 14);

    let drained: Vec<u64> = std::iter::from_fn(|| duplex.pop_output()).collect();
    assert_eq!(drained, (0..10).collect::<Vec<_>>());
}
