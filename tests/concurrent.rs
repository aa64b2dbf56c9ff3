// Multi-threaded stress tests: many threads interning at once must never
// corrupt the table or create duplicate entries.
//
// Each test documents what behavior is being verified and which
// invariants are assumed or asserted. Counts are checked only after all
// threads have been joined, when the relaxed stats counters are exact.

use shard_intern::{global, Handle, InternTable, TableConfig};
use std::collections::HashMap;
use std::sync::Barrier;
use std::thread;

const THREADS: usize = 16;

// Test: 16 threads intern one value 100,000 times each.
// Assumes: creation re-probes under the shard write lock.
// Verifies: one entry, one canonical handle, every request counted.
#[test]
fn racing_interns_of_one_string_create_one_entry() {
    const ITERS: usize = 100_000;
    let table = InternTable::new();
    let barrier = Barrier::new(THREADS);

    let per_thread: Vec<Handle<'_>> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let table = &table;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    let first = table.intern("contended").unwrap();
                    for _ in 1..ITERS {
                        let h = table.intern("contended").unwrap();
                        assert_eq!(h, first);
                    }
                    first
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(table.len(), 1);
    for h in &per_thread {
        assert_eq!(*h, per_thread[0]);
    }
    assert_eq!(per_thread[0].as_bytes(), b"contended");
    assert_eq!(per_thread[0].request_count(), THREADS * ITERS);
    let stats = table.snapshot_stats();
    assert_eq!(stats.unique, 1);
    assert_eq!(stats.requests, (THREADS * ITERS) as u64);
}

// Test: every thread interns the decimal strings 0..n in a staggered
// order, so each value is raced by all threads.
// Assumes: shards lock independently.
// Verifies: all threads agree on every handle; no value is duplicated.
#[test]
fn racing_threads_agree_on_every_value() {
    const N: usize = 20_000;
    let table = InternTable::with_config(TableConfig::default().with_shards(16));
    let barrier = Barrier::new(THREADS);

    let results: Vec<Vec<Handle<'_>>> = thread::scope(|s| {
        let workers: Vec<_> = (0..THREADS)
            .map(|t| {
                let table = &table;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    // Stagger the order so threads collide on different keys.
                    let mut out = vec![None; N];
                    for k in 0..N {
                        let i = (k + t * 997) % N;
                        out[i] = Some(table.intern(&i.to_string()).unwrap());
                    }
                    out.into_iter().map(Option::unwrap).collect::<Vec<_>>()
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(table.len(), N);
    for i in 0..N {
        let canonical = results[0][i];
        assert_eq!(canonical.as_bytes(), i.to_string().as_bytes());
        for r in &results[1..] {
            assert_eq!(r[i], canonical);
        }
    }
    let stats = table.snapshot_stats();
    assert_eq!(stats.unique, N);
    assert_eq!(stats.shard_depths.iter().sum::<usize>(), N);
}

// Test: lookups of seeded values while other threads insert new ones.
// Assumes: lookups take only a read lock and entries never move.
// Verifies: seeded handles stay found and readable throughout.
#[test]
fn readers_and_writers_interleave() {
    let table = InternTable::with_config(TableConfig::default().with_shards(4));
    let seeded: HashMap<String, Handle<'_>> = (0..1_000)
        .map(|i| {
            let s = format!("seed-{}", i);
            let h = table.intern(&s).unwrap();
            (s, h)
        })
        .collect();

    thread::scope(|s| {
        for t in 0..4 {
            let table = &table;
            s.spawn(move || {
                for i in 0..10_000 {
                    table.intern(&format!("w{}-{}", t, i)).unwrap();
                }
            });
        }
        for _ in 0..4 {
            let table = &table;
            let seeded = &seeded;
            s.spawn(move || {
                for _ in 0..5 {
                    for (k, h) in seeded {
                        assert_eq!(table.lookup(k), Some(*h));
                        assert_eq!(h.as_bytes(), k.as_bytes());
                    }
                }
                // A stats snapshot mid-flight is allowed to be stale but not wrong.
                let stats = table.snapshot_stats();
                assert!(stats.unique >= 1_000);
            });
        }
    });

    assert_eq!(table.len(), 1_000 + 4 * 10_000);
}

// Test: eight threads intern one value in the global pool.
// Assumes: the pool is built once by whichever thread arrives first.
// Verifies: every thread gets the same 'static handle.
#[test]
fn global_pool_is_shared_across_threads() {
    let handles: Vec<Handle<'static>> = (0..8)
        .map(|_| thread::spawn(|| global::intern("shared-across-threads").unwrap()))
        .collect::<Vec<_>>()
        .into_iter()
        .map(|j| j.join().unwrap())
        .collect();
    for h in &handles {
        assert_eq!(*h, handles[0]);
    }
    assert_eq!(global::lookup("shared-across-threads"), Some(handles[0]));
}

// Test: all threads insert distinct values into a single shard, repeatedly,
// until some acquisition finds the lock held.
// Assumes: an intern takes at most the read lock and then the write lock.
// Verifies: the contention counter moves and stays within 2 * requests.
#[test]
fn single_shard_contention_is_counted() {
    const PER_THREAD: usize = 5_000;
    let table = InternTable::with_config(TableConfig::default().with_shards(1));
    let barrier = Barrier::new(THREADS);

    let mut round = 0;
    loop {
        thread::scope(|s| {
            for t in 0..THREADS {
                let table = &table;
                let barrier = &barrier;
                s.spawn(move || {
                    barrier.wait();
                    for i in 0..PER_THREAD {
                        table.intern(&format!("{}-{}-{}", round, t, i)).unwrap();
                    }
                });
            }
        });
        round += 1;

        let stats = table.snapshot_stats();
        assert_eq!(stats.unique, round * THREADS * PER_THREAD);
        assert_eq!(stats.requests, (round * THREADS * PER_THREAD) as u64);
        assert!(stats.contended <= 2 * stats.requests);
        if stats.contended > 0 || round == 20 {
            assert!(stats.contended > 0, "no contention after {} rounds", round);
            break;
        }
    }
}
