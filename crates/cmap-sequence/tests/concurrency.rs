//! Multi-threaded coverage of the cyclic counter

use cmap_sequence::{CyclicRangeCounter, FlakeSequenceGenerator, RangeConfig, TimeSource};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Barrier};
use std::thread;

/// Run `threads` x `calls` increments and return every value handed out
fn hammer(counter: Arc<CyclicRangeCounter>, threads: usize, calls: usize) -> Vec<i64> {
    let barrier = Arc::new(Barrier::new(threads));
    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..calls)
                    .map(|_| counter.get_and_increment())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    handles
        .into_iter()
        .flat_map(|h| h.join().expect("worker panicked"))
        .collect()
}

fn histogram(values: &[i64]) -> HashMap<i64, usize> {
    let mut counts = HashMap::new();
    for v in values {
        *counts.entry(*v).or_insert(0) += 1;
    }
    counts
}

#[test]
fn every_value_appears_once_per_cycle() {
    let (min, max) = (0i64, 15i64);
    let range = (max - min + 1) as usize;
    let (threads, calls) = (8, 2_000);
    let cycles = threads * calls / range;
    assert_eq!(threads * calls % range, 0);

    let counter = Arc::new(CyclicRangeCounter::new(min, max).unwrap());
    let values = hammer(Arc::clone(&counter), threads, calls);

    assert_eq!(values.len(), threads * calls);
    let counts = histogram(&values);
    assert_eq!(counts.len(), range);
    for v in min..=max {
        assert_eq!(counts[&v], cycles, "value {} seen {} times", v, counts[&v]);
    }
    // complete cycles only, so the counter is back at the start
    assert_eq!(counter.peek(), min);
}

#[test]
fn partial_cycle_covers_a_prefix() {
    let (min, max) = (10i64, 13i64);
    let (threads, calls) = (3, 1_001);
    let counter = Arc::new(CyclicRangeCounter::new(min, max).unwrap());
    let values = hammer(Arc::clone(&counter), threads, calls);

    let range = 4usize;
    let total = threads * calls;
    let (full, rest) = (total / range, total % range);
    let counts = histogram(&values);

    // the trailing partial window holds min, min+1, ... exactly once each
    for (i, v) in (min..=max).enumerate() {
        let expected = full + usize::from(i < rest);
        assert_eq!(counts[&v], expected, "value {}", v);
    }
    assert!(values.iter().all(|v| (min..=max).contains(v)));
}

#[test]
fn each_thread_sees_increasing_values_between_wraps() {
    let counter = Arc::new(CyclicRangeCounter::new(0, i64::MAX).unwrap());
    let barrier = Arc::new(Barrier::new(4));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let counter = Arc::clone(&counter);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                (0..5_000)
                    .map(|_| counter.get_and_increment())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut all = HashSet::new();
    for h in handles {
        let seen = h.join().expect("worker panicked");
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        for v in seen {
            assert!(all.insert(v), "value {} handed out twice", v);
        }
    }
    assert_eq!(all.len(), 20_000);
}

struct FrozenClock;

impl TimeSource for FrozenClock {
    fn now_millis(&self) -> u64 {
        1
    }
}

#[test]
fn stamps_are_unique_across_threads() {
    let generator = Arc::new(
        FlakeSequenceGenerator::with_clock(5, RangeConfig::new(0, 9_999), FrozenClock).unwrap(),
    );

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let generator = Arc::clone(&generator);
            thread::spawn(move || (0..2_500).map(|_| generator.next_sequence()).collect::<Vec<_>>())
        })
        .collect();

    let mut stamps = HashSet::new();
    for h in handles {
        for s in h.join().expect("worker panicked") {
            assert!(stamps.insert(s));
        }
    }
    assert_eq!(stamps.len(), 10_000);
}
