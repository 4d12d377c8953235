use super::*;

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    thread::ThreadId,
    time::Duration,
};

use hashbrown::HashSet;

/// Tracks how many calls overlap.
#[derive(Default)]
struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }
}

#[test]
fn empty_input_spawns_nothing() {
    let calls = AtomicUsize::new(0);
    let out: Vec<u32> = fan_out(Vec::<u32>::new(), 4, |x| {
        calls.fetch_add(1, Ordering::SeqCst);
        x
    });

    assert!(out.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn results_keep_input_order() {
    let items: Vec<u64> = (0..50).collect();
    let out = fan_out(items, 8, |x| {
        // Finish out of order on purpose.
        thread::sleep(Duration::from_millis((50 - x) % 7));
        x * 10
    });

    let expected: Vec<u64> = (0..50).map(|x| x * 10).collect();
    assert_eq!(out, expected);
}

#[test]
fn in_flight_never_exceeds_min_of_items_and_limit() {
    let cases: &[(usize, usize)] = &[(10, 3), (3, 10), (1, 4), (8, 8), (5, 0)];

    for &(n, limit) in cases {
        let in_flight = InFlight::default();
        let out = fan_out((0..n).collect::<Vec<_>>(), limit, |x| {
            in_flight.enter();
            thread::sleep(Duration::from_millis(15));
            in_flight.leave();
            x
        });

        let bound = limit.max(1).min(n);
        let peak = in_flight.peak.load(Ordering::SeqCst);
        assert_eq!(out.len(), n);
        assert!(
            peak <= bound,
            "n={n} limit={limit}: peak {peak} exceeds bound {bound}"
        );
    }
}

#[test]
fn worker_threads_are_clamped_to_item_count() {
    let seen = Mutex::new(HashSet::<ThreadId>::new());
    fan_out(vec![1, 2], 16, |x| {
        seen.lock().unwrap().insert(thread::current().id());
        thread::sleep(Duration::from_millis(10));
        x
    });

    assert!(seen.lock().unwrap().len() <= 2);
}

#[test]
fn every_item_is_processed_exactly_once() {
    let calls = AtomicUsize::new(0);
    let out = fan_out((0..200).collect::<Vec<u32>>(), 4, |x| {
        calls.fetch_add(1, Ordering::SeqCst);
        x + 1
    });

    assert_eq!(calls.load(Ordering::SeqCst), 200);
    assert_eq!(out.iter().map(|&x| u64::from(x)).sum::<u64>(), (1..=200).sum());
}
