use std::thread;

use crossbeam::channel;
use log::debug;

/// Run `f` over every item on at most `max_workers` scoped threads.
///
/// The worker count is clamped to `1..=items.len()` so no thread is spawned
/// without work. Results come back in input order: item `i` fills slot `i`
/// exactly once. The call returns only after every worker has finished.
pub fn fan_out<T, R, F>(items: Vec<T>, max_workers: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let n = items.len();
    if n == 0 {
        return Vec::new();
    }

    let workers = max_workers.clamp(1, n);

    // Both channels hold every item, so neither side ever blocks on send.
    let (work_tx, work_rx) = channel::bounded::<(usize, T)>(n);
    let (result_tx, result_rx) = channel::bounded::<(usize, R)>(n);

    for job in items.into_iter().enumerate() {
        let _ = work_tx.send(job);
    }
    // Workers stop once the queue is drained.
    drop(work_tx);

    debug!("[fan_out] {n} items on {workers} workers");

    thread::scope(|s| {
        for _ in 0..workers {
            let work_rx = work_rx.clone();
            let result_tx = result_tx.clone();
            let f = &f;

            s.spawn(move || {
                for (slot, item) in work_rx.iter() {
                    if result_tx.send((slot, f(item))).is_err() {
                        return;
                    }
                }
            });
        }
    });
    drop(result_tx);

    let mut slots: Vec<Option<R>> = (0..n).map(|_| None).collect();
    for (slot, result) in result_rx.iter() {
        slots[slot] = Some(result);
    }

    slots.into_iter().flatten().collect()
}

#[cfg(test)]
#[path = "pool_tests.rs"]
mod tests;
