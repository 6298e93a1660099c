use std::sync::{Mutex, MutexGuard};

/// One exclusive-lock fork per philosopher, allocated once at setup and
/// only dropped after every thread has joined.
pub struct ForkTable {
    forks: Box<[Mutex<()>]>,
}

impl ForkTable {
    pub fn new(count: usize) -> Self {
        let forks = (0..count).map(|_| Mutex::new(())).collect();
        ForkTable { forks }
    }

    /// Blocks until fork `index` is exclusively held. Intentionally has no
    /// try/timeout variant: waiting on a neighbor is normal behavior, and
    /// holders always release promptly.
    pub fn acquire(&self, index: usize) -> MutexGuard<'_, ()> {
        self.forks[index].lock().unwrap()
    }
}

/// Acquisition order for the philosopher at `seat` (0-based).
///
/// Even seats take their own fork first, odd seats take the neighbor's
/// first. This asymmetry is the entire deadlock-avoidance mechanism: it
/// breaks the circular wait a uniform own-then-neighbor assignment would
/// allow. With a single philosopher both slots alias fork 0.
pub fn fork_order(seat: usize, count: usize) -> (usize, usize) {
    let own = seat;
    let neighbor = (seat + 1) % count;
    if seat % 2 == 0 {
        (own, neighbor)
    } else {
        (neighbor, own)
    }
}
