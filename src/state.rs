use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use crate::clock::Clock;

/// How often interruptible sleeps re-check the stop flag.
const SLEEP_POLL: Duration = Duration::from_micros(100);
/// How often threads waiting for the common start line re-check the clock.
const START_POLL: Duration = Duration::from_micros(50);

/// A philosopher's meal record. Written only by that philosopher's own
/// thread, read by the monitor, always through the owning mutex.
#[derive(Debug, Clone, Copy)]
pub struct Meal {
    pub last_meal_ms: u64,
    pub count: u32,
}

/// State shared by every thread in the simulation: the stop flag, the
/// synchronized start line and one meal record per philosopher.
pub struct SimState {
    stopped: AtomicBool,
    start_at_ms: u64,
    meals: Box<[Mutex<Meal>]>,
}

impl SimState {
    /// Meal timestamps start at the start line itself, so nobody is
    /// starving before the simulation begins.
    pub fn new(count: usize, start_at_ms: u64) -> Self {
        let meals = (0..count)
            .map(|_| {
                Mutex::new(Meal {
                    last_meal_ms: start_at_ms,
                    count: 0,
                })
            })
            .collect();
        SimState {
            stopped: AtomicBool::new(false),
            start_at_ms,
            meals,
        }
    }

    pub fn start_at_ms(&self) -> u64 {
        self.start_at_ms
    }

    pub fn stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Idempotent: only ever transitions false -> true.
    pub fn request_stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn record_meal_start(&self, seat: usize, now_ms: u64) {
        self.meals[seat].lock().unwrap().last_meal_ms = now_ms;
    }

    pub fn record_meal_done(&self, seat: usize) {
        self.meals[seat].lock().unwrap().count += 1;
    }

    pub fn meal(&self, seat: usize) -> Meal {
        *self.meals[seat].lock().unwrap()
    }

    pub fn meal_counts(&self) -> Vec<u32> {
        self.meals.iter().map(|m| m.lock().unwrap().count).collect()
    }

    /// Sleeps for `duration_ms`, returning early the moment the stop flag
    /// is set. Every timed wait in the simulation goes through here so no
    /// thread can oversleep termination by more than one poll interval.
    pub fn interruptible_sleep(&self, clock: &Clock, duration_ms: u64) {
        let deadline = clock.now_ms() + duration_ms;
        while !self.stopped() && clock.now_ms() < deadline {
            thread::sleep(SLEEP_POLL);
        }
    }

    /// Blocks until the common start line, so all threads observe the same
    /// time origin and no fork is touched before setup finished.
    pub fn wait_for_start(&self, clock: &Clock) {
        while !self.stopped() && clock.now_ms() < self.start_at_ms {
            thread::sleep(START_POLL);
        }
    }
}
