use std::time::Instant;

/// Monotonic millisecond clock anchored at construction.
///
/// Every timestamp in the simulation (last-meal times, the start line,
/// log timestamps) is a `u64` millisecond offset from this anchor, so
/// subtractions between them are always meaningful.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    origin: Instant,
}

impl Clock {
    pub fn start() -> Self {
        Clock {
            origin: Instant::now(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
