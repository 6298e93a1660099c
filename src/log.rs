use std::fmt;
use std::sync::{Arc, Mutex};

use crate::clock::Clock;
use crate::state::SimState;

/// The five observable things a philosopher can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    TookFork,
    Eating,
    Sleeping,
    Thinking,
    Died,
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Event::TookFork => "has taken a fork",
            Event::Eating => "is eating",
            Event::Sleeping => "is sleeping",
            Event::Thinking => "is thinking",
            Event::Died => "died",
        };
        f.write_str(text)
    }
}

/// One status line: elapsed ms since the start line, 1-based philosopher
/// id, event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub elapsed_ms: u64,
    pub id: u32,
    pub event: Event,
}

/// Where status lines go. Called with the log lock held, so records arrive
/// whole and in order.
pub trait EventSink: Send {
    fn emit(&mut self, record: &Record);
}

/// Sink that collects records in memory; clones share the same buffer so a
/// caller can keep one half and hand the other to the simulation.
#[derive(Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<Record>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<Record> {
        self.records.lock().unwrap().clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, record: &Record) {
        self.records.lock().unwrap().push(*record);
    }
}

/// Serialized status log. A single mutex keeps concurrent lines from
/// interleaving, and the stop flag is re-checked under that mutex so no
/// status line can race past a death announcement.
pub struct StatusLog {
    sink: Mutex<Box<dyn EventSink>>,
}

impl StatusLog {
    pub fn new(sink: Box<dyn EventSink>) -> Self {
        StatusLog {
            sink: Mutex::new(sink),
        }
    }

    /// Emits a status line unless the simulation has stopped. Returns
    /// whether the line was actually written.
    pub fn status(&self, state: &SimState, clock: &Clock, id: u32, event: Event) -> bool {
        let mut sink = self.sink.lock().unwrap();
        if state.stopped() {
            return false;
        }
        sink.emit(&stamp(state, clock, id, event));
        true
    }

    /// Announces a death. The stop flag is already set by the caller, so
    /// this bypasses the suppression check; it is the final line.
    pub fn death(&self, state: &SimState, clock: &Clock, id: u32) {
        let mut sink = self.sink.lock().unwrap();
        sink.emit(&stamp(state, clock, id, Event::Died));
    }
}

fn stamp(state: &SimState, clock: &Clock, id: u32, event: Event) -> Record {
    Record {
        elapsed_ms: clock.now_ms().saturating_sub(state.start_at_ms()),
        id,
        event,
    }
}
