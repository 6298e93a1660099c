//! Dining philosophers simulation.
//!
//! N philosopher threads contend pairwise for forks, eat, sleep and think,
//! while a monitor thread watches for starvation (no meal within
//! `time_to_die` ms) or global completion (everyone ate `meals` times).
//! Deadlock is prevented purely by the fork acquisition order fixed at
//! setup; termination is cooperative through a shared stop flag.

mod clock;
mod config;
mod fork;
mod log;
mod monitor;
mod philosopher;
mod sim;
mod state;

pub use config::{Config, ConfigError};
pub use log::{Event, EventSink, MemorySink, Record};
pub use sim::{Outcome, SetupError, SimHandle, Simulation};
