use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::config::Config;
use crate::fork::ForkTable;
use crate::log::{EventSink, StatusLog};
use crate::monitor::{self, Verdict};
use crate::philosopher;
use crate::state::SimState;

/// The start line is pushed this many ms into the future per philosopher,
/// giving the coordinator time to spawn every thread before anyone moves.
const START_OFFSET_MS_PER_SEAT: u64 = 20;

/// Everything the threads share, allocated once before the first spawn and
/// dropped only after the last join.
pub(crate) struct SimContext {
    pub(crate) config: Config,
    pub(crate) clock: Clock,
    pub(crate) state: SimState,
    pub(crate) forks: ForkTable,
    pub(crate) log: StatusLog,
}

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("failed to spawn {role} thread")]
    Spawn {
        role: &'static str,
        #[source]
        source: io::Error,
    },
}

/// How a run ended. Death is a normal outcome, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every philosopher reached the required meal count.
    Completed,
    /// A philosopher went `time_to_die` without a meal.
    Starved { id: u32 },
    /// Stopped from outside via [`SimHandle::stop`].
    Interrupted,
}

/// Requests termination from outside the simulation; the same idempotent
/// flag transition the monitor uses.
#[derive(Clone)]
pub struct SimHandle {
    ctx: Arc<SimContext>,
}

impl SimHandle {
    pub fn stop(&self) {
        self.ctx.state.request_stop();
    }

    /// Current meal count per philosopher, in id order. Stable once the
    /// run has returned.
    pub fn meal_counts(&self) -> Vec<u32> {
        self.ctx.state.meal_counts()
    }
}

pub struct Simulation {
    ctx: Arc<SimContext>,
}

impl Simulation {
    pub fn new(config: Config, sink: Box<dyn EventSink>) -> Self {
        let clock = Clock::start();
        let start_at_ms = clock.now_ms() + config.philosophers as u64 * START_OFFSET_MS_PER_SEAT;
        Simulation {
            ctx: Arc::new(SimContext {
                config,
                clock,
                state: SimState::new(config.philosophers, start_at_ms),
                forks: ForkTable::new(config.philosophers),
                log: StatusLog::new(sink),
            }),
        }
    }

    pub fn handle(&self) -> SimHandle {
        SimHandle {
            ctx: Arc::clone(&self.ctx),
        }
    }

    /// Spawns one thread per philosopher plus the monitor, then blocks
    /// until all of them have joined. A spawn failure stops and joins the
    /// threads already running before reporting the error, so no thread is
    /// ever leaked.
    pub fn run(self) -> Result<Outcome, SetupError> {
        let config = self.ctx.config;
        if config.required_meals == Some(0) {
            // Nothing to simulate: the quota is met before anyone eats.
            return Ok(Outcome::Completed);
        }

        let mut workers = Vec::with_capacity(config.philosophers);
        for seat in 0..config.philosophers {
            let ctx = Arc::clone(&self.ctx);
            let spawned = thread::Builder::new()
                .name(format!("philosopher-{}", seat + 1))
                .spawn(move || philosopher::run(&ctx, seat));
            match spawned {
                Ok(handle) => workers.push(handle),
                Err(source) => {
                    warn!(seat, "philosopher spawn failed, aborting startup");
                    self.abort_startup(workers);
                    return Err(SetupError::Spawn {
                        role: "philosopher",
                        source,
                    });
                }
            }
        }
        debug!(count = config.philosophers, "philosopher threads running");

        let monitor = {
            let ctx = Arc::clone(&self.ctx);
            thread::Builder::new()
                .name("monitor".into())
                .spawn(move || monitor::run(&ctx))
        };
        let monitor = match monitor {
            Ok(handle) => handle,
            Err(source) => {
                warn!("monitor spawn failed, aborting startup");
                self.abort_startup(workers);
                return Err(SetupError::Spawn {
                    role: "monitor",
                    source,
                });
            }
        };

        let verdict = monitor.join().unwrap();
        for worker in workers {
            worker.join().unwrap();
        }

        let outcome = match verdict {
            Verdict::Starved { id } => Outcome::Starved { id },
            Verdict::AllFed => Outcome::Completed,
            Verdict::Interrupted => Outcome::Interrupted,
        };
        info!(?outcome, "simulation finished");
        Ok(outcome)
    }

    /// Stops and joins the threads started before a spawn failure.
    fn abort_startup(&self, workers: Vec<JoinHandle<()>>) {
        self.ctx.state.request_stop();
        for worker in workers {
            worker.join().unwrap();
        }
    }
}
