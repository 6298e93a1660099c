use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::sim::SimContext;

/// Pause between monitor scans. Far below any realistic time_to_die, so a
/// meal recorded one interval before a scan can never be misread as
/// starvation.
const POLL: Duration = Duration::from_micros(500);

/// Why the monitor stopped the simulation (or found it already stopped).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// A philosopher exceeded time_to_die since its last meal.
    Starved { id: u32 },
    /// Everyone reached the required meal count.
    AllFed,
    /// The stop flag was set by someone else (spawn failure, embedder).
    Interrupted,
}

/// The observer loop. Scans every philosopher at a fixed interval; the
/// first starved one (lowest id wins a tie) ends the run with a death
/// announcement, a completed meal quota ends it silently.
pub fn run(ctx: &SimContext) -> Verdict {
    ctx.state.wait_for_start(&ctx.clock);
    loop {
        if ctx.state.stopped() {
            return Verdict::Interrupted;
        }
        if let Some(id) = find_starved(ctx) {
            ctx.state.request_stop();
            ctx.log.death(&ctx.state, &ctx.clock, id);
            debug!(id, "starvation detected");
            return Verdict::Starved { id };
        }
        if all_fed(ctx) {
            ctx.state.request_stop();
            debug!("meal quota reached by all philosophers");
            return Verdict::AllFed;
        }
        thread::sleep(POLL);
    }
}

/// Checks seats in ascending id order; the first philosopher past the
/// death threshold is the one reported.
fn find_starved(ctx: &SimContext) -> Option<u32> {
    for seat in 0..ctx.config.philosophers {
        let last_meal = ctx.state.meal(seat).last_meal_ms;
        let since = ctx.clock.now_ms().saturating_sub(last_meal);
        if since > ctx.config.time_to_die {
            return Some(seat as u32 + 1);
        }
    }
    None
}

fn all_fed(ctx: &SimContext) -> bool {
    let Some(required) = ctx.config.required_meals else {
        return false;
    };
    (0..ctx.config.philosophers).all(|seat| ctx.state.meal(seat).count >= required)
}
