use tracing::trace;

use crate::fork::fork_order;
use crate::log::Event;
use crate::sim::SimContext;

/// Upper bound on a single think pause, so a thinking philosopher stays
/// responsive to termination.
const MAX_THINK_MS: u64 = 200;

/// The per-thread actor loop: wait for the common start line, then cycle
/// eat -> sleep -> think until the stop flag is observed.
pub fn run(ctx: &SimContext, seat: usize) {
    let id = seat as u32 + 1;
    ctx.state.wait_for_start(&ctx.clock);
    // Stagger even ids by one tick so neighbors do not all lunge for the
    // same fork pair at t=0.
    if id % 2 == 0 {
        ctx.state.interruptible_sleep(&ctx.clock, 1);
    }
    while !ctx.state.stopped() {
        eat(ctx, seat, id);
        if ctx.config.philosophers == 1 {
            break;
        }
        if ctx.state.stopped() {
            break;
        }
        ctx.log.status(&ctx.state, &ctx.clock, id, Event::Sleeping);
        ctx.state
            .interruptible_sleep(&ctx.clock, ctx.config.time_to_sleep);
        if ctx.state.stopped() {
            break;
        }
        think(ctx, seat, id);
    }
    trace!(id, "philosopher loop done");
}

fn eat(ctx: &SimContext, seat: usize, id: u32) {
    let (first, second) = fork_order(seat, ctx.config.philosophers);
    let _first = ctx.forks.acquire(first);
    ctx.log.status(&ctx.state, &ctx.clock, id, Event::TookFork);

    if ctx.config.philosophers == 1 {
        // The second fork does not exist; hold the only one until the
        // death threshold passes (or termination interrupts the wait).
        ctx.state
            .interruptible_sleep(&ctx.clock, ctx.config.time_to_die);
        return;
    }

    let _second = ctx.forks.acquire(second);
    ctx.log.status(&ctx.state, &ctx.clock, id, Event::TookFork);

    ctx.state.record_meal_start(seat, ctx.clock.now_ms());
    // Count the meal only if its line went out, so the meal tally always
    // matches the log even when termination lands mid-meal.
    let announced = ctx.log.status(&ctx.state, &ctx.clock, id, Event::Eating);
    ctx.state
        .interruptible_sleep(&ctx.clock, ctx.config.time_to_eat);
    if announced {
        ctx.state.record_meal_done(seat);
    }
    // Guards drop in reverse declaration order: second fork first, then
    // the first, mirroring acquisition.
}

fn think(ctx: &SimContext, seat: usize, id: u32) {
    ctx.log.status(&ctx.state, &ctx.clock, id, Event::Thinking);
    let since_meal = ctx
        .clock
        .now_ms()
        .saturating_sub(ctx.state.meal(seat).last_meal_ms);
    let budget = think_budget(ctx.config.time_to_die, ctx.config.time_to_eat, since_meal);
    if budget > 0 {
        ctx.state.interruptible_sleep(&ctx.clock, budget);
    }
}

/// Half the slack before this philosopher would starve, clamped to
/// [0, MAX_THINK_MS]. Philosophers close to the threshold barely pause and
/// retry eating almost immediately.
fn think_budget(time_to_die: u64, time_to_eat: u64, since_meal_ms: u64) -> u64 {
    let slack = time_to_die as i64 - since_meal_ms as i64 - time_to_eat as i64;
    (slack / 2).clamp(0, MAX_THINK_MS as i64) as u64
}
