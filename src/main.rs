use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

use philo::{Config, Event, EventSink, Record, Simulation};

/// Dining philosophers simulation.
///
/// Runs until a philosopher starves, or until everyone has eaten MEALS
/// times when that bound is given. All durations are milliseconds.
#[derive(Parser)]
#[command(name = "philo", version)]
struct Cli {
    /// Number of philosophers (and forks) at the table
    #[arg(value_name = "PHILOSOPHERS", allow_negative_numbers = true)]
    philosophers: i64,
    /// Time without a meal after which a philosopher dies
    #[arg(value_name = "TIME_TO_DIE", allow_negative_numbers = true)]
    time_to_die: i64,
    /// Time a meal takes
    #[arg(value_name = "TIME_TO_EAT", allow_negative_numbers = true)]
    time_to_eat: i64,
    /// Time spent sleeping after a meal
    #[arg(value_name = "TIME_TO_SLEEP", allow_negative_numbers = true)]
    time_to_sleep: i64,
    /// Stop once every philosopher has eaten this many times
    #[arg(value_name = "MEALS", allow_negative_numbers = true)]
    meals: Option<i64>,
}

/// Writes event lines to stdout, one color per event kind. Diagnostics go
/// to stderr via tracing, so the event log stays clean.
struct ConsoleSink;

impl EventSink for ConsoleSink {
    fn emit(&mut self, record: &Record) {
        let line = format!("{} {} {}", record.elapsed_ms, record.id, record.event);
        let styled = match record.event {
            Event::TookFork => style(line).green(),
            Event::Eating => style(line).magenta(),
            Event::Sleeping => style(line).yellow(),
            Event::Thinking => style(line).blue(),
            Event::Died => style(line).red(),
        };
        println!("{styled}");
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::new(
        cli.philosophers,
        cli.time_to_die,
        cli.time_to_eat,
        cli.time_to_sleep,
        cli.meals,
    )?;

    // A death is a normal end of the simulation, not a failure; only
    // setup errors exit non-zero.
    Simulation::new(config, Box::new(ConsoleSink)).run()?;
    Ok(())
}
