//! Chapas headless demo
//!
//! Runs a full match between two synthetic players on the scheduler thread
//! and prints the final snapshot as JSON. Run with `--help` for options.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use chapas::autoplay::{NearestTarget, ShotStrategy};
use chapas::engine::PhaseView;
use chapas::platform::{Scheduler, SchedulerConfig, TimingPolicy};
use chapas::sim::{Dimensions, SimEvent};
use chapas::{ChapasError, Engine, Snapshot, Tuning};

const SURFACE: Dimensions = Dimensions {
    width: 1600.0,
    height: 900.0,
};

#[derive(Parser, Debug)]
#[command(name = "chapas")]
#[command(about = "Headless chapas match between two synthetic players")]
struct Cli {
    /// Tuning JSON file; built-in defaults when omitted
    tuning: Option<PathBuf>,
    /// Seed for the synthetic players' aim jitter
    #[arg(long, default_value_t = 0x5eed)]
    seed: u64,
    #[arg(long, value_enum, default_value_t = CliTiming::Fixed)]
    timing: CliTiming,
    /// Stop after this many shots even without a winner
    #[arg(long, default_value_t = 60)]
    max_shots: u32,
    /// Print the effective tuning as JSON and exit
    #[arg(long)]
    dump_tuning: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliTiming {
    Fixed,
    Measured,
}

impl From<CliTiming> for TimingPolicy {
    fn from(value: CliTiming) -> Self {
        match value {
            CliTiming::Fixed => TimingPolicy::Fixed,
            CliTiming::Measured => TimingPolicy::Measured,
        }
    }
}

fn log_frame(_: &Snapshot, events: &[SimEvent]) {
    for event in events {
        match event {
            SimEvent::DiscEjected { id, owner, .. } => {
                log::info!("Disc {id} of {owner} knocked off the board");
            }
            SimEvent::Collision { a, b, impulse, .. } => {
                log::debug!("Discs {a} and {b} collided (impulse {impulse:.1})");
            }
            other => log::trace!("{other:?}"),
        }
    }
}

fn main() -> Result<(), ChapasError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = Cli::parse();
    let tuning = match &options.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };

    if options.dump_tuning {
        println!("{}", tuning.to_json_pretty()?);
        return Ok(());
    }

    log::info!("Chapas starting (seed {})", options.seed);
    let mut strategy = NearestTarget::new(options.seed, &tuning.shot);
    let engine = Engine::new(SURFACE, tuning)?.into_shared();
    let config = SchedulerConfig {
        policy: options.timing.into(),
        ..Default::default()
    };
    let scheduler = Scheduler::attach(engine.clone(), SURFACE, config, log_frame)?;

    let mut shots = 0;
    while shots < options.max_shots {
        let snapshot = engine.lock().snapshot();
        match snapshot.phase {
            PhaseView::GameOver => break,
            PhaseView::Resolving => {}
            PhaseView::Idle => {
                let Some(plan) = strategy.plan(&snapshot) else {
                    break;
                };
                match engine.lock().start_shot(plan.hint, plan.drag) {
                    Ok(()) => shots += 1,
                    Err(reason) => log::warn!("Planned shot refused: {reason}"),
                }
            }
        }
        thread::sleep(Duration::from_millis(20));
    }

    scheduler.detach();

    let snapshot = engine.lock().snapshot();
    match snapshot.winner {
        Some(winner) => log::info!("{winner} wins after {shots} shots"),
        None => log::info!("No winner after {shots} shots"),
    }
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize final snapshot: {e}"),
    }
    Ok(())
}
