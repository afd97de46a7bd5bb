//! Syndicate Simulation Runner
//!
//! Plays the engine without a presentation layer. A simple house policy
//! stands in for the player: it staffs idle buildings, takes the first
//! affordable choice on every event and votes with the council majority.

use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syndicate_core::chronicle::ChronicleWriter;
use syndicate_core::config::EngineConfig;
use syndicate_core::engine::Engine;
use syndicate_core::error::CommandError;
use syndicate_core::output::write_snapshot;
use syndicate_core::scheduler::{lock, AutoAdvance, SharedEngine};
use syndicate_events::Phase;

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "syndicate_sim")]
#[command(about = "A headless street-syndicate management simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of days to play
    #[arg(long, default_value_t = 30)]
    days: u32,

    /// Tuning file (TOML); falls back to ./tuning.toml, then built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append chronicle entries to this JSONL file
    #[arg(long)]
    chronicle: Option<PathBuf>,

    /// Days between snapshots
    #[arg(long, default_value_t = 5)]
    snapshot_interval: u32,

    /// Directory for snapshot files
    #[arg(long, default_value = "output/snapshots")]
    output_dir: PathBuf,

    /// Drive the clock with the real-time timer instead of stepping phases
    #[arg(long)]
    realtime: bool,

    /// Timer speed for real-time mode
    #[arg(long, default_value_t = 4)]
    speed: u8,
}

/// Upper bound on consecutive rejected phase advances before giving up
const MAX_STALLS: u32 = 16;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    println!("Syndicate Simulation");
    println!("====================");
    println!("Seed: {}", args.seed);
    println!("Days: {}", args.days);
    println!("Snapshot interval: {} days", args.snapshot_interval);
    println!("Mode: {}", if args.realtime { "real-time" } else { "stepped" });
    println!();

    let config = match &args.config {
        Some(path) => match EngineConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: could not load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => EngineConfig::load_or_default(),
    };

    let mut engine = Engine::seeded(config, args.seed);
    if let Some(path) = &args.chronicle {
        match ChronicleWriter::new(path) {
            Ok(writer) => {
                engine = engine.with_chronicle_writer(writer);
                println!("Chronicle: {}", path.display());
            }
            Err(e) => {
                eprintln!("Warning: could not open chronicle {}: {}", path.display(), e);
            }
        }
    }

    println!(
        "Starting district: {} officers, {} buildings, {} soldiers, {} rivals",
        engine.officers().len(),
        engine.buildings().len(),
        engine.soldiers().count,
        engine.rivals().len()
    );
    take_snapshot(&mut engine, &args.output_dir);
    println!();

    let last_day = engine.clock().day() + args.days;
    if args.realtime {
        let shared = run_realtime(engine, last_day, args.speed).await;
        finish(&mut lock(&shared), &args.output_dir);
    } else {
        let mut engine = run_stepped(engine, last_day, &args);
        finish(&mut engine, &args.output_dir);
    }
    ExitCode::SUCCESS
}

fn finish(engine: &mut Engine, output_dir: &Path) {
    take_snapshot(engine, output_dir);
    if let Err(e) = engine.flush_chronicle() {
        eprintln!("Warning: could not flush chronicle: {}", e);
    }

    let ledger = engine.ledger();
    println!();
    println!(
        "Simulation complete on {}. Cash {}, reputation {}, heat {}.",
        engine.clock().time,
        ledger.cash,
        ledger.reputation,
        ledger.heat
    );
    println!(
        "{} officers, {} soldiers, {} chronicle entries.",
        engine.officers().len(),
        engine.soldiers().count,
        engine.chronicle().len()
    );
}

fn run_stepped(mut engine: Engine, last_day: u32, args: &Args) -> Engine {
    let mut stalls = 0;
    while engine.clock().day() < last_day {
        attend(&mut engine);
        match engine.advance_phase() {
            Ok(change) => {
                stalls = 0;
                if change.new_day {
                    report_day(&engine);
                    if args.snapshot_interval > 0 && change.to.day % args.snapshot_interval == 0 {
                        take_snapshot(&mut engine, &args.output_dir);
                    }
                }
                if change.council_convened {
                    println!("  Council convened on day {}", change.to.day);
                }
            }
            Err(e) => {
                stalls += 1;
                if stalls >= MAX_STALLS {
                    eprintln!("Warning: clock stuck ({}), stopping early", e);
                    break;
                }
            }
        }
    }
    engine
}

async fn run_realtime(engine: Engine, last_day: u32, speed: u8) -> SharedEngine {
    let shared = Arc::new(Mutex::new(engine));
    let mut timer = AutoAdvance::new(Arc::clone(&shared));
    let applied = timer.set_speed(speed);
    timer.start();
    println!("Timer running at {}x", applied);

    let mut reported_day = lock(&shared).clock().day();
    loop {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let mut engine = lock(&shared);
        attend(&mut engine);
        let day = engine.clock().day();
        if day != reported_day {
            reported_day = day;
            report_day(&engine);
        }
        if day >= last_day {
            break;
        }
    }
    timer.stop();
    shared
}

/// The house policy: clear whatever the clock is waiting on.
fn attend(engine: &mut Engine) {
    if let Some(view) = engine.active_event() {
        let event_id = view.event.event_id;
        let pick = view
            .choices
            .iter()
            .find(|c| c.affordable)
            .map(|c| c.choice_id.clone());
        let resolved = match pick {
            Some(choice_id) => engine.resolve_event(event_id, &choice_id).is_ok(),
            None => false,
        };
        if !resolved {
            let _ = engine.dismiss_event(event_id);
        }
    }

    if engine.council().active {
        let ballots: Vec<(String, bool)> = engine
            .council()
            .motions
            .iter()
            .filter(|m| !m.resolved)
            .map(|m| (m.id.clone(), m.majority()))
            .collect();
        for (motion_id, approve) in ballots {
            if let Err(CommandError::NoCouncilSession) = engine.cast_vote(&motion_id, approve) {
                break;
            }
        }
    }

    if engine.clock().phase() == Phase::Morning && !engine.clock().in_council() {
        staff_buildings(engine);
    }
}

fn staff_buildings(engine: &mut Engine) {
    let day = engine.clock().day();
    let mut idle: Vec<String> = engine
        .officers()
        .into_iter()
        .filter(|o| o.assigned_building.is_none() && !o.wounded && !o.arrested && !o.traitor)
        .map(|o| o.officer_id)
        .collect();
    let open: Vec<String> = engine
        .buildings()
        .into_iter()
        .filter(|b| {
            !b.occupied
                && b.rebel_soldiers.is_none()
                && b.inactive_until_day.map_or(true, |d| d <= day)
        })
        .map(|b| b.building_id)
        .collect();

    for building_id in open {
        let Some(officer_id) = idle.pop() else {
            break;
        };
        if engine.assign_officer(&officer_id, &building_id).is_err() {
            idle.push(officer_id);
        }
    }
}

fn report_day(engine: &Engine) {
    let ledger = engine.ledger();
    let needs = engine.critical_needs();
    println!(
        "[Day {:>3}] cash {:>6}  rep {:>3}  heat {:>3}  officers {}  soldiers {}  needs {}",
        engine.clock().day(),
        ledger.cash,
        ledger.reputation,
        ledger.heat,
        engine.officers().len(),
        engine.soldiers().count,
        needs.len()
    );
}

fn take_snapshot(engine: &mut Engine, dir: &Path) {
    let snapshot = engine.snapshot();
    let path = dir.join(format!("{}.json", snapshot.snapshot_id));
    if let Err(e) = write_snapshot(&path, &snapshot) {
        eprintln!("Warning: could not write snapshot {}: {}", path.display(), e);
        return;
    }
    if let Err(e) = write_snapshot(dir.join("current.json"), &snapshot) {
        eprintln!("Warning: could not write current state: {}", e);
    }
}
