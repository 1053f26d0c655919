use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use smart_intersection::sim::{CsvLog, SimConfig, SimEngine};

#[derive(Parser)]
#[command(name = "smart_intersection")]
#[command(about = "Signalized intersection simulation with a rule-priority agent")]
struct Cli {
    /// Number of simulation ticks to run
    #[arg(long, default_value = "1000")]
    ticks: u32,

    /// Time delta per tick in seconds
    #[arg(long, default_value = "0.1")]
    delta: f64,

    /// Seed for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Write a row-per-tick CSV log to this path
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Inject one emergency vehicle at the given tick
    #[arg(long)]
    emergency_at: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    run_headless(&cli)
}

/// Run the simulation in headless mode (no transport layer)
fn run_headless(cli: &Cli) -> Result<()> {
    println!("Running intersection simulation in headless mode...");
    println!("Ticks: {}, Delta: {}s", cli.ticks, cli.delta);

    let config = SimConfig::default();
    let mut engine = match cli.seed {
        Some(seed) => SimEngine::with_seed(config, seed)?,
        None => SimEngine::new(config)?,
    };

    let mut csv_log = match &cli.csv {
        Some(path) => Some(CsvLog::create(path)?),
        None => None,
    };

    engine.start()?;

    // Report once per simulated second's worth of ticks.
    let ticks_per_second = (1.0 / cli.delta).ceil().max(1.0) as u32;
    let mut tick = 0;
    while tick < cli.ticks {
        let ticks_to_run = ticks_per_second.min(cli.ticks - tick);

        for _ in 0..ticks_to_run {
            tick += 1;

            if cli.emergency_at == Some(tick) {
                let (id, direction) = engine.spawn_emergency_vehicle();
                println!("Injected emergency vehicle {} heading {}", id.0, direction);
            }

            engine.step(cli.delta)?;

            if let Some(csv_log) = csv_log.as_mut() {
                if let Some(snapshot) = engine.latest_snapshot() {
                    let reason = engine
                        .last_decision()
                        .map(|decision| decision.reason.clone())
                        .unwrap_or_default();
                    csv_log.append(snapshot, &reason)?;
                }
            }
        }

        println!(
            "--- After tick {} ({:.1}s simulated time) ---",
            tick, engine.sim_time()
        );
        print_status(&engine);
        println!();
    }

    engine.stop()?;

    println!("=== Final State ===");
    print_status(&engine);
    print_summary(&engine);

    if let Some(csv_log) = csv_log.as_mut() {
        csv_log.flush()?;
    }

    Ok(())
}

fn print_status(engine: &SimEngine) {
    let state = engine.state();
    println!(
        "Status: {} | Active vehicles: {} | Lights: NS {} / EW {} ({:.1}s remaining)",
        state.status,
        state.vehicles.len(),
        state.lights.north_south,
        state.lights.east_west,
        state.lights.time_remaining,
    );
    if state.lights.emergency_mode {
        println!("EMERGENCY OVERRIDE ACTIVE");
    }
    println!("Agent: {}", engine.current_decision_summary());
}

fn print_summary(engine: &SimEngine) {
    let summary = match engine.summary() {
        Ok(summary) => summary,
        Err(_) => {
            println!("No ticks recorded.");
            return;
        }
    };

    println!("=== Run Summary ===");
    println!("Simulated time: {:.1}s", summary.total_sim_time);
    println!(
        "Vehicles: {} spawned, {} crossed ({:.1}/min)",
        summary.total_vehicles_spawned, summary.total_crossed, summary.throughput_per_minute
    );
    println!(
        "Mean wait: {:.1}s (peak {:.1}s)",
        summary.average_wait, summary.peak_wait
    );
    println!(
        "Average queues: N {:.1} / S {:.1} / E {:.1} / W {:.1} (peak {})",
        summary.average_queues.north,
        summary.average_queues.south,
        summary.average_queues.east,
        summary.average_queues.west,
        summary.peak_queue
    );
    println!("Emergency override ticks: {}", summary.emergency_ticks);

    if let Ok(stats) = engine.vehicle_stats() {
        println!(
            "By kind: {} cars, {} buses, {} trucks, {} emergency",
            stats.by_kind.cars, stats.by_kind.buses, stats.by_kind.trucks, stats.by_kind.emergencies
        );
    }
}
