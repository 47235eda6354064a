use anyhow::Result;
use clap::Parser;
use log::info;
use std::collections::BTreeMap;
use std::time::Instant;

use mobil_lane_change::{
    config::ScenarioConfig,
    simulation::{LaneChangeAdvisor, TrafficManager},
};

#[derive(Parser)]
#[command(name = "mobil-lane-change")]
#[command(about = "Evaluates MOBIL lane-change proposals on a populated road")]
struct Args {
    /// Road configuration file
    #[arg(short, long, default_value = "road.toml")]
    road: String,

    /// Vehicles configuration file
    #[arg(short = 'c', long, default_value = "vehicles.toml")]
    vehicles: String,

    /// Random seed for reproducible populations
    #[arg(short, long)]
    seed: Option<u64>,

    /// Log every evaluation, including blocked ones
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info })
        .init();
    info!("Starting MOBIL lane-change evaluation");

    // Load configuration
    let config = ScenarioConfig::load_from_files(&args.road, &args.vehicles)?;
    info!("Loaded configuration: road '{}' with {} lanes, {} vehicle types",
          config.road.road.name,
          config.road.road.lanes.len(),
          config.vehicles.vehicle_types.len());

    // Use seed from args or config
    let seed = args.seed.or(config.vehicles.random.seed);
    if let Some(seed) = seed {
        info!("Random Seed: {}", seed);
    }
    let mut traffic_manager = TrafficManager::new(config, seed);
    let road = traffic_manager.populate()?;

    let advisor = LaneChangeAdvisor::new();
    let start_time = Instant::now();
    let proposals = advisor.propose_all(&road);
    let elapsed = start_time.elapsed();

    for proposal in &proposals {
        info!("Vehicle {} -> {} (balance {:.3} m/s²)",
              proposal.vehicle.0,
              proposal.direction,
              proposal.balance);
    }

    // Tally why the remaining candidate moves were refused
    let mut blocked: BTreeMap<String, usize> = BTreeMap::new();
    for vehicle in road.vehicles() {
        for (_, evaluation) in advisor.evaluate_directions(vehicle, &road) {
            if let Some(reason) = evaluation.block_reason() {
                *blocked.entry(reason.to_string()).or_insert(0) += 1;
            }
        }
    }
    for (reason, count) in &blocked {
        info!("Blocked ({}): {}", reason, count);
    }

    info!("Evaluated {} vehicles in {:.2}ms, {} lane changes proposed",
          road.vehicle_count(),
          elapsed.as_secs_f64() * 1000.0,
          proposals.len());

    Ok(())
}
