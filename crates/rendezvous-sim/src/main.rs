//! Rendezvous Simulator CLI
//!
//! Runs docking approach scenarios and encodes burns into node coordinates.
//!
//! Usage:
//!   rendezvous-sim dock --scenario scenarios/forward_approach.json \
//!                       --output approach_report.json
//!   rendezvous-sim encode --position 7000,0,0 --velocity 0,7.5,0 \
//!                         --delta-v 0,0,12

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use maneuver_planner::{NodeFrame, StateVector};
use nalgebra::Vector3;
use rendezvous_sim::{scenario, simulation};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(
    name = "rendezvous-sim",
    about = "Docking approach simulator and maneuver node encoder"
)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output (per-tick phase and command logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a closed-loop approach scenario
    Dock {
        /// Path to scenario JSON file
        #[arg(short, long)]
        scenario: PathBuf,

        /// Write the run report as JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Express a world-frame delta-v in (radial, normal, prograde) node coordinates
    Encode {
        /// Position relative to the central body, x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        position: Vector3<f64>,

        /// Velocity relative to the central body, x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        velocity: Vector3<f64>,

        /// World-frame delta-v, x,y,z
        #[arg(long, value_parser = parse_vector, allow_hyphen_values = true)]
        delta_v: Vector3<f64>,
    },
}

fn parse_vector(s: &str) -> Result<Vector3<f64>> {
    let parts = s
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vector3::new(*x, *y, *z)),
        _ => Err(anyhow!("expected three comma-separated components, got {s:?}")),
    }
}

fn dock(scenario_path: PathBuf, output: Option<PathBuf>) -> Result<()> {
    let scenario = scenario::load_scenario(&scenario_path)?;
    let report = simulation::run(&scenario)?;

    info!("{}", "=".repeat(60));
    info!("APPROACH SUMMARY");
    info!("{}", "=".repeat(60));
    info!("Scenario:   {}", report.scenario);
    info!("Outcome:    {:?}", report.outcome);
    info!("Ticks:      {} ({:.1} s)", report.ticks, report.elapsed);
    info!("Along axis: {:.3} m", report.final_along_axis);
    info!("Lateral:    {:.3} m", report.final_lateral);

    if let Some(path) = output {
        info!("Writing report to {:?}", path);
        let file = File::create(&path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, &report)?;
    }

    Ok(())
}

fn encode(position: Vector3<f64>, velocity: Vector3<f64>, delta_v: Vector3<f64>) -> Result<()> {
    let frame = NodeFrame::from_state(&StateVector::new(position, velocity))?;
    let node = frame.encode(&delta_v);

    info!(?delta_v, "Encoded world delta-v");
    println!("radial:   {:.6}", node.x);
    println!("normal-:  {:.6}", node.y);
    println!("prograde: {:.6}", node.z);
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides the verbosity flag
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match args.command {
        Command::Dock { scenario, output } => dock(scenario, output),
        Command::Encode {
            position,
            velocity,
            delta_v,
        } => encode(position, velocity, delta_v),
    }
}
