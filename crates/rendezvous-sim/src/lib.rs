//! Rendezvous Simulator
//!
//! Closes the loop around the docking autopilot with a point-mass plant:
//! the target drifts at constant velocity, the vehicle's reaction-control
//! system chases whatever world velocity the autopilot commands, limited by
//! thrust over mass.
//!
//! Scenarios are JSON files; runs produce a serializable report with one
//! sample per control tick.

use thiserror::Error;

pub mod scenario;
pub mod simulation;

pub use scenario::Scenario;
pub use simulation::{run, Outcome, PointMassPlant, Sample, SimulationReport};

/// Default control step in seconds
pub const DEFAULT_DT: f64 = 0.1;

/// Default tick budget for one run
pub const DEFAULT_MAX_TICKS: usize = 50_000;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid scenario: {0}")]
    Scenario(String),
    #[error(transparent)]
    Docking(#[from] docking_autopilot::DockingError),
    #[error(transparent)]
    Planner(#[from] maneuver_planner::PlannerError),
}

pub type Result<T> = std::result::Result<T, SimError>;
