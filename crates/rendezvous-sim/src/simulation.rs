//! Closed-loop approach simulation

use crate::{Result, Scenario};
use chrono::{DateTime, Utc};
use docking_autopilot::{
    AxisDecomposition, DockingAutopilot, DriveOutcome, TargetState, TranslationActuator,
    VehicleState,
};
use nalgebra::{Unit, Vector3};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Reaction-control stand-in: chases the commanded world velocity
#[derive(Debug, Default)]
pub struct PointMassPlant {
    engaged: bool,
    commanded: Option<Vector3<f64>>,
    attitude: Option<Unit<Vector3<f64>>>,
}

impl PointMassPlant {
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn commanded(&self) -> Option<Vector3<f64>> {
        self.commanded
    }

    /// Last requested nose direction
    pub fn attitude(&self) -> Option<Unit<Vector3<f64>>> {
        self.attitude
    }

    /// Advance the vehicle by `dt`.
    ///
    /// Velocity moves toward the command by at most thrust/mass·dt along the
    /// needed direction; a released plant coasts.
    pub fn step(&self, vehicle: &mut VehicleState, dt: f64) {
        if let (true, Some(commanded)) = (self.engaged, self.commanded) {
            let needed = commanded - vehicle.velocity;
            let gap = needed.norm();
            if gap > 0.0 {
                let accel = vehicle.thrust.available_along(&needed) / vehicle.mass;
                let change = (accel * dt).min(gap);
                vehicle.velocity += needed * (change / gap);
            }
        }
        vehicle.position += vehicle.velocity * dt;
    }
}

impl TranslationActuator for PointMassPlant {
    fn engage(&mut self) {
        self.engaged = true;
    }

    fn release(&mut self) {
        self.engaged = false;
        self.commanded = None;
    }

    fn point_along(&mut self, direction: &Unit<Vector3<f64>>) {
        self.attitude = Some(*direction);
    }

    fn set_target_world_velocity(&mut self, velocity: Vector3<f64>) {
        self.commanded = Some(velocity);
    }
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    HandedOff,
    LostTarget,
    TimedOut,
}

/// One commanded tick
#[derive(Debug, Clone, Serialize)]
pub struct Sample {
    pub tick: usize,
    pub time: f64,
    pub phase: String,
    pub along_axis: f64,
    pub lateral: f64,
    pub commanded_velocity: Vector3<f64>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub scenario: String,
    pub outcome: Outcome,
    pub ticks: usize,
    pub elapsed: f64,
    pub final_along_axis: f64,
    pub final_lateral: f64,
    pub samples: Vec<Sample>,
    pub generated_at: DateTime<Utc>,
}

fn decompose(target: &TargetState, vehicle: &VehicleState) -> AxisDecomposition {
    AxisDecomposition::resolve(&target.relative_position(vehicle), &target.docking_axis)
}

/// Engage the autopilot and tick until it lets go or the budget runs out
pub fn run(scenario: &Scenario) -> Result<SimulationReport> {
    let mut autopilot = DockingAutopilot::new(scenario.config)?;
    let mut plant = PointMassPlant::default();
    let mut target = scenario.target;
    let mut vehicle = scenario.vehicle;

    info!(scenario = %scenario.name, "Starting approach");
    autopilot.engage(&mut plant);

    let mut samples = Vec::new();
    let mut outcome = Outcome::TimedOut;
    let mut ticks = 0;

    for tick in 0..scenario.max_ticks {
        ticks = tick + 1;
        let tracked = match scenario.target_lost_at {
            Some(lost_at) if tick >= lost_at => None,
            _ => Some(&target),
        };

        let result = autopilot.drive(tracked, &vehicle, &mut plant);
        if let Some(command) = result.command() {
            let d = decompose(&target, &vehicle);
            samples.push(Sample {
                tick,
                time: tick as f64 * scenario.dt,
                phase: command.phase.to_string(),
                along_axis: d.along_axis,
                lateral: d.lateral_distance(),
                commanded_velocity: command.velocity,
                status: command.status.clone(),
            });
        }

        match result {
            DriveOutcome::HandedOff(_) => {
                outcome = Outcome::HandedOff;
                break;
            }
            DriveOutcome::TargetLost => {
                outcome = Outcome::LostTarget;
                break;
            }
            DriveOutcome::Idle | DriveOutcome::Commanded(_) => {}
        }

        plant.step(&mut vehicle, scenario.dt);
        target.position += target.velocity * scenario.dt;
    }

    if outcome == Outcome::TimedOut {
        warn!(ticks, "Approach did not finish within the tick budget");
        autopilot.disengage(&mut plant);
    }

    let last = decompose(&target, &vehicle);
    debug!(along_axis = last.along_axis, lateral = last.lateral_distance(), "Final geometry");
    info!(?outcome, ticks, "Approach finished");

    Ok(SimulationReport {
        scenario: scenario.name.clone(),
        outcome,
        ticks,
        elapsed: ticks as f64 * scenario.dt,
        final_along_axis: last.along_axis,
        final_lateral: last.lateral_distance(),
        samples,
        generated_at: Utc::now(),
    })
}
