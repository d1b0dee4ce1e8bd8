//! Docking Autopilot
//!
//! Closed-loop final approach controller for rendezvous and docking with a
//! target port. Each control tick the autopilot:
//! - resolves the docking axis and splits the vehicle's offset from the
//!   target into along-axis and lateral parts
//! - derives approach speed limits from available translation thrust
//! - picks an approach phase from that geometry alone
//! - commands a world-frame velocity to the translation actuator
//!
//! Phase is never stored as state. The only carried state is the lateral
//! PID history and whether the autopilot is engaged.

use nalgebra::{Unit, Vector3};
use thiserror::Error;

pub mod approach;
pub mod autopilot;
pub mod config;
pub mod geometry;
pub mod pid;

// Re-exports
pub use approach::{ApproachCommand, Phase};
pub use autopilot::{DockingAutopilot, DriveOutcome};
pub use config::ApproachConfig;
pub use geometry::{ApproachGeometry, AxisDecomposition, SpeedLimits};
pub use pid::{PidController, PidGains};

#[derive(Error, Debug)]
pub enum DockingError {
    #[error("Invalid approach config: {0}")]
    InvalidConfig(String),
    #[error("Invalid vehicle state: {0}")]
    InvalidVehicle(String),
    #[error("Invalid target state: {0}")]
    InvalidTarget(String),
}

pub type Result<T> = std::result::Result<T, DockingError>;

/// Translation thrust available along each of the six body directions.
/// Body axes are taken as aligned with the world frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThrustEnvelope {
    /// Thrust pushing toward +x, +y, +z
    pub positive: Vector3<f64>,
    /// Thrust pushing toward -x, -y, -z
    pub negative: Vector3<f64>,
}

impl ThrustEnvelope {
    pub fn new(positive: Vector3<f64>, negative: Vector3<f64>) -> Self {
        Self { positive, negative }
    }

    /// Same thrust in every direction
    pub fn uniform(thrust: f64) -> Self {
        Self {
            positive: Vector3::repeat(thrust),
            negative: Vector3::repeat(thrust),
        }
    }

    /// Thrust available for a push along `direction`.
    ///
    /// Each signed axis contributes its thrust scaled by how much the
    /// direction points along it; contributions add in quadrature.
    pub fn available_along(&self, direction: &Vector3<f64>) -> f64 {
        let Some(direction) = Unit::try_new(*direction, 0.0) else {
            return 0.0;
        };

        let mut sum_sq = 0.0;
        for i in 0..3 {
            let component = direction[i];
            let thrust = if component > 0.0 {
                self.positive[i]
            } else {
                self.negative[i]
            };
            sum_sq += (component * thrust).powi(2);
        }
        sum_sq.sqrt()
    }
}

/// Vehicle state sampled from the simulation at the start of a tick
#[derive(Debug, Clone, Copy)]
pub struct VehicleState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    pub mass: f64,
    pub thrust: ThrustEnvelope,
}

impl VehicleState {
    pub fn validate(&self) -> Result<()> {
        if !(self.mass.is_finite() && self.mass > 0.0) {
            return Err(DockingError::InvalidVehicle(format!(
                "mass must be positive, got {}",
                self.mass
            )));
        }
        let thrust_ok = self
            .thrust
            .positive
            .iter()
            .chain(self.thrust.negative.iter())
            .all(|t| t.is_finite() && *t >= 0.0);
        if !thrust_ok {
            return Err(DockingError::InvalidVehicle(
                "thrust must be finite and non-negative".to_string(),
            ));
        }
        if !(self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite()))
        {
            return Err(DockingError::InvalidVehicle(
                "position and velocity must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

/// Target port state supplied by the target tracker
#[derive(Debug, Clone, Copy)]
pub struct TargetState {
    pub position: Vector3<f64>,
    pub velocity: Vector3<f64>,
    /// Approach direction into the port
    pub docking_axis: Unit<Vector3<f64>>,
}

impl TargetState {
    /// Build a target, normalizing the docking axis
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>, axis: Vector3<f64>) -> Result<Self> {
        if !axis.iter().all(|c| c.is_finite()) {
            return Err(DockingError::InvalidTarget(format!(
                "docking axis must be finite, got {axis:?}"
            )));
        }
        let docking_axis = Unit::try_new(axis, f64::EPSILON).ok_or_else(|| {
            DockingError::InvalidTarget("docking axis has zero length".to_string())
        })?;

        Ok(Self {
            position,
            velocity,
            docking_axis,
        })
    }

    /// Vehicle position relative to the target
    pub fn relative_position(&self, vehicle: &VehicleState) -> Vector3<f64> {
        vehicle.position - self.position
    }
}

/// Reaction-control translation layer that executes the autopilot's commands
pub trait TranslationActuator {
    /// Take over translation and attitude control
    fn engage(&mut self);

    /// Hand translation and attitude control back
    fn release(&mut self);

    /// Hold the vehicle's nose along `direction`
    fn point_along(&mut self, direction: &Unit<Vector3<f64>>);

    /// Drive the vehicle toward this world-frame velocity
    fn set_target_world_velocity(&mut self, velocity: Vector3<f64>);
}
