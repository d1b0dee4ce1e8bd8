//! Maneuver Planner
//!
//! Turns a world-frame velocity change into a maneuver node expressed in
//! the orbit-relative (radial, normal, prograde) frame, on whichever orbit
//! patch is active at the node's execution time.
//!
//! Propagation and delta-v solving stay outside this crate: patches report
//! their own state vectors through [`OrbitalPatch`] and delta-v calculators
//! plug in through [`ManeuverOperation`].

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod frame;
pub mod planner;
pub mod trajectory;

// Re-exports
pub use frame::NodeFrame;
pub use planner::{
    encode_on_patch, place_node, plan, ManeuverNode, ManeuverOperation, ManeuverParameters,
    RawDeltaV,
};
pub use trajectory::{Patch, PatchId, PatchedTrajectory, PlannedNode};

#[derive(Error, Debug)]
pub enum PlannerError {
    #[error("Unknown patch: {0}")]
    UnknownPatch(usize),
    #[error("Patch chain loops back on itself from patch {0}")]
    CyclicPatchChain(usize),
    #[error("Degenerate node frame: {0}")]
    DegenerateFrame(String),
    #[error("Invalid maneuver node: {0}")]
    InvalidNode(String),
    #[error("Maneuver operation failed: {0}")]
    Operation(String),
}

pub type Result<T> = std::result::Result<T, PlannerError>;

/// Position and velocity relative to the patch's central body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
}

impl StateVector {
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        Self {
            position: position.into(),
            velocity: velocity.into(),
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::from(self.position)
    }

    pub fn velocity(&self) -> Vector3<f64> {
        Vector3::from(self.velocity)
    }
}

/// One conic segment of a trajectory, able to report its state at any time
/// inside its validity window
pub trait OrbitalPatch {
    fn state_at(&self, ut: f64) -> StateVector;
}
