//! Node Frame
//!
//! Orbit-relative basis used by maneuver nodes. Node coordinates are
//! `(radial+, normal-, prograde)`: the normal component is stored negated.

use crate::{OrbitalPatch, PlannerError, Result, StateVector};
use nalgebra::{Unit, Vector3};

/// Relative size below which a direction is treated as undefined
const DEGENERATE_TOLERANCE: f64 = 1e-12;

/// Orthonormal (radial, normal, prograde) basis at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeFrame {
    radial: Unit<Vector3<f64>>,
    normal: Unit<Vector3<f64>>,
    prograde: Unit<Vector3<f64>>,
}

impl NodeFrame {
    /// Build from already orthonormal axes
    pub fn from_axes(
        radial: Unit<Vector3<f64>>,
        normal: Unit<Vector3<f64>>,
        prograde: Unit<Vector3<f64>>,
    ) -> Self {
        Self {
            radial,
            normal,
            prograde,
        }
    }

    /// Derive the basis from a state vector.
    ///
    /// Prograde follows velocity, radial is the part of position orthogonal
    /// to prograde, normal completes the right-handed set (along r × v).
    pub fn from_state(state: &StateVector) -> Result<Self> {
        let position = state.position();
        let velocity = state.velocity();

        let prograde = Unit::try_new(velocity, DEGENERATE_TOLERANCE).ok_or_else(|| {
            PlannerError::DegenerateFrame(format!("velocity {velocity:?} has no direction"))
        })?;

        let radial_part = position - prograde.into_inner() * position.dot(&prograde.into_inner());
        let radial = Unit::try_new(radial_part, DEGENERATE_TOLERANCE * position.norm().max(1.0))
            .ok_or_else(|| {
                PlannerError::DegenerateFrame("position is parallel to velocity".to_string())
            })?;

        let normal = Unit::new_normalize(radial.cross(&prograde.into_inner()));

        Ok(Self {
            radial,
            normal,
            prograde,
        })
    }

    /// Frame of `patch` at `ut`
    pub fn at<O: OrbitalPatch + ?Sized>(patch: &O, ut: f64) -> Result<Self> {
        Self::from_state(&patch.state_at(ut))
    }

    pub fn radial(&self) -> Unit<Vector3<f64>> {
        self.radial
    }

    pub fn normal(&self) -> Unit<Vector3<f64>> {
        self.normal
    }

    pub fn prograde(&self) -> Unit<Vector3<f64>> {
        self.prograde
    }

    /// World-frame delta-v to node coordinates
    pub fn encode(&self, world_delta_v: &Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            self.radial.dot(world_delta_v),
            -self.normal.dot(world_delta_v),
            self.prograde.dot(world_delta_v),
        )
    }

    /// Node coordinates back to a world-frame delta-v
    pub fn decode(&self, node_delta_v: &Vector3<f64>) -> Vector3<f64> {
        self.radial.into_inner() * node_delta_v.x - self.normal.into_inner() * node_delta_v.y
            + self.prograde.into_inner() * node_delta_v.z
    }
}
