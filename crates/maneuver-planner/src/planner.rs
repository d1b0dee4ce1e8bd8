//! Node Placement
//!
//! Encodes world-frame velocity changes onto the patch in effect at the
//! execution time, and runs pluggable delta-v calculators through the same
//! path.

use crate::frame::NodeFrame;
use crate::trajectory::PatchedTrajectory;
use crate::{OrbitalPatch, PlannerError, Result};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A node ready to hand to the planner: execution time and node-frame delta-v
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManeuverNode {
    pub ut: f64,
    /// `(radial+, normal-, prograde)`
    pub delta_v: Vector3<f64>,
    /// Caveat from the operation that produced the node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// What an operation asks for, still in world coordinates
#[derive(Debug, Clone, PartialEq)]
pub struct ManeuverParameters {
    pub delta_v: Vector3<f64>,
    pub ut: f64,
    /// Non-fatal caveat; the node is still placed
    pub warning: Option<String>,
}

impl ManeuverParameters {
    pub fn new(delta_v: Vector3<f64>, ut: f64) -> Self {
        Self {
            delta_v,
            ut,
            warning: None,
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }
}

/// External delta-v calculator (circularize, match planes, transfer ...)
pub trait ManeuverOperation {
    fn name(&self) -> &str;

    /// Compute the burn for `patch`, starting from the requested `ut`.
    /// Implementations may move the execution time.
    fn make_node(&self, patch: &dyn OrbitalPatch, ut: f64) -> Result<ManeuverParameters>;
}

/// Fixed world-frame delta-v at the requested time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDeltaV {
    pub delta_v: Vector3<f64>,
}

impl RawDeltaV {
    pub fn new(delta_v: Vector3<f64>) -> Self {
        Self { delta_v }
    }
}

impl ManeuverOperation for RawDeltaV {
    fn name(&self) -> &str {
        "raw delta-v"
    }

    fn make_node(&self, _patch: &dyn OrbitalPatch, ut: f64) -> Result<ManeuverParameters> {
        Ok(ManeuverParameters::new(self.delta_v, ut))
    }
}

fn check_finite(world_delta_v: &Vector3<f64>, ut: f64) -> Result<()> {
    if !ut.is_finite() {
        return Err(PlannerError::InvalidNode(format!(
            "execution time must be finite, got {ut}"
        )));
    }
    if !world_delta_v.iter().all(|c| c.is_finite()) {
        return Err(PlannerError::InvalidNode(format!(
            "delta-v must be finite, got {world_delta_v:?}"
        )));
    }
    Ok(())
}

/// Express `world_delta_v` in the node frame of `patch` at `ut`
pub fn encode_on_patch<O: OrbitalPatch + ?Sized>(
    patch: &O,
    world_delta_v: &Vector3<f64>,
    ut: f64,
) -> Result<Vector3<f64>> {
    check_finite(world_delta_v, ut)?;

    let frame = NodeFrame::at(patch, ut).inspect_err(|e| {
        warn!(ut, error = %e, "Cannot build node frame");
    })?;
    Ok(frame.encode(world_delta_v))
}

/// Node for a world-frame burn at `ut`, on whichever patch is in effect then
pub fn place_node<O: OrbitalPatch>(
    trajectory: &PatchedTrajectory<O>,
    world_delta_v: &Vector3<f64>,
    ut: f64,
) -> Result<ManeuverNode> {
    check_finite(world_delta_v, ut)?;

    let id = trajectory.patch_at(ut)?;
    let patch = trajectory.patch(id)?;
    let delta_v = encode_on_patch(&patch.orbit, world_delta_v, ut)?;

    debug!(ut, patch = id.index(), ?delta_v, "Placed maneuver node");
    Ok(ManeuverNode {
        ut,
        delta_v,
        warning: None,
    })
}

/// Run `operation` against the patch in effect at `ut`.
///
/// The delta-v is encoded on that same patch at the time the operation
/// returns, which may differ from `ut`.
pub fn plan<O: OrbitalPatch>(
    operation: &dyn ManeuverOperation,
    trajectory: &PatchedTrajectory<O>,
    ut: f64,
) -> Result<ManeuverNode> {
    if !ut.is_finite() {
        return Err(PlannerError::InvalidNode(format!(
            "execution time must be finite, got {ut}"
        )));
    }

    let id = trajectory.patch_at(ut)?;
    let patch = trajectory.patch(id)?;
    let params = operation.make_node(&patch.orbit, ut)?;
    let delta_v = encode_on_patch(&patch.orbit, &params.delta_v, params.ut)?;

    if let Some(warning) = &params.warning {
        warn!(operation = operation.name(), %warning, "Maneuver planned with caveat");
    }
    debug!(
        operation = operation.name(),
        requested_ut = ut,
        ut = params.ut,
        patch = id.index(),
        "Planned maneuver"
    );
    Ok(ManeuverNode {
        ut: params.ut,
        delta_v,
        warning: params.warning,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trajectory::PlannedNode;
    use crate::StateVector;

    /// Circular orbit in the xy plane, counterclockwise from +x at t=0
    #[derive(Debug, Clone, Copy)]
    struct CircularOrbit {
        radius: f64,
        speed: f64,
    }

    impl OrbitalPatch for CircularOrbit {
        fn state_at(&self, ut: f64) -> StateVector {
            let angle = self.speed / self.radius * ut;
            let (sin, cos) = angle.sin_cos();
            StateVector::new(
                Vector3::new(cos, sin, 0.0) * self.radius,
                Vector3::new(-sin, cos, 0.0) * self.speed,
            )
        }
    }

    /// Burns prograde `delay` seconds after the requested time
    struct DelayedPrograde {
        delay: f64,
        magnitude: f64,
    }

    impl ManeuverOperation for DelayedPrograde {
        fn name(&self) -> &str {
            "delayed prograde"
        }

        fn make_node(&self, patch: &dyn OrbitalPatch, ut: f64) -> Result<ManeuverParameters> {
            let burn_ut = ut + self.delay;
            let velocity = patch.state_at(burn_ut).velocity();
            Ok(ManeuverParameters::new(
                velocity.normalize() * self.magnitude,
                burn_ut,
            ))
        }
    }

    /// Plans a normal burn but flags a shallow target inclination
    struct ShallowPlaneChange;

    impl ManeuverOperation for ShallowPlaneChange {
        fn name(&self) -> &str {
            "shallow plane change"
        }

        fn make_node(&self, _patch: &dyn OrbitalPatch, ut: f64) -> Result<ManeuverParameters> {
            Ok(ManeuverParameters::new(Vector3::new(0.0, 0.0, 3.0), ut)
                .with_warning("target inclination below current latitude"))
        }
    }

    struct Refuses;

    impl ManeuverOperation for Refuses {
        fn name(&self) -> &str {
            "refuses"
        }

        fn make_node(&self, _patch: &dyn OrbitalPatch, _ut: f64) -> Result<ManeuverParameters> {
            Err(PlannerError::Operation("no solution".to_string()))
        }
    }

    fn low_orbit() -> CircularOrbit {
        CircularOrbit {
            radius: 7000.0,
            speed: 7.5,
        }
    }

    #[test]
    fn test_encode_on_patch_at_epoch() {
        let dv = encode_on_patch(&low_orbit(), &Vector3::new(1.0, 2.0, 3.0), 0.0).unwrap();
        assert!((dv - Vector3::new(1.0, -3.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn test_encode_follows_orbit_position() {
        let orbit = low_orbit();
        // a quarter revolution later, prograde points along -x
        let quarter = std::f64::consts::FRAC_PI_2 * orbit.radius / orbit.speed;
        let dv = encode_on_patch(&orbit, &Vector3::new(-4.0, 0.0, 0.0), quarter).unwrap();
        assert!((dv - Vector3::new(0.0, 0.0, 4.0)).norm() < 1e-9);
    }

    #[test]
    fn test_place_node_uses_patch_after_node() {
        let mut trajectory = PatchedTrajectory::new(low_orbit(), 0.0);
        // after the node at 100 the vehicle is on a retrograde orbit
        let reversed = trajectory.add_patch(
            CircularOrbit {
                radius: 7000.0,
                speed: -7.5,
            },
            100.0,
            true,
        );
        trajectory
            .add_node(PlannedNode {
                ut: 100.0,
                delta_v: Vector3::new(0.0, 0.0, -15.0),
                next_patch: reversed,
            })
            .unwrap();

        let before = place_node(&trajectory, &Vector3::new(0.0, 1.0, 0.0), 0.0).unwrap();
        let after = place_node(&trajectory, &Vector3::new(0.0, 1.0, 0.0), 200.0).unwrap();

        assert!(before.delta_v.z > 0.0);
        assert!(after.delta_v.z < 0.0);
        assert_eq!(after.ut, 200.0);
    }

    #[test]
    fn test_raw_delta_v_matches_place_node() {
        let trajectory = PatchedTrajectory::new(low_orbit(), 0.0);
        let world = Vector3::new(0.3, -1.2, 0.8);

        let planned = plan(&RawDeltaV::new(world), &trajectory, 42.0).unwrap();
        let placed = place_node(&trajectory, &world, 42.0).unwrap();
        assert_eq!(planned, placed);
    }

    #[test]
    fn test_plan_encodes_at_operation_time() {
        let trajectory = PatchedTrajectory::new(low_orbit(), 0.0);
        let op = DelayedPrograde {
            delay: 600.0,
            magnitude: 12.0,
        };

        let node = plan(&op, &trajectory, 100.0).unwrap();
        assert_eq!(node.ut, 700.0);
        assert!((node.delta_v - Vector3::new(0.0, 0.0, 12.0)).norm() < 1e-9);
    }

    #[test]
    fn test_operation_warning_kept_on_node() {
        let trajectory = PatchedTrajectory::new(low_orbit(), 0.0);

        let node = plan(&ShallowPlaneChange, &trajectory, 0.0).unwrap();
        assert_eq!(
            node.warning.as_deref(),
            Some("target inclination below current latitude")
        );
        // world +z is the orbit normal, stored negated
        assert!((node.delta_v - Vector3::new(0.0, -3.0, 0.0)).norm() < 1e-12);

        let plain = plan(&RawDeltaV::new(Vector3::z()), &trajectory, 0.0).unwrap();
        assert!(plain.warning.is_none());
    }

    #[test]
    fn test_operation_error_propagates() {
        let trajectory = PatchedTrajectory::new(low_orbit(), 0.0);
        assert!(matches!(
            plan(&Refuses, &trajectory, 0.0),
            Err(PlannerError::Operation(_))
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        let trajectory = PatchedTrajectory::new(low_orbit(), 0.0);

        assert!(matches!(
            place_node(&trajectory, &Vector3::new(f64::NAN, 0.0, 0.0), 10.0),
            Err(PlannerError::InvalidNode(_))
        ));
        assert!(matches!(
            place_node(&trajectory, &Vector3::x(), f64::INFINITY),
            Err(PlannerError::InvalidNode(_))
        ));
        assert!(matches!(
            plan(&RawDeltaV::new(Vector3::x()), &trajectory, f64::NAN),
            Err(PlannerError::InvalidNode(_))
        ));
    }

    #[test]
    fn test_degenerate_patch_reported() {
        struct Parked;
        impl OrbitalPatch for Parked {
            fn state_at(&self, _ut: f64) -> StateVector {
                StateVector::new(Vector3::new(7000.0, 0.0, 0.0), Vector3::zeros())
            }
        }

        assert!(matches!(
            encode_on_patch(&Parked, &Vector3::x(), 0.0),
            Err(PlannerError::DegenerateFrame(_))
        ));
    }
}
