//! Approach Geometry
//!
//! Splits the vehicle's offset from the target into a signed along-axis
//! distance and a lateral vector, and turns available thrust into speed
//! limits for each of those directions.

use crate::{ApproachConfig, TargetState, VehicleState};
use nalgebra::{Unit, Vector3};
use tracing::warn;

/// Offset from the target split along and across the docking axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisDecomposition {
    /// Positive in front of the port, negative behind it
    pub along_axis: f64,
    /// Offset orthogonal to the docking axis
    pub lateral: Vector3<f64>,
}

impl AxisDecomposition {
    /// Decompose `separation` (vehicle relative to target) about `axis`
    pub fn resolve(separation: &Vector3<f64>, axis: &Unit<Vector3<f64>>) -> Self {
        let axis = axis.into_inner();
        let projection = separation.dot(&axis);

        Self {
            along_axis: -projection,
            lateral: separation - axis * projection,
        }
    }

    pub fn lateral_distance(&self) -> f64 {
        self.lateral.norm()
    }

    /// Unit lateral offset, `None` when the vehicle sits exactly on the axis
    pub fn lateral_direction(&self) -> Option<Unit<Vector3<f64>>> {
        Unit::try_new(self.lateral, 0.0)
    }

    pub fn is_behind(&self) -> bool {
        self.along_axis < 0.0
    }

    /// Rebuild the separation this decomposition came from
    pub fn recompose(&self, axis: &Unit<Vector3<f64>>) -> Vector3<f64> {
        self.lateral - axis.into_inner() * self.along_axis
    }
}

/// Soft speed caps derived from thrust/mass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedLimits {
    pub axis: f64,
    pub lateral: f64,
}

impl SpeedLimits {
    pub fn from_vehicle(
        vehicle: &VehicleState,
        axis: &Unit<Vector3<f64>>,
        lateral: &Vector3<f64>,
        approach_speed_mult: f64,
    ) -> Self {
        if !(vehicle.mass.is_finite() && vehicle.mass > 0.0) {
            warn!(mass = vehicle.mass, "non-positive vehicle mass, zeroing speed limits");
            return Self {
                axis: 0.0,
                lateral: 0.0,
            };
        }

        let axis_thrust = vehicle.thrust.available_along(&-axis.into_inner());
        let lateral_thrust = vehicle.thrust.available_along(&-lateral);

        Self {
            axis: axis_thrust * approach_speed_mult / vehicle.mass,
            lateral: lateral_thrust * approach_speed_mult / vehicle.mass,
        }
    }
}

/// Everything the phase logic needs from one tick's sample
#[derive(Debug, Clone, Copy)]
pub struct ApproachGeometry {
    pub axis: Unit<Vector3<f64>>,
    pub separation: Vector3<f64>,
    pub decomposition: AxisDecomposition,
    pub limits: SpeedLimits,
}

impl ApproachGeometry {
    pub fn resolve(target: &TargetState, vehicle: &VehicleState, config: &ApproachConfig) -> Self {
        let axis = target.docking_axis;
        let separation = target.relative_position(vehicle);
        let decomposition = AxisDecomposition::resolve(&separation, &axis);
        let limits = SpeedLimits::from_vehicle(
            vehicle,
            &axis,
            &decomposition.lateral,
            config.approach_speed_mult,
        );

        Self {
            axis,
            separation,
            decomposition,
            limits,
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use fuzz_harness::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(5000))]

        // Fuzz: decomposition is exact for any axis
        #[test]
        fn fuzz_decomposition_recomposes(
            separation in separation_vector(),
            axis in unit_vector(),
        ) {
            let d = AxisDecomposition::resolve(&separation, &axis);
            let error = (d.recompose(&axis) - separation).norm();
            prop_assert!(error <= 1e-9 * (1.0 + separation.norm()), "error {}", error);
        }

        // Fuzz: lateral part carries nothing along the axis
        #[test]
        fn fuzz_lateral_orthogonal(
            separation in separation_vector(),
            axis in unit_vector(),
        ) {
            let d = AxisDecomposition::resolve(&separation, &axis);
            prop_assert!(d.lateral.dot(&axis.into_inner()).abs() <= 1e-9 * (1.0 + separation.norm()));
        }
    }
}
