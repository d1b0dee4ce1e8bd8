//! Strategies for vectors, frames and controller inputs
//!
//! Everything is plain `f64`/nalgebra so the guidance crates can use the
//! values directly.

use nalgebra::{Unit, UnitQuaternion, Vector3};
use proptest::prelude::*;

// ============================================================================
// Vector Generators
// ============================================================================

/// Vector with each component in `[-limit, limit]`
pub fn vector_within(limit: f64) -> impl Strategy<Value = Vector3<f64>> {
    (-limit..=limit, -limit..=limit, -limit..=limit).prop_map(|(x, y, z)| Vector3::new(x, y, z))
}

/// Rotation covering every orientation
pub fn rotation() -> impl Strategy<Value = UnitQuaternion<f64>> {
    use std::f64::consts::PI;
    (-PI..PI, -PI..PI, -PI..PI)
        .prop_map(|(x, y, z)| UnitQuaternion::from_scaled_axis(Vector3::new(x, y, z)))
}

/// Arbitrary unit direction
pub fn unit_vector() -> impl Strategy<Value = Unit<Vector3<f64>>> {
    rotation().prop_map(|q| q * Vector3::z_axis())
}

/// Vehicle offset from the target, out to 2 km on each axis
pub fn separation_vector() -> impl Strategy<Value = Vector3<f64>> {
    vector_within(2000.0)
}

/// Burn size up to 500 m/s per component
pub fn delta_v() -> impl Strategy<Value = Vector3<f64>> {
    vector_within(500.0)
}

// ============================================================================
// Frame Generators
// ============================================================================

/// Right-handed `(radial, normal, prograde)` triple with normal = radial × prograde
pub fn orthonormal_frame(
) -> impl Strategy<Value = (Unit<Vector3<f64>>, Unit<Vector3<f64>>, Unit<Vector3<f64>>)> {
    rotation().prop_map(|q| (q * Vector3::x_axis(), q * Vector3::z_axis(), q * Vector3::y_axis()))
}

/// Bound orbit state `(position, velocity)`, never radial-only
pub fn orbit_state() -> impl Strategy<Value = (Vector3<f64>, Vector3<f64>)> {
    (rotation(), 6500.0f64..50_000.0, 1.0f64..12.0, -3.0f64..3.0).prop_map(
        |(q, radius, tangential, radial)| {
            let out = (q * Vector3::x_axis()).into_inner();
            let along = (q * Vector3::y_axis()).into_inner();
            (out * radius, along * tangential + out * radial)
        },
    )
}

// ============================================================================
// Controller Generators
// ============================================================================

/// `(kp, ki, kd)` in the range a lateral controller would be tuned to
pub fn pid_gains() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.0f64..2.0, 0.0f64..0.5, 0.0f64..1.0)
}

/// Error samples fed to a controller, one per tick
pub fn error_sequence(len: usize) -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-500.0f64..500.0, len)
}

/// Signed range along the docking axis, behind and in front of the port
pub fn along_axis_distance() -> impl Strategy<Value = f64> {
    -500.0f64..500.0
}

/// Lateral miss distance
pub fn lateral_distance() -> impl Strategy<Value = f64> {
    0.0f64..500.0
}

/// Thrust per axis in newtons and vehicle mass in kg
pub fn thrust_and_mass() -> impl Strategy<Value = (f64, f64)> {
    (1.0f64..5000.0, 100.0f64..50_000.0)
}
