//! Approach Phase Logic
//!
//! Phase is a pure function of the current tick's geometry. The command for
//! a phase depends on that geometry plus the lateral PID history.

use crate::geometry::ApproachGeometry;
use crate::{ApproachConfig, PidController};
use nalgebra::Vector3;
use std::fmt;

/// Approach regime selected for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Behind the port and close to the axis: sidestep before backing up
    BehindAvoidingCollision,
    /// Behind the port with lateral clearance: back around to the front
    BackingUp,
    /// In front but too close for the lateral miss: open range while correcting
    FarOffAxisBackingUp,
    /// In front and well off axis: hold range while correcting
    FarOffAxisHolding,
    /// On axis: close along the axis
    ForwardApproach,
    /// Close enough for the capture mechanism to take over
    TerminalHandoff,
}

impl Phase {
    /// Whether this phase runs the lateral PID
    pub fn uses_lateral_correction(&self) -> bool {
        !matches!(self, Phase::BehindAvoidingCollision | Phase::BackingUp)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::BehindAvoidingCollision => "behind, clearing axis",
            Phase::BackingUp => "behind, backing up",
            Phase::FarOffAxisBackingUp => "off axis, backing up",
            Phase::FarOffAxisHolding => "off axis, holding range",
            Phase::ForwardApproach => "forward approach",
            Phase::TerminalHandoff => "terminal handoff",
        };
        f.write_str(name)
    }
}

/// Pick the approach regime from along-axis range and lateral miss
pub fn select_phase(along_axis: f64, lateral_distance: f64, config: &ApproachConfig) -> Phase {
    if along_axis < 0.0 {
        if lateral_distance < config.collision_clearance {
            Phase::BehindAvoidingCollision
        } else {
            Phase::BackingUp
        }
    } else if lateral_distance > config.off_axis_tolerance
        && lateral_distance * config.off_axis_ratio > along_axis
    {
        if along_axis < lateral_distance {
            Phase::FarOffAxisBackingUp
        } else {
            Phase::FarOffAxisHolding
        }
    } else if along_axis > config.handoff_distance {
        Phase::ForwardApproach
    } else {
        Phase::TerminalHandoff
    }
}

/// Velocity command for one tick
#[derive(Debug, Clone, PartialEq)]
pub struct ApproachCommand {
    pub phase: Phase,
    /// Commanded world-frame velocity
    pub velocity: Vector3<f64>,
    /// Lateral part of the command, relative to the target
    pub lateral_velocity: Vector3<f64>,
    /// Signed speed along the docking axis, relative to the target
    pub axis_speed: f64,
    /// Diagnostic only
    pub status: String,
}

/// Compute the command for `phase`.
///
/// Phases that use lateral correction advance `lateral_pid` by one step;
/// the other phases leave it untouched.
pub fn compute_command(
    phase: Phase,
    geometry: &ApproachGeometry,
    target_velocity: &Vector3<f64>,
    lateral_pid: &mut PidController,
    config: &ApproachConfig,
) -> ApproachCommand {
    let axis = geometry.axis.into_inner();
    let along_axis = geometry.decomposition.along_axis;
    let lateral_distance = geometry.decomposition.lateral_distance();
    let lateral_direction = geometry
        .decomposition
        .lateral_direction()
        .map_or_else(Vector3::zeros, |d| d.into_inner());
    let limits = geometry.limits;

    let (lateral_velocity, axis_speed, status) = match phase {
        Phase::BehindAvoidingCollision => {
            let lateral_velocity = lateral_direction * limits.axis;
            let status = format!(
                "Moving away from docking axis at {:.2} m/s to clear the target before backing up",
                limits.axis
            );
            (lateral_velocity, 0.0, status)
        }
        Phase::BackingUp => {
            let speed = (limits.axis * along_axis / config.backup_ramp_distance)
                .clamp(-limits.axis, limits.axis);
            let status = format!(
                "Backing up at {:.2} m/s to get in front of the docking port",
                speed
            );
            (Vector3::zeros(), speed, status)
        }
        _ => {
            let lateral_velocity = lateral_correction(
                lateral_distance,
                &lateral_direction,
                limits.lateral,
                lateral_pid,
                config,
            );
            let closing = config.closing_speed_floor
                + limits
                    .axis
                    .min(limits.axis * along_axis / config.closing_ramp_distance);

            let (speed, status) = match phase {
                Phase::FarOffAxisBackingUp => (
                    -closing,
                    format!(
                        "Backing up at {:.2} m/s and moving toward the docking axis",
                        -closing
                    ),
                ),
                Phase::FarOffAxisHolding => (
                    0.0,
                    format!(
                        "Holding range and moving toward the docking axis at {:.2} m/s",
                        lateral_velocity.norm()
                    ),
                ),
                Phase::TerminalHandoff => (
                    closing,
                    format!("Within {:.2} m of the port, handing off to capture", along_axis),
                ),
                _ => (closing, format!("Moving forward to dock at {:.2} m/s", closing)),
            };
            (lateral_velocity, speed, status)
        }
    };

    ApproachCommand {
        phase,
        velocity: target_velocity + lateral_velocity + axis * axis_speed,
        lateral_velocity,
        axis_speed,
        status,
    }
}

/// PID-driven velocity back toward the axis, capped at the lateral limit
fn lateral_correction(
    lateral_distance: f64,
    lateral_direction: &Vector3<f64>,
    lateral_limit: f64,
    lateral_pid: &mut PidController,
    config: &ApproachConfig,
) -> Vector3<f64> {
    let envelope = lateral_limit * lateral_distance / config.lateral_ramp_distance;
    lateral_pid.set_bounds(-envelope, envelope);

    let mut velocity = -lateral_direction * lateral_pid.compute(lateral_distance);
    let speed = velocity.norm();
    if speed > lateral_limit {
        velocity *= lateral_limit / speed;
    }
    velocity
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{TargetState, ThrustEnvelope, VehicleState};
    use fuzz_harness::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(5000))]

        // Fuzz: only positions behind the port skip lateral correction
        #[test]
        fn fuzz_behind_iff_no_lateral_correction(
            along in along_axis_distance(),
            lateral in lateral_distance(),
        ) {
            let phase = select_phase(along, lateral, &ApproachConfig::default());
            prop_assert_eq!(phase.uses_lateral_correction(), along >= 0.0);
        }

        // Fuzz: behind and close to the axis, the command only moves away from it
        #[test]
        fn fuzz_behind_close_clears_axis(
            axis in unit_vector(),
            offset in separation_vector(),
            behind in 0.01f64..500.0,
            lateral in 0.01f64..9.99,
            (thrust, mass) in thrust_and_mass(),
        ) {
            let axis_vec = axis.into_inner();
            let across = offset - axis_vec * offset.dot(&axis_vec);
            prop_assume!(across.norm() > 1e-3);
            let separation = across.normalize() * lateral + axis_vec * behind;

            let config = ApproachConfig::default();
            let target = TargetState::new(Vector3::zeros(), Vector3::zeros(), axis_vec).unwrap();
            let vehicle = VehicleState {
                position: separation,
                velocity: Vector3::zeros(),
                mass,
                thrust: ThrustEnvelope::uniform(thrust),
            };
            let geometry = ApproachGeometry::resolve(&target, &vehicle, &config);
            let phase = select_phase(
                geometry.decomposition.along_axis,
                geometry.decomposition.lateral_distance(),
                &config,
            );
            prop_assert_eq!(phase, Phase::BehindAvoidingCollision);

            let mut pid = PidController::new(config.lateral_gains);
            let cmd = compute_command(phase, &geometry, &Vector3::zeros(), &mut pid, &config);
            let scale = geometry.limits.axis * (1.0 + separation.norm());

            prop_assert_eq!(cmd.axis_speed, 0.0);
            prop_assert!(cmd.velocity.dot(&axis_vec).abs() <= 1e-9 * scale);
            prop_assert!(cmd.lateral_velocity.dot(&geometry.decomposition.lateral) > 0.0);
            prop_assert_eq!(pid.integral(), 0.0);
        }

        // Fuzz: lateral command never exceeds the thrust-derived limit
        #[test]
        fn fuzz_lateral_command_within_limit(
            separation in separation_vector(),
            axis in unit_vector(),
            (thrust, mass) in thrust_and_mass(),
            ticks in 1usize..8,
        ) {
            let config = ApproachConfig::default();
            let target = TargetState::new(Vector3::zeros(), Vector3::zeros(), axis.into_inner()).unwrap();
            let vehicle = VehicleState {
                position: separation,
                velocity: Vector3::zeros(),
                mass,
                thrust: ThrustEnvelope::uniform(thrust),
            };
            let geometry = ApproachGeometry::resolve(&target, &vehicle, &config);
            let phase = select_phase(
                geometry.decomposition.along_axis,
                geometry.decomposition.lateral_distance(),
                &config,
            );
            let mut pid = PidController::new(config.lateral_gains);

            for _ in 0..ticks {
                let cmd = compute_command(phase, &geometry, &Vector3::zeros(), &mut pid, &config);
                prop_assert!(cmd.velocity.iter().all(|c| c.is_finite()));
                if phase.uses_lateral_correction() {
                    prop_assert!(cmd.lateral_velocity.norm() <= geometry.limits.lateral * (1.0 + 1e-9));
                }
            }
        }
    }
}
