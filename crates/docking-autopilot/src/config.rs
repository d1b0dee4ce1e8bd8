//! Approach Tuning
//!
//! Thresholds and gains for the approach controller. Distances are in the
//! simulation's distance unit, speeds in distance units per second.

use crate::pid::PidGains;
use crate::{DockingError, Result};
use serde::{Deserialize, Serialize};

/// Approach speed as a multiple of thrust/mass on each axis
pub const APPROACH_SPEED_MULT: f64 = 1.0;

/// Lateral PID gains
pub const KP: f64 = 0.2;
pub const KI: f64 = 0.0;
pub const KD: f64 = 0.02;

/// Lateral clearance below which backing past the target would hit it
pub const COLLISION_CLEARANCE: f64 = 10.0;

/// Along-axis distance at which the back-up speed saturates
pub const BACKUP_RAMP_DISTANCE: f64 = 50.0;

/// Lateral distance at which the lateral correction envelope reaches full speed
pub const LATERAL_RAMP_DISTANCE: f64 = 200.0;

/// Along-axis distance at which the closing speed saturates
pub const CLOSING_RAMP_DISTANCE: f64 = 200.0;

/// Minimum closing speed so the approach never stalls
pub const CLOSING_SPEED_FLOOR: f64 = 0.1;

/// Lateral distance under which the vehicle counts as on-axis
pub const OFF_AXIS_TOLERANCE: f64 = 0.2;

/// Off-axis override when lateral * ratio exceeds the along-axis range
pub const OFF_AXIS_RATIO: f64 = 10.0;

/// Along-axis range at which control is handed to the capture mechanism
pub const HANDOFF_DISTANCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApproachConfig {
    pub approach_speed_mult: f64,
    pub lateral_gains: PidGains,
    pub collision_clearance: f64,
    pub backup_ramp_distance: f64,
    pub lateral_ramp_distance: f64,
    pub closing_ramp_distance: f64,
    pub closing_speed_floor: f64,
    pub off_axis_tolerance: f64,
    pub off_axis_ratio: f64,
    pub handoff_distance: f64,
}

impl Default for ApproachConfig {
    fn default() -> Self {
        Self {
            approach_speed_mult: APPROACH_SPEED_MULT,
            lateral_gains: PidGains::new(KP, KI, KD),
            collision_clearance: COLLISION_CLEARANCE,
            backup_ramp_distance: BACKUP_RAMP_DISTANCE,
            lateral_ramp_distance: LATERAL_RAMP_DISTANCE,
            closing_ramp_distance: CLOSING_RAMP_DISTANCE,
            closing_speed_floor: CLOSING_SPEED_FLOOR,
            off_axis_tolerance: OFF_AXIS_TOLERANCE,
            off_axis_ratio: OFF_AXIS_RATIO,
            handoff_distance: HANDOFF_DISTANCE,
        }
    }
}

impl ApproachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn approach_speed_mult(mut self, mult: f64) -> Self {
        self.approach_speed_mult = mult;
        self
    }

    pub fn lateral_gains(mut self, kp: f64, ki: f64, kd: f64) -> Self {
        self.lateral_gains = PidGains::new(kp, ki, kd);
        self
    }

    pub fn handoff_distance(mut self, distance: f64) -> Self {
        self.handoff_distance = distance;
        self
    }

    pub fn collision_clearance(mut self, distance: f64) -> Self {
        self.collision_clearance = distance;
        self
    }

    /// Reject tunings that would make a tick divide by zero or go non-finite
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("backup_ramp_distance", self.backup_ramp_distance),
            ("lateral_ramp_distance", self.lateral_ramp_distance),
            ("closing_ramp_distance", self.closing_ramp_distance),
            ("approach_speed_mult", self.approach_speed_mult),
            ("off_axis_ratio", self.off_axis_ratio),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(DockingError::InvalidConfig(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        let non_negative = [
            ("collision_clearance", self.collision_clearance),
            ("closing_speed_floor", self.closing_speed_floor),
            ("off_axis_tolerance", self.off_axis_tolerance),
            ("handoff_distance", self.handoff_distance),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(DockingError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        let PidGains { kp, ki, kd } = self.lateral_gains;
        if !(kp.is_finite() && ki.is_finite() && kd.is_finite()) {
            return Err(DockingError::InvalidConfig(format!(
                "lateral gains must be finite, got ({kp}, {ki}, {kd})"
            )));
        }

        Ok(())
    }
}
