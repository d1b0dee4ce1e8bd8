//! Scalar PID Controller
//!
//! Discrete PID with a unit time step per call. The output envelope is
//! public so the caller can narrow it before each `compute`.

use serde::{Deserialize, Serialize};

/// Proportional/integral/derivative gains
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PidGains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl PidGains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// PID controller with clamped output
#[derive(Debug, Clone)]
pub struct PidController {
    pub gains: PidGains,
    /// Lower output bound, may be changed between calls
    pub min: f64,
    /// Upper output bound, may be changed between calls
    pub max: f64,
    integral: f64,
    previous_error: f64,
}

impl PidController {
    /// Create a controller with an unbounded output envelope
    pub fn new(gains: PidGains) -> Self {
        Self {
            gains,
            min: f64::NEG_INFINITY,
            max: f64::INFINITY,
            integral: 0.0,
            previous_error: 0.0,
        }
    }

    pub fn with_bounds(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Narrow or widen the output envelope for the next call
    pub fn set_bounds(&mut self, min: f64, max: f64) {
        self.min = min;
        self.max = max;
    }

    /// Clear accumulated integral and derivative history
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.previous_error = 0.0;
    }

    /// Advance one step and return the clamped actuation
    pub fn compute(&mut self, error: f64) -> f64 {
        self.integral += error;
        let derivative = error - self.previous_error;
        self.previous_error = error;

        let action =
            self.gains.kp * error + self.gains.ki * self.integral + self.gains.kd * derivative;

        // f64::clamp panics on an inverted envelope
        if self.min > self.max {
            return self.max;
        }
        action.clamp(self.min, self.max)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }
}
