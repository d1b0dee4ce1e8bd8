//! Docking Autopilot Driver
//!
//! Owns the lateral PID and the engaged flag, and runs one approach tick
//! per `drive` call against explicitly passed target, vehicle and actuator.

use crate::approach::{compute_command, select_phase, ApproachCommand, Phase};
use crate::geometry::ApproachGeometry;
use crate::{ApproachConfig, PidController, Result, TargetState, TranslationActuator, VehicleState};
use tracing::{debug, info};

/// What a single `drive` call did
#[derive(Debug, Clone, PartialEq)]
pub enum DriveOutcome {
    /// Autopilot is disengaged, nothing was commanded
    Idle,
    /// No target designated; the autopilot disengaged itself
    TargetLost,
    /// A velocity command was issued
    Commanded(ApproachCommand),
    /// The final command was issued and the autopilot disengaged for capture
    HandedOff(ApproachCommand),
}

impl DriveOutcome {
    pub fn command(&self) -> Option<&ApproachCommand> {
        match self {
            DriveOutcome::Commanded(cmd) | DriveOutcome::HandedOff(cmd) => Some(cmd),
            DriveOutcome::Idle | DriveOutcome::TargetLost => None,
        }
    }
}

/// Final approach autopilot
pub struct DockingAutopilot {
    config: ApproachConfig,
    lateral_pid: PidController,
    enabled: bool,
    /// Previous tick's phase, only used to detect re-entry into lateral correction
    previous_phase: Option<Phase>,
    status: String,
}

impl DockingAutopilot {
    pub fn new(config: ApproachConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lateral_pid: PidController::new(config.lateral_gains),
            config,
            enabled: false,
            previous_phase: None,
            status: String::new(),
        })
    }

    pub fn config(&self) -> &ApproachConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Last status line, diagnostic only
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn lateral_pid(&self) -> &PidController {
        &self.lateral_pid
    }

    /// Start a fresh approach
    pub fn engage<A: TranslationActuator + ?Sized>(&mut self, actuator: &mut A) {
        self.lateral_pid.reset();
        self.previous_phase = None;
        self.enabled = true;
        self.status = "Engaged".to_string();
        actuator.engage();
        info!("Docking autopilot engaged");
    }

    /// Stop commanding and release the actuator. Takes effect before the next tick.
    pub fn disengage<A: TranslationActuator + ?Sized>(&mut self, actuator: &mut A) {
        if !self.enabled {
            return;
        }
        self.enabled = false;
        self.previous_phase = None;
        actuator.release();
        info!("Docking autopilot disengaged");
    }

    /// Run one control tick
    pub fn drive<A: TranslationActuator + ?Sized>(
        &mut self,
        target: Option<&TargetState>,
        vehicle: &VehicleState,
        actuator: &mut A,
    ) -> DriveOutcome {
        if !self.enabled {
            return DriveOutcome::Idle;
        }

        let Some(target) = target else {
            self.status = "No target".to_string();
            info!("Target lost, disengaging");
            self.disengage(actuator);
            return DriveOutcome::TargetLost;
        };

        actuator.point_along(&target.docking_axis);

        let geometry = ApproachGeometry::resolve(target, vehicle, &self.config);
        let phase = select_phase(
            geometry.decomposition.along_axis,
            geometry.decomposition.lateral_distance(),
            &self.config,
        );

        let was_correcting = self
            .previous_phase
            .is_some_and(|p| p.uses_lateral_correction());
        if phase.uses_lateral_correction() && !was_correcting {
            self.lateral_pid.reset();
        }

        let command = compute_command(
            phase,
            &geometry,
            &target.velocity,
            &mut self.lateral_pid,
            &self.config,
        );

        if !phase.uses_lateral_correction() {
            self.lateral_pid.reset();
        }

        if self.previous_phase != Some(phase) {
            debug!(
                %phase,
                range = geometry.separation.norm(),
                along_axis = geometry.decomposition.along_axis,
                lateral = geometry.decomposition.lateral_distance(),
                "Approach phase change"
            );
        }
        self.previous_phase = Some(phase);

        actuator.set_target_world_velocity(command.velocity);
        self.status = command.status.clone();
        debug!(status = %self.status, "Approach tick");

        if phase == Phase::TerminalHandoff {
            info!(
                along_axis = geometry.decomposition.along_axis,
                "Within capture range, handing off"
            );
            self.disengage(actuator);
            return DriveOutcome::HandedOff(command);
        }

        DriveOutcome::Commanded(command)
    }
}
