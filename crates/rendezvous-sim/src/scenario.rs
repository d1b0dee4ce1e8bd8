//! Scenario loading from JSON files

use crate::{Result, SimError, DEFAULT_DT, DEFAULT_MAX_TICKS};
use docking_autopilot::{ApproachConfig, TargetState, ThrustEnvelope, VehicleState};
use nalgebra::Vector3;
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::info;

/// Raw target block from JSON
#[derive(Debug, Deserialize)]
struct RawTarget {
    position: Option<[f64; 3]>,
    velocity: Option<[f64; 3]>,
    docking_axis: [f64; 3],
}

/// Thrust given either as one figure for every direction or per signed axis
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawThrust {
    Uniform(f64),
    PerAxis {
        positive: [f64; 3],
        negative: [f64; 3],
    },
}

/// Raw vehicle block from JSON
#[derive(Debug, Deserialize)]
struct RawVehicle {
    position: [f64; 3],
    velocity: Option<[f64; 3]>,
    mass: f64,
    thrust: RawThrust,
}

/// Raw scenario file
#[derive(Debug, Deserialize)]
struct RawScenario {
    name: Option<String>,
    dt: Option<f64>,
    max_ticks: Option<usize>,
    target_lost_at: Option<usize>,
    target: RawTarget,
    vehicle: RawVehicle,
    #[serde(default)]
    config: ApproachConfig,
}

/// Validated simulation setup
#[derive(Debug, Clone)]
pub struct Scenario {
    pub name: String,
    /// Control step in seconds
    pub dt: f64,
    pub max_ticks: usize,
    /// Tick from which the tracker stops reporting a target
    pub target_lost_at: Option<usize>,
    pub target: TargetState,
    pub vehicle: VehicleState,
    pub config: ApproachConfig,
}

/// Check a raw scenario and convert it to typed states
fn validate(raw: RawScenario) -> Result<Scenario> {
    let dt = raw.dt.unwrap_or(DEFAULT_DT);
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::Scenario(format!("dt must be positive, got {dt}")));
    }

    let max_ticks = raw.max_ticks.unwrap_or(DEFAULT_MAX_TICKS);
    if max_ticks == 0 {
        return Err(SimError::Scenario("max_ticks must be at least 1".to_string()));
    }

    let target = TargetState::new(
        Vector3::from(raw.target.position.unwrap_or_default()),
        Vector3::from(raw.target.velocity.unwrap_or_default()),
        Vector3::from(raw.target.docking_axis),
    )?;

    let thrust = match raw.vehicle.thrust {
        RawThrust::Uniform(t) => ThrustEnvelope::uniform(t),
        RawThrust::PerAxis { positive, negative } => {
            ThrustEnvelope::new(Vector3::from(positive), Vector3::from(negative))
        }
    };
    let vehicle = VehicleState {
        position: Vector3::from(raw.vehicle.position),
        velocity: Vector3::from(raw.vehicle.velocity.unwrap_or_default()),
        mass: raw.vehicle.mass,
        thrust,
    };
    vehicle.validate()?;
    raw.config.validate()?;

    Ok(Scenario {
        name: raw.name.unwrap_or_else(|| "unnamed".to_string()),
        dt,
        max_ticks,
        target_lost_at: raw.target_lost_at,
        target,
        vehicle,
        config: raw.config,
    })
}

/// Load and validate a scenario file
pub fn load_scenario(path: impl AsRef<Path>) -> Result<Scenario> {
    let path = path.as_ref();
    info!("Loading scenario from {:?}", path);

    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let raw: RawScenario = serde_json::from_reader(reader)?;
    let scenario = validate(raw)?;

    info!(
        name = %scenario.name,
        dt = scenario.dt,
        max_ticks = scenario.max_ticks,
        "Loaded scenario"
    );
    Ok(scenario)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_json(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_minimal_scenario() {
        let file = write_json(
            r#"{
                "target": {"docking_axis": [0.0, 0.0, 2.0]},
                "vehicle": {"position": [1.0, 0.0, -80.0], "mass": 1000.0, "thrust": 500.0}
            }"#,
        );

        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.name, "unnamed");
        assert_eq!(scenario.dt, DEFAULT_DT);
        assert_eq!(scenario.max_ticks, DEFAULT_MAX_TICKS);
        assert_eq!(scenario.target.docking_axis.into_inner(), Vector3::z());
        assert_eq!(scenario.vehicle.thrust, ThrustEnvelope::uniform(500.0));
        assert_eq!(scenario.config, ApproachConfig::default());
    }

    #[test]
    fn test_load_full_scenario() {
        let file = write_json(
            r#"{
                "name": "station keeping",
                "dt": 0.05,
                "max_ticks": 1200,
                "target_lost_at": 600,
                "target": {"position": [10.0, 0.0, 0.0], "velocity": [0.0, 7.6, 0.0], "docking_axis": [1.0, 0.0, 0.0]},
                "vehicle": {
                    "position": [-40.0, 2.0, 0.0],
                    "velocity": [0.0, 7.6, 0.0],
                    "mass": 2500.0,
                    "thrust": {"positive": [200.0, 100.0, 100.0], "negative": [150.0, 100.0, 100.0]}
                },
                "config": {"approach_speed_mult": 0.5, "handoff_distance": 0.25}
            }"#,
        );

        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.name, "station keeping");
        assert_eq!(scenario.target_lost_at, Some(600));
        assert_eq!(scenario.vehicle.thrust.negative.x, 150.0);
        assert_eq!(scenario.config.approach_speed_mult, 0.5);
        assert_eq!(scenario.config.handoff_distance, 0.25);
        assert_eq!(scenario.config.collision_clearance, 10.0);
    }

    #[test]
    fn test_rejects_zero_axis() {
        let file = write_json(
            r#"{
                "target": {"docking_axis": [0.0, 0.0, 0.0]},
                "vehicle": {"position": [0.0, 0.0, -10.0], "mass": 1000.0, "thrust": 500.0}
            }"#,
        );
        assert!(matches!(load_scenario(file.path()), Err(SimError::Docking(_))));
    }

    #[test]
    fn test_rejects_bad_vehicle_and_dt() {
        let massless = write_json(
            r#"{
                "target": {"docking_axis": [0.0, 0.0, 1.0]},
                "vehicle": {"position": [0.0, 0.0, -10.0], "mass": 0.0, "thrust": 500.0}
            }"#,
        );
        assert!(matches!(load_scenario(massless.path()), Err(SimError::Docking(_))));

        let frozen = write_json(
            r#"{
                "dt": 0.0,
                "target": {"docking_axis": [0.0, 0.0, 1.0]},
                "vehicle": {"position": [0.0, 0.0, -10.0], "mass": 1000.0, "thrust": 500.0}
            }"#,
        );
        assert!(matches!(load_scenario(frozen.path()), Err(SimError::Scenario(_))));
    }

    #[test]
    fn test_malformed_json() {
        let file = write_json(r#"{"target": "#);
        assert!(matches!(load_scenario(file.path()), Err(SimError::Json(_))));
    }
}
