use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;
use crate::simulation::MobilParameters;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehiclesConfig {
    pub scenario: ScenarioParams,
    pub vehicle_types: Vec<VehicleType>,
    #[serde(default)]
    pub random: RandomConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScenarioParams {
    pub vehicles_per_lane: u32,
    pub mean_spacing: f64,
    pub spacing_stddev: f64,
    pub speed_stddev: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VehicleType {
    pub id: String,
    pub weight: u32,
    pub length: f64,
    pub idm: IdmConfig,
    pub lane_change: LaneChangeConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdmConfig {
    pub desired_speed: f64,
    pub time_headway: f64,
    pub minimum_spacing: f64,
    pub max_acceleration: f64,
    pub comfortable_deceleration: f64,
    #[serde(default = "default_exponent")]
    pub exponent: f64,
    #[serde(default)]
    pub no_passing_on_right: bool,
}

fn default_exponent() -> f64 {
    4.0
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LaneChangeConfig {
    /// Vehicles without a `[mobil]` block get the unconfigured placeholder model.
    #[serde(default)]
    pub mobil: Option<MobilConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MobilConfig {
    pub minimum_gap: f64,
    pub safe_deceleration: f64,
    pub politeness: f64,
    pub threshold_acceleration: f64,
    pub right_bias_acceleration: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RandomConfig {
    pub seed: Option<u64>,
}

impl Validate for VehiclesConfig {
    fn validate(&self) -> Result<()> {
        // Validate scenario parameters
        let scenario = &self.scenario;
        if scenario.mean_spacing <= 0.0 {
            return Err(anyhow!("Mean spacing must be positive"));
        }

        if scenario.spacing_stddev < 0.0 || scenario.speed_stddev < 0.0 {
            return Err(anyhow!("Standard deviations must be non-negative"));
        }

        // Validate vehicle types
        if self.vehicle_types.is_empty() {
            return Err(anyhow!("At least one vehicle type must be defined"));
        }

        let total_weight: u32 = self.vehicle_types.iter().map(|vt| vt.weight).sum();
        if total_weight != 100 {
            return Err(anyhow!("Vehicle type weights must sum to 100, got {}", total_weight));
        }

        for vehicle_type in &self.vehicle_types {
            if vehicle_type.length <= 0.0 {
                return Err(anyhow!("Length of '{}' must be positive", vehicle_type.id));
            }

            let idm = &vehicle_type.idm;
            if idm.desired_speed <= 0.0 {
                return Err(anyhow!("Desired speed of '{}' must be positive", vehicle_type.id));
            }

            if idm.time_headway < 0.0 || idm.minimum_spacing < 0.0 {
                return Err(anyhow!("Headway and spacing of '{}' must be non-negative", vehicle_type.id));
            }

            if idm.max_acceleration <= 0.0 || idm.comfortable_deceleration <= 0.0 {
                return Err(anyhow!("Acceleration values of '{}' must be positive", vehicle_type.id));
            }

            if let Some(mobil) = &vehicle_type.lane_change.mobil {
                MobilParameters::try_from(mobil)
                    .map_err(|e| anyhow!("Invalid MOBIL parameters for '{}': {}", vehicle_type.id, e))?;
            }
        }

        Ok(())
    }
}
