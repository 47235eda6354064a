use serde::{Deserialize, Serialize};
use anyhow::{Result, anyhow};
use super::Validate;
use crate::simulation::LaneKind;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RoadConfig {
    pub road: Road,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Road {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub length: f64,
    /// Listed from the rightmost lane (index 0) leftwards.
    pub lanes: Vec<LaneConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneType {
    #[default]
    Regular,
    Entrance,
    Exit,
}

impl From<LaneType> for LaneKind {
    fn from(lane_type: LaneType) -> Self {
        match lane_type {
            LaneType::Regular => LaneKind::Regular,
            LaneType::Entrance => LaneKind::Entrance,
            LaneType::Exit => LaneKind::Exit,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LaneConfig {
    #[serde(rename = "type", default)]
    pub lane_type: LaneType,
}

impl Road {
    pub fn lane_kinds(&self) -> Vec<LaneKind> {
        self.lanes.iter().map(|lane| lane.lane_type.into()).collect()
    }
}

impl Validate for RoadConfig {
    fn validate(&self) -> Result<()> {
        let road = &self.road;

        if road.length <= 0.0 || !road.length.is_finite() {
            return Err(anyhow!("Road length must be positive, got {}", road.length));
        }

        if road.lanes.is_empty() {
            return Err(anyhow!("Road '{}' must have at least one lane", road.name));
        }

        if road.lanes.iter().all(|lane| lane.lane_type != LaneType::Regular) {
            return Err(anyhow!("Road '{}' needs at least one regular lane", road.name));
        }

        Ok(())
    }
}
