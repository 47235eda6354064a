use anyhow::Result;

pub mod road;
pub mod vehicles;

pub use road::*;
pub use vehicles::*;

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub road: RoadConfig,
    pub vehicles: VehiclesConfig,
}

impl ScenarioConfig {
    pub fn load_from_files(road_path: &str, vehicles_path: &str) -> Result<Self> {
        let road_content = std::fs::read_to_string(road_path)?;
        let vehicles_content = std::fs::read_to_string(vehicles_path)?;

        Self::from_toml_str(&road_content, &vehicles_content)
    }

    pub fn from_toml_str(road_content: &str, vehicles_content: &str) -> Result<Self> {
        let road: RoadConfig = toml::from_str(road_content)?;
        let vehicles: VehiclesConfig = toml::from_str(vehicles_content)?;

        // Validate configurations
        road.validate()?;
        vehicles.validate()?;

        Ok(ScenarioConfig { road, vehicles })
    }
}

pub trait Validate {
    fn validate(&self) -> Result<()>;
}
