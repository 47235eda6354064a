use super::{IntelligentDriver, LaneKind, LaneView, Mobil, MobilParameters, RoadSegment, Vehicle, VehicleId};
use crate::config::{ScenarioConfig, VehicleType};
use anyhow::{Result, anyhow};
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use std::sync::Arc;

/// Populates a road segment with vehicles drawn from the configured types.
pub struct TrafficManager {
    config: ScenarioConfig,
    next_vehicle_id: usize,
    rng: StdRng,
}

impl TrafficManager {
    pub fn new(config: ScenarioConfig, seed: Option<u64>) -> Self {
        let rng = if let Some(seed) = seed {
            StdRng::seed_from_u64(seed)
        } else {
            StdRng::from_entropy()
        };

        Self {
            config,
            next_vehicle_id: 0,
            rng,
        }
    }

    /// Builds the configured road and fills every non-entrance lane with up to
    /// `vehicles_per_lane` vehicles, front to back.
    pub fn populate(&mut self) -> Result<RoadSegment> {
        let road_name = self.config.road.road.name.clone();
        let mut road = RoadSegment::new(self.config.road.road.length, &self.config.road.road.lane_kinds());

        let scenario = self.config.vehicles.scenario.clone();
        let spacing = Normal::new(scenario.mean_spacing, scenario.spacing_stddev)
            .map_err(|e| anyhow!("Invalid spacing distribution: {}", e))?;
        let speed_factor = Normal::new(1.0, scenario.speed_stddev)
            .map_err(|e| anyhow!("Invalid speed distribution: {}", e))?;

        for lane in 0..road.lane_count() {
            if road.lane(lane).map(|l| l.kind()) == Some(LaneKind::Entrance) {
                continue;
            }

            let mut position = road.length();
            for _ in 0..scenario.vehicles_per_lane {
                let vehicle_type = self.select_vehicle_type()?.clone();
                let speed = vehicle_type.idm.desired_speed
                    * speed_factor.sample(&mut self.rng).max(0.0);

                if position - vehicle_type.length < 0.0 {
                    log::debug!("Lane {} full after {} vehicles", lane, road.lane(lane).map_or(0, |l| l.len()));
                    break;
                }

                let vehicle = self.build_vehicle(&vehicle_type, lane, position, speed)?;
                road.add_vehicle(lane, vehicle);

                // Negative draws would overlap vehicles
                let gap = spacing.sample(&mut self.rng).max(0.0);
                position -= vehicle_type.length + gap;
            }
        }

        log::info!("Populated road '{}' with {} vehicles", road_name, road.vehicle_count());
        Ok(road)
    }

    fn select_vehicle_type(&mut self) -> Result<&VehicleType> {
        let vehicle_types = &self.config.vehicles.vehicle_types;
        let total_weight: u32 = vehicle_types.iter().map(|vt| vt.weight).sum();
        if total_weight == 0 {
            return Err(anyhow!("No vehicle type has a positive weight"));
        }

        let mut random_value = self.rng.gen_range(0..total_weight);
        for vehicle_type in vehicle_types {
            if random_value < vehicle_type.weight {
                return Ok(vehicle_type);
            }
            random_value -= vehicle_type.weight;
        }

        vehicle_types.first().ok_or_else(|| anyhow!("No vehicle types configured"))
    }

    fn build_vehicle(&mut self, vehicle_type: &VehicleType, lane: usize, position: f64, speed: f64) -> Result<Vehicle> {
        let lane_change_model = match &vehicle_type.lane_change.mobil {
            Some(mobil) => Mobil::new(MobilParameters::try_from(mobil)?),
            None => Mobil::unconfigured(),
        };

        let id = VehicleId(self.next_vehicle_id);
        self.next_vehicle_id += 1;

        Ok(Vehicle::new(
            id,
            lane,
            position,
            speed,
            vehicle_type.length,
            Arc::new(IntelligentDriver::from(&vehicle_type.idm)),
            lane_change_model,
        ))
    }
}
