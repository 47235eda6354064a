use mobil_lane_change::{
    config::{LaneType, ScenarioConfig},
    simulation::{
        Direction, IntelligentDriver, LaneChangeAdvisor, LaneKind, Mobil, RoadSegment, TrafficManager,
        Vehicle, VehicleId,
    },
};
use anyhow::Result;
use std::sync::Arc;

const ROAD: &str = r#"
[road]
name = "test road"
length = 600.0

[[road.lanes]]
type = "entrance"

[[road.lanes]]

[[road.lanes]]
type = "regular"
"#;

const VEHICLES: &str = r#"
[scenario]
vehicles_per_lane = 8
mean_spacing = 30.0
spacing_stddev = 8.0
speed_stddev = 0.1

[random]
seed = 7

[[vehicle_types]]
id = "car"
weight = 70
length = 5.0

[vehicle_types.idm]
desired_speed = 33.3
time_headway = 1.5
minimum_spacing = 2.0
max_acceleration = 1.4
comfortable_deceleration = 2.0

[vehicle_types.lane_change.mobil]
minimum_gap = 2.0
safe_deceleration = 4.0
politeness = 0.2
threshold_acceleration = 0.1
right_bias_acceleration = 0.1

[[vehicle_types]]
id = "truck"
weight = 30
length = 16.0

[vehicle_types.idm]
desired_speed = 22.2
time_headway = 1.8
minimum_spacing = 4.0
max_acceleration = 0.7
comfortable_deceleration = 1.5

[vehicle_types.lane_change]
"#;

fn vehicle(id: usize, lane: usize, position: f64, speed: f64) -> Vehicle {
    Vehicle::new(
        VehicleId(id),
        lane,
        position,
        speed,
        5.0,
        Arc::new(IntelligentDriver::new(33.3, 1.5, 2.0, 1.4, 2.0)),
        Mobil::from_values(2.0, 4.0, 0.2, 0.1, 0.1).unwrap(),
    )
}

#[test]
fn parses_road_and_vehicle_config() -> Result<()> {
    let config = ScenarioConfig::from_toml_str(ROAD, VEHICLES)?;

    let lane_types: Vec<LaneType> = config.road.road.lanes.iter().map(|l| l.lane_type).collect();
    assert_eq!(lane_types, vec![LaneType::Entrance, LaneType::Regular, LaneType::Regular]);
    assert_eq!(config.vehicles.random.seed, Some(7));
    assert_eq!(config.vehicles.vehicle_types[0].idm.exponent, 4.0);
    assert!(!config.vehicles.vehicle_types[0].idm.no_passing_on_right);
    assert!(config.vehicles.vehicle_types[1].lane_change.mobil.is_none());
    Ok(())
}

#[test]
fn loads_shipped_config_files() -> Result<()> {
    let config = ScenarioConfig::load_from_files("road.toml", "vehicles.toml")?;
    assert!(!config.road.road.lanes.is_empty());
    assert!(!config.vehicles.vehicle_types.is_empty());
    Ok(())
}

#[test]
fn rejects_politeness_out_of_range() {
    let vehicles = VEHICLES.replace("politeness = 0.2", "politeness = 1.2");
    let err = ScenarioConfig::from_toml_str(ROAD, &vehicles).unwrap_err();
    assert!(err.to_string().contains("politeness"), "{}", err);
}

#[test]
fn rejects_negative_minimum_gap() {
    let vehicles = VEHICLES.replace("minimum_gap = 2.0", "minimum_gap = -1.0");
    assert!(ScenarioConfig::from_toml_str(ROAD, &vehicles).is_err());
}

#[test]
fn rejects_weights_not_summing_to_100() {
    let vehicles = VEHICLES.replace("weight = 30", "weight = 40");
    let err = ScenarioConfig::from_toml_str(ROAD, &vehicles).unwrap_err();
    assert!(err.to_string().contains("sum to 100"), "{}", err);
}

#[test]
fn rejects_road_without_regular_lane() {
    let road = r#"
[road]
name = "ramp only"
length = 100.0

[[road.lanes]]
type = "entrance"
"#;
    assert!(ScenarioConfig::from_toml_str(road, VEHICLES).is_err());
}

#[test]
fn populated_road_is_reproducible_with_seed() -> Result<()> {
    let config = ScenarioConfig::from_toml_str(ROAD, VEHICLES)?;

    let first = TrafficManager::new(config.clone(), Some(7)).populate()?;
    let second = TrafficManager::new(config, Some(7)).populate()?;

    let layout = |road: &RoadSegment| -> Vec<(usize, usize, u64, u64)> {
        road.vehicles()
            .map(|v| (v.id.0, v.lane, v.position.to_bits(), v.speed.to_bits()))
            .collect()
    };
    assert_eq!(layout(&first), layout(&second));

    assert_eq!(first.lane_count(), 3);
    assert!(first.lane(0).unwrap().is_empty(), "entrance lanes stay empty");
    assert!(first.vehicle_count() > 0);
    Ok(())
}

#[test]
fn populated_lanes_do_not_overlap() -> Result<()> {
    let config = ScenarioConfig::from_toml_str(ROAD, VEHICLES)?;
    let road = TrafficManager::new(config, Some(11)).populate()?;

    for lane in road.lanes() {
        for pair in lane.vehicles().windows(2) {
            let (front, back) = (&pair[0], &pair[1]);
            assert!(back.net_distance_to(Some(front)) >= 0.0);
            assert!(back.rear_position() >= 0.0);
        }
    }
    Ok(())
}

#[test]
fn advisor_picks_the_better_direction() {
    // Blocked ahead in lane 1; lane 0 free, lane 2 has a slow leader
    let mut road = RoadSegment::with_regular_lanes(1000.0, 3);
    road.add_vehicle(1, vehicle(1, 1, 100.0, 20.0));
    road.add_vehicle(1, vehicle(2, 1, 125.0, 10.0));
    road.add_vehicle(2, vehicle(3, 2, 160.0, 15.0));

    let advisor = LaneChangeAdvisor::new();
    let me = road.get_vehicle(VehicleId(1)).unwrap();

    let evaluations = advisor.evaluate_directions(me, &road);
    assert_eq!(evaluations.len(), 2);

    let proposal = advisor.decide(me, &road).expect("a lane change is attractive");
    assert_eq!(proposal.vehicle, VehicleId(1));
    assert_eq!(proposal.direction, Direction::Right);

    let left = evaluations.iter().find(|(d, _)| *d == Direction::Left).and_then(|(_, e)| e.balance()).unwrap();
    assert!(proposal.balance > left);
}

#[test]
fn advisor_skips_vehicles_changing_lane() {
    let mut road = RoadSegment::with_regular_lanes(1000.0, 2);
    road.add_vehicle(1, vehicle(1, 1, 100.0, 20.0));
    road.add_vehicle(1, vehicle(2, 1, 125.0, 10.0));

    let advisor = LaneChangeAdvisor::new();
    assert!(advisor.decide(road.get_vehicle(VehicleId(1)).unwrap(), &road).is_some());

    road.get_vehicle_mut(VehicleId(1)).unwrap().lane_change_in_progress = true;
    assert!(advisor.decide(road.get_vehicle(VehicleId(1)).unwrap(), &road).is_none());
}

#[test]
fn advisor_ignores_entrance_lane() {
    let mut road = RoadSegment::new(1000.0, &[LaneKind::Entrance, LaneKind::Regular]);
    road.add_vehicle(1, vehicle(1, 1, 100.0, 20.0));
    road.add_vehicle(1, vehicle(2, 1, 125.0, 10.0));

    let advisor = LaneChangeAdvisor::new();
    let me = road.get_vehicle(VehicleId(1)).unwrap();
    assert!(advisor.decide(me, &road).is_none());
    assert!(advisor.evaluate_directions(me, &road)[0].1.is_blocked());
}

#[test]
fn propose_all_leaves_road_unchanged() -> Result<()> {
    let config = ScenarioConfig::from_toml_str(ROAD, VEHICLES)?;
    let road = TrafficManager::new(config, Some(3)).populate()?;
    let lanes_before: Vec<usize> = road.lanes().iter().map(|l| l.len()).collect();

    let advisor = LaneChangeAdvisor::new();
    let first = advisor.propose_all(&road);
    let second = advisor.propose_all(&road);

    assert_eq!(first, second);
    assert!(first.iter().all(|p| p.balance > 0.0));
    let lanes_after: Vec<usize> = road.lanes().iter().map(|l| l.len()).collect();
    assert_eq!(lanes_before, lanes_after);
    Ok(())
}
