use std::sync::Arc;

pub mod acceleration;
pub mod behavior;
pub mod lane_change;
pub mod road;
pub mod scratch;
pub mod traffic;

pub use acceleration::*;
pub use behavior::*;
pub use lane_change::*;
pub use road::*;
pub use scratch::*;
pub use traffic::*;

/// Net gap reported when there is no vehicle to measure against.
pub const GAP_INFINITY: f64 = f64::INFINITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VehicleId(pub usize);

/// A vehicle on a road segment.
///
/// `position` is the longitudinal coordinate of the front bumper. Lane indices
/// grow towards the left, lane 0 being the rightmost lane.
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub id: VehicleId,
    pub position: f64,
    pub speed: f64,
    pub length: f64,
    pub lane: usize,
    pub lane_change_in_progress: bool,
    acceleration_model: Arc<dyn AccelerationModel>,
    lane_change_model: Mobil,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        lane: usize,
        position: f64,
        speed: f64,
        length: f64,
        acceleration_model: Arc<dyn AccelerationModel>,
        lane_change_model: Mobil,
    ) -> Self {
        Self {
            id,
            position,
            speed,
            length,
            lane,
            lane_change_in_progress: false,
            acceleration_model,
            lane_change_model,
        }
    }

    pub fn rear_position(&self) -> f64 {
        self.position - self.length
    }

    pub fn is_changing_lane(&self) -> bool {
        self.lane_change_in_progress
    }

    /// Bumper-to-bumper distance to `front`, or [`GAP_INFINITY`] when there is
    /// no such vehicle.
    pub fn net_distance_to(&self, front: Option<&Vehicle>) -> f64 {
        match front {
            Some(front) => front.rear_position() - self.position,
            None => GAP_INFINITY,
        }
    }

    pub fn acceleration_model(&self) -> &dyn AccelerationModel {
        self.acceleration_model.as_ref()
    }

    pub fn lane_change_model(&self) -> &Mobil {
        &self.lane_change_model
    }

    /// Acceleration this vehicle would have in `own` with `left` as its left
    /// neighbour lane.
    pub fn acceleration(&self, own: &dyn LaneView, left: Option<&dyn LaneView>) -> f64 {
        self.acceleration_model.acceleration(self, own, left)
    }

    pub fn evaluate_lane_change(&self, direction: Direction, road: &RoadSegment) -> Evaluation {
        self.lane_change_model.evaluate(self, direction, road)
    }
}
