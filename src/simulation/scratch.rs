//! Throwaway lane orderings used to ask "what would this vehicle's
//! acceleration be if...".
//!
//! A [`ScratchLane`] borrows at most [`SCRATCH_CAPACITY`] vehicles from the
//! live road and lives only for the evaluation that built it. Which lane a
//! probe sees as its left neighbour depends on the move direction; that rule
//! is spelled out as two tables, [`before_move_left_context`] and
//! [`after_move_left_context`].

use super::road::{front_among, rear_among};
use super::{Direction, LaneKind, LaneSegment, LaneView, RoadSegment, Vehicle};

pub const SCRATCH_CAPACITY: usize = 2;

#[derive(Debug, Clone, Copy)]
pub struct ScratchLane<'a> {
    index: usize,
    slots: [Option<&'a Vehicle>; SCRATCH_CAPACITY],
}

impl<'a> ScratchLane<'a> {
    pub fn new(index: usize) -> Self {
        Self {
            index,
            slots: [None; SCRATCH_CAPACITY],
        }
    }

    /// Testwise insertion. Absent vehicles are skipped.
    pub fn with_vehicle(mut self, vehicle: Option<&'a Vehicle>) -> Self {
        let Some(vehicle) = vehicle else {
            return self;
        };
        let slot = self.slots.iter_mut().find(|slot| slot.is_none());
        debug_assert!(slot.is_some(), "scratch lane {} is full", self.index);
        if let Some(slot) = slot {
            *slot = Some(vehicle);
        }
        self
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &'a Vehicle> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl LaneView for ScratchLane<'_> {
    fn index(&self) -> usize {
        self.index
    }

    fn kind(&self) -> LaneKind {
        LaneKind::Regular
    }

    fn front_of(&self, probe: &Vehicle) -> Option<&Vehicle> {
        front_among(self.vehicles(), probe)
    }

    fn rear_of(&self, probe: &Vehicle) -> Option<&Vehicle> {
        rear_among(self.vehicles(), probe)
    }
}

/// Whose acceleration a probe computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Probe {
    /// The vehicle considering the lane change.
    Ego,
    /// Its follower in the lane it would leave.
    OldFollower,
    /// Its follower in the lane it would enter.
    NewFollower,
}

/// Where a probe's left-neighbour lane comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeftContext {
    /// Live lane this many steps (leftwards positive) from the acting
    /// vehicle's current lane. Absent when the index is off the road.
    Live(isize),
    /// The acting vehicle's current lane holding only its current leader.
    OriginalLaneWithOldFront,
    /// No left neighbour at all.
    Absent,
}

pub const fn before_move_left_context(direction: Direction, probe: Probe) -> LeftContext {
    match probe {
        Probe::Ego | Probe::OldFollower => LeftContext::Live(1),
        Probe::NewFollower => LeftContext::Live(direction.lane_offset() + 1),
    }
}

pub const fn after_move_left_context(direction: Direction, probe: Probe) -> LeftContext {
    match (direction, probe) {
        (Direction::Left, _) => LeftContext::Live(2),
        (Direction::Right, Probe::Ego) => LeftContext::OriginalLaneWithOldFront,
        (Direction::Right, Probe::OldFollower) => LeftContext::Live(1),
        (Direction::Right, Probe::NewFollower) => LeftContext::Absent,
    }
}

/// A resolved left-neighbour lane.
#[derive(Debug, Clone, Copy)]
pub enum LeftLane<'a> {
    Live(&'a LaneSegment),
    Scratch(ScratchLane<'a>),
}

impl<'a> LeftLane<'a> {
    pub fn resolve(
        context: LeftContext,
        road: &'a RoadSegment,
        current_lane: usize,
        old_front: Option<&'a Vehicle>,
    ) -> Option<Self> {
        match context {
            LeftContext::Live(offset) => road.lane_at_offset(current_lane, offset).map(LeftLane::Live),
            LeftContext::OriginalLaneWithOldFront => Some(LeftLane::Scratch(
                ScratchLane::new(current_lane).with_vehicle(old_front),
            )),
            LeftContext::Absent => None,
        }
    }

    pub fn as_view(&self) -> &dyn LaneView {
        match self {
            LeftLane::Live(lane) => *lane,
            LeftLane::Scratch(lane) => lane,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::{IntelligentDriver, Mobil, VehicleId};
    use std::sync::Arc;

    fn vehicle(id: usize, position: f64) -> Vehicle {
        Vehicle::new(
            VehicleId(id),
            0,
            position,
            20.0,
            5.0,
            Arc::new(IntelligentDriver::new(30.0, 1.5, 2.0, 1.0, 1.5)),
            Mobil::unconfigured(),
        )
    }

    #[test]
    fn left_move_uses_lane_two_to_the_left_for_every_probe() {
        for probe in [Probe::Ego, Probe::OldFollower, Probe::NewFollower] {
            assert_eq!(after_move_left_context(Direction::Left, probe), LeftContext::Live(2));
        }
    }

    #[test]
    fn right_move_context_depends_on_probe() {
        assert_eq!(
            after_move_left_context(Direction::Right, Probe::Ego),
            LeftContext::OriginalLaneWithOldFront
        );
        assert_eq!(
            after_move_left_context(Direction::Right, Probe::OldFollower),
            LeftContext::Live(1)
        );
        assert_eq!(
            after_move_left_context(Direction::Right, Probe::NewFollower),
            LeftContext::Absent
        );
    }

    #[test]
    fn before_move_contexts() {
        for direction in [Direction::Left, Direction::Right] {
            assert_eq!(before_move_left_context(direction, Probe::Ego), LeftContext::Live(1));
            assert_eq!(before_move_left_context(direction, Probe::OldFollower), LeftContext::Live(1));
        }
        assert_eq!(before_move_left_context(Direction::Left, Probe::NewFollower), LeftContext::Live(2));
        assert_eq!(before_move_left_context(Direction::Right, Probe::NewFollower), LeftContext::Live(0));
    }

    #[test]
    fn live_context_off_the_road_is_absent() {
        let road = RoadSegment::with_regular_lanes(500.0, 2);
        assert!(LeftLane::resolve(LeftContext::Live(2), &road, 1, None).is_none());
        assert!(LeftLane::resolve(LeftContext::Live(-2), &road, 1, None).is_none());
        assert!(LeftLane::resolve(LeftContext::Absent, &road, 1, None).is_none());
        let lane = LeftLane::resolve(LeftContext::Live(1), &road, 0, None).map(|l| l.as_view().index());
        assert_eq!(lane, Some(1));
    }

    #[test]
    fn original_lane_context_holds_only_the_old_front() {
        let road = RoadSegment::with_regular_lanes(500.0, 2);
        let front = vehicle(1, 150.0);
        let me = vehicle(2, 100.0);
        let lane = LeftLane::resolve(LeftContext::OriginalLaneWithOldFront, &road, 1, Some(&front))
            .expect("scratch context always resolves");
        let view = lane.as_view();
        assert_eq!(view.index(), 1);
        assert_eq!(view.front_of(&me).map(|v| v.id), Some(VehicleId(1)));
        assert!(view.rear_of(&me).is_none());
    }

    #[test]
    fn scratch_lane_orders_by_position_and_skips_absent() {
        let leader = vehicle(1, 150.0);
        let follower = vehicle(2, 90.0);
        let probe = vehicle(3, 120.0);
        let lane = ScratchLane::new(0)
            .with_vehicle(None)
            .with_vehicle(Some(&leader))
            .with_vehicle(Some(&follower));

        assert_eq!(lane.len(), 2);
        assert_eq!(lane.front_of(&probe).map(|v| v.id), Some(VehicleId(1)));
        assert_eq!(lane.rear_of(&probe).map(|v| v.id), Some(VehicleId(2)));
        assert!(lane.front_of(&leader).is_none());
        assert!(lane.rear_of(&follower).is_none());
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "scratch lane 0 is full")]
    fn third_vehicle_overflows_scratch_lane() {
        let vehicles = [vehicle(1, 150.0), vehicle(2, 120.0), vehicle(3, 90.0)];
        let _ = vehicles
            .iter()
            .fold(ScratchLane::new(0), |lane, v| lane.with_vehicle(Some(v)));
    }
}
