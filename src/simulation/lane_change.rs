//! MOBIL ("Minimizing Overall Braking Induced by Lane changes").
//!
//! For one vehicle and one candidate direction, [`Mobil::evaluate`] first runs
//! a chain of cheap safety checks and, if they all pass, compares six
//! hypothetical accelerations (the vehicle, its current follower and its
//! prospective follower, each before and after the move) into one signed
//! incentive balance. Nothing on the live road is touched: the "after"
//! situations are [`ScratchLane`] snapshots that die with the call.

use super::{
    after_move_left_context, before_move_left_context, LaneKind, LaneSegment, LaneView, LeftLane,
    Probe, RoadSegment, ScratchLane, Vehicle, GAP_INFINITY,
};
use crate::config::MobilConfig;
use crate::error::{ParameterError, ParameterResult};
use log::{debug, warn};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    /// +1 for left, -1 for right. Only the bias term uses it.
    pub const fn sign(self) -> f64 {
        match self {
            Direction::Left => 1.0,
            Direction::Right => -1.0,
        }
    }

    /// Change of lane index when moving this way.
    pub const fn lane_offset(self) -> isize {
        match self {
            Direction::Left => 1,
            Direction::Right => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "left"),
            Direction::Right => write!(f, "right"),
        }
    }
}

/// Calibration of one driver's lane-change behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MobilParameters {
    /// Weight of the followers' advantage, in `[0, 1]`.
    pub politeness: f64,
    /// Minimum own advantage (m/s²) before changing at all.
    pub threshold: f64,
    /// Most braking (m/s², magnitude) a new follower may be forced into.
    pub safe_deceleration: f64,
    /// Minimum net gap (m) to the new leader and the new follower.
    pub minimum_gap: f64,
    /// Preference (m/s²) for the right lane.
    pub right_bias: f64,
}

impl MobilParameters {
    pub fn new(
        minimum_gap: f64,
        safe_deceleration: f64,
        politeness: f64,
        threshold: f64,
        right_bias: f64,
    ) -> ParameterResult<Self> {
        let params = Self {
            politeness,
            threshold,
            safe_deceleration,
            minimum_gap,
            right_bias,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> ParameterResult<()> {
        for (name, value) in [
            ("politeness", self.politeness),
            ("threshold", self.threshold),
            ("safe deceleration", self.safe_deceleration),
            ("minimum gap", self.minimum_gap),
            ("right bias", self.right_bias),
        ] {
            if !value.is_finite() {
                return Err(ParameterError::NotFinite { name, value });
            }
        }

        if !(0.0..=1.0).contains(&self.politeness) {
            return Err(ParameterError::Politeness(self.politeness));
        }
        if self.safe_deceleration < 0.0 {
            return Err(ParameterError::SafeDeceleration(self.safe_deceleration));
        }
        if self.minimum_gap < 0.0 {
            return Err(ParameterError::MinimumGap(self.minimum_gap));
        }
        Ok(())
    }
}

impl TryFrom<&MobilConfig> for MobilParameters {
    type Error = ParameterError;

    fn try_from(config: &MobilConfig) -> ParameterResult<Self> {
        Self::new(
            config.minimum_gap,
            config.safe_deceleration,
            config.politeness,
            config.threshold_acceleration,
            config.right_bias_acceleration,
        )
    }
}

/// Why a lane change was ruled out before any incentive was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockReason {
    /// No lane in that direction, or the vehicle's own lane is unknown.
    NoSuchLane,
    /// Candidate lane is an on-ramp.
    EntranceLane,
    /// Current leader, new leader or new follower is itself changing lanes.
    NeighborChangingLane,
    /// Net gap to the new leader or from the new follower is below the minimum.
    InsufficientGap,
    /// The new follower would have to brake harder than the safe deceleration.
    UnsafeDeceleration,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let reason = match self {
            BlockReason::NoSuchLane => "no such lane",
            BlockReason::EntranceLane => "entrance lane",
            BlockReason::NeighborChangingLane => "neighbour changing lane",
            BlockReason::InsufficientGap => "insufficient gap",
            BlockReason::UnsafeDeceleration => "unsafe deceleration",
        };
        f.write_str(reason)
    }
}

/// Result of evaluating one candidate lane change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Evaluation {
    Blocked(BlockReason),
    /// Incentive balance; the change is attractive when it is positive.
    Balance(f64),
}

impl Evaluation {
    pub fn balance(&self) -> Option<f64> {
        match self {
            Evaluation::Balance(balance) => Some(*balance),
            Evaluation::Blocked(_) => None,
        }
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, Evaluation::Blocked(_))
    }

    pub fn block_reason(&self) -> Option<BlockReason> {
        match self {
            Evaluation::Blocked(reason) => Some(*reason),
            Evaluation::Balance(_) => None,
        }
    }
}

/// Neighbourhood of a vehicle that cleared the safety gate.
#[derive(Debug, Clone, Copy)]
pub struct Clearance<'a> {
    pub current_lane: &'a LaneSegment,
    pub target_lane: &'a LaneSegment,
    pub old_front: Option<&'a Vehicle>,
    pub new_front: Option<&'a Vehicle>,
    pub new_back: Option<&'a Vehicle>,
    /// Acceleration of `new_back` behind the acting vehicle; 0 without one.
    pub new_back_new_acc: f64,
}

/// The MOBIL lane-change model.
///
/// Holds only its parameters; the acting vehicle and road are passed in on
/// every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Mobil {
    params: MobilParameters,
    reference: MobilParameters,
}

impl Mobil {
    pub fn new(params: MobilParameters) -> Self {
        Self {
            params,
            reference: params,
        }
    }

    pub fn from_values(
        minimum_gap: f64,
        safe_deceleration: f64,
        politeness: f64,
        threshold_acceleration: f64,
        right_bias_acceleration: f64,
    ) -> ParameterResult<Self> {
        MobilParameters::new(
            minimum_gap,
            safe_deceleration,
            politeness,
            threshold_acceleration,
            right_bias_acceleration,
        )
        .map(Self::new)
    }

    /// A model with every parameter at zero.
    ///
    /// This is a placeholder for vehicles without lane-change calibration and
    /// is not a supported configuration: with a zero safe deceleration any
    /// braking follower blocks the change.
    pub fn unconfigured() -> Self {
        warn!("MOBIL model created without parameters; all values default to zero");
        Self::new(MobilParameters::default())
    }

    pub fn parameters(&self) -> &MobilParameters {
        &self.params
    }

    /// Copy of the parameters as first configured. Nothing adjusts the live
    /// parameters yet, so both are always equal.
    pub fn reference_parameters(&self) -> &MobilParameters {
        &self.reference
    }

    pub fn minimum_gap(&self) -> f64 {
        self.params.minimum_gap
    }

    pub fn safe_deceleration(&self) -> f64 {
        self.params.safe_deceleration
    }

    /// Cheap checks run before any incentive is computed, in order:
    /// entrance lane, neighbours mid-change, net gaps, new follower's braking.
    pub fn safety_gate<'a>(
        &self,
        me: &'a Vehicle,
        direction: Direction,
        road: &'a RoadSegment,
    ) -> Result<Clearance<'a>, BlockReason> {
        let current = me.lane;
        let current_lane = road.lane(current).ok_or(BlockReason::NoSuchLane)?;
        let target_lane = road
            .lane_at_offset(current, direction.lane_offset())
            .ok_or(BlockReason::NoSuchLane)?;

        if target_lane.kind() == LaneKind::Entrance {
            return Err(BlockReason::EntranceLane);
        }

        let new_front = target_lane.front_of(me);
        let new_back = target_lane.rear_of(me);
        let old_front = current_lane.front_of(me);

        if [old_front, new_front, new_back]
            .into_iter()
            .flatten()
            .any(Vehicle::is_changing_lane)
        {
            return Err(BlockReason::NeighborChangingLane);
        }

        let gap_front = me.net_distance_to(new_front);
        let gap_back = new_back.map_or(GAP_INFINITY, |back| back.net_distance_to(Some(me)));
        if gap_front < self.params.minimum_gap || gap_back < self.params.minimum_gap {
            return Err(BlockReason::InsufficientGap);
        }

        let new_back_new_acc = match new_back {
            Some(back) => {
                let situation = ScratchLane::new(current)
                    .with_vehicle(Some(me))
                    .with_vehicle(Some(back));
                let left = LeftLane::resolve(
                    after_move_left_context(direction, Probe::NewFollower),
                    road,
                    current,
                    old_front,
                );
                let acc = back.acceleration(&situation, left.as_ref().map(LeftLane::as_view));
                if acc <= -self.params.safe_deceleration {
                    return Err(BlockReason::UnsafeDeceleration);
                }
                acc
            }
            None => 0.0,
        };

        Ok(Clearance {
            current_lane,
            target_lane,
            old_front,
            new_front,
            new_back,
            new_back_new_acc,
        })
    }

    /// Incentive balance of moving `me` one lane in `direction`:
    ///
    /// `Δme + politeness · (Δold_back + Δnew_back) − threshold − sign · right_bias`
    pub fn evaluate(&self, me: &Vehicle, direction: Direction, road: &RoadSegment) -> Evaluation {
        let clearance = match self.safety_gate(me, direction, road) {
            Ok(clearance) => clearance,
            Err(reason) => {
                debug!("Vehicle {} blocked from moving {}: {}", me.id.0, direction, reason);
                return Evaluation::Blocked(reason);
            }
        };

        let current = me.lane;
        let left_lane = |probe, before: bool| {
            let context = if before {
                before_move_left_context(direction, probe)
            } else {
                after_move_left_context(direction, probe)
            };
            LeftLane::resolve(context, road, current, clearance.old_front)
        };

        let own_lane: &dyn LaneView = clearance.current_lane;
        let old_back = own_lane.rear_of(me);

        // Current situation, read straight from the live lanes
        let me_left = left_lane(Probe::Ego, true);
        let me_old_acc = me.acceleration(own_lane, me_left.as_ref().map(LeftLane::as_view));

        let old_back_left = left_lane(Probe::OldFollower, true);
        let old_back_old_acc = old_back.map_or(0.0, |back| {
            back.acceleration(own_lane, old_back_left.as_ref().map(LeftLane::as_view))
        });

        let new_back_left = left_lane(Probe::NewFollower, true);
        let new_back_old_acc = clearance.new_back.map_or(0.0, |back| {
            back.acceleration(clearance.target_lane, new_back_left.as_ref().map(LeftLane::as_view))
        });

        // Prospective situation
        let me_situation = ScratchLane::new(current)
            .with_vehicle(clearance.new_front)
            .with_vehicle(Some(me));
        let me_new_left = left_lane(Probe::Ego, false);
        let me_new_acc = me.acceleration(&me_situation, me_new_left.as_ref().map(LeftLane::as_view));

        let old_back_new_acc = old_back.map_or(0.0, |back| {
            let situation = ScratchLane::new(current)
                .with_vehicle(clearance.old_front)
                .with_vehicle(Some(back));
            let left = left_lane(Probe::OldFollower, false);
            back.acceleration(&situation, left.as_ref().map(LeftLane::as_view))
        });

        let me_diff = me_new_acc - me_old_acc;
        let old_back_diff = old_back_new_acc - old_back_old_acc;
        let new_back_diff = clearance.new_back_new_acc - new_back_old_acc;

        let balance = me_diff + self.params.politeness * (old_back_diff + new_back_diff)
            - self.params.threshold
            - direction.sign() * self.params.right_bias;

        debug!(
            "Vehicle {} moving {}: balance {:.3} (me {:.3}, old back {:.3}, new back {:.3})",
            me.id.0, direction, balance, me_diff, old_back_diff, new_back_diff
        );

        Evaluation::Balance(balance)
    }
}
