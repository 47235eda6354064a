use super::{LaneView, Vehicle};
use crate::config::IdmConfig;
use std::fmt::Debug;

/// Car-following model: how hard a vehicle accelerates in a given lane context.
///
/// The lane-change model treats this as an oracle and calls it on both live
/// and scratch lanes, so implementations must only look at what the views
/// expose.
pub trait AccelerationModel: Send + Sync + Debug {
    fn acceleration(&self, me: &Vehicle, own: &dyn LaneView, left: Option<&dyn LaneView>) -> f64;
}

/// Intelligent Driver Model.
#[derive(Debug, Clone, PartialEq)]
pub struct IntelligentDriver {
    pub desired_speed: f64,
    pub time_headway: f64,
    pub minimum_spacing: f64,
    pub max_acceleration: f64,
    pub comfortable_deceleration: f64,
    pub exponent: f64,
    /// Never drive faster than a slower leader in the left lane.
    pub no_passing_on_right: bool,
}

impl IntelligentDriver {
    pub fn new(
        desired_speed: f64,
        time_headway: f64,
        minimum_spacing: f64,
        max_acceleration: f64,
        comfortable_deceleration: f64,
    ) -> Self {
        Self {
            desired_speed,
            time_headway,
            minimum_spacing,
            max_acceleration,
            comfortable_deceleration,
            exponent: 4.0,
            no_passing_on_right: false,
        }
    }

    pub fn with_no_passing_on_right(mut self, enabled: bool) -> Self {
        self.no_passing_on_right = enabled;
        self
    }

    /// IDM response for `speed` at net `gap` behind a leader approached at
    /// `approaching_rate` (own speed minus leader speed).
    pub fn acceleration_for(&self, speed: f64, gap: f64, approaching_rate: f64) -> f64 {
        let free_road = 1.0 - (speed / self.desired_speed).powf(self.exponent);

        if gap.is_infinite() {
            return self.max_acceleration * free_road;
        }

        let dynamic = speed * self.time_headway
            + speed * approaching_rate
                / (2.0 * (self.max_acceleration * self.comfortable_deceleration).sqrt());
        let s_star = self.minimum_spacing + dynamic.max(0.0);
        let gap = gap.max(0.01);

        self.max_acceleration * (free_road - (s_star / gap).powi(2))
    }

    fn response_to(&self, me: &Vehicle, front: Option<&Vehicle>) -> f64 {
        let gap = me.net_distance_to(front);
        let approaching_rate = front.map_or(0.0, |f| me.speed - f.speed);
        self.acceleration_for(me.speed, gap, approaching_rate)
    }
}

impl From<&IdmConfig> for IntelligentDriver {
    fn from(config: &IdmConfig) -> Self {
        Self {
            desired_speed: config.desired_speed,
            time_headway: config.time_headway,
            minimum_spacing: config.minimum_spacing,
            max_acceleration: config.max_acceleration,
            comfortable_deceleration: config.comfortable_deceleration,
            exponent: config.exponent,
            no_passing_on_right: config.no_passing_on_right,
        }
    }
}

impl AccelerationModel for IntelligentDriver {
    fn acceleration(&self, me: &Vehicle, own: &dyn LaneView, left: Option<&dyn LaneView>) -> f64 {
        let acc = self.response_to(me, own.front_of(me));

        if !self.no_passing_on_right {
            return acc;
        }

        match left.and_then(|lane| lane.front_of(me)) {
            Some(left_front) if left_front.speed < me.speed => {
                acc.min(self.response_to(me, Some(left_front)))
            }
            _ => acc,
        }
    }
}
