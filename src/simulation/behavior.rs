use super::{Direction, Evaluation, RoadSegment, Vehicle, VehicleId};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneChangeProposal {
    pub vehicle: VehicleId,
    pub direction: Direction,
    pub balance: f64,
}

/// Turns per-direction MOBIL balances into at most one lane-change proposal
/// per vehicle. Proposals are only collected; committing them is up to the
/// caller.
#[derive(Debug, Clone, Default)]
pub struct LaneChangeAdvisor;

impl LaneChangeAdvisor {
    pub fn new() -> Self {
        Self
    }

    /// Both directions' evaluations for `vehicle`; directions without a lane
    /// are left out.
    pub fn evaluate_directions(&self, vehicle: &Vehicle, road: &RoadSegment) -> Vec<(Direction, Evaluation)> {
        [Direction::Left, Direction::Right]
            .into_iter()
            .filter(|direction| road.lane_at_offset(vehicle.lane, direction.lane_offset()).is_some())
            .map(|direction| (direction, vehicle.evaluate_lane_change(direction, road)))
            .collect()
    }

    /// The better of the two directions, if its balance is strictly positive.
    pub fn decide(&self, vehicle: &Vehicle, road: &RoadSegment) -> Option<LaneChangeProposal> {
        if vehicle.is_changing_lane() {
            return None;
        }

        let mut best: Option<LaneChangeProposal> = None;
        for (direction, evaluation) in self.evaluate_directions(vehicle, road) {
            let Some(balance) = evaluation.balance() else {
                continue;
            };
            if balance <= 0.0 {
                continue;
            }
            if best.map_or(true, |b| balance > b.balance) {
                best = Some(LaneChangeProposal {
                    vehicle: vehicle.id,
                    direction,
                    balance,
                });
            }
        }

        if let Some(proposal) = best {
            debug!(
                "Vehicle {} proposes moving {} (balance {:.3})",
                proposal.vehicle.0, proposal.direction, proposal.balance
            );
        }

        best
    }

    /// Collects proposals for every vehicle on `road` without changing it.
    pub fn propose_all(&self, road: &RoadSegment) -> Vec<LaneChangeProposal> {
        road.vehicles()
            .filter_map(|vehicle| self.decide(vehicle, road))
            .collect()
    }
}
