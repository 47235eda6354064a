use super::{Vehicle, VehicleId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneKind {
    Regular,
    Entrance,
    Exit,
}

/// Read access to an ordering of vehicles in one lane.
///
/// Implemented by the live [`LaneSegment`] and by the per-call
/// [`ScratchLane`](super::ScratchLane) snapshots, so the acceleration model
/// cannot tell a hypothetical lane from a real one.
pub trait LaneView {
    fn index(&self) -> usize;

    fn kind(&self) -> LaneKind;

    /// Closest vehicle strictly ahead of `probe`, ignoring `probe` itself.
    fn front_of(&self, probe: &Vehicle) -> Option<&Vehicle>;

    /// Closest vehicle at or behind `probe`, ignoring `probe` itself.
    fn rear_of(&self, probe: &Vehicle) -> Option<&Vehicle>;
}

pub(crate) fn front_among<'a>(
    vehicles: impl Iterator<Item = &'a Vehicle>,
    probe: &Vehicle,
) -> Option<&'a Vehicle> {
    vehicles
        .filter(|v| v.id != probe.id && v.position > probe.position)
        .min_by(|a, b| a.position.total_cmp(&b.position))
}

pub(crate) fn rear_among<'a>(
    vehicles: impl Iterator<Item = &'a Vehicle>,
    probe: &Vehicle,
) -> Option<&'a Vehicle> {
    vehicles
        .filter(|v| v.id != probe.id && v.position <= probe.position)
        .max_by(|a, b| a.position.total_cmp(&b.position))
}

#[derive(Debug, Clone)]
pub struct LaneSegment {
    index: usize,
    kind: LaneKind,
    vehicles: Vec<Vehicle>, // Front first
}

impl LaneSegment {
    pub fn new(index: usize, kind: LaneKind) -> Self {
        Self {
            index,
            kind,
            vehicles: Vec::new(),
        }
    }

    /// Inserts `vehicle`, keeping the lane ordered front first.
    pub fn add_vehicle(&mut self, mut vehicle: Vehicle) {
        vehicle.lane = self.index;
        let pos = self
            .vehicles
            .iter()
            .position(|v| v.position < vehicle.position)
            .unwrap_or(self.vehicles.len());
        self.vehicles.insert(pos, vehicle);
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    pub fn get_vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.vehicles.iter_mut().find(|v| v.id == id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

impl LaneView for LaneSegment {
    fn index(&self) -> usize {
        self.index
    }

    fn kind(&self) -> LaneKind {
        self.kind
    }

    fn front_of(&self, probe: &Vehicle) -> Option<&Vehicle> {
        front_among(self.vehicles.iter(), probe)
    }

    fn rear_of(&self, probe: &Vehicle) -> Option<&Vehicle> {
        rear_among(self.vehicles.iter(), probe)
    }
}

/// One stretch of road: its lanes, indexed from the rightmost (0) leftwards.
#[derive(Debug, Clone)]
pub struct RoadSegment {
    length: f64,
    lanes: Vec<LaneSegment>,
}

impl RoadSegment {
    pub fn new(length: f64, kinds: &[LaneKind]) -> Self {
        let lanes = kinds
            .iter()
            .enumerate()
            .map(|(index, kind)| LaneSegment::new(index, *kind))
            .collect();
        Self { length, lanes }
    }

    /// A road of `lane_count` regular lanes.
    pub fn with_regular_lanes(length: f64, lane_count: usize) -> Self {
        Self::new(length, &vec![LaneKind::Regular; lane_count])
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    pub fn lane(&self, index: usize) -> Option<&LaneSegment> {
        self.lanes.get(index)
    }

    pub fn lanes(&self) -> &[LaneSegment] {
        &self.lanes
    }

    /// Lane `offset` steps from `index` (positive is leftwards), if it exists.
    pub fn lane_at_offset(&self, index: usize, offset: isize) -> Option<&LaneSegment> {
        index
            .checked_add_signed(offset)
            .and_then(|target| self.lane(target))
    }

    /// Places `vehicle` into lane `lane`, returning `false` if the lane does not exist.
    pub fn add_vehicle(&mut self, lane: usize, vehicle: Vehicle) -> bool {
        match self.lanes.get_mut(lane) {
            Some(segment) => {
                segment.add_vehicle(vehicle);
                true
            }
            None => false,
        }
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.lanes.iter().flat_map(|lane| lane.vehicles.iter())
    }

    pub fn get_vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.lanes.iter().find_map(|lane| lane.get_vehicle(id))
    }

    pub fn get_vehicle_mut(&mut self, id: VehicleId) -> Option<&mut Vehicle> {
        self.lanes.iter_mut().find_map(|lane| lane.get_vehicle_mut(id))
    }

    pub fn vehicle_count(&self) -> usize {
        self.lanes.iter().map(LaneSegment::len).sum()
    }
}
