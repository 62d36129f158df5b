//! Mines and mine facilities
//!
//! A Mine tracks the ore deposit under a facility: total yield and what is
//! still available per lane, plus the player's per-lane toggles. The
//! MineFacility owns its Mine and the trucks hauling ore to the smelters.
//!
//! Haul capacity per turn:
//!   floor(traversal_constant / max(route_cost, 1.0)) * trucks
//! split over the four lanes as capacity / 4 each, with the whole remainder
//! (capacity % 4) added to the last lane.

use serde::{Deserialize, Serialize};

use crate::city::resources::{ResourceLane, ResourcePool};
use crate::core::config::SimulationConfig;

/// Extraction tier of a mine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MineProductionRate {
    Low,
    #[default]
    Medium,
    High,
}

impl MineProductionRate {
    /// Ore extracted per enabled lane per turn
    pub fn quantity(&self, config: &SimulationConfig) -> u32 {
        match self {
            MineProductionRate::Low => config.mine_rate_low,
            MineProductionRate::Medium => config.mine_rate_medium,
            MineProductionRate::High => config.mine_rate_high,
        }
    }

    /// Yield every lane gains when a new level is dug
    pub fn level_yield(&self, config: &SimulationConfig) -> u32 {
        match self {
            MineProductionRate::Low => config.mine_level_yield_low,
            MineProductionRate::Medium => config.mine_level_yield_medium,
            MineProductionRate::High => config.mine_level_yield_high,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MineProductionRate::Low => "Low",
            MineProductionRate::Medium => "Medium",
            MineProductionRate::High => "High",
        }
    }
}

/// Ore deposit
///
/// Invariant: every lane of `available` is at most the same lane of `total_yield`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mine {
    rate: MineProductionRate,
    total_yield: ResourcePool,
    available: ResourcePool,
    enabled: [bool; 4],
    depth: u32,
}

impl Mine {
    /// A freshly surveyed mine with one level dug
    pub fn new(rate: MineProductionRate, config: &SimulationConfig) -> Self {
        Self::with_yield(rate, ResourcePool::splat(rate.level_yield(config)))
    }

    pub fn with_yield(rate: MineProductionRate, yield_per_lane: ResourcePool) -> Self {
        Self {
            rate,
            total_yield: yield_per_lane,
            available: yield_per_lane,
            enabled: [true; 4],
            depth: 1,
        }
    }

    pub fn rate(&self) -> MineProductionRate {
        self.rate
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn total_yield(&self) -> ResourcePool {
        self.total_yield
    }

    pub fn available_resources(&self) -> ResourcePool {
        self.available
    }

    pub fn lane_enabled(&self, lane: ResourceLane) -> bool {
        self.enabled[lane.index()]
    }

    pub fn set_lane_enabled(&mut self, lane: ResourceLane, enabled: bool) {
        self.enabled[lane.index()] = enabled;
    }

    pub fn lane_exhausted(&self, lane: ResourceLane) -> bool {
        self.available.get(lane) == 0
    }

    /// Every lane has run dry
    pub fn exhausted(&self) -> bool {
        self.available.is_empty()
    }

    /// Enabled lanes that still hold ore
    pub fn active_lanes(&self) -> Vec<ResourceLane> {
        ResourceLane::ALL
            .into_iter()
            .filter(|l| self.lane_enabled(*l) && !self.lane_exhausted(*l))
            .collect()
    }

    /// Take up to `amount` ore from a lane, returns what was taken
    pub fn pull(&mut self, lane: ResourceLane, amount: u32) -> u32 {
        let taken = amount.min(self.available.get(lane));
        self.available.set(lane, self.available.get(lane) - taken);
        taken
    }

    /// Dig one more level: every lane gains `yield_per_lane`
    pub fn add_level(&mut self, yield_per_lane: u32) {
        let added = ResourcePool::splat(yield_per_lane);
        self.total_yield += added;
        self.available += added;
        self.depth += 1;
    }
}

/// Haul capacity for a route. No route hauls nothing.
pub fn haul_capacity(route_cost: Option<f32>, traversal_constant: u32, trucks: u32) -> u32 {
    match route_cost {
        Some(cost) => {
            let cost = cost.max(1.0);
            (traversal_constant as f32 / cost).floor() as u32 * trucks
        }
        None => 0,
    }
}

/// Split a haul capacity over the four lanes, remainder on the last lane
pub fn lane_allocation(capacity: u32) -> [u32; 4] {
    let base = capacity / 4;
    [base, base, base, base + capacity % 4]
}

/// Mine facility state: the deposit, the haul fleet and any dig in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MineFacility {
    mine: Mine,
    trucks: u32,
    extension_turns: Option<u32>,
    exhaustion_reported: bool,
}

impl MineFacility {
    pub fn new(mine: Mine) -> Self {
        Self {
            mine,
            trucks: 1,
            extension_turns: None,
            exhaustion_reported: false,
        }
    }

    pub fn mine(&self) -> &Mine {
        &self.mine
    }

    pub fn mine_mut(&mut self) -> &mut Mine {
        &mut self.mine
    }

    pub fn trucks(&self) -> u32 {
        self.trucks
    }

    /// Assign one more truck. `take_truck` pulls one from the shared
    /// inventory and is only called when the count is below `max_trucks`.
    pub fn add_truck(&mut self, max_trucks: u32, take_truck: impl FnOnce() -> bool) -> bool {
        if self.trucks >= max_trucks {
            return false;
        }
        if !take_truck() {
            return false;
        }
        self.trucks += 1;
        true
    }

    /// Release one truck. `return_truck` pushes it back into the shared
    /// inventory and is only called when more than one truck is assigned.
    pub fn remove_truck(&mut self, return_truck: impl FnOnce() -> bool) -> bool {
        if self.trucks <= 1 {
            return false;
        }
        if !return_truck() {
            return false;
        }
        self.trucks -= 1;
        true
    }

    pub fn extending(&self) -> bool {
        self.extension_turns.is_some()
    }

    pub fn extension_turns(&self) -> Option<u32> {
        self.extension_turns
    }

    pub fn can_extend(&self, max_depth: u32) -> bool {
        !self.extending() && self.mine.depth() < max_depth
    }

    /// Start digging a new level. Returns false if one is already being dug
    /// or the mine is at maximum depth.
    pub fn extend(&mut self, max_depth: u32) -> bool {
        if !self.can_extend(max_depth) {
            return false;
        }
        self.extension_turns = Some(0);
        true
    }

    /// Advance a dig in progress. Returns true on the turn the new level opens.
    pub fn tick_extension(&mut self, config: &SimulationConfig) -> bool {
        let turns = match self.extension_turns.as_mut() {
            Some(t) => t,
            None => return false,
        };

        *turns += 1;
        if *turns < config.mine_extension_turns {
            return false;
        }

        self.extension_turns = None;
        let level_yield = self.mine.rate().level_yield(config);
        self.mine.add_level(level_yield);
        self.exhaustion_reported = false;
        true
    }

    /// Marks exhaustion as reported; true only the first time
    pub fn report_exhaustion(&mut self) -> bool {
        !std::mem::replace(&mut self.exhaustion_reported, true)
    }

    /// Extract one turn of ore.
    ///
    /// Per enabled lane: min(rate quantity, the lane's haul share, remaining
    /// yield, remaining smelter demand). Demand is shared by all lanes and
    /// consumed in lane order.
    pub fn extract(&mut self, haul_capacity: u32, demand: u32, config: &SimulationConfig) -> ResourcePool {
        let rate = self.mine.rate().quantity(config);
        let allocation = lane_allocation(haul_capacity);
        let mut demand = demand;
        let mut ore = ResourcePool::default();

        for lane in self.mine.active_lanes() {
            let wanted = rate.min(allocation[lane.index()]).min(demand);
            let taken = self.mine.pull(lane, wanted);
            ore.set(lane, taken);
            demand -= taken;
        }

        ore
    }
}
