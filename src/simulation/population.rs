//! Population and robot pools
//!
//! Workers and scientists are handed out greedily to structures in
//! evaluation order every turn. Scientists left over after scientist
//! requirements are met may stand in for missing workers.

use serde::{Deserialize, Serialize};

use crate::city::product::ProductType;
use crate::city::structure::PopulationRequirements;

/// Colonists arriving with a colonist lander
pub const COLONIST_LANDER_WORKERS: u32 = 20;
pub const COLONIST_LANDER_SCIENTISTS: u32 = 20;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationPool {
    workers: u32,
    scientists: u32,
    workers_assigned: u32,
    scientists_assigned: u32,
}

impl PopulationPool {
    pub fn new(workers: u32, scientists: u32) -> Self {
        Self {
            workers,
            scientists,
            ..Default::default()
        }
    }

    pub fn workers(&self) -> u32 {
        self.workers
    }

    pub fn scientists(&self) -> u32 {
        self.scientists
    }

    pub fn size(&self) -> u32 {
        self.workers + self.scientists
    }

    pub fn add_population(&mut self, workers: u32, scientists: u32) {
        self.workers += workers;
        self.scientists += scientists;
    }

    pub fn workers_available(&self) -> u32 {
        self.workers - self.workers_assigned
    }

    pub fn scientists_available(&self) -> u32 {
        self.scientists - self.scientists_assigned
    }

    /// Start a new allocation pass
    pub fn reset_assignments(&mut self) {
        self.workers_assigned = 0;
        self.scientists_assigned = 0;
    }

    pub fn can_assign(&self, required: &PopulationRequirements) -> bool {
        let free_scientists = self.scientists_available();
        if free_scientists < required.scientists {
            return false;
        }
        let spare_scientists = free_scientists - required.scientists;
        self.workers_available() + spare_scientists >= required.workers
    }

    /// Take the required staff. Returns false (and takes nothing) if short.
    pub fn assign(&mut self, required: &PopulationRequirements) -> bool {
        if !self.can_assign(required) {
            return false;
        }
        let from_workers = required.workers.min(self.workers_available());
        let from_scientists = required.workers - from_workers;
        self.workers_assigned += from_workers;
        self.scientists_assigned += required.scientists + from_scientists;
        true
    }
}

/// Robots under colony control
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotPool {
    diggers: u32,
    dozers: u32,
    miners: u32,
    command_capacity: u32,
}

impl RobotPool {
    pub fn new(command_capacity: u32) -> Self {
        Self {
            command_capacity,
            ..Default::default()
        }
    }

    pub fn count(&self, product: ProductType) -> u32 {
        match product {
            ProductType::Digger => self.diggers,
            ProductType::Dozer => self.dozers,
            ProductType::Miner => self.miners,
            _ => 0,
        }
    }

    pub fn total(&self) -> u32 {
        self.diggers + self.dozers + self.miners
    }

    pub fn command_capacity(&self) -> u32 {
        self.command_capacity
    }

    pub fn set_command_capacity(&mut self, capacity: u32) {
        self.command_capacity = capacity;
    }

    pub fn command_capacity_available(&self) -> bool {
        self.total() < self.command_capacity
    }

    /// Add a robot. Non-robot products are refused.
    pub fn add_robot(&mut self, product: ProductType) -> bool {
        let slot = match product {
            ProductType::Digger => &mut self.diggers,
            ProductType::Dozer => &mut self.dozers,
            ProductType::Miner => &mut self.miners,
            _ => return false,
        };
        *slot += 1;
        true
    }
}
