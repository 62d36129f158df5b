//! Simulation configuration with documented constants
//!
//! All magic numbers of the colony engine are collected here with notes on
//! what they drive and how they interact. The config is owned by the colony
//! world context; there is no global instance.

use serde::Deserialize;
use std::path::Path;

use crate::core::error::{ColonyError, Result};

/// Tunables for the turn driver and its subsystems
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    // === HAULING ===
    /// Ore units a single truck moves per turn over a route of cost 1.0
    ///
    /// Haul capacity = floor(haul_traversal_constant / route_cost) * trucks.
    /// A route of cost 2.0 with one truck moves 50 units per turn.
    pub haul_traversal_constant: u32,

    /// Upper bound on trucks assigned to one mine facility
    pub max_truck_count: u32,

    // === MINING ===
    /// Ore extracted per enabled lane per turn at the Low rate tier
    pub mine_rate_low: u32,
    /// Ore extracted per enabled lane per turn at the Medium rate tier
    pub mine_rate_medium: u32,
    /// Ore extracted per enabled lane per turn at the High rate tier
    pub mine_rate_high: u32,

    /// Yield added to every lane when a Low tier mine digs a new level
    pub mine_level_yield_low: u32,
    /// Yield added to every lane when a Medium tier mine digs a new level
    pub mine_level_yield_medium: u32,
    /// Yield added to every lane when a High tier mine digs a new level
    pub mine_level_yield_high: u32,

    /// Turns needed to dig one additional mine level
    pub mine_extension_turns: u32,

    /// Deepest level a mine can be extended to
    pub mine_max_depth: u32,

    // === REFINING ===
    /// Maximum ore per lane a smelter refines in one turn
    pub smelter_processing_rate: u32,

    // === STRUCTURES ===
    /// Turns between 1-point integrity losses for an operational, ageing structure
    ///
    /// At 10, an Agridome (max age 600) loses 60 integrity over its whole life,
    /// so age alone never pushes it under the operating threshold.
    pub integrity_decay_interval: u32,

    /// Structures below this integrity are disabled (StructuralIntegrity)
    pub integrity_operating_threshold: u32,

    // === ROBOTS ===
    /// Robots every operational Robot Command can control
    pub robot_command_capacity: u32,

    /// Robots controllable without any Robot Command (seed robots)
    pub base_robot_command_capacity: u32,

    // === ENERGY ===
    /// Mean distance of the planet from its star; solar output is divided by it
    pub mean_solar_distance: f32,

    // === CRIME ===
    /// Inclusive range of food units stolen before the difficulty multiplier
    pub food_theft_range: [u32; 2],

    /// Inclusive range of resource units stolen before the difficulty multiplier
    pub resource_theft_range: [u32; 2],

    /// Morale change for every vandalism event (independent of difficulty)
    pub vandalism_morale_penalty: i32,

    // === MORALE ===
    /// Morale at colony founding (0-1000)
    pub starting_morale: i32,
    /// Bonus per operational park
    pub park_morale_bonus: i32,
    /// Bonus per operational recreation center
    pub recreation_morale_bonus: i32,
    /// Bonus per operational commercial structure
    pub commercial_morale_bonus: i32,
    /// Penalty per disabled structure
    pub disabled_morale_penalty: i32,
    /// Penalty per structure destroyed this turn
    pub destroyed_morale_penalty: i32,
    /// Penalty when no food production is active
    pub no_food_morale_penalty: i32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            // Hauling
            haul_traversal_constant: 100,
            max_truck_count: 10,

            // Mining (rates per lane per turn, yields per level)
            mine_rate_low: 10,
            mine_rate_medium: 15,
            mine_rate_high: 20,
            mine_level_yield_low: 600,
            mine_level_yield_medium: 800,
            mine_level_yield_high: 1000,
            mine_extension_turns: 3,
            mine_max_depth: 4,

            // Refining
            smelter_processing_rate: 20,

            // Structures
            integrity_decay_interval: 10,
            integrity_operating_threshold: 30,

            // Robots
            robot_command_capacity: 10,
            base_robot_command_capacity: 3,

            // Energy
            mean_solar_distance: 1.0,

            // Crime
            food_theft_range: [2, 5],
            resource_theft_range: [2, 5],
            vandalism_morale_penalty: -1,

            // Morale
            starting_morale: 600,
            park_morale_bonus: 1,
            recreation_morale_bonus: 1,
            commercial_morale_bonus: 1,
            disabled_morale_penalty: -1,
            destroyed_morale_penalty: -1,
            no_food_morale_penalty: -5,
        }
    }
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a (possibly partial) TOML override on top of the defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn load_from_toml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.mean_solar_distance <= 0.0 {
            return Err(ColonyError::InvalidConfig(format!(
                "mean_solar_distance must be positive: {}",
                self.mean_solar_distance
            )));
        }

        if self.haul_traversal_constant == 0 {
            return Err(ColonyError::InvalidConfig(
                "haul_traversal_constant must be positive".into(),
            ));
        }

        if self.max_truck_count == 0 {
            return Err(ColonyError::InvalidConfig(
                "max_truck_count must allow at least one truck".into(),
            ));
        }

        for (name, range) in [
            ("food_theft_range", self.food_theft_range),
            ("resource_theft_range", self.resource_theft_range),
        ] {
            if range[0] > range[1] {
                return Err(ColonyError::InvalidConfig(format!(
                    "{} is empty: [{}, {}]",
                    name, range[0], range[1]
                )));
            }
        }

        if self.integrity_operating_threshold > 100 {
            return Err(ColonyError::InvalidConfig(format!(
                "integrity_operating_threshold ({}) exceeds maximum integrity",
                self.integrity_operating_threshold
            )));
        }

        if !(0..=1000).contains(&self.starting_morale) {
            return Err(ColonyError::InvalidConfig(format!(
                "starting_morale ({}) must be within 0..=1000",
                self.starting_morale
            )));
        }

        Ok(())
    }
}
