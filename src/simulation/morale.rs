//! Morale aggregation
//!
//! Morale is a 0-1000 score. Each turn collects labelled deltas from the
//! colony's structures and from the crime pass and applies their sum.

use serde::{Deserialize, Serialize};

use crate::city::manager::StructureManager;
use crate::city::structure::StructureClass;
use crate::core::config::SimulationConfig;

pub const MORALE_MIN: i32 = 0;
pub const MORALE_MAX: i32 = 1000;

/// One labelled contribution to this turn's morale change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoraleChange {
    pub label: String,
    pub delta: i32,
}

impl MoraleChange {
    pub fn new(label: impl Into<String>, delta: i32) -> Self {
        Self {
            label: label.into(),
            delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morale {
    value: i32,
}

impl Morale {
    pub fn new(value: i32) -> Self {
        Self {
            value: value.clamp(MORALE_MIN, MORALE_MAX),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Apply the summed deltas, clamped to range. Returns the net change.
    pub fn apply(&mut self, changes: &[MoraleChange]) -> i32 {
        let before = self.value;
        let delta: i32 = changes.iter().map(|c| c.delta).sum();
        self.value = (self.value + delta).clamp(MORALE_MIN, MORALE_MAX);
        self.value - before
    }

    pub fn description(&self) -> &'static str {
        match self.value {
            v if v < 200 => "Terrible",
            v if v < 400 => "Poor",
            v if v < 600 => "Fair",
            v if v < 800 => "Good",
            _ => "Excellent",
        }
    }
}

/// Morale deltas caused by the state of the colony's structures
pub fn structure_morale_changes(
    manager: &StructureManager,
    config: &SimulationConfig,
    destroyed_this_turn: u32,
) -> Vec<MoraleChange> {
    let mut changes = Vec::new();

    let mut push = |label: &str, count: usize, per_structure: i32| {
        if count > 0 {
            changes.push(MoraleChange::new(label, count as i32 * per_structure));
        }
    };

    push(
        "Parks & Arboretums",
        manager.operational_count(StructureClass::Park),
        config.park_morale_bonus,
    );
    push(
        "Recreational Facilities",
        manager.operational_count(StructureClass::RecreationCenter),
        config.recreation_morale_bonus,
    );
    push(
        "Luxury Availability",
        manager.operational_count(StructureClass::Commercial),
        config.commercial_morale_bonus,
    );

    let disabled = manager.iter().filter(|e| e.structure.disabled()).count();
    push("Structures Disabled", disabled, config.disabled_morale_penalty);
    push(
        "Structures Destroyed",
        destroyed_this_turn as usize,
        config.destroyed_morale_penalty,
    );

    if manager.operational_count(StructureClass::FoodProduction) == 0 {
        changes.push(MoraleChange::new(
            "No active Food Production",
            config.no_food_morale_penalty,
        ));
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_clamps() {
        let mut morale = Morale::new(995);
        assert_eq!(morale.apply(&[MoraleChange::new("Parks & Arboretums", 10)]), 5);
        assert_eq!(morale.value(), MORALE_MAX);

        let mut morale = Morale::new(3);
        assert_eq!(morale.apply(&[MoraleChange::new("Vandalism", -1), MoraleChange::new("Vandalism", -5)]), -3);
        assert_eq!(morale.value(), 0);
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(Morale::new(0).description(), "Terrible");
        assert_eq!(Morale::new(399).description(), "Poor");
        assert_eq!(Morale::new(600).description(), "Good");
        assert_eq!(Morale::new(1000).description(), "Excellent");
    }

    #[test]
    fn test_empty_colony_lacks_food() {
        let changes = structure_morale_changes(&StructureManager::new(), &SimulationConfig::default(), 2);
        assert_eq!(
            changes,
            vec![
                MoraleChange::new("Structures Destroyed", -2),
                MoraleChange::new("No active Food Production", -5),
            ]
        );
    }
}
