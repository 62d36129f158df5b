//! Crime execution
//!
//! Runs after the production pass over the structures flagged as committing
//! crime this turn. Food production loses food, smelters lose ore, storage
//! tanks lose refined resources and parks are vandalized. Amounts scale with
//! difficulty and never exceed what is in stock.

use rand::Rng;

use crate::city::manager::StructureManager;
use crate::city::resources::ResourceLane;
use crate::city::structure::StructureClass;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::core::types::{Difficulty, StructureId};
use crate::simulation::morale::MoraleChange;
use crate::simulation::services::{Notification, NotificationSink, Severity};

pub const THEFT_REASONS: [&str; 6] = [
    "There are no identified suspects",
    "An investigation has been opened",
    "A local crime syndicate is under investigation",
    "A suspect was aprehended but the goods remain unaccounted for",
    "A separatist political movement has claimed responsibility",
    "The rebel faction is suspected in preparation for a splinter colony",
];

/// What a crime did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrimeEvent {
    FoodStolen {
        id: StructureId,
        amount: u32,
    },
    ResourcesStolen {
        id: StructureId,
        lane: ResourceLane,
        amount: u32,
        refined: bool,
    },
    Vandalism {
        id: StructureId,
    },
}

/// Crime pass state. Morale changes are rebuilt on every pass.
#[derive(Debug, Clone, Default)]
pub struct CrimeExecution {
    morale_changes: Vec<MoraleChange>,
}

/// Random amount in `range`, scaled by the difficulty multiplier and truncated
pub fn theft_amount<R: Rng>(rng: &mut R, difficulty: Difficulty, range: [u32; 2]) -> u32 {
    let low = range[0].min(range[1]);
    let high = range[0].max(range[1]);
    let raw = rng.gen_range(low..=high);
    (difficulty.theft_multiplier() * raw as f64) as u32
}

fn theft_reason<R: Rng>(rng: &mut R) -> &'static str {
    THEFT_REASONS[rng.gen_range(0..THEFT_REASONS.len())]
}

impl CrimeExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Morale deltas from the last pass
    pub fn morale_changes(&self) -> &[MoraleChange] {
        &self.morale_changes
    }

    /// Apply crimes for every flagged structure. `None` entries are skipped.
    pub fn execute<R: Rng>(
        &mut self,
        structures: &[Option<StructureId>],
        manager: &mut StructureManager,
        difficulty: Difficulty,
        config: &SimulationConfig,
        rng: &mut R,
        notifications: &mut dyn NotificationSink,
    ) -> Result<Vec<CrimeEvent>> {
        self.morale_changes.clear();
        let mut events = Vec::new();

        for id in structures.iter().flatten().copied() {
            let tile = manager.tile_of(id)?;
            let (structure, capability) = manager.entry_mut(id)?;
            if structure.destroyed() {
                continue;
            }
            let name = structure.name();

            match structure.class() {
                StructureClass::FoodProduction => {
                    let food = match capability.and_then(|c| c.as_food_mut()) {
                        Some(food) => food,
                        None => continue,
                    };
                    if food.food_level() == 0 {
                        continue;
                    }
                    let wanted = theft_amount(rng, difficulty, config.food_theft_range);
                    let amount = food.remove_food(wanted);
                    let reason = theft_reason(rng);

                    notifications.push(Notification::new(
                        "Food Stolen",
                        format!(
                            "{} units of food was pilfered from a {}. {}.",
                            amount, name, reason
                        ),
                        tile,
                        Severity::Warning,
                    ));
                    tracing::warn!(%id, amount, "Food stolen");
                    events.push(CrimeEvent::FoodStolen { id, amount });
                }
                StructureClass::Smelter | StructureClass::Storage => {
                    let refined = structure.class() == StructureClass::Storage;
                    let lanes = structure.storage().lanes_with_stock();
                    if lanes.is_empty() {
                        continue;
                    }
                    let lane = lanes[rng.gen_range(0..lanes.len())];
                    let wanted = theft_amount(rng, difficulty, config.resource_theft_range);
                    let amount = wanted.min(structure.storage().get(lane));
                    let storage = structure.storage_mut();
                    storage.set(lane, storage.get(lane) - amount);
                    let reason = theft_reason(rng);

                    let resource = if refined {
                        lane.refined_name()
                    } else {
                        lane.ore_name()
                    };
                    notifications.push(Notification::new(
                        "Resources Stolen",
                        format!(
                            "{} units of {} were stolen from a {}. {}.",
                            amount, resource, name, reason
                        ),
                        tile,
                        Severity::Warning,
                    ));
                    tracing::warn!(%id, ?lane, amount, "Resources stolen");
                    events.push(CrimeEvent::ResourcesStolen {
                        id,
                        lane,
                        amount,
                        refined,
                    });
                }
                StructureClass::Park | StructureClass::RecreationCenter => {
                    self.morale_changes
                        .push(MoraleChange::new("Vandalism", config.vandalism_morale_penalty));
                    notifications.push(Notification::new(
                        "Vandalism",
                        format!("A {} was vandalized.", name),
                        tile,
                        Severity::Warning,
                    ));
                    tracing::warn!(%id, "Vandalism");
                    events.push(CrimeEvent::Vandalism { id });
                }
                _ => {}
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::capability::Capability;
    use crate::city::catalogue::StructureCatalogue;
    use crate::city::resources::ResourcePool;
    use crate::city::structure::StructureKind;
    use crate::core::types::TileCoord;
    use crate::simulation::services::NotificationQueue;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn place(manager: &mut StructureManager, kind: StructureKind, x: i32) -> StructureId {
        let (mut s, c) = StructureCatalogue::get(kind, &SimulationConfig::default()).unwrap();
        while s.under_construction() {
            s.increment_age(0);
        }
        manager.add(s, c, TileCoord::surface(x, 0)).unwrap()
    }

    #[test]
    fn test_theft_amount_scaled_by_difficulty() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..100 {
            let beginner = theft_amount(&mut rng, Difficulty::Beginner, [2, 5]);
            assert!((1..=2).contains(&beginner));
            let hard = theft_amount(&mut rng, Difficulty::Hard, [2, 5]);
            assert!((3..=7).contains(&hard));
        }
    }

    #[test]
    fn test_food_theft_capped_at_stock() {
        let mut manager = StructureManager::new();
        let dome = place(&mut manager, StructureKind::Agridome, 0);
        if let Some(Capability::Food(food)) = manager.capability_mut(dome) {
            food.set_food_level(1);
        }

        let mut crime = CrimeExecution::new();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut queue = NotificationQueue::new();
        let events = crime
            .execute(&[Some(dome)], &mut manager, Difficulty::Hard, &SimulationConfig::default(), &mut rng, &mut queue)
            .unwrap();

        assert_eq!(events, vec![CrimeEvent::FoodStolen { id: dome, amount: 1 }]);
        assert_eq!(manager.food_total(), 0);
        let note = &queue.notifications[0];
        assert_eq!(note.title, "Food Stolen");
        assert!(note.body.starts_with("1 units of food was pilfered from a Agridome. "));
    }

    #[test]
    fn test_resource_theft_only_touches_one_lane() {
        let mut manager = StructureManager::new();
        let tanks = place(&mut manager, StructureKind::StorageTanks, 0);
        *manager.get_mut(tanks).unwrap().storage_mut() = ResourcePool::new(0, 10, 0, 0);

        let mut crime = CrimeExecution::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut queue = NotificationQueue::new();
        let events = crime
            .execute(&[Some(tanks)], &mut manager, Difficulty::Medium, &SimulationConfig::default(), &mut rng, &mut queue)
            .unwrap();

        let stored = *manager.get(tanks).unwrap().storage();
        match &events[0] {
            CrimeEvent::ResourcesStolen { lane, amount, refined, .. } => {
                assert_eq!(*lane, ResourceLane::CommonMinerals);
                assert!(*refined);
                assert!((2..=5).contains(amount));
                assert_eq!(stored, ResourcePool::new(0, 10 - amount, 0, 0));
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(queue.notifications[0].body.contains("Common Minerals were stolen from a Storage Tanks."));
    }

    #[test]
    fn test_vandalism_and_skips() {
        let mut manager = StructureManager::new();
        let park = place(&mut manager, StructureKind::Park, 0);
        let lab = place(&mut manager, StructureKind::Laboratory, 1);
        let empty_smelter = place(&mut manager, StructureKind::Smelter, 2);

        let mut crime = CrimeExecution::new();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut queue = NotificationQueue::new();
        let events = crime
            .execute(
                &[None, Some(park), Some(lab), Some(empty_smelter), Some(park)],
                &mut manager,
                Difficulty::Beginner,
                &SimulationConfig::default(),
                &mut rng,
                &mut queue,
            )
            .unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(crime.morale_changes(), &[MoraleChange::new("Vandalism", -1), MoraleChange::new("Vandalism", -1)]);
        assert_eq!(queue.notifications[0].body, "A Park was vandalized.");

        // Rebuilt every pass
        crime
            .execute(&[], &mut manager, Difficulty::Beginner, &SimulationConfig::default(), &mut rng, &mut queue)
            .unwrap();
        assert!(crime.morale_changes().is_empty());
    }

    #[test]
    fn test_same_seed_same_crimes() {
        let run = |seed| {
            let mut manager = StructureManager::new();
            let tanks = place(&mut manager, StructureKind::StorageTanks, 0);
            *manager.get_mut(tanks).unwrap().storage_mut() = ResourcePool::splat(50);
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut queue = NotificationQueue::new();
            CrimeExecution::new()
                .execute(&[Some(tanks); 5], &mut manager, Difficulty::Easy, &SimulationConfig::default(), &mut rng, &mut queue)
                .unwrap()
        };
        assert_eq!(run(42), run(42));
    }
}
