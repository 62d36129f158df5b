//! Colony - the world context handed to every turn
//!
//! Owns the configuration, the structure arena, population and robot pools,
//! morale and the single seeded random generator. Player commands issued
//! between turns go through the methods here.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::city::capability::Capability;
use crate::city::catalogue::StructureCatalogue;
use crate::city::manager::StructureManager;
use crate::city::mine::{Mine, MineFacility};
use crate::city::product::ProductType;
use crate::city::production::Factory;
use crate::city::resources::{ResourceLane, ResourcePool};
use crate::city::structure::{AgeOutcome, StructureKind};
use crate::core::config::SimulationConfig;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{Difficulty, StructureId, TileCoord, Turn};
use crate::simulation::crime::CrimeExecution;
use crate::simulation::morale::Morale;
use crate::simulation::population::{PopulationPool, RobotPool};

#[derive(Debug, Clone)]
pub struct Colony {
    pub(crate) config: SimulationConfig,
    pub(crate) difficulty: Difficulty,
    pub(crate) turn: Turn,
    pub(crate) manager: StructureManager,
    pub(crate) population: PopulationPool,
    pub(crate) robots: RobotPool,
    pub(crate) morale: Morale,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) crime: CrimeExecution,
    /// Structures destroyed between turns, reported by the next turn
    pub(crate) destroyed_pending: Vec<StructureId>,
}

impl Colony {
    /// New empty colony. The config is validated first.
    pub fn new(config: SimulationConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            difficulty: Difficulty::default(),
            turn: 1,
            manager: StructureManager::new(),
            population: PopulationPool::default(),
            robots: RobotPool::new(config.base_robot_command_capacity),
            morale: Morale::new(config.starting_morale),
            rng: ChaCha8Rng::seed_from_u64(seed),
            crime: CrimeExecution::new(),
            destroyed_pending: Vec::new(),
            config,
        })
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.difficulty = difficulty;
    }

    pub fn turn(&self) -> Turn {
        self.turn
    }

    pub fn manager(&self) -> &StructureManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut StructureManager {
        &mut self.manager
    }

    pub fn population(&self) -> &PopulationPool {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut PopulationPool {
        &mut self.population
    }

    pub fn robots(&self) -> &RobotPool {
        &self.robots
    }

    pub fn morale(&self) -> &Morale {
        &self.morale
    }

    pub fn refined_resources(&self) -> ResourcePool {
        self.manager.refined_resources()
    }

    pub fn food_total(&self) -> u32 {
        self.manager.food_total()
    }

    // === Building ===

    /// Place a new structure without charging for it
    pub fn place_structure(&mut self, kind: StructureKind, tile: TileCoord) -> Result<StructureId> {
        let (structure, capability) = StructureCatalogue::get(kind, &self.config)?;
        let id = self.manager.add(structure, capability, tile)?;
        tracing::debug!(%id, ?kind, %tile, "Structure placed");
        Ok(id)
    }

    /// Build a structure paid for from refined storage. Returns None if the
    /// colony can't afford it.
    pub fn purchase_structure(&mut self, kind: StructureKind, tile: TileCoord) -> Result<Option<StructureId>> {
        if let Some(occupant) = self.manager.structure_at(tile) {
            return Err(ColonyError::TileOccupied { tile, occupant });
        }
        if !StructureCatalogue::can_build(&self.refined_resources(), kind) {
            return Ok(None);
        }
        self.manager.pull_refined(&StructureCatalogue::cost_to_build(kind));
        self.place_structure(kind, tile).map(Some)
    }

    /// Place a mine facility over a surveyed deposit
    pub fn place_mine(&mut self, tile: TileCoord, mine: Mine) -> Result<StructureId> {
        let (structure, _) = StructureCatalogue::get(StructureKind::MineFacility, &self.config)?;
        let capability = Capability::Mine(MineFacility::new(mine));
        self.manager.add(structure, Some(capability), tile)
    }

    /// Tear a structure down and return its recycle value to refined
    /// storage. Returns what was actually stored.
    pub fn recycle(&mut self, id: StructureId) -> Result<ResourcePool> {
        let (structure, _) = self.manager.remove(id)?;
        let value = StructureCatalogue::recycle_value(structure.kind());
        let leftover = self.manager.deposit_refined(&value);
        tracing::debug!(%id, kind = ?structure.kind(), "Structure recycled");
        Ok(value - leftover)
    }

    // === Player commands ===

    pub fn force_idle(&mut self, id: StructureId, idle: bool) -> Result<()> {
        self.manager.get_mut(id)?.force_idle(idle);
        Ok(())
    }

    pub fn repair(&mut self, id: StructureId) -> Result<bool> {
        Ok(self.manager.get_mut(id)?.repair())
    }

    /// Damage a structure. Returns true if this destroyed it.
    pub fn damage(&mut self, id: StructureId, amount: u32) -> Result<bool> {
        let structure = self.manager.get_mut(id)?;
        let kind = structure.kind();
        if structure.apply_damage(amount) != AgeOutcome::Destroyed {
            return Ok(false);
        }

        tracing::info!(%id, ?kind, "Structure destroyed by damage");
        self.manager.mark_topology_changed();
        self.destroyed_pending.push(id);
        Ok(true)
    }

    pub fn set_factory_product(&mut self, id: StructureId, product: Option<ProductType>) -> Result<()> {
        let kind = self.manager.get(id)?.kind();
        self.factory_mut(id)?.set_product(kind, product)
    }

    pub fn set_mine_lane(&mut self, id: StructureId, lane: ResourceLane, enabled: bool) -> Result<()> {
        self.mine_facility_mut(id)?
            .mine_mut()
            .set_lane_enabled(lane, enabled);
        Ok(())
    }

    /// Start digging a new mine level
    pub fn extend_mine(&mut self, id: StructureId) -> Result<bool> {
        let max_depth = self.config.mine_max_depth;
        Ok(self.mine_facility_mut(id)?.extend(max_depth))
    }

    /// Move a truck from a warehouse to a mine facility
    pub fn add_truck(&mut self, id: StructureId) -> Result<bool> {
        let max_trucks = self.config.max_truck_count;
        self.with_detached_mine(id, |facility, manager| {
            facility.add_truck(max_trucks, || manager.pull_product(ProductType::Truck))
        })
    }

    /// Return a truck from a mine facility to a warehouse
    pub fn remove_truck(&mut self, id: StructureId) -> Result<bool> {
        self.with_detached_mine(id, |facility, manager| {
            facility.remove_truck(|| manager.store_product(ProductType::Truck))
        })
    }

    // === Capability access ===

    pub fn mine_facility(&self, id: StructureId) -> Result<&MineFacility> {
        self.manager.get(id)?;
        self.manager
            .capability(id)
            .and_then(|c| c.as_mine())
            .ok_or(ColonyError::CapabilityMismatch { id, expected: "mine" })
    }

    pub fn mine_facility_mut(&mut self, id: StructureId) -> Result<&mut MineFacility> {
        self.manager.get(id)?;
        self.manager
            .capability_mut(id)
            .and_then(|c| c.as_mine_mut())
            .ok_or(ColonyError::CapabilityMismatch { id, expected: "mine" })
    }

    pub fn factory(&self, id: StructureId) -> Result<&Factory> {
        self.manager.get(id)?;
        self.manager
            .capability(id)
            .and_then(|c| c.as_factory())
            .ok_or(ColonyError::CapabilityMismatch { id, expected: "factory" })
    }

    pub fn factory_mut(&mut self, id: StructureId) -> Result<&mut Factory> {
        self.manager.get(id)?;
        self.manager
            .capability_mut(id)
            .and_then(|c| c.as_factory_mut())
            .ok_or(ColonyError::CapabilityMismatch { id, expected: "factory" })
    }

    /// Run `f` on a mine facility taken out of the arena so the rest of the
    /// arena (warehouses) can be borrowed alongside it
    fn with_detached_mine<T>(
        &mut self,
        id: StructureId,
        f: impl FnOnce(&mut MineFacility, &mut StructureManager) -> T,
    ) -> Result<T> {
        self.manager.get(id)?;
        let mut capability = self
            .manager
            .take_capability(id)
            .ok_or(ColonyError::CapabilityMismatch { id, expected: "mine" })?;

        let result = match capability.as_mine_mut() {
            Some(facility) => Ok(f(facility, &mut self.manager)),
            None => Err(ColonyError::CapabilityMismatch { id, expected: "mine" }),
        };

        self.manager.put_capability(id, capability);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::mine::MineProductionRate;

    fn colony() -> Colony {
        Colony::new(SimulationConfig::default(), 1).unwrap()
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SimulationConfig {
            mean_solar_distance: 0.0,
            ..Default::default()
        };
        assert!(matches!(Colony::new(config, 0), Err(ColonyError::InvalidConfig(_))));
    }

    #[test]
    fn test_purchase_needs_resources() {
        let mut colony = colony();
        let cc = colony.place_structure(StructureKind::CommandCenter, TileCoord::surface(0, 0)).unwrap();
        // Command center storage only counts once built
        while colony.manager().get(cc).unwrap().under_construction() {
            colony.manager_mut().get_mut(cc).unwrap().increment_age(0);
        }

        assert_eq!(
            colony.purchase_structure(StructureKind::Agridome, TileCoord::surface(1, 0)).unwrap(),
            None
        );

        colony.manager_mut().deposit_refined(&ResourcePool::new(30, 30, 30, 30));
        let dome = colony
            .purchase_structure(StructureKind::Agridome, TileCoord::surface(1, 0))
            .unwrap();
        assert!(dome.is_some());
        assert_eq!(colony.refined_resources(), ResourcePool::new(10, 20, 25, 30));
    }

    #[test]
    fn test_recycle_returns_value() {
        let mut colony = colony();
        let cc = colony.place_structure(StructureKind::CommandCenter, TileCoord::surface(0, 0)).unwrap();
        for _ in 0..4 {
            colony.manager_mut().get_mut(cc).unwrap().increment_age(0);
        }
        let dome = colony.place_structure(StructureKind::Agridome, TileCoord::surface(1, 0)).unwrap();

        let value = colony.recycle(dome).unwrap();
        assert_eq!(value, ResourcePool::new(18, 9, 4, 0));
        assert_eq!(colony.refined_resources(), value);
        assert!(colony.recycle(dome).is_err());
    }

    #[test]
    fn test_trucks_move_between_warehouse_and_mine() {
        let mut colony = colony();
        let warehouse = colony.place_structure(StructureKind::Warehouse, TileCoord::surface(0, 0)).unwrap();
        for _ in 0..3 {
            colony.manager_mut().get_mut(warehouse).unwrap().increment_age(0);
        }
        let mine = colony
            .place_mine(
                TileCoord::surface(5, 5),
                Mine::with_yield(MineProductionRate::Low, ResourcePool::splat(100)),
            )
            .unwrap();

        // Warehouse empty
        assert!(!colony.add_truck(mine).unwrap());

        colony.manager_mut().store_product(ProductType::Truck);
        assert!(colony.add_truck(mine).unwrap());
        assert_eq!(colony.mine_facility(mine).unwrap().trucks(), 2);
        assert_eq!(colony.manager().product_count(ProductType::Truck), 0);

        assert!(colony.remove_truck(mine).unwrap());
        assert!(!colony.remove_truck(mine).unwrap());
        assert_eq!(colony.manager().product_count(ProductType::Truck), 1);
    }

    #[test]
    fn test_damage_destroys_once() {
        let mut colony = colony();
        let park = colony.place_structure(StructureKind::Park, TileCoord::surface(0, 0)).unwrap();

        assert!(!colony.damage(park, 40).unwrap());
        assert_eq!(colony.manager().get(park).unwrap().integrity(), 60);
        assert!(colony.destroyed_pending.is_empty());

        colony.manager.clear_connectivity_dirty();
        assert!(colony.damage(park, 100).unwrap());
        assert!(!colony.damage(park, 100).unwrap());
        assert!(colony.manager().get(park).unwrap().destroyed());
        assert!(colony.manager().connectivity_dirty());
        assert_eq!(colony.destroyed_pending, vec![park]);
    }

    #[test]
    fn test_capability_mismatch() {
        let mut colony = colony();
        let park = colony.place_structure(StructureKind::Park, TileCoord::surface(0, 0)).unwrap();
        assert!(matches!(
            colony.add_truck(park),
            Err(ColonyError::CapabilityMismatch { expected: "mine", .. })
        ));
        assert!(matches!(
            colony.set_factory_product(park, Some(ProductType::Truck)),
            Err(ColonyError::CapabilityMismatch { .. })
        ));
        assert!(matches!(
            colony.force_idle(StructureId(99), true),
            Err(ColonyError::UnmanagedStructure(_))
        ));
    }
}
