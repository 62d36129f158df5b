//! Production capabilities - food, power, factories and ore refining
//!
//! Each capability only updates its own state. The turn driver owns the
//! shared pools: it hands in what is available and applies what a step
//! reports as consumed.

use serde::{Deserialize, Serialize};

use crate::city::product::ProductType;
use crate::city::resources::{ResourceLane, ResourcePool};
use crate::city::structure::{IdleReason, Structure, StructureKind};
use crate::core::error::{ColonyError, Result};

/// Ore units needed per refined unit, by lane
pub const REFINING_DIVISORS: [u32; 4] = [2, 2, 3, 3];

/// Food storage and per-turn production (Agridome, Command Center)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodProduction {
    food_level: u32,
    capacity: u32,
    base_production: u32,
}

impl FoodProduction {
    pub fn new(base_production: u32, capacity: u32) -> Self {
        Self {
            food_level: 0,
            capacity,
            base_production,
        }
    }

    pub fn food_level(&self) -> u32 {
        self.food_level
    }

    /// Clamped to `[0, capacity]`
    pub fn set_food_level(&mut self, level: u32) {
        self.food_level = level.min(self.capacity);
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn base_production(&self) -> u32 {
        self.base_production
    }

    pub fn is_full(&self) -> bool {
        self.food_level >= self.capacity
    }

    /// Add food up to capacity, returns the amount actually added
    pub fn add_food(&mut self, amount: u32) -> u32 {
        let added = amount.min(self.capacity - self.food_level.min(self.capacity));
        self.food_level += added;
        added
    }

    /// Remove up to `amount`, returns the amount actually removed
    pub fn remove_food(&mut self, amount: u32) -> u32 {
        let removed = amount.min(self.food_level);
        self.food_level -= removed;
        removed
    }

    /// Produce one turn's worth of food. Idles the structure when storage is full.
    pub fn think(&mut self, structure: &mut Structure) -> u32 {
        if self.base_production == 0 {
            return 0;
        }

        if self.is_full() {
            structure.idle(IdleReason::InternalStorageFull);
            return 0;
        }

        if structure.idle_reason() == IdleReason::InternalStorageFull {
            structure.enable();
        }
        self.add_food(self.base_production)
    }
}

/// Energy output of a power structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerStructure {
    pub fuel_production: u32,
    pub solar_production: u32,
}

impl PowerStructure {
    pub fn fuel(production: u32) -> Self {
        Self {
            fuel_production: production,
            solar_production: 0,
        }
    }

    pub fn solar(production: u32) -> Self {
        Self {
            fuel_production: 0,
            solar_production: production,
        }
    }

    /// Solar output falls off with the planet's mean distance from its star
    pub fn energy_produced(&self, mean_solar_distance: f32) -> u32 {
        let solar = if mean_solar_distance > 0.0 {
            (self.solar_production as f32 / mean_solar_distance) as u32
        } else {
            0
        };
        self.fuel_production + solar
    }
}

/// Outcome of one factory production step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryStep {
    /// Nothing selected, or the structure can't run
    Stopped,
    /// Inputs were short; nothing consumed
    Starved,
    /// One production turn done, `consumed` must be pulled from storage
    Advanced { consumed: ResourcePool },
    /// The final production turn finished a product
    Completed {
        consumed: ResourcePool,
        product: ProductType,
    },
    /// A finished product is still waiting to be delivered
    Waiting(ProductType),
}

/// Factory production state
///
/// `turns_completed` goes back to 0 when the product changes or a product
/// completes. A completed product stays in `product_waiting` until pulled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factory {
    product_list: Vec<ProductType>,
    product_type: Option<ProductType>,
    turns_completed: u32,
    product_waiting: Option<ProductType>,
}

impl Factory {
    pub fn new(kind: StructureKind, product_list: Vec<ProductType>) -> Result<Self> {
        if product_list.is_empty() {
            return Err(ColonyError::EmptyProductionList(kind));
        }
        Ok(Self {
            product_list,
            product_type: None,
            turns_completed: 0,
            product_waiting: None,
        })
    }

    pub fn product_list(&self) -> &[ProductType] {
        &self.product_list
    }

    pub fn product_type(&self) -> Option<ProductType> {
        self.product_type
    }

    pub fn turns_completed(&self) -> u32 {
        self.turns_completed
    }

    pub fn product_waiting(&self) -> Option<ProductType> {
        self.product_waiting
    }

    /// Select a product (or None to stop). Changing the product discards progress.
    pub fn set_product(&mut self, kind: StructureKind, product: Option<ProductType>) -> Result<()> {
        if let Some(p) = product {
            if !self.product_list.contains(&p) {
                return Err(ColonyError::ProductNotAllowed { kind, product: p });
            }
        }
        if product != self.product_type {
            self.product_type = product;
            self.turns_completed = 0;
        }
        Ok(())
    }

    /// Take the waiting product out of the factory
    pub fn pull_product(&mut self) -> Option<ProductType> {
        self.product_waiting.take()
    }

    /// Run one production turn against the refined resources on hand
    pub fn update_production(
        &mut self,
        structure: &mut Structure,
        available: &ResourcePool,
    ) -> FactoryStep {
        if let Some(product) = self.product_waiting {
            return FactoryStep::Waiting(product);
        }

        let product = match self.product_type {
            Some(p) => p,
            None => return FactoryStep::Stopped,
        };

        if !structure.can_think() {
            return FactoryStep::Stopped;
        }

        let cost = product.cost();
        if !available.covers(&cost.resource_cost) {
            structure.idle(IdleReason::FactoryInsufficientResources);
            return FactoryStep::Starved;
        }

        if structure.is_idle() {
            structure.enable();
        }

        self.turns_completed += 1;
        if self.turns_completed >= cost.turns_to_build {
            self.turns_completed = 0;
            self.product_waiting = Some(product);
            return FactoryStep::Completed {
                consumed: cost.resource_cost,
                product,
            };
        }

        FactoryStep::Advanced {
            consumed: cost.resource_cost,
        }
    }
}

/// Refine smelter ore into refined resources.
///
/// Each lane processes up to `rate` ore; only whole refined units that fit in
/// `room` are produced and only the ore they need is consumed.
pub fn refine_ore(ore: &mut ResourcePool, rate: u32, room: u32) -> ResourcePool {
    let mut refined = ResourcePool::default();
    let mut room = room;

    for lane in ResourceLane::ALL {
        let divisor = REFINING_DIVISORS[lane.index()];
        let processable = ore.get(lane).min(rate);
        let units = (processable / divisor).min(room);
        if units == 0 {
            continue;
        }
        ore.set(lane, ore.get(lane) - units * divisor);
        refined.set(lane, units);
        room -= units;
    }

    refined
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::structure::StructureClass;

    fn operational(kind: StructureKind, class: StructureClass) -> Structure {
        let mut s = Structure::new(kind, class).with_turns_to_build(1);
        s.increment_age(0);
        s
    }

    #[test]
    fn test_food_level_clamps() {
        let mut food = FoodProduction::new(10, 100);
        food.set_food_level(150);
        assert_eq!(food.food_level(), 100);

        // Clamping twice is the same as once
        food.set_food_level(150);
        assert_eq!(food.food_level(), 100);
    }

    #[test]
    fn test_food_idles_when_full() {
        let mut structure = operational(StructureKind::Agridome, StructureClass::FoodProduction);
        let mut food = FoodProduction::new(10, 25);

        assert_eq!(food.think(&mut structure), 10);
        assert_eq!(food.think(&mut structure), 10);
        assert_eq!(food.think(&mut structure), 5);
        assert!(structure.operational());

        assert_eq!(food.think(&mut structure), 0);
        assert_eq!(structure.idle_reason(), IdleReason::InternalStorageFull);

        // Room again: production resumes
        food.remove_food(10);
        assert_eq!(food.think(&mut structure), 10);
        assert!(structure.operational());
    }

    #[test]
    fn test_power_solar_distance() {
        assert_eq!(PowerStructure::solar(50).energy_produced(1.0), 50);
        assert_eq!(PowerStructure::solar(50).energy_produced(2.0), 25);
        assert_eq!(PowerStructure::fuel(1000).energy_produced(3.0), 1000);
    }

    #[test]
    fn test_empty_product_list_rejected() {
        let result = Factory::new(StructureKind::SurfaceFactory, Vec::new());
        assert!(matches!(result, Err(ColonyError::EmptyProductionList(_))));
    }

    #[test]
    fn test_product_must_be_in_list() {
        let kind = StructureKind::UndergroundFactory;
        let mut factory = Factory::new(kind, vec![ProductType::Clothing]).unwrap();
        assert!(factory.set_product(kind, Some(ProductType::Digger)).is_err());
        assert!(factory.set_product(kind, Some(ProductType::Clothing)).is_ok());
    }

    #[test]
    fn test_factory_completes_after_build_turns() {
        let kind = StructureKind::SurfaceFactory;
        let mut structure = operational(kind, StructureClass::Factory);
        let mut factory = Factory::new(kind, vec![ProductType::Truck]).unwrap();
        factory.set_product(kind, Some(ProductType::Truck)).unwrap();

        let plenty = ResourcePool::splat(100);
        assert!(matches!(
            factory.update_production(&mut structure, &plenty),
            FactoryStep::Advanced { .. }
        ));
        assert!(matches!(
            factory.update_production(&mut structure, &plenty),
            FactoryStep::Advanced { .. }
        ));
        assert_eq!(
            factory.update_production(&mut structure, &plenty),
            FactoryStep::Completed {
                consumed: ProductType::Truck.cost().resource_cost,
                product: ProductType::Truck
            }
        );
        assert_eq!(factory.turns_completed(), 0);

        // Undelivered product blocks further production
        assert_eq!(
            factory.update_production(&mut structure, &plenty),
            FactoryStep::Waiting(ProductType::Truck)
        );
        assert_eq!(factory.pull_product(), Some(ProductType::Truck));
        assert_eq!(factory.product_waiting(), None);
    }

    #[test]
    fn test_factory_starved_keeps_progress() {
        let kind = StructureKind::SurfaceFactory;
        let mut structure = operational(kind, StructureClass::Factory);
        let mut factory = Factory::new(kind, vec![ProductType::Digger]).unwrap();
        factory.set_product(kind, Some(ProductType::Digger)).unwrap();

        factory.update_production(&mut structure, &ResourcePool::splat(10));
        assert_eq!(factory.turns_completed(), 1);

        // One unit short on a single lane
        let short = ResourcePool::new(2, 2, 1, 0);
        assert_eq!(factory.update_production(&mut structure, &short), FactoryStep::Starved);
        assert_eq!(factory.turns_completed(), 1);
        assert_eq!(structure.idle_reason(), IdleReason::FactoryInsufficientResources);

        // Recovers once resources are back
        factory.update_production(&mut structure, &ResourcePool::splat(10));
        assert_eq!(factory.turns_completed(), 2);
        assert!(structure.operational());
    }

    #[test]
    fn test_changing_product_resets_progress() {
        let kind = StructureKind::SeedFactory;
        let mut structure = operational(kind, StructureClass::Factory);
        let mut factory = Factory::new(kind, vec![ProductType::Digger, ProductType::Dozer]).unwrap();
        factory.set_product(kind, Some(ProductType::Digger)).unwrap();
        factory.update_production(&mut structure, &ResourcePool::splat(10));

        factory.set_product(kind, Some(ProductType::Digger)).unwrap();
        assert_eq!(factory.turns_completed(), 1);

        factory.set_product(kind, Some(ProductType::Dozer)).unwrap();
        assert_eq!(factory.turns_completed(), 0);
    }

    #[test]
    fn test_refine_ore_divisors_and_room() {
        let mut ore = ResourcePool::new(20, 7, 9, 2);
        let refined = refine_ore(&mut ore, 20, 100);
        assert_eq!(refined, ResourcePool::new(10, 3, 3, 0));
        assert_eq!(ore, ResourcePool::new(0, 1, 0, 2));

        let mut ore = ResourcePool::new(40, 40, 0, 0);
        let refined = refine_ore(&mut ore, 20, 12);
        assert_eq!(refined, ResourcePool::new(10, 2, 0, 0));
        assert_eq!(ore, ResourcePool::new(20, 36, 0, 0));
    }
}
