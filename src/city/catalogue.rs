//! StructureCatalogue - static structure tables and the structure factory
//!
//! Build costs, recycle values and population requirements are fixed per
//! structure kind. `get` returns a new structure (UnderConstruction) plus the
//! capability record that goes with it.

use crate::city::capability::Capability;
use crate::city::mine::{Mine, MineFacility, MineProductionRate};
use crate::city::product::ProductType;
use crate::city::production::{Factory, FoodProduction, PowerStructure};
use crate::city::resources::ResourcePool;
use crate::city::stockpile::ProductPool;
use crate::city::structure::{PopulationRequirements, Structure, StructureClass, StructureKind};
use crate::core::config::SimulationConfig;
use crate::core::error::Result;

/// Default recycle value as a fraction of build cost
pub const DEFAULT_RECYCLE_VALUE: f32 = 0.9;

/// Refined storage (and food storage) of a Command Center
pub const BASE_STORAGE_CAPACITY: u32 = 250;

pub const STORAGE_TANKS_CAPACITY: u32 = 1000;
pub const SMELTER_ORE_CAPACITY: u32 = 250;
pub const WAREHOUSE_CAPACITY: u32 = 100;
pub const AGRIDOME_FOOD_CAPACITY: u32 = 1000;
pub const AGRIDOME_BASE_PRODUCTION: u32 = 10;

const ROBOT_FACTORY_PRODUCTS: [ProductType; 4] = [
    ProductType::Digger,
    ProductType::Dozer,
    ProductType::Miner,
    ProductType::Truck,
];

const CONSUMER_FACTORY_PRODUCTS: [ProductType; 2] = [ProductType::Clothing, ProductType::Medicine];

/// Static structure factory and lookup tables
pub struct StructureCatalogue;

impl StructureCatalogue {
    /// Refined resources needed to build a structure
    pub fn cost_to_build(kind: StructureKind) -> ResourcePool {
        use StructureKind::*;
        match kind {
            Agridome => ResourcePool::new(20, 10, 5, 0),
            Chap => ResourcePool::new(50, 10, 20, 5),
            CommandCenter => ResourcePool::new(100, 75, 65, 35),
            Commercial => ResourcePool::new(25, 5, 2, 0),
            CommTower => ResourcePool::new(30, 10, 5, 5),
            FusionReactor => ResourcePool::new(75, 25, 50, 30),
            HotLaboratory => ResourcePool::new(45, 10, 15, 5),
            Laboratory => ResourcePool::new(20, 10, 10, 5),
            MedicalCenter => ResourcePool::new(25, 5, 2, 0),
            Nursery => ResourcePool::new(20, 10, 5, 0),
            Park => ResourcePool::new(25, 5, 2, 0),
            SurfacePolice | UndergroundPolice => ResourcePool::new(25, 5, 2, 0),
            RecreationCenter => ResourcePool::new(25, 5, 2, 0),
            Recycling => ResourcePool::new(20, 10, 8, 3),
            RedLightDistrict => ResourcePool::new(20, 5, 2, 0),
            Residence => ResourcePool::new(25, 5, 2, 0),
            Road => ResourcePool::new(10, 15, 0, 0),
            RobotCommand => ResourcePool::new(75, 50, 45, 25),
            Smelter => ResourcePool::new(30, 20, 10, 5),
            SolarPanel1 => ResourcePool::new(10, 20, 5, 5),
            SolarPlant => ResourcePool::new(50, 25, 50, 20),
            StorageTanks => ResourcePool::new(15, 5, 6, 1),
            SurfaceFactory | UndergroundFactory => ResourcePool::new(20, 10, 10, 5),
            University => ResourcePool::new(20, 10, 10, 5),
            Warehouse => ResourcePool::new(15, 5, 6, 1),
            AirShaft | CargoLander | ColonistLander | MineFacility | MineShaft | SeedFactory
            | SeedLander | SeedPower | SeedSmelter | Tube => ResourcePool::default(),
        }
    }

    /// Refined resources returned when a structure is recycled
    pub fn recycle_value(kind: StructureKind) -> ResourcePool {
        use StructureKind::*;
        match kind {
            MineFacility | CargoLander | ColonistLander | SeedFactory | SeedPower
            | SeedSmelter => ResourcePool::new(15, 10, 5, 5),
            SeedLander => ResourcePool::new(10, 5, 5, 5),
            _ => Self::default_recycle_value(&Self::cost_to_build(kind)),
        }
    }

    pub fn population_requirements(kind: StructureKind) -> PopulationRequirements {
        use StructureKind::*;
        let (workers, scientists) = match kind {
            Agridome => (1, 0),
            Chap => (2, 0),
            Commercial => (1, 0),
            FusionReactor => (1, 2),
            HotLaboratory => (1, 5),
            Laboratory => (1, 5),
            MedicalCenter => (1, 2),
            Nursery => (1, 1),
            Park => (1, 0),
            SurfacePolice | UndergroundPolice => (5, 0),
            RecreationCenter => (2, 0),
            Recycling => (1, 1),
            RedLightDistrict => (2, 0),
            RobotCommand => (4, 0),
            SeedFactory => (2, 0),
            SeedSmelter => (2, 0),
            Smelter => (4, 0),
            SolarPanel1 => (1, 0),
            SurfaceFactory => (4, 0),
            UndergroundFactory => (2, 0),
            University => (1, 3),
            Warehouse => (1, 0),
            _ => (0, 0),
        };
        PopulationRequirements::new(workers, scientists)
    }

    pub fn can_build(pool: &ResourcePool, kind: StructureKind) -> bool {
        pool.covers(&Self::cost_to_build(kind))
    }

    /// Cost scaled by the default recycle value, truncated toward zero
    fn default_recycle_value(cost: &ResourcePool) -> ResourcePool {
        let mut value = *cost;
        for r in value.resources.iter_mut() {
            *r = (*r as f32 * DEFAULT_RECYCLE_VALUE) as u32;
        }
        value
    }

    /// Build a new structure of `kind` with its capability record
    pub fn get(kind: StructureKind, config: &SimulationConfig) -> Result<(Structure, Option<Capability>)> {
        use StructureKind as K;

        let class = Self::class_of(kind);
        let base = Structure::new(kind, class)
            .with_population_requirements(Self::population_requirements(kind));

        let built = match kind {
            K::Agridome => (
                base.with_max_age(600)
                    .with_turns_to_build(3)
                    .with_requires_chap(true)
                    .with_resources_in(ResourcePool::new(1, 0, 0, 0))
                    .with_energy_required(2),
                Some(Capability::Food(FoodProduction::new(
                    AGRIDOME_BASE_PRODUCTION,
                    AGRIDOME_FOOD_CAPACITY,
                ))),
            ),
            K::AirShaft | K::Tube => (
                base.with_turns_to_build(1)
                    .with_self_sustained(true)
                    .with_repairable(false),
                None,
            ),
            K::CargoLander | K::ColonistLander | K::SeedLander => (
                base.with_max_age(50)
                    .with_turns_to_build(1)
                    .with_self_sustained(true)
                    .with_repairable(false),
                None,
            ),
            K::Chap => (
                base.with_max_age(600)
                    .with_turns_to_build(5)
                    .with_energy_required(10),
                None,
            ),
            K::CommandCenter => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_self_sustained(true)
                    .with_storage_capacity(BASE_STORAGE_CAPACITY),
                Some(Capability::Food(FoodProduction::new(0, BASE_STORAGE_CAPACITY))),
            ),
            K::Commercial => (
                base.with_max_age(500)
                    .with_turns_to_build(3)
                    .with_requires_chap(true)
                    .with_energy_required(1),
                None,
            ),
            K::CommTower => (
                base.with_max_age(600)
                    .with_turns_to_build(2)
                    .with_energy_required(2),
                None,
            ),
            K::FusionReactor => (
                base.with_max_age(1000)
                    .with_turns_to_build(10)
                    .with_resources_in(ResourcePool::new(2, 2, 1, 1)),
                Some(Capability::Power(PowerStructure::fuel(1000))),
            ),
            K::HotLaboratory => (
                base.with_max_age(500)
                    .with_turns_to_build(5)
                    .with_energy_required(5),
                None,
            ),
            K::Laboratory => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_energy_required(3),
                None,
            ),
            K::MedicalCenter => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_requires_chap(true)
                    .with_energy_required(2),
                None,
            ),
            K::MineFacility => (
                base.with_turns_to_build(3).with_self_sustained(true),
                Some(Capability::Mine(MineFacility::new(Mine::new(
                    MineProductionRate::Medium,
                    config,
                )))),
            ),
            K::MineShaft => (
                base.with_turns_to_build(1)
                    .with_self_sustained(true)
                    .with_repairable(false),
                None,
            ),
            K::Nursery => (
                base.with_max_age(500)
                    .with_turns_to_build(3)
                    .with_requires_chap(true)
                    .with_energy_required(1),
                None,
            ),
            K::Park => (
                base.with_turns_to_build(3).with_requires_chap(true),
                None,
            ),
            K::Road => (
                base.with_turns_to_build(1).with_self_sustained(true),
                None,
            ),
            K::SurfacePolice => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_requires_chap(true)
                    .with_energy_required(2),
                None,
            ),
            K::UndergroundPolice => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_energy_required(2),
                None,
            ),
            K::RecreationCenter => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_requires_chap(true)
                    .with_energy_required(2),
                None,
            ),
            K::Recycling => (
                base.with_max_age(600)
                    .with_turns_to_build(4)
                    .with_energy_required(4),
                None,
            ),
            K::RedLightDistrict => (
                base.with_max_age(500)
                    .with_turns_to_build(4)
                    .with_requires_chap(true)
                    .with_energy_required(1),
                None,
            ),
            K::Residence => (
                base.with_max_age(500)
                    .with_turns_to_build(2)
                    .with_requires_chap(true)
                    .with_energy_required(2),
                None,
            ),
            K::RobotCommand => (
                base.with_max_age(500)
                    .with_turns_to_build(3)
                    .with_energy_required(5),
                None,
            ),
            K::SeedFactory => (
                base.with_max_age(200)
                    .with_turns_to_build(7)
                    .with_self_sustained(true),
                Some(Capability::Factory(Factory::new(
                    kind,
                    ROBOT_FACTORY_PRODUCTS.to_vec(),
                )?)),
            ),
            K::SeedPower => (
                base.with_max_age(150)
                    .with_turns_to_build(5)
                    .with_self_sustained(true),
                Some(Capability::Power(PowerStructure::fuel(50))),
            ),
            K::SeedSmelter => (
                base.with_max_age(150)
                    .with_turns_to_build(7)
                    .with_self_sustained(true)
                    .with_storage_capacity(SMELTER_ORE_CAPACITY),
                None,
            ),
            K::Smelter => (
                base.with_max_age(600)
                    .with_turns_to_build(8)
                    .with_energy_required(5)
                    .with_storage_capacity(SMELTER_ORE_CAPACITY),
                None,
            ),
            K::SolarPanel1 => (
                base.with_max_age(1000).with_turns_to_build(4),
                Some(Capability::Power(PowerStructure::solar(50))),
            ),
            K::SolarPlant => (
                base.with_max_age(1000).with_turns_to_build(8),
                Some(Capability::Power(PowerStructure::solar(2000))),
            ),
            K::StorageTanks => (
                base.with_max_age(500)
                    .with_turns_to_build(2)
                    .with_storage_capacity(STORAGE_TANKS_CAPACITY),
                None,
            ),
            K::SurfaceFactory => (
                base.with_max_age(600)
                    .with_turns_to_build(7)
                    .with_energy_required(10),
                Some(Capability::Factory(Factory::new(
                    kind,
                    ROBOT_FACTORY_PRODUCTS.to_vec(),
                )?)),
            ),
            K::UndergroundFactory => (
                base.with_max_age(600)
                    .with_turns_to_build(7)
                    .with_energy_required(4),
                Some(Capability::Factory(Factory::new(
                    kind,
                    CONSUMER_FACTORY_PRODUCTS.to_vec(),
                )?)),
            ),
            K::University => (
                base.with_max_age(500)
                    .with_turns_to_build(6)
                    .with_requires_chap(true)
                    .with_energy_required(3),
                None,
            ),
            K::Warehouse => (
                base.with_max_age(500)
                    .with_turns_to_build(3)
                    .with_energy_required(1),
                Some(Capability::Warehouse(ProductPool::new(WAREHOUSE_CAPACITY))),
            ),
        };

        Ok(built)
    }

    /// Build a structure from a numeric type id
    pub fn get_by_id(id: u32, config: &SimulationConfig) -> Result<(Structure, Option<Capability>)> {
        Self::get(StructureKind::from_id(id)?, config)
    }

    pub fn class_of(kind: StructureKind) -> StructureClass {
        use StructureClass as C;
        use StructureKind::*;
        match kind {
            Agridome => C::FoodProduction,
            AirShaft | Tube => C::Tube,
            CargoLander | ColonistLander | SeedLander => C::Lander,
            Chap => C::LifeSupport,
            CommandCenter => C::Command,
            Commercial | RedLightDistrict => C::Commercial,
            CommTower => C::Communication,
            FusionReactor | SeedPower | SolarPanel1 | SolarPlant => C::EnergyProduction,
            HotLaboratory | Laboratory => C::Laboratory,
            MedicalCenter => C::MedicalCenter,
            MineFacility => C::Mine,
            MineShaft => C::Undefined,
            Nursery => C::Nursery,
            Park => C::Park,
            Road => C::Road,
            SurfacePolice | UndergroundPolice => C::Police,
            RecreationCenter => C::RecreationCenter,
            Recycling => C::Recycling,
            Residence => C::Residence,
            RobotCommand => C::RobotCommand,
            SeedFactory | SurfaceFactory | UndergroundFactory => C::Factory,
            SeedSmelter | Smelter => C::Smelter,
            StorageTanks => C::Storage,
            University => C::University,
            Warehouse => C::Warehouse,
        }
    }
}
