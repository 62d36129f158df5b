//! City layer - structures, resources, production and the structure arena

pub mod capability;
pub mod catalogue;
pub mod connectivity;
pub mod manager;
pub mod mine;
pub mod product;
pub mod production;
pub mod resources;
pub mod stockpile;
pub mod structure;

pub use capability::Capability;
pub use catalogue::StructureCatalogue;
pub use manager::{StructureEntry, StructureManager};
pub use mine::{Mine, MineFacility, MineProductionRate};
pub use product::{ProductCost, ProductType};
pub use production::{Factory, FactoryStep, FoodProduction, PowerStructure};
pub use resources::{ResourceLane, ResourcePool};
pub use stockpile::ProductPool;
pub use structure::{
    DisabledReason, IdleReason, PopulationRequirements, Structure, StructureClass, StructureKind,
    StructureState,
};
