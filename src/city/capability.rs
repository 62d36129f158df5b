//! Capability records attached to structures
//!
//! The manager keeps one optional capability per structure, index-aligned
//! with the structure arena. Smelters, storage and command structures use the
//! structure's own resource storage and carry no capability record.

use serde::{Deserialize, Serialize};

use crate::city::mine::MineFacility;
use crate::city::production::{Factory, FoodProduction, PowerStructure};
use crate::city::stockpile::ProductPool;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Capability {
    Food(FoodProduction),
    Power(PowerStructure),
    Factory(Factory),
    Mine(MineFacility),
    Warehouse(ProductPool),
}

impl Capability {
    pub fn as_food(&self) -> Option<&FoodProduction> {
        match self {
            Capability::Food(food) => Some(food),
            _ => None,
        }
    }

    pub fn as_food_mut(&mut self) -> Option<&mut FoodProduction> {
        match self {
            Capability::Food(food) => Some(food),
            _ => None,
        }
    }

    pub fn as_power(&self) -> Option<&PowerStructure> {
        match self {
            Capability::Power(power) => Some(power),
            _ => None,
        }
    }

    pub fn as_factory(&self) -> Option<&Factory> {
        match self {
            Capability::Factory(factory) => Some(factory),
            _ => None,
        }
    }

    pub fn as_factory_mut(&mut self) -> Option<&mut Factory> {
        match self {
            Capability::Factory(factory) => Some(factory),
            _ => None,
        }
    }

    pub fn as_mine(&self) -> Option<&MineFacility> {
        match self {
            Capability::Mine(facility) => Some(facility),
            _ => None,
        }
    }

    pub fn as_mine_mut(&mut self) -> Option<&mut MineFacility> {
        match self {
            Capability::Mine(facility) => Some(facility),
            _ => None,
        }
    }

    pub fn as_warehouse(&self) -> Option<&ProductPool> {
        match self {
            Capability::Warehouse(pool) => Some(pool),
            _ => None,
        }
    }

    pub fn as_warehouse_mut(&mut self) -> Option<&mut ProductPool> {
        match self {
            Capability::Warehouse(pool) => Some(pool),
            _ => None,
        }
    }
}
