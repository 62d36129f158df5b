//! Products - what factories build
//!
//! Each product has a per-turn resource cost, a number of production turns
//! and a storage footprint used by warehouses.

use serde::{Deserialize, Serialize};

use crate::city::resources::ResourcePool;

/// Type of product a factory can build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ProductType {
    Digger,
    Dozer,
    Miner,
    Truck,
    Clothing,
    Medicine,
}

/// Cost to produce one unit of a product
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductCost {
    /// Refined resources consumed on every production turn
    pub resource_cost: ResourcePool,
    /// Production turns until the product is complete
    pub turns_to_build: u32,
}

impl ProductCost {
    /// Resources consumed over the whole production run
    pub fn total_cost(&self) -> ResourcePool {
        self.resource_cost * self.turns_to_build
    }
}

impl ProductType {
    pub const COUNT: usize = 6;

    pub const ALL: [ProductType; ProductType::COUNT] = [
        ProductType::Digger,
        ProductType::Dozer,
        ProductType::Miner,
        ProductType::Truck,
        ProductType::Clothing,
        ProductType::Medicine,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            ProductType::Digger => "Robodigger",
            ProductType::Dozer => "Robodozer",
            ProductType::Miner => "Robominer",
            ProductType::Truck => "Truck",
            ProductType::Clothing => "Clothing",
            ProductType::Medicine => "Medicine",
        }
    }

    pub fn cost(&self) -> ProductCost {
        let (resource_cost, turns_to_build) = match self {
            ProductType::Digger => (ResourcePool::new(2, 2, 1, 1), 5),
            ProductType::Dozer => (ResourcePool::new(2, 2, 1, 1), 5),
            ProductType::Miner => (ResourcePool::new(2, 2, 2, 1), 5),
            ProductType::Truck => (ResourcePool::new(2, 1, 1, 0), 3),
            ProductType::Clothing => (ResourcePool::new(1, 0, 0, 0), 2),
            ProductType::Medicine => (ResourcePool::new(0, 1, 0, 1), 2),
        };
        ProductCost {
            resource_cost,
            turns_to_build,
        }
    }

    /// Storage units one item occupies in a warehouse
    pub fn storage_required_per_unit(&self) -> u32 {
        match self {
            ProductType::Digger | ProductType::Dozer | ProductType::Miner => 25,
            ProductType::Truck => 10,
            ProductType::Clothing | ProductType::Medicine => 1,
        }
    }

    /// Robots are delivered to the robot pool instead of a warehouse
    pub fn is_robot(&self) -> bool {
        matches!(
            self,
            ProductType::Digger | ProductType::Dozer | ProductType::Miner
        )
    }

    pub fn is_warehouse_stored(&self) -> bool {
        !self.is_robot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_product_takes_time_and_resources() {
        for product in ProductType::ALL {
            let cost = product.cost();
            assert!(cost.turns_to_build > 0, "{:?}", product);
            assert!(!cost.resource_cost.is_empty(), "{:?}", product);
            assert!(product.storage_required_per_unit() > 0);
        }
    }

    #[test]
    fn test_total_cost_spans_all_turns() {
        let cost = ProductType::Truck.cost();
        assert_eq!(cost.total_cost(), ResourcePool::new(6, 3, 3, 0));
    }

    #[test]
    fn test_robot_split() {
        assert!(ProductType::Digger.is_robot());
        assert!(ProductType::Truck.is_warehouse_stored());
        assert!(!ProductType::Medicine.is_robot());
    }
}
