//! ProductPool - capacity-bounded warehouse storage for finished products

use serde::{Deserialize, Serialize};

use crate::city::product::ProductType;

/// Product counts plus a storage capacity in storage units
///
/// Invariant: the storage used by all stored products never exceeds capacity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductPool {
    counts: [u32; ProductType::COUNT],
    capacity: u32,
}

impl ProductPool {
    pub fn new(capacity: u32) -> Self {
        Self {
            counts: [0; ProductType::COUNT],
            capacity,
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn count(&self, product: ProductType) -> u32 {
        self.counts[product.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }

    /// Storage units currently occupied
    pub fn used_storage(&self) -> u32 {
        ProductType::ALL
            .iter()
            .map(|p| self.count(*p) * p.storage_required_per_unit())
            .sum()
    }

    pub fn available_storage(&self) -> u32 {
        self.capacity.saturating_sub(self.used_storage())
    }

    pub fn can_store(&self, product: ProductType, count: u32) -> bool {
        product.storage_required_per_unit() * count <= self.available_storage()
    }

    /// Store `count` items; all or nothing. Returns the number stored.
    pub fn store(&mut self, product: ProductType, count: u32) -> u32 {
        if !self.can_store(product, count) {
            return 0;
        }
        self.counts[product.index()] += count;
        count
    }

    /// Remove up to `count` items, returns the number actually removed
    pub fn pull(&mut self, product: ProductType, count: u32) -> u32 {
        let entry = &mut self.counts[product.index()];
        let pulled = count.min(*entry);
        *entry -= pulled;
        pulled
    }
}
