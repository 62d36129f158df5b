//! ResourcePool - the four-lane resource vector shared by every subsystem
//!
//! Lanes are ordered {CommonMetals, CommonMinerals, RareMetals, RareMinerals}
//! and used for both raw ore and refined resources. Quantities never go
//! negative: callers check `covers` before subtracting.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

/// One of the four resource categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ResourceLane {
    CommonMetals,
    CommonMinerals,
    RareMetals,
    RareMinerals,
}

impl ResourceLane {
    pub const ALL: [ResourceLane; 4] = [
        ResourceLane::CommonMetals,
        ResourceLane::CommonMinerals,
        ResourceLane::RareMetals,
        ResourceLane::RareMinerals,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Display name of the refined resource
    pub fn refined_name(&self) -> &'static str {
        match self {
            ResourceLane::CommonMetals => "Common Metals",
            ResourceLane::CommonMinerals => "Common Minerals",
            ResourceLane::RareMetals => "Rare Metals",
            ResourceLane::RareMinerals => "Rare Minerals",
        }
    }

    /// Display name of the raw ore
    pub fn ore_name(&self) -> &'static str {
        match self {
            ResourceLane::CommonMetals => "Common Metals Ore",
            ResourceLane::CommonMinerals => "Common Minerals Ore",
            ResourceLane::RareMetals => "Rare Metals Ore",
            ResourceLane::RareMinerals => "Rare Minerals Ore",
        }
    }
}

/// Fixed-size vector of resource quantities
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourcePool {
    pub resources: [u32; 4],
}

impl ResourcePool {
    pub const fn new(
        common_metals: u32,
        common_minerals: u32,
        rare_metals: u32,
        rare_minerals: u32,
    ) -> Self {
        Self {
            resources: [common_metals, common_minerals, rare_metals, rare_minerals],
        }
    }

    pub const fn splat(amount: u32) -> Self {
        Self { resources: [amount; 4] }
    }

    pub fn get(&self, lane: ResourceLane) -> u32 {
        self.resources[lane.index()]
    }

    pub fn set(&mut self, lane: ResourceLane, amount: u32) {
        self.resources[lane.index()] = amount;
    }

    pub fn total(&self) -> u32 {
        self.resources.iter().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.iter().all(|&r| r == 0)
    }

    /// True iff every lane of `self` is at least the matching lane of `other`
    pub fn covers(&self, other: &ResourcePool) -> bool {
        self.resources
            .iter()
            .zip(other.resources.iter())
            .all(|(have, need)| have >= need)
    }

    /// Lane-wise minimum
    pub fn min(&self, other: &ResourcePool) -> ResourcePool {
        let mut result = *self;
        for (r, o) in result.resources.iter_mut().zip(other.resources.iter()) {
            *r = (*r).min(*o);
        }
        result
    }

    /// What is missing from `self` to cover `required` (zero lanes when covered)
    pub fn shortfall(&self, required: &ResourcePool) -> ResourcePool {
        let mut result = *required;
        for (r, have) in result.resources.iter_mut().zip(self.resources.iter()) {
            *r = r.saturating_sub(*have);
        }
        result
    }

    /// Lanes holding a non-zero quantity, in lane order
    pub fn lanes_with_stock(&self) -> Vec<ResourceLane> {
        ResourceLane::ALL
            .into_iter()
            .filter(|lane| self.get(*lane) > 0)
            .collect()
    }

    /// Lane-wise subtraction, or None if any lane would go negative
    pub fn checked_sub(&self, other: &ResourcePool) -> Option<ResourcePool> {
        if !self.covers(other) {
            return None;
        }
        Some(*self - *other)
    }
}

impl Add for ResourcePool {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl AddAssign for ResourcePool {
    fn add_assign(&mut self, rhs: Self) {
        for (r, o) in self.resources.iter_mut().zip(rhs.resources.iter()) {
            *r += *o;
        }
    }
}

impl Sub for ResourcePool {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        self -= rhs;
        self
    }
}

impl SubAssign for ResourcePool {
    fn sub_assign(&mut self, rhs: Self) {
        debug_assert!(
            self.covers(&rhs),
            "resource subtraction would go negative: {:?} - {:?}",
            self,
            rhs
        );
        for (r, o) in self.resources.iter_mut().zip(rhs.resources.iter()) {
            *r = r.saturating_sub(*o);
        }
    }
}

impl Mul<u32> for ResourcePool {
    type Output = Self;
    fn mul(mut self, rhs: u32) -> Self {
        for r in self.resources.iter_mut() {
            *r *= rhs;
        }
        self
    }
}

/// Partial order by coverage: `a <= b` iff `b` covers `a`
impl PartialOrd for ResourcePool {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self == other {
            Some(Ordering::Equal)
        } else if other.covers(self) {
            Some(Ordering::Less)
        } else if self.covers(other) {
            Some(Ordering::Greater)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covers_requires_every_lane() {
        let pool = ResourcePool::new(10, 10, 5, 0);
        assert!(pool.covers(&ResourcePool::new(10, 0, 5, 0)));
        assert!(!pool.covers(&ResourcePool::new(0, 0, 0, 1)));
        assert!(pool.covers(&ResourcePool::default()));
    }

    #[test]
    fn test_partial_order_follows_coverage() {
        let cost = ResourcePool::new(20, 10, 5, 0);
        let rich = ResourcePool::new(100, 75, 65, 35);
        let odd = ResourcePool::new(100, 0, 0, 0);

        assert!(cost <= rich);
        assert!(rich > cost);
        assert_eq!(cost.partial_cmp(&odd), None);
        assert!(!(cost <= odd));
    }

    #[test]
    fn test_arithmetic() {
        let a = ResourcePool::new(1, 2, 3, 4);
        let b = ResourcePool::new(1, 1, 1, 1);

        assert_eq!(a + b, ResourcePool::new(2, 3, 4, 5));
        assert_eq!(a - b, ResourcePool::new(0, 1, 2, 3));
        assert_eq!(a * 3, ResourcePool::new(3, 6, 9, 12));
        assert_eq!(a.total(), 10);
    }

    #[test]
    fn test_checked_sub_refuses_negative() {
        let a = ResourcePool::new(1, 0, 0, 0);
        assert_eq!(a.checked_sub(&ResourcePool::new(0, 1, 0, 0)), None);
        assert_eq!(a.checked_sub(&a), Some(ResourcePool::default()));
    }

    #[test]
    fn test_shortfall_and_min() {
        let have = ResourcePool::new(5, 0, 2, 9);
        let need = ResourcePool::new(3, 4, 2, 10);

        assert_eq!(have.shortfall(&need), ResourcePool::new(0, 4, 0, 1));
        assert_eq!(have.min(&need), ResourcePool::new(3, 0, 2, 9));
    }

    #[test]
    fn test_lanes_with_stock() {
        let pool = ResourcePool::new(0, 3, 0, 1);
        assert_eq!(
            pool.lanes_with_stock(),
            vec![ResourceLane::CommonMinerals, ResourceLane::RareMinerals]
        );
        assert!(ResourcePool::default().lanes_with_stock().is_empty());
    }
}
