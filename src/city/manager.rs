//! StructureManager - arena owning every structure on the map
//!
//! Storage is structure-of-arrays: index i of each Vec belongs to the
//! structure with `StructureId(i)`. Removed structures leave an empty slot so
//! ids stay stable. Typed queries return ids in insertion order.

use ahash::AHashMap;

use crate::city::capability::Capability;
use crate::city::product::ProductType;
use crate::city::resources::ResourcePool;
use crate::city::structure::{Structure, StructureClass, StructureKind};
use crate::core::error::{ColonyError, Result};
use crate::core::types::{StructureId, TileCoord};

/// A managed structure as seen by iteration
pub struct StructureEntry<'a> {
    pub id: StructureId,
    pub tile: TileCoord,
    pub structure: &'a Structure,
    pub capability: Option<&'a Capability>,
}

#[derive(Debug, Clone, Default)]
pub struct StructureManager {
    structures: Vec<Option<Structure>>,
    capabilities: Vec<Option<Capability>>,
    tiles: Vec<Option<TileCoord>>,
    tile_index: AHashMap<TileCoord, StructureId>,
    connectivity_dirty: bool,
    /// Never reset, so an id is not handed out twice
    next_id: u32,
}

impl StructureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a structure on a tile. Fails if the tile is already occupied.
    pub fn add(
        &mut self,
        structure: Structure,
        capability: Option<Capability>,
        tile: TileCoord,
    ) -> Result<StructureId> {
        let id = StructureId(self.next_id);
        self.insert(id, structure, capability, tile)?;
        Ok(id)
    }

    /// Place a structure under a known id (used when restoring a save)
    pub fn insert(
        &mut self,
        id: StructureId,
        structure: Structure,
        capability: Option<Capability>,
        tile: TileCoord,
    ) -> Result<()> {
        if let Some(&occupant) = self.tile_index.get(&tile) {
            return Err(ColonyError::TileOccupied { tile, occupant });
        }
        if let Some(existing) = self.tiles.get(id.index()).copied().flatten() {
            return Err(ColonyError::TileOccupied {
                tile: existing,
                occupant: id,
            });
        }

        let index = id.index();
        if index >= self.structures.len() {
            self.structures.resize(index + 1, None);
            self.capabilities.resize(index + 1, None);
            self.tiles.resize(index + 1, None);
        }

        self.structures[index] = Some(structure);
        self.capabilities[index] = capability;
        self.tiles[index] = Some(tile);
        self.tile_index.insert(tile, id);
        self.connectivity_dirty = true;
        self.next_id = self.next_id.max(id.0 + 1);
        Ok(())
    }

    /// Remove a structure, handing back its state
    pub fn remove(&mut self, id: StructureId) -> Result<(Structure, Option<Capability>)> {
        let tile = self.tile_of(id)?;
        let index = id.index();
        let structure = self.structures[index]
            .take()
            .ok_or(ColonyError::UnmanagedStructure(id))?;
        let capability = self.capabilities[index].take();
        self.tiles[index] = None;
        self.tile_index.remove(&tile);
        self.connectivity_dirty = true;
        Ok((structure, capability))
    }

    /// Release every structure. Ids issued before stay unmanaged.
    pub fn drop_all(&mut self) {
        self.structures.clear();
        self.capabilities.clear();
        self.tiles.clear();
        self.tile_index.clear();
        self.connectivity_dirty = true;
    }

    fn slot(&self, id: StructureId) -> Option<&Structure> {
        self.structures.get(id.index()).and_then(|s| s.as_ref())
    }

    pub fn contains(&self, id: StructureId) -> bool {
        self.slot(id).is_some()
    }

    pub fn get(&self, id: StructureId) -> Result<&Structure> {
        self.slot(id).ok_or(ColonyError::UnmanagedStructure(id))
    }

    pub fn get_mut(&mut self, id: StructureId) -> Result<&mut Structure> {
        self.structures
            .get_mut(id.index())
            .and_then(|s| s.as_mut())
            .ok_or(ColonyError::UnmanagedStructure(id))
    }

    pub fn capability(&self, id: StructureId) -> Option<&Capability> {
        self.capabilities.get(id.index()).and_then(|c| c.as_ref())
    }

    pub fn capability_mut(&mut self, id: StructureId) -> Option<&mut Capability> {
        self.capabilities.get_mut(id.index()).and_then(|c| c.as_mut())
    }

    /// Detach a capability record; pair with `put_capability`
    pub(crate) fn take_capability(&mut self, id: StructureId) -> Option<Capability> {
        self.capabilities.get_mut(id.index()).and_then(|c| c.take())
    }

    pub(crate) fn put_capability(&mut self, id: StructureId, capability: Capability) {
        if let Some(slot) = self.capabilities.get_mut(id.index()) {
            *slot = Some(capability);
        }
    }

    /// Structure and capability borrowed together
    pub fn entry_mut(&mut self, id: StructureId) -> Result<(&mut Structure, Option<&mut Capability>)> {
        let index = id.index();
        let structure = self
            .structures
            .get_mut(index)
            .and_then(|s| s.as_mut())
            .ok_or(ColonyError::UnmanagedStructure(id))?;
        let capability = self.capabilities.get_mut(index).and_then(|c| c.as_mut());
        Ok((structure, capability))
    }

    /// Tile a structure occupies. An unmanaged id is a logic error.
    pub fn tile_of(&self, id: StructureId) -> Result<TileCoord> {
        self.tiles
            .get(id.index())
            .copied()
            .flatten()
            .ok_or(ColonyError::UnmanagedStructure(id))
    }

    pub fn structure_at(&self, tile: TileCoord) -> Option<StructureId> {
        self.tile_index.get(&tile).copied()
    }

    pub fn len(&self) -> usize {
        self.structures.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live ids in insertion order
    pub fn ids(&self) -> Vec<StructureId> {
        self.structures
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_some())
            .map(|(i, _)| StructureId(i as u32))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = StructureEntry<'_>> {
        self.structures
            .iter()
            .zip(self.capabilities.iter())
            .zip(self.tiles.iter())
            .enumerate()
            .filter_map(|(i, ((s, c), t))| {
                Some(StructureEntry {
                    id: StructureId(i as u32),
                    tile: (*t)?,
                    structure: s.as_ref()?,
                    capability: c.as_ref(),
                })
            })
    }

    pub fn structures_of_kind(&self, kind: StructureKind) -> Vec<StructureId> {
        self.iter()
            .filter(|e| e.structure.kind() == kind)
            .map(|e| e.id)
            .collect()
    }

    pub fn structures_of_class(&self, class: StructureClass) -> Vec<StructureId> {
        self.iter()
            .filter(|e| e.structure.class() == class)
            .map(|e| e.id)
            .collect()
    }

    /// Number of operational structures of a class
    pub fn operational_count(&self, class: StructureClass) -> usize {
        self.iter()
            .filter(|e| e.structure.class() == class && e.structure.operational())
            .count()
    }

    // === Topology ===

    pub fn mark_topology_changed(&mut self) {
        self.connectivity_dirty = true;
    }

    pub fn connectivity_dirty(&self) -> bool {
        self.connectivity_dirty
    }

    pub(crate) fn clear_connectivity_dirty(&mut self) {
        self.connectivity_dirty = false;
    }

    // === Refined resource storage ===

    /// Built Command Centers and Storage Tanks, in insertion order
    pub fn refined_storage_ids(&self) -> Vec<StructureId> {
        self.iter()
            .filter(|e| is_refined_storage(e.structure))
            .map(|e| e.id)
            .collect()
    }

    /// Colony-wide refined resources
    pub fn refined_resources(&self) -> ResourcePool {
        self.iter()
            .filter(|e| is_refined_storage(e.structure))
            .fold(ResourcePool::default(), |acc, e| acc + *e.structure.storage())
    }

    pub fn refined_free_capacity(&self) -> u32 {
        self.iter()
            .filter(|e| is_refined_storage(e.structure))
            .map(|e| e.structure.free_storage())
            .sum()
    }

    /// Pull `amount` from refined storage, all or nothing
    pub fn pull_refined(&mut self, amount: &ResourcePool) -> bool {
        if !self.refined_resources().covers(amount) {
            return false;
        }

        let mut remaining = *amount;
        for structure in self.structures.iter_mut().flatten() {
            if remaining.is_empty() {
                break;
            }
            if !is_refined_storage(structure) {
                continue;
            }
            let taken = structure.storage().min(&remaining);
            *structure.storage_mut() -= taken;
            remaining -= taken;
        }
        true
    }

    /// Deposit into refined storage up to capacity. Returns what didn't fit.
    pub fn deposit_refined(&mut self, amount: &ResourcePool) -> ResourcePool {
        let mut remaining = *amount;
        for structure in self.structures.iter_mut().flatten() {
            if remaining.is_empty() {
                break;
            }
            if !is_refined_storage(structure) {
                continue;
            }
            let room = structure.free_storage();
            fill(structure.storage_mut(), &mut remaining, room);
        }
        remaining
    }

    // === Warehouses ===

    /// First operational warehouse with room for `count` of `product`
    pub fn available_warehouse(&self, product: ProductType, count: u32) -> Option<StructureId> {
        self.iter()
            .filter(|e| e.structure.operational())
            .find(|e| {
                e.capability
                    .and_then(|c| c.as_warehouse())
                    .map(|pool| pool.can_store(product, count))
                    .unwrap_or(false)
            })
            .map(|e| e.id)
    }

    /// Store one product in the first warehouse with room
    pub fn store_product(&mut self, product: ProductType) -> bool {
        let id = match self.available_warehouse(product, 1) {
            Some(id) => id,
            None => return false,
        };
        match self.capability_mut(id).and_then(|c| c.as_warehouse_mut()) {
            Some(pool) => pool.store(product, 1) == 1,
            None => false,
        }
    }

    /// Take one product out of the first warehouse holding it
    pub fn pull_product(&mut self, product: ProductType) -> bool {
        for (structure, capability) in self.structures.iter().zip(self.capabilities.iter_mut()) {
            let built = structure.as_ref().map(|s| s.is_built()).unwrap_or(false);
            if !built {
                continue;
            }
            if let Some(pool) = capability.as_mut().and_then(|c| c.as_warehouse_mut()) {
                if pool.pull(product, 1) == 1 {
                    return true;
                }
            }
        }
        false
    }

    /// Units of `product` held across built warehouses
    pub fn product_count(&self, product: ProductType) -> u32 {
        self.iter()
            .filter(|e| e.structure.is_built())
            .filter_map(|e| e.capability.and_then(|c| c.as_warehouse()))
            .map(|pool| pool.count(product))
            .sum()
    }

    // === Food ===

    pub fn food_total(&self) -> u32 {
        self.iter()
            .filter(|e| !e.structure.destroyed())
            .filter_map(|e| e.capability.and_then(|c| c.as_food()))
            .map(|food| food.food_level())
            .sum()
    }
}

fn is_refined_storage(structure: &Structure) -> bool {
    matches!(
        structure.class(),
        StructureClass::Command | StructureClass::Storage
    ) && structure.is_built()
}

/// Move as much of `remaining` into `storage` as `room` allows, lane by lane
pub(crate) fn fill(storage: &mut ResourcePool, remaining: &mut ResourcePool, room: u32) -> u32 {
    let mut room = room;
    let mut stored = 0;
    for (slot, want) in storage.resources.iter_mut().zip(remaining.resources.iter_mut()) {
        let moved = (*want).min(room);
        *slot += moved;
        *want -= moved;
        room -= moved;
        stored += moved;
    }
    stored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::city::catalogue::StructureCatalogue;
    use crate::core::config::SimulationConfig;

    fn built(kind: StructureKind) -> (Structure, Option<Capability>) {
        let (mut s, c) = StructureCatalogue::get(kind, &SimulationConfig::default()).unwrap();
        while s.under_construction() {
            s.increment_age(0);
        }
        (s, c)
    }

    #[test]
    fn test_add_rejects_occupied_tile() {
        let mut manager = StructureManager::new();
        let tile = TileCoord::surface(1, 1);
        let (s, c) = built(StructureKind::Agridome);
        let first = manager.add(s, c, tile).unwrap();

        let (s, c) = built(StructureKind::Park);
        let err = manager.add(s, c, tile).unwrap_err();
        assert!(matches!(err, ColonyError::TileOccupied { occupant, .. } if occupant == first));
        assert_eq!(manager.len(), 1);
    }

    #[test]
    fn test_typed_queries_keep_insertion_order() {
        let mut manager = StructureManager::new();
        for x in 0..3 {
            let (s, c) = built(StructureKind::Agridome);
            manager.add(s, c, TileCoord::surface(x, 0)).unwrap();
            let (s, c) = built(StructureKind::Park);
            manager.add(s, c, TileCoord::surface(x, 1)).unwrap();
        }

        let domes = manager.structures_of_kind(StructureKind::Agridome);
        assert_eq!(domes, vec![StructureId(0), StructureId(2), StructureId(4)]);
        assert_eq!(manager.structures_of_class(StructureClass::Park).len(), 3);
    }

    #[test]
    fn test_tile_lookup_and_remove() {
        let mut manager = StructureManager::new();
        let tile = TileCoord::new(4, 2, 1);
        let (s, c) = built(StructureKind::Warehouse);
        let id = manager.add(s, c, tile).unwrap();

        assert_eq!(manager.tile_of(id).unwrap(), tile);
        assert_eq!(manager.structure_at(tile), Some(id));

        manager.remove(id).unwrap();
        assert!(matches!(manager.tile_of(id), Err(ColonyError::UnmanagedStructure(_))));
        assert_eq!(manager.structure_at(tile), None);

        // Ids are not reused
        let (s, c) = built(StructureKind::Warehouse);
        assert_eq!(manager.add(s, c, tile).unwrap(), StructureId(1));
    }

    #[test]
    fn test_refined_storage_pull_and_deposit() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::CommandCenter);
        manager.add(s, c, TileCoord::surface(0, 0)).unwrap();
        let (s, c) = built(StructureKind::StorageTanks);
        manager.add(s, c, TileCoord::surface(1, 0)).unwrap();

        let leftover = manager.deposit_refined(&ResourcePool::new(200, 100, 0, 0));
        assert!(leftover.is_empty());
        assert_eq!(manager.refined_resources(), ResourcePool::new(200, 100, 0, 0));

        assert!(!manager.pull_refined(&ResourcePool::new(0, 0, 1, 0)));
        assert!(manager.pull_refined(&ResourcePool::new(150, 100, 0, 0)));
        assert_eq!(manager.refined_resources(), ResourcePool::new(50, 0, 0, 0));
    }

    #[test]
    fn test_deposit_overflow_returned() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::CommandCenter);
        manager.add(s, c, TileCoord::surface(0, 0)).unwrap();

        let leftover = manager.deposit_refined(&ResourcePool::new(200, 100, 0, 0));
        assert_eq!(leftover.total(), 50);
        assert_eq!(manager.refined_free_capacity(), 0);
    }

    #[test]
    fn test_warehouse_products() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::Warehouse);
        manager.add(s, c, TileCoord::surface(0, 0)).unwrap();

        assert!(manager.store_product(ProductType::Truck));
        assert_eq!(manager.product_count(ProductType::Truck), 1);
        assert!(manager.pull_product(ProductType::Truck));
        assert!(!manager.pull_product(ProductType::Truck));
    }

    #[test]
    fn test_destroyed_warehouse_stock_not_counted() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::Warehouse);
        let warehouse = manager.add(s, c, TileCoord::surface(0, 0)).unwrap();
        assert!(manager.store_product(ProductType::Truck));

        manager.get_mut(warehouse).unwrap().destroy();
        assert_eq!(manager.product_count(ProductType::Truck), 0);
        assert!(!manager.pull_product(ProductType::Truck));
    }

    #[test]
    fn test_drop_all() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::Park);
        manager.add(s, c, TileCoord::surface(0, 0)).unwrap();
        manager.drop_all();
        assert!(manager.is_empty());
        assert_eq!(manager.structure_at(TileCoord::surface(0, 0)), None);
    }

    #[test]
    fn test_ids_not_reused_after_drop_all() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::Park);
        let old = manager.add(s, c, TileCoord::surface(0, 0)).unwrap();
        manager.drop_all();

        let (s, c) = built(StructureKind::Warehouse);
        let new = manager.add(s, c, TileCoord::surface(0, 0)).unwrap();
        assert_ne!(old, new);
        assert!(matches!(manager.get(old), Err(ColonyError::UnmanagedStructure(id)) if id == old));
        assert_eq!(manager.get(new).unwrap().kind(), StructureKind::Warehouse);
    }

    #[test]
    fn test_insert_advances_next_id() {
        let mut manager = StructureManager::new();
        let (s, c) = built(StructureKind::Park);
        manager.insert(StructureId(7), s, c, TileCoord::surface(0, 0)).unwrap();

        let (s, c) = built(StructureKind::Park);
        let next = manager.add(s, c, TileCoord::surface(1, 0)).unwrap();
        assert_eq!(next, StructureId(8));
    }
}
