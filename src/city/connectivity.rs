//! Connectivity - which structures are linked to a Command Center
//!
//! Breadth-first search from every built Command Center through connector
//! tiles (tubes, air shafts, or tiles the map reports as connectors). Air
//! shafts stacked on adjacent levels link those levels. A structure is
//! connected if it sits on a reached tile or next to one.
//!
//! Recomputed over the whole map whenever the topology changes.

use ahash::AHashSet;
use std::collections::VecDeque;

use crate::city::manager::StructureManager;
use crate::city::structure::StructureKind;
use crate::core::types::TileCoord;
use crate::simulation::services::TileGraph;

fn built_kind_at(manager: &StructureManager, tile: TileCoord) -> Option<StructureKind> {
    let id = manager.structure_at(tile)?;
    let structure = manager.get(id).ok()?;
    structure.is_built().then(|| structure.kind())
}

fn is_connector(manager: &StructureManager, graph: &dyn TileGraph, tile: TileCoord) -> bool {
    matches!(
        built_kind_at(manager, tile),
        Some(StructureKind::Tube) | Some(StructureKind::AirShaft)
    ) || graph.is_connector(tile)
}

/// Tiles reachable from a Command Center through connectors
pub fn reachable_tiles(manager: &StructureManager, graph: &dyn TileGraph) -> AHashSet<TileCoord> {
    let mut reached = AHashSet::new();
    let mut queue = VecDeque::new();

    for entry in manager.iter() {
        if entry.structure.kind() == StructureKind::CommandCenter && entry.structure.is_built() {
            reached.insert(entry.tile);
            queue.push_back(entry.tile);
        }
    }

    while let Some(tile) = queue.pop_front() {
        for next in tile.neighbors() {
            if !reached.contains(&next) && is_connector(manager, graph, next) {
                reached.insert(next);
                queue.push_back(next);
            }
        }

        if built_kind_at(manager, tile) == Some(StructureKind::AirShaft) {
            for next in [tile.above(), tile.below()] {
                if !reached.contains(&next)
                    && built_kind_at(manager, next) == Some(StructureKind::AirShaft)
                {
                    reached.insert(next);
                    queue.push_back(next);
                }
            }
        }
    }

    reached
}

/// Recompute every structure's connected flag. Returns the number connected.
pub fn update_connectivity(manager: &mut StructureManager, graph: &dyn TileGraph) -> usize {
    let reached = reachable_tiles(manager, graph);

    let flags: Vec<_> = manager
        .iter()
        .map(|e| {
            let connected = reached.contains(&e.tile)
                || e.tile.neighbors().iter().any(|n| reached.contains(n));
            (e.id, connected)
        })
        .collect();

    let mut connected_count = 0;
    for (id, connected) in flags {
        if let Ok(structure) = manager.get_mut(id) {
            structure.set_connected(connected);
        }
        if connected {
            connected_count += 1;
        }
    }

    manager.clear_connectivity_dirty();
    tracing::debug!(connected = connected_count, "Connectivity recomputed");
    connected_count
}
