//! Turn driver - advances the colony by one turn
//!
//! Order of a turn:
//! ageing -> connectivity -> power -> CHAP -> enablement of everything else
//! -> food -> mines -> smelters -> factories -> product delivery -> crime -> morale
//!
//! Everything that happens is collected as `TurnEvent`s and returned in the
//! `TurnReport` once the pass has finished.

use crate::city::catalogue::StructureCatalogue;
use crate::city::connectivity::update_connectivity;
use crate::city::manager::fill;
use crate::city::mine::haul_capacity;
use crate::city::product::ProductType;
use crate::city::production::{refine_ore, FactoryStep};
use crate::city::resources::ResourcePool;
use crate::city::structure::{
    AgeOutcome, DisabledReason, IdleReason, PopulationRequirements, StructureClass, StructureKind,
};
use crate::core::error::Result;
use crate::core::types::{StructureId, TileCoord, Turn};
use crate::simulation::crime::CrimeEvent;
use crate::simulation::morale::{structure_morale_changes, MoraleChange};
use crate::simulation::population::{COLONIST_LANDER_SCIENTISTS, COLONIST_LANDER_WORKERS};
use crate::simulation::services::{
    Notification, NotificationSink, RouteCostService, Severity, TileGraph,
};
use crate::simulation::world::Colony;

/// Food delivered to the first Command Center by a cargo lander
pub const CARGO_LANDER_FOOD: u32 = 125;

/// Refined resources delivered by a cargo lander
pub const CARGO_LANDER_RESOURCES: ResourcePool = ResourcePool::new(25, 25, 15, 15);

/// External collaborators for one turn
pub struct TurnInput<'a> {
    pub routes: &'a dyn RouteCostService,
    pub tiles: &'a dyn TileGraph,
    pub notifications: &'a mut dyn NotificationSink,
    /// Structures committing crime this turn, decided upstream
    pub crime: &'a [Option<StructureId>],
}

/// Events generated during a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    ConstructionComplete {
        id: StructureId,
        kind: StructureKind,
    },
    StructureDestroyed {
        id: StructureId,
        kind: StructureKind,
    },
    /// A lander finished construction and unloaded its cargo
    LanderDeployed {
        id: StructureId,
        kind: StructureKind,
    },
    /// Newly disabled, or disabled for a different reason than last turn
    Disabled {
        id: StructureId,
        reason: DisabledReason,
    },
    ProductionComplete {
        id: StructureId,
        product: ProductType,
    },
    ProductDelivered {
        id: StructureId,
        product: ProductType,
    },
    /// A finished product is held by its factory until it can be delivered
    DeliveryDeferred {
        id: StructureId,
        product: ProductType,
        reason: IdleReason,
    },
    MineExhausted {
        id: StructureId,
    },
    MineExtended {
        id: StructureId,
        depth: u32,
    },
    Crime(CrimeEvent),
}

/// End-of-turn summary
#[derive(Debug, Clone, Default)]
pub struct TurnReport {
    /// The turn that was processed
    pub turn: Turn,
    pub events: Vec<TurnEvent>,
    pub morale_changes: Vec<MoraleChange>,
    pub morale: i32,
    pub energy_produced: u32,
    pub energy_used: u32,
    pub food: u32,
    pub refined: ResourcePool,
}

/// Running totals for the enablement pass
#[derive(Debug, Default)]
struct Allocation {
    energy_available: u32,
    energy_used: u32,
    chap_available: bool,
}

impl Colony {
    /// Advance the colony by one turn
    pub fn advance_turn(&mut self, input: TurnInput<'_>) -> Result<TurnReport> {
        let TurnInput {
            routes,
            tiles,
            notifications,
            crime,
        } = input;

        let mut events = Vec::new();

        let mut destroyed = self.report_pending_destroyed(&mut events);
        destroyed += self.age_structures(&mut events)?;

        if self.manager.connectivity_dirty() {
            update_connectivity(&mut self.manager, tiles);
        }

        let mut allocation = Allocation::default();
        let energy_produced = self.evaluate_structures(&mut allocation, &mut events)?;

        self.update_food()?;
        self.update_mines(routes, notifications, &mut events)?;
        self.update_smelters()?;

        let pending = self.update_factories(&mut events)?;
        self.update_robot_command_capacity();
        self.deliver_products(pending, notifications, &mut events)?;

        let crime_events = self.crime.execute(
            crime,
            &mut self.manager,
            self.difficulty,
            &self.config,
            &mut self.rng,
            notifications,
        )?;
        events.extend(crime_events.into_iter().map(TurnEvent::Crime));

        let mut morale_changes = structure_morale_changes(&self.manager, &self.config, destroyed);
        morale_changes.extend(self.crime.morale_changes().iter().cloned());
        self.morale.apply(&morale_changes);

        let report = TurnReport {
            turn: self.turn,
            events,
            morale_changes,
            morale: self.morale.value(),
            energy_produced,
            energy_used: allocation.energy_used,
            food: self.manager.food_total(),
            refined: self.manager.refined_resources(),
        };

        tracing::info!(
            turn = report.turn,
            events = report.events.len(),
            morale = report.morale,
            energy = report.energy_produced,
            food = report.food,
            "Turn complete"
        );

        self.turn += 1;
        Ok(report)
    }

    /// Structures destroyed by player commands since the last turn and still
    /// managed (a recycled wreck is not reported). Returns how many.
    fn report_pending_destroyed(&mut self, events: &mut Vec<TurnEvent>) -> u32 {
        let mut reported = 0;
        for id in std::mem::take(&mut self.destroyed_pending) {
            if let Ok(structure) = self.manager.get(id) {
                let kind = structure.kind();
                events.push(TurnEvent::StructureDestroyed { id, kind });
                reported += 1;
            }
        }
        reported
    }

    /// Age every structure. Returns the number destroyed this turn.
    fn age_structures(&mut self, events: &mut Vec<TurnEvent>) -> Result<u32> {
        let interval = self.config.integrity_decay_interval;
        let mut destroyed = 0;

        for id in self.manager.ids() {
            let structure = self.manager.get_mut(id)?;
            let kind = structure.kind();

            match structure.increment_age(interval) {
                AgeOutcome::ConstructionComplete => {
                    tracing::debug!(%id, ?kind, "Construction complete");
                    events.push(TurnEvent::ConstructionComplete { id, kind });
                    self.manager.mark_topology_changed();
                    if self.deploy_lander(kind) {
                        events.push(TurnEvent::LanderDeployed { id, kind });
                    }
                }
                AgeOutcome::Destroyed => {
                    tracing::info!(%id, ?kind, "Structure destroyed");
                    events.push(TurnEvent::StructureDestroyed { id, kind });
                    self.manager.mark_topology_changed();
                    destroyed += 1;
                }
                AgeOutcome::Unchanged => {}
            }
        }

        Ok(destroyed)
    }

    /// Unload a lander's cargo. Returns false for non-landers.
    fn deploy_lander(&mut self, kind: StructureKind) -> bool {
        match kind {
            StructureKind::CargoLander => {
                let command_center = self
                    .manager
                    .structures_of_kind(StructureKind::CommandCenter)
                    .into_iter()
                    .next();
                if let Some(food) = command_center
                    .and_then(|cc| self.manager.capability_mut(cc))
                    .and_then(|c| c.as_food_mut())
                {
                    food.add_food(CARGO_LANDER_FOOD);
                }
                let lost = self.manager.deposit_refined(&CARGO_LANDER_RESOURCES);
                if !lost.is_empty() {
                    tracing::warn!(lost = lost.total(), "Cargo lander resources exceeded storage");
                }
            }
            StructureKind::ColonistLander => {
                self.population
                    .add_population(COLONIST_LANDER_WORKERS, COLONIST_LANDER_SCIENTISTS);
            }
            StructureKind::SeedLander => {
                for robot in [ProductType::Dozer, ProductType::Digger, ProductType::Miner] {
                    self.robots.add_robot(robot);
                }
            }
            _ => return false,
        }
        true
    }

    /// Power first, then CHAP, then everything else, each group in insertion
    /// order. Returns the energy produced.
    fn evaluate_structures(
        &mut self,
        allocation: &mut Allocation,
        events: &mut Vec<TurnEvent>,
    ) -> Result<u32> {
        self.population.reset_assignments();

        let ids = self.manager.ids();
        let mut power = Vec::new();
        let mut chap = Vec::new();
        let mut rest = Vec::new();
        for id in ids {
            let structure = self.manager.get(id)?;
            if structure.class() == StructureClass::EnergyProduction {
                power.push(id);
            } else if structure.kind() == StructureKind::Chap {
                chap.push(id);
            } else {
                rest.push(id);
            }
        }

        let mut energy_produced = 0;
        for id in power {
            self.evaluate_structure(id, allocation, events)?;
            if !self.manager.get(id)?.operational() {
                continue;
            }
            if let Some(power) = self.manager.capability(id).and_then(|c| c.as_power()) {
                let produced = power.energy_produced(self.config.mean_solar_distance);
                energy_produced += produced;
                allocation.energy_available += produced;
            }
        }

        for id in &chap {
            self.evaluate_structure(*id, allocation, events)?;
        }
        allocation.chap_available = chap
            .iter()
            .filter_map(|id| self.manager.get(*id).ok())
            .any(|s| s.operational());

        for id in rest {
            self.evaluate_structure(id, allocation, events)?;
        }

        Ok(energy_produced)
    }

    /// Check one structure's preconditions in priority order and take what it
    /// needs if all of them hold
    fn evaluate_structure(
        &mut self,
        id: StructureId,
        allocation: &mut Allocation,
        events: &mut Vec<TurnEvent>,
    ) -> Result<()> {
        let refined = self.manager.refined_resources();
        let threshold = self.config.integrity_operating_threshold;
        let structure = self.manager.get_mut(id)?;

        if !structure.is_built() || structure.is_player_idled() {
            return Ok(());
        }

        if structure.self_sustained() {
            if structure.disabled() {
                structure.restore();
            }
            return Ok(());
        }

        let required = structure.population_requirements();
        let resources_in = structure.resources_in();
        let reason = if structure.requires_chap() && !allocation.chap_available {
            DisabledReason::Chap
        } else if !structure.connected() {
            DisabledReason::Disconnected
        } else if structure.energy_required() > allocation.energy_available {
            DisabledReason::Energy
        } else if !self.population.can_assign(&required) {
            DisabledReason::Population
        } else if !refined.covers(&resources_in) {
            DisabledReason::RefinedResources
        } else if structure.integrity() < threshold {
            DisabledReason::StructuralIntegrity
        } else {
            DisabledReason::None
        };

        if reason != DisabledReason::None {
            let previous = structure.disabled_reason();
            structure.disable(reason);
            structure.set_population_available(PopulationRequirements::default());
            if previous != reason {
                tracing::debug!(%id, ?reason, "Structure disabled");
                events.push(TurnEvent::Disabled { id, reason });
            }
            return Ok(());
        }

        allocation.energy_available -= structure.energy_required();
        allocation.energy_used += structure.energy_required();
        self.population.assign(&required);
        structure.set_population_available(required);
        if structure.disabled() {
            structure.restore();
        }

        if !resources_in.is_empty() {
            self.manager.pull_refined(&resources_in);
        }
        Ok(())
    }

    fn update_food(&mut self) -> Result<()> {
        for id in self.manager.ids() {
            let (structure, capability) = self.manager.entry_mut(id)?;
            if !structure.can_think() {
                continue;
            }
            if let Some(food) = capability.and_then(|c| c.as_food_mut()) {
                food.think(structure);
            }
        }
        Ok(())
    }

    /// Smelters able to take ore this turn, with their tiles
    fn active_smelters(&self) -> Vec<(StructureId, TileCoord)> {
        self.manager
            .iter()
            .filter(|e| e.structure.class() == StructureClass::Smelter && e.structure.can_think())
            .map(|e| (e.id, e.tile))
            .collect()
    }

    fn update_mines(
        &mut self,
        routes: &dyn RouteCostService,
        notifications: &mut dyn NotificationSink,
        events: &mut Vec<TurnEvent>,
    ) -> Result<()> {
        let smelters = self.active_smelters();
        let depots: Vec<TileCoord> = smelters.iter().map(|(_, tile)| *tile).collect();
        let mut shafts = Vec::new();

        for id in self.manager.structures_of_class(StructureClass::Mine) {
            let tile = self.manager.tile_of(id)?;
            let mut demand = 0;
            for (smelter, _) in &smelters {
                demand += self.manager.get(*smelter)?.free_storage();
            }

            let (structure, capability) = self.manager.entry_mut(id)?;
            let facility = match capability.and_then(|c| c.as_mine_mut()) {
                Some(facility) => facility,
                None => continue,
            };
            if !structure.can_think() {
                continue;
            }

            if facility.tick_extension(&self.config) {
                let depth = facility.mine().depth();
                tracing::info!(%id, depth, "Mine extended");
                events.push(TurnEvent::MineExtended { id, depth });
                shafts.push(TileCoord::new(tile.x, tile.y, depth as i32));
            }

            if facility.mine().exhausted() {
                structure.idle(IdleReason::MineExhausted);
                if facility.report_exhaustion() {
                    notifications.push(Notification::new(
                        "Mine Exhausted",
                        "A mine has exhausted its resources and needs to be extended.",
                        tile,
                        Severity::Warning,
                    ));
                    events.push(TurnEvent::MineExhausted { id });
                }
                continue;
            }

            // Disabled lanes, or only exhausted ones left enabled
            if facility.mine().active_lanes().is_empty() {
                structure.idle(IdleReason::MineInactive);
                continue;
            }

            if matches!(
                structure.idle_reason(),
                IdleReason::MineExhausted | IdleReason::MineInactive
            ) {
                structure.enable();
            }

            let capacity = haul_capacity(
                routes.route_cost(tile, &depots),
                self.config.haul_traversal_constant,
                facility.trucks(),
            );
            let mut ore = facility.extract(capacity, demand, &self.config);
            tracing::debug!(%id, capacity, ore = ore.total(), "Ore extracted");

            for (smelter, _) in &smelters {
                if ore.is_empty() {
                    break;
                }
                let structure = self.manager.get_mut(*smelter)?;
                let room = structure.free_storage();
                fill(structure.storage_mut(), &mut ore, room);
            }
        }

        for tile in shafts {
            self.dig_mine_shaft(tile)?;
        }
        Ok(())
    }

    /// Open a new mine level with a shaft under the facility
    fn dig_mine_shaft(&mut self, tile: TileCoord) -> Result<()> {
        if let Some(occupant) = self.manager.structure_at(tile) {
            tracing::warn!(%tile, %occupant, "Mine shaft tile already occupied");
            return Ok(());
        }
        let (structure, capability) = StructureCatalogue::get(StructureKind::MineShaft, &self.config)?;
        let id = self.manager.add(structure, capability, tile)?;
        tracing::debug!(%id, %tile, "Mine shaft dug");
        Ok(())
    }

    fn update_smelters(&mut self) -> Result<()> {
        let rate = self.config.smelter_processing_rate;

        for (id, _) in self.active_smelters() {
            let room = self.manager.refined_free_capacity();
            let structure = self.manager.get_mut(id)?;

            if room == 0 {
                if !structure.storage().is_empty() {
                    structure.idle(IdleReason::InternalStorageFull);
                }
                continue;
            }

            let refined = refine_ore(structure.storage_mut(), rate, room);
            if refined.is_empty() {
                continue;
            }
            if structure.idle_reason() == IdleReason::InternalStorageFull {
                structure.enable();
            }
            self.manager.deposit_refined(&refined);
        }

        Ok(())
    }

    /// Run every factory. Returns the products awaiting delivery.
    fn update_factories(&mut self, events: &mut Vec<TurnEvent>) -> Result<Vec<(StructureId, ProductType)>> {
        let mut pending = Vec::new();

        for id in self.manager.ids() {
            let available = self.manager.refined_resources();
            let (structure, capability) = self.manager.entry_mut(id)?;
            let factory = match capability.and_then(|c| c.as_factory_mut()) {
                Some(factory) => factory,
                None => continue,
            };
            if !structure.is_built() || structure.disabled() {
                continue;
            }

            match factory.update_production(structure, &available) {
                FactoryStep::Advanced { consumed } => {
                    self.manager.pull_refined(&consumed);
                }
                FactoryStep::Completed { consumed, product } => {
                    self.manager.pull_refined(&consumed);
                    tracing::debug!(%id, ?product, "Production complete");
                    events.push(TurnEvent::ProductionComplete { id, product });
                    pending.push((id, product));
                }
                FactoryStep::Waiting(product) => pending.push((id, product)),
                FactoryStep::Stopped | FactoryStep::Starved => {}
            }
        }

        Ok(pending)
    }

    fn update_robot_command_capacity(&mut self) {
        let centers = self.manager.operational_count(StructureClass::RobotCommand) as u32;
        self.robots.set_command_capacity(
            self.config.base_robot_command_capacity + centers * self.config.robot_command_capacity,
        );
    }

    /// Hand finished products to the robot pool or a warehouse. Products that
    /// can't be placed stay in their factory for another try next turn.
    fn deliver_products(
        &mut self,
        pending: Vec<(StructureId, ProductType)>,
        notifications: &mut dyn NotificationSink,
        events: &mut Vec<TurnEvent>,
    ) -> Result<()> {
        for (id, product) in pending {
            let delivered = if product.is_robot() {
                self.robots.command_capacity_available() && self.robots.add_robot(product)
            } else {
                self.manager.store_product(product)
            };

            if delivered {
                self.factory_mut(id)?.pull_product();
                let structure = self.manager.get_mut(id)?;
                if matches!(
                    structure.idle_reason(),
                    IdleReason::FactoryInsufficientRobotCommandCapacity
                        | IdleReason::FactoryInsufficientWarehouseSpace
                ) {
                    structure.enable();
                }
                events.push(TurnEvent::ProductDelivered { id, product });
                continue;
            }

            let reason = if product.is_robot() {
                IdleReason::FactoryInsufficientRobotCommandCapacity
            } else {
                IdleReason::FactoryInsufficientWarehouseSpace
            };
            let tile = self.manager.tile_of(id)?;
            let structure = self.manager.get_mut(id)?;
            let newly_deferred = structure.idle_reason() != reason;
            structure.idle(reason);

            if newly_deferred && reason == IdleReason::FactoryInsufficientWarehouseSpace {
                notifications.push(Notification::new(
                    "Warehouses full",
                    "A factory has shut down due to lack of available warehouse space.",
                    tile,
                    Severity::Warning,
                ));
            }
            events.push(TurnEvent::DeliveryDeferred { id, product, reason });
        }

        Ok(())
    }
}
