//! Structure lifecycle state machine
//!
//! A structure starts UnderConstruction, becomes Operational once its age
//! reaches its build time, and from then on moves between Operational, Idle
//! and Disabled as the turn driver re-evaluates it. Destroyed is terminal.

use serde::{Deserialize, Serialize};

use crate::city::resources::ResourcePool;
use crate::core::error::{ColonyError, Result};

/// Structure type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum StructureKind {
    Agridome = 1,
    AirShaft = 2,
    CargoLander = 3,
    Chap = 4,
    ColonistLander = 5,
    CommandCenter = 6,
    Commercial = 7,
    CommTower = 8,
    FusionReactor = 9,
    HotLaboratory = 10,
    Laboratory = 11,
    MedicalCenter = 12,
    MineFacility = 13,
    MineShaft = 14,
    Nursery = 15,
    Park = 16,
    Road = 17,
    SurfacePolice = 18,
    UndergroundPolice = 19,
    RecreationCenter = 20,
    Recycling = 21,
    RedLightDistrict = 22,
    Residence = 23,
    RobotCommand = 24,
    SeedFactory = 25,
    SeedLander = 26,
    SeedPower = 27,
    SeedSmelter = 28,
    Smelter = 29,
    SolarPanel1 = 30,
    SolarPlant = 31,
    StorageTanks = 32,
    SurfaceFactory = 33,
    UndergroundFactory = 34,
    University = 35,
    Warehouse = 36,
    Tube = 37,
}

impl StructureKind {
    pub const ALL: [StructureKind; 37] = [
        StructureKind::Agridome,
        StructureKind::AirShaft,
        StructureKind::CargoLander,
        StructureKind::Chap,
        StructureKind::ColonistLander,
        StructureKind::CommandCenter,
        StructureKind::Commercial,
        StructureKind::CommTower,
        StructureKind::FusionReactor,
        StructureKind::HotLaboratory,
        StructureKind::Laboratory,
        StructureKind::MedicalCenter,
        StructureKind::MineFacility,
        StructureKind::MineShaft,
        StructureKind::Nursery,
        StructureKind::Park,
        StructureKind::Road,
        StructureKind::SurfacePolice,
        StructureKind::UndergroundPolice,
        StructureKind::RecreationCenter,
        StructureKind::Recycling,
        StructureKind::RedLightDistrict,
        StructureKind::Residence,
        StructureKind::RobotCommand,
        StructureKind::SeedFactory,
        StructureKind::SeedLander,
        StructureKind::SeedPower,
        StructureKind::SeedSmelter,
        StructureKind::Smelter,
        StructureKind::SolarPanel1,
        StructureKind::SolarPlant,
        StructureKind::StorageTanks,
        StructureKind::SurfaceFactory,
        StructureKind::UndergroundFactory,
        StructureKind::University,
        StructureKind::Warehouse,
        StructureKind::Tube,
    ];

    pub fn id(&self) -> u32 {
        *self as u32
    }

    /// Look up a kind by its numeric id (as stored in save documents)
    pub fn from_id(id: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|k| k.id() == id)
            .ok_or(ColonyError::UnsupportedStructureType(id))
    }

    pub fn name(&self) -> &'static str {
        match self {
            StructureKind::Agridome => "Agridome",
            StructureKind::AirShaft => "Air Shaft",
            StructureKind::CargoLander => "Cargo Lander",
            StructureKind::Chap => "Atmospheric Processor",
            StructureKind::ColonistLander => "Colonist Lander",
            StructureKind::CommandCenter => "Command Center",
            StructureKind::Commercial => "Commercial",
            StructureKind::CommTower => "Communications Tower",
            StructureKind::FusionReactor => "Fusion Reactor",
            StructureKind::HotLaboratory => "Hot Laboratory",
            StructureKind::Laboratory => "Laboratory",
            StructureKind::MedicalCenter => "Medical Center",
            StructureKind::MineFacility => "Mine Facility",
            StructureKind::MineShaft => "Mine Shaft",
            StructureKind::Nursery => "Nursery",
            StructureKind::Park => "Park",
            StructureKind::Road => "Road",
            StructureKind::SurfacePolice => "Police (Surface)",
            StructureKind::UndergroundPolice => "Police (Underground)",
            StructureKind::RecreationCenter => "Recreation Center",
            StructureKind::Recycling => "Recycling Facility",
            StructureKind::RedLightDistrict => "Red Light District",
            StructureKind::Residence => "Residential Facility",
            StructureKind::RobotCommand => "Robot Command",
            StructureKind::SeedFactory => "SEED Factory",
            StructureKind::SeedLander => "SEED Lander",
            StructureKind::SeedPower => "SEED Power",
            StructureKind::SeedSmelter => "SEED Smelter",
            StructureKind::Smelter => "Smelter",
            StructureKind::SolarPanel1 => "Solar Panel",
            StructureKind::SolarPlant => "Solar Plant",
            StructureKind::StorageTanks => "Storage Tanks",
            StructureKind::SurfaceFactory => "Surface Factory",
            StructureKind::UndergroundFactory => "Underground Factory",
            StructureKind::University => "University",
            StructureKind::Warehouse => "Warehouse",
            StructureKind::Tube => "Tube",
        }
    }
}

/// Broad functional class of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureClass {
    Command,
    Commercial,
    Communication,
    EnergyProduction,
    Factory,
    FoodProduction,
    Laboratory,
    Lander,
    LifeSupport,
    MedicalCenter,
    Mine,
    Nursery,
    Park,
    Police,
    RecreationCenter,
    Recycling,
    Residence,
    Road,
    RobotCommand,
    Smelter,
    Storage,
    Tube,
    Undefined,
    University,
    Warehouse,
}

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureState {
    UnderConstruction,
    Operational,
    Idle,
    Disabled,
    Destroyed,
}

impl StructureState {
    pub fn description(&self) -> &'static str {
        match self {
            StructureState::UnderConstruction => "Under Construction",
            StructureState::Operational => "Operational",
            StructureState::Idle => "Idle",
            StructureState::Disabled => "Disabled",
            StructureState::Destroyed => "Destroyed",
        }
    }
}

/// Hard precondition failures, listed in evaluation priority order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisabledReason {
    #[default]
    None,
    Chap,
    Disconnected,
    Energy,
    Population,
    RefinedResources,
    StructuralIntegrity,
}

impl DisabledReason {
    pub fn description(&self) -> &'static str {
        match self {
            DisabledReason::None => "Not Disabled",
            DisabledReason::Chap => "CHAP Facility unavailable",
            DisabledReason::Disconnected => "Not connected to a Command Center",
            DisabledReason::Energy => "Insufficient Energy",
            DisabledReason::Population => "Insufficient Workers or Scientists",
            DisabledReason::RefinedResources => "Insufficient refined resources",
            DisabledReason::StructuralIntegrity => "Structural Integrity is compromised",
        }
    }
}

/// Soft, recoverable reasons for not producing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdleReason {
    #[default]
    None,
    PlayerSet,
    InternalStorageFull,
    FactoryProductionComplete,
    FactoryInsufficientResources,
    FactoryInsufficientRobotCommandCapacity,
    FactoryInsufficientWarehouseSpace,
    MineExhausted,
    MineInactive,
    InsufficientLuxuryProduct,
}

impl IdleReason {
    pub fn description(&self) -> &'static str {
        match self {
            IdleReason::None => "Not Idle",
            IdleReason::PlayerSet => "Manually set to Idle",
            IdleReason::InternalStorageFull => "Internal storage pool full",
            IdleReason::FactoryProductionComplete => "Production complete, waiting on product pull",
            IdleReason::FactoryInsufficientResources => "Insufficient resources to continue production",
            IdleReason::FactoryInsufficientRobotCommandCapacity => "Cannot pull robot due to lack of robot command capacity",
            IdleReason::FactoryInsufficientWarehouseSpace => "Cannot pull product due to lack of Warehouse space",
            IdleReason::MineExhausted => "Mine exhausted",
            IdleReason::MineInactive => "Mine inactive",
            IdleReason::InsufficientLuxuryProduct => "Insufficient luxury product",
        }
    }
}

/// Workers and scientists, used both for requirements and assignments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PopulationRequirements {
    pub workers: u32,
    pub scientists: u32,
}

impl PopulationRequirements {
    pub const fn new(workers: u32, scientists: u32) -> Self {
        Self { workers, scientists }
    }

    pub fn is_empty(&self) -> bool {
        self.workers == 0 && self.scientists == 0
    }

    pub fn satisfies(&self, required: &PopulationRequirements) -> bool {
        self.workers >= required.workers && self.scientists >= required.scientists
    }
}

/// What happened when a structure aged one turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgeOutcome {
    Unchanged,
    ConstructionComplete,
    Destroyed,
}

pub const MAX_INTEGRITY: u32 = 100;

/// One built object on the colony map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    kind: StructureKind,
    class: StructureClass,
    state: StructureState,
    disabled_reason: DisabledReason,
    idle_reason: IdleReason,
    age: u32,
    max_age: u32,
    turns_to_build: u32,
    integrity: u32,
    energy_required: u32,
    population_requirements: PopulationRequirements,
    population_available: PopulationRequirements,
    requires_chap: bool,
    self_sustained: bool,
    repairable: bool,
    connected: bool,
    resources_in: ResourcePool,
    storage: ResourcePool,
    storage_capacity: u32,
}

impl Structure {
    pub fn new(kind: StructureKind, class: StructureClass) -> Self {
        Self {
            kind,
            class,
            state: StructureState::UnderConstruction,
            disabled_reason: DisabledReason::None,
            idle_reason: IdleReason::None,
            age: 0,
            max_age: 0,
            turns_to_build: 1,
            integrity: MAX_INTEGRITY,
            energy_required: 0,
            population_requirements: PopulationRequirements::default(),
            population_available: PopulationRequirements::default(),
            requires_chap: false,
            self_sustained: false,
            repairable: true,
            connected: false,
            resources_in: ResourcePool::default(),
            storage: ResourcePool::default(),
            storage_capacity: 0,
        }
    }

    // === Construction-time builders (used by the catalogue) ===

    pub fn with_max_age(mut self, max_age: u32) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_turns_to_build(mut self, turns: u32) -> Self {
        self.turns_to_build = turns.max(1);
        self
    }

    pub fn with_energy_required(mut self, energy: u32) -> Self {
        self.energy_required = energy;
        self
    }

    pub fn with_requires_chap(mut self, requires_chap: bool) -> Self {
        self.requires_chap = requires_chap;
        self
    }

    pub fn with_self_sustained(mut self, self_sustained: bool) -> Self {
        self.self_sustained = self_sustained;
        self
    }

    pub fn with_repairable(mut self, repairable: bool) -> Self {
        self.repairable = repairable;
        self
    }

    pub fn with_resources_in(mut self, resources: ResourcePool) -> Self {
        self.resources_in = resources;
        self
    }

    pub fn with_storage_capacity(mut self, capacity: u32) -> Self {
        self.storage_capacity = capacity;
        self
    }

    pub fn with_population_requirements(mut self, requirements: PopulationRequirements) -> Self {
        self.population_requirements = requirements;
        self
    }

    // === Accessors ===

    pub fn kind(&self) -> StructureKind {
        self.kind
    }

    pub fn class(&self) -> StructureClass {
        self.class
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn state(&self) -> StructureState {
        self.state
    }

    pub fn disabled_reason(&self) -> DisabledReason {
        self.disabled_reason
    }

    pub fn idle_reason(&self) -> IdleReason {
        self.idle_reason
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn max_age(&self) -> u32 {
        self.max_age
    }

    /// Structures with a max age of 0 never age out
    pub fn ages(&self) -> bool {
        self.max_age > 0
    }

    pub fn turns_to_build(&self) -> u32 {
        self.turns_to_build
    }

    pub fn integrity(&self) -> u32 {
        self.integrity
    }

    pub fn energy_required(&self) -> u32 {
        self.energy_required
    }

    pub fn population_requirements(&self) -> PopulationRequirements {
        self.population_requirements
    }

    pub fn population_available(&self) -> PopulationRequirements {
        self.population_available
    }

    pub fn set_population_available(&mut self, available: PopulationRequirements) {
        self.population_available = available;
    }

    pub fn requires_chap(&self) -> bool {
        self.requires_chap
    }

    pub fn self_sustained(&self) -> bool {
        self.self_sustained
    }

    pub fn repairable(&self) -> bool {
        self.repairable
    }

    pub fn connected(&self) -> bool {
        self.connected
    }

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn resources_in(&self) -> ResourcePool {
        self.resources_in
    }

    pub fn storage(&self) -> &ResourcePool {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut ResourcePool {
        &mut self.storage
    }

    pub fn storage_capacity(&self) -> u32 {
        self.storage_capacity
    }

    pub fn free_storage(&self) -> u32 {
        self.storage_capacity.saturating_sub(self.storage.total())
    }

    // === State predicates ===

    pub fn under_construction(&self) -> bool {
        self.state == StructureState::UnderConstruction
    }

    pub fn operational(&self) -> bool {
        self.state == StructureState::Operational
    }

    pub fn is_idle(&self) -> bool {
        self.state == StructureState::Idle
    }

    pub fn disabled(&self) -> bool {
        self.state == StructureState::Disabled
    }

    pub fn destroyed(&self) -> bool {
        self.state == StructureState::Destroyed
    }

    /// Construction finished and not destroyed
    pub fn is_built(&self) -> bool {
        !self.under_construction() && !self.destroyed()
    }

    /// Idled by the player rather than by a recoverable production condition
    pub fn is_player_idled(&self) -> bool {
        self.idle_reason == IdleReason::PlayerSet
    }

    /// Operational, or idle for a reason the structure can recover from itself
    pub fn can_think(&self) -> bool {
        self.operational() || (self.is_idle() && !self.is_player_idled())
    }

    pub fn state_description(&self) -> &'static str {
        self.state.description()
    }

    /// Inspector text: the disabled reason wins over the idle reason
    pub fn reason_description(&self) -> &'static str {
        if self.disabled() {
            self.disabled_reason.description()
        } else if self.is_idle() {
            self.idle_reason.description()
        } else {
            ""
        }
    }

    // === Transitions ===

    /// Clear any idle reason and resume operation (no effect while disabled)
    pub fn enable(&mut self) {
        if !self.is_built() {
            return;
        }
        self.idle_reason = IdleReason::None;
        if self.state != StructureState::Disabled {
            self.state = StructureState::Operational;
        }
    }

    /// Hard failure. The idle reason is kept for reporting.
    pub fn disable(&mut self, reason: DisabledReason) {
        if !self.is_built() {
            return;
        }
        self.state = StructureState::Disabled;
        self.disabled_reason = reason;
    }

    /// All preconditions hold again: leave Disabled, falling back to Idle if
    /// an idle reason is still pending
    pub fn restore(&mut self) {
        if !self.is_built() {
            return;
        }
        self.disabled_reason = DisabledReason::None;
        self.state = if self.idle_reason == IdleReason::None {
            StructureState::Operational
        } else {
            StructureState::Idle
        };
    }

    /// Soft stop. A disabled structure records the reason but stays disabled.
    pub fn idle(&mut self, reason: IdleReason) {
        if !self.is_built() {
            return;
        }
        self.idle_reason = reason;
        if self.state != StructureState::Disabled {
            self.state = StructureState::Idle;
        }
    }

    /// Player toggle
    pub fn force_idle(&mut self, idle: bool) {
        if idle {
            self.idle(IdleReason::PlayerSet);
        } else if self.is_player_idled() {
            self.enable();
        }
    }

    pub fn destroy(&mut self) {
        self.state = StructureState::Destroyed;
        self.integrity = 0;
    }

    /// Advance age by one turn, completing construction or destroying the
    /// structure as thresholds are crossed
    pub fn increment_age(&mut self, integrity_decay_interval: u32) -> AgeOutcome {
        if self.destroyed() {
            return AgeOutcome::Unchanged;
        }

        self.age += 1;

        if self.ages() && self.age > self.max_age {
            self.destroy();
            return AgeOutcome::Destroyed;
        }

        if self.under_construction() {
            if self.age >= self.turns_to_build {
                self.state = StructureState::Operational;
                return AgeOutcome::ConstructionComplete;
            }
            return AgeOutcome::Unchanged;
        }

        if self.ages() && integrity_decay_interval > 0 {
            let turns_in_service = self.age - self.turns_to_build;
            if turns_in_service > 0 && turns_in_service % integrity_decay_interval == 0 {
                return self.apply_damage(1);
            }
        }

        AgeOutcome::Unchanged
    }

    /// Reduce integrity; reaching zero destroys the structure
    pub fn apply_damage(&mut self, amount: u32) -> AgeOutcome {
        if self.destroyed() {
            return AgeOutcome::Unchanged;
        }
        self.integrity = self.integrity.saturating_sub(amount);
        if self.integrity == 0 {
            self.destroy();
            return AgeOutcome::Destroyed;
        }
        AgeOutcome::Unchanged
    }

    /// Restore full integrity. Returns false if the structure can't be repaired.
    pub fn repair(&mut self) -> bool {
        if !self.repairable || self.destroyed() {
            return false;
        }
        self.integrity = MAX_INTEGRITY;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agridome() -> Structure {
        Structure::new(StructureKind::Agridome, StructureClass::FoodProduction)
            .with_turns_to_build(3)
            .with_max_age(600)
    }

    #[test]
    fn test_kind_ids_round_trip() {
        for kind in StructureKind::ALL {
            assert_eq!(StructureKind::from_id(kind.id()).unwrap(), kind);
        }
        assert!(matches!(
            StructureKind::from_id(0),
            Err(ColonyError::UnsupportedStructureType(0))
        ));
        assert!(StructureKind::from_id(999).is_err());
    }

    #[test]
    fn test_construction_completes_at_build_time() {
        let mut s = agridome();
        assert!(s.under_construction());

        assert_eq!(s.increment_age(10), AgeOutcome::Unchanged);
        assert_eq!(s.increment_age(10), AgeOutcome::Unchanged);
        assert_eq!(s.increment_age(10), AgeOutcome::ConstructionComplete);
        assert!(s.operational());
        assert_eq!(s.age(), 3);
    }

    #[test]
    fn test_destroyed_after_max_age() {
        let mut s = Structure::new(StructureKind::CargoLander, StructureClass::Lander)
            .with_turns_to_build(1)
            .with_max_age(2);

        s.increment_age(0);
        s.increment_age(0);
        assert!(s.operational());
        assert_eq!(s.increment_age(0), AgeOutcome::Destroyed);
        assert!(s.destroyed());

        // Destroyed structures never come back
        s.enable();
        s.restore();
        assert!(s.destroyed());
    }

    #[test]
    fn test_integrity_decays_while_in_service() {
        let mut s = agridome();
        for _ in 0..3 {
            s.increment_age(10);
        }
        assert_eq!(s.integrity(), MAX_INTEGRITY);

        for _ in 0..20 {
            s.increment_age(10);
        }
        assert_eq!(s.integrity(), MAX_INTEGRITY - 2);
    }

    #[test]
    fn test_damage_to_zero_destroys() {
        let mut s = agridome();
        assert_eq!(s.apply_damage(150), AgeOutcome::Destroyed);
        assert!(s.destroyed());
        assert!(!s.repair());
    }

    #[test]
    fn test_idle_reason_survives_disable() {
        let mut s = agridome().with_turns_to_build(1);
        s.increment_age(0);

        s.idle(IdleReason::InternalStorageFull);
        s.disable(DisabledReason::Energy);
        assert!(s.disabled());
        assert_eq!(s.idle_reason(), IdleReason::InternalStorageFull);
        assert_eq!(s.reason_description(), DisabledReason::Energy.description());

        s.restore();
        assert!(s.is_idle());
        assert_eq!(s.disabled_reason(), DisabledReason::None);
    }

    #[test]
    fn test_force_idle_toggle() {
        let mut s = agridome().with_turns_to_build(1);
        s.increment_age(0);

        s.force_idle(true);
        assert!(s.is_player_idled());
        assert!(!s.can_think());

        s.force_idle(false);
        assert!(s.operational());
    }

    #[test]
    fn test_transitions_ignored_during_construction() {
        let mut s = agridome();
        s.disable(DisabledReason::Chap);
        s.idle(IdleReason::PlayerSet);
        assert!(s.under_construction());
    }

    #[test]
    fn test_population_satisfies() {
        let required = PopulationRequirements::new(2, 1);
        assert!(PopulationRequirements::new(2, 1).satisfies(&required));
        assert!(!PopulationRequirements::new(5, 0).satisfies(&required));
    }
}
