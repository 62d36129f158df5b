//! Simulation layer - the colony world context and the turn driver

pub mod crime;
pub mod morale;
pub mod population;
pub mod services;
pub mod turn;
pub mod world;

pub use crime::{CrimeEvent, CrimeExecution};
pub use morale::{Morale, MoraleChange};
pub use population::{PopulationPool, RobotPool};
pub use services::{
    FixedRouteCost, ManhattanRouteCost, NoConnectorTiles, Notification, NotificationQueue,
    NotificationSink, RouteCostService, Severity, TileGraph,
};
pub use turn::{TurnEvent, TurnInput, TurnReport};
pub use world::Colony;
