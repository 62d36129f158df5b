//! External collaborators consumed by the turn driver
//!
//! Path finding, the tile map and the notification area live outside the
//! engine. The driver only sees them through these traits.

use serde::{Deserialize, Serialize};

use crate::core::types::TileCoord;

/// Shortest-path cost service
pub trait RouteCostService {
    /// Cost of the cheapest route from `from` to any of `depots`, or None if
    /// no depot is reachable
    fn route_cost(&self, from: TileCoord, depots: &[TileCoord]) -> Option<f32>;
}

/// Tile map queries used by the connectivity pass
pub trait TileGraph {
    /// True if the tile links structures to each other like a tube does
    fn is_connector(&self, tile: TileCoord) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Information,
    Warning,
    Critical,
}

/// A message for the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub tile: TileCoord,
    pub severity: Severity,
}

impl Notification {
    pub fn new(title: impl Into<String>, body: impl Into<String>, tile: TileCoord, severity: Severity) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            tile,
            severity,
        }
    }
}

/// Receiver for notifications. Pushing never blocks.
pub trait NotificationSink {
    fn push(&mut self, notification: Notification);
}

/// Notifications collected in memory
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    pub notifications: Vec<Notification>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    pub fn with_title<'a>(&'a self, title: &'a str) -> impl Iterator<Item = &'a Notification> + 'a {
        self.notifications.iter().filter(move |n| n.title == title)
    }
}

impl NotificationSink for NotificationQueue {
    fn push(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }
}

/// Every depot is reachable at the same cost
#[derive(Debug, Clone, Copy)]
pub struct FixedRouteCost(pub f32);

impl RouteCostService for FixedRouteCost {
    fn route_cost(&self, _from: TileCoord, depots: &[TileCoord]) -> Option<f32> {
        if depots.is_empty() {
            None
        } else {
            Some(self.0)
        }
    }
}

/// Route cost is the Manhattan distance to the nearest depot (same level only
/// counts x and y; level changes add one per level)
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanRouteCost;

impl RouteCostService for ManhattanRouteCost {
    fn route_cost(&self, from: TileCoord, depots: &[TileCoord]) -> Option<f32> {
        depots
            .iter()
            .map(|d| (d.x - from.x).abs() + (d.y - from.y).abs() + (d.depth - from.depth).abs())
            .min()
            .map(|distance| distance as f32)
    }
}

/// A tile map without any connector terrain; only tube structures connect
#[derive(Debug, Clone, Copy, Default)]
pub struct NoConnectorTiles;

impl TileGraph for NoConnectorTiles {
    fn is_connector(&self, _tile: TileCoord) -> bool {
        false
    }
}
