//! Savegame persistence
//!
//! A save is a single JSON document. The `version` tag is checked before
//! anything else is read; a load always builds a fresh `Colony` so a failed
//! load leaves the running game untouched.

use std::path::Path;

use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::city::capability::Capability;
use crate::city::structure::{Structure, StructureKind};
use crate::core::config::SimulationConfig;
use crate::core::error::{ColonyError, Result};
use crate::core::types::{Difficulty, StructureId, TileCoord, Turn};
use crate::simulation::morale::Morale;
use crate::simulation::population::{PopulationPool, RobotPool};
use crate::simulation::world::Colony;

pub const SAVEGAME_VERSION: &str = "0.7.1";

/// One managed structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureRecord {
    pub id: StructureId,
    /// Numeric structure type id, checked against the catalogue on load
    pub type_id: u32,
    pub tile: TileCoord,
    pub structure: Structure,
    pub capability: Option<Capability>,
}

/// Root of the save document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveDocument {
    pub version: String,
    pub turn: Turn,
    pub difficulty: Difficulty,
    pub population: PopulationPool,
    pub robots: RobotPool,
    pub morale: Morale,
    pub rng: ChaCha8Rng,
    /// Destroyed since the last turn, not yet reported
    #[serde(default)]
    pub destroyed_pending: Vec<StructureId>,
    pub structures: Vec<StructureRecord>,
}

impl SaveDocument {
    /// Snapshot a colony
    pub fn capture(colony: &Colony) -> Self {
        let manager = colony.manager();
        let structures = manager
            .iter()
            .map(|e| StructureRecord {
                id: e.id,
                type_id: e.structure.kind().id(),
                tile: e.tile,
                structure: e.structure.clone(),
                capability: e.capability.cloned(),
            })
            .collect();

        Self {
            version: SAVEGAME_VERSION.to_string(),
            turn: colony.turn,
            difficulty: colony.difficulty,
            population: colony.population.clone(),
            robots: colony.robots.clone(),
            morale: colony.morale,
            rng: colony.rng.clone(),
            destroyed_pending: colony.destroyed_pending.clone(),
            structures,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a save document. `filename` is only used in error messages.
    pub fn from_json(json: &str, filename: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;

        let found = match value.as_object().and_then(|root| root.get("version")) {
            Some(serde_json::Value::String(version)) => version.clone(),
            _ => {
                return Err(ColonyError::MissingRoot {
                    filename: filename.to_string(),
                })
            }
        };
        if found != SAVEGAME_VERSION {
            return Err(ColonyError::VersionMismatch {
                filename: filename.to_string(),
                expected: SAVEGAME_VERSION.to_string(),
                found,
            });
        }

        // Parse the typed document from the text so integer widths survive
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild a colony from this document
    pub fn restore(self, config: SimulationConfig) -> Result<Colony> {
        let mut colony = Colony::new(config, 0)?;
        colony.turn = self.turn;
        colony.difficulty = self.difficulty;
        colony.population = self.population;
        colony.robots = self.robots;
        colony.morale = self.morale;
        colony.rng = self.rng;
        colony.destroyed_pending = self.destroyed_pending;

        for record in self.structures {
            let kind = StructureKind::from_id(record.type_id)?;
            if kind != record.structure.kind() {
                return Err(ColonyError::UnsupportedStructureType(record.type_id));
            }
            colony
                .manager
                .insert(record.id, record.structure, record.capability, record.tile)?;
        }
        colony.manager.mark_topology_changed();

        tracing::info!(
            turn = colony.turn,
            structures = colony.manager.len(),
            "Colony restored"
        );
        Ok(colony)
    }
}

/// Serialize a colony to a JSON string
pub fn to_json(colony: &Colony) -> Result<String> {
    SaveDocument::capture(colony).to_json()
}

/// Restore a colony from a JSON string
pub fn from_json(json: &str, filename: &str, config: SimulationConfig) -> Result<Colony> {
    SaveDocument::from_json(json, filename)?.restore(config)
}

/// Write a save file
pub fn save(colony: &Colony, path: &Path) -> Result<()> {
    std::fs::write(path, to_json(colony)?)?;
    tracing::info!(path = %path.display(), "Colony saved");
    Ok(())
}

/// Load a save file into a fresh colony
pub fn load(path: &Path, config: SimulationConfig) -> Result<Colony> {
    let content = std::fs::read_to_string(path)?;
    from_json(&content, &path.display().to_string(), config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_version_is_missing_root() {
        for json in ["[]", "{}", r#"{"version": 3}"#] {
            let err = SaveDocument::from_json(json, "bad.json").unwrap_err();
            assert!(matches!(err, ColonyError::MissingRoot { ref filename } if filename == "bad.json"));
        }
    }

    #[test]
    fn test_version_mismatch_names_both_versions() {
        let err = SaveDocument::from_json(r#"{"version": "0.1"}"#, "old.json").unwrap_err();
        assert_eq!(
            err.to_string(),
            format!(
                "Savegame version mismatch: 'old.json'. Expected {}, found 0.1.",
                SAVEGAME_VERSION
            )
        );
    }

    #[test]
    fn test_round_trip_keeps_colony_state() {
        let mut colony = Colony::new(SimulationConfig::default(), 9).unwrap();
        colony.population_mut().add_population(12, 4);
        colony
            .place_structure(StructureKind::Agridome, TileCoord::surface(2, 3))
            .unwrap();

        let json = to_json(&colony).unwrap();
        let restored = from_json(&json, "round.json", SimulationConfig::default()).unwrap();

        assert_eq!(restored.population(), colony.population());
        assert_eq!(restored.manager().len(), 1);
        assert_eq!(to_json(&restored).unwrap(), json);
    }

    #[test]
    fn test_type_id_must_match_structure() {
        let colony = {
            let mut colony = Colony::new(SimulationConfig::default(), 1).unwrap();
            colony
                .place_structure(StructureKind::Park, TileCoord::surface(0, 0))
                .unwrap();
            colony
        };
        let mut doc = SaveDocument::capture(&colony);
        doc.structures[0].type_id = StructureKind::Road.id();
        assert!(doc.restore(SimulationConfig::default()).is_err());

        let mut doc = SaveDocument::capture(&colony);
        doc.structures[0].type_id = 0;
        assert!(matches!(
            doc.restore(SimulationConfig::default()),
            Err(ColonyError::UnsupportedStructureType(0))
        ));
    }
}
