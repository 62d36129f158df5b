//! Integration tests for savegame persistence
//!
//! - save -> load -> save is byte-identical for a colony holding every
//!   structure kind
//! - a restored colony continues exactly like the original
//! - version and root checks fail the load without touching anything

use std::path::PathBuf;

use colony_sim::city::{ProductType, StructureKind};
use colony_sim::core::{ColonyError, Difficulty, SimulationConfig, StructureId, TileCoord};
use colony_sim::save::{self, SaveDocument, SAVEGAME_VERSION};
use colony_sim::simulation::{
    Colony, FixedRouteCost, NoConnectorTiles, NotificationQueue, TurnEvent, TurnInput, TurnReport,
};

fn advance(colony: &mut Colony, crime: &[Option<StructureId>]) -> TurnReport {
    let mut queue = NotificationQueue::new();
    colony
        .advance_turn(TurnInput {
            routes: &FixedRouteCost(3.0),
            tiles: &NoConnectorTiles,
            notifications: &mut queue,
            crime,
        })
        .unwrap()
}

/// One of every structure kind along a row, aged a few turns with crime
fn populated_colony() -> Colony {
    let mut colony = Colony::new(SimulationConfig::default(), 2024)
        .unwrap()
        .with_difficulty(Difficulty::Hard);
    colony.population_mut().add_population(40, 20);

    let mut ids = Vec::new();
    for (x, kind) in StructureKind::ALL.iter().enumerate() {
        let id = colony
            .place_structure(*kind, TileCoord::surface(x as i32, 0))
            .unwrap();
        ids.push(id);
    }

    let factory = colony.manager().structures_of_kind(StructureKind::SeedFactory)[0];
    colony
        .set_factory_product(factory, Some(ProductType::Truck))
        .unwrap();

    let flagged: Vec<_> = ids.iter().copied().map(Some).collect();
    for _ in 0..12 {
        advance(&mut colony, &flagged);
    }
    colony
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("colony_sim_{}_{}.json", std::process::id(), name))
}

#[test]
fn test_every_structure_kind_round_trips() {
    let colony = populated_colony();
    let json = save::to_json(&colony).unwrap();

    let restored = save::from_json(&json, "all_kinds.json", SimulationConfig::default()).unwrap();
    assert_eq!(restored.manager().len(), StructureKind::ALL.len());
    for kind in StructureKind::ALL {
        assert_eq!(restored.manager().structures_of_kind(kind).len(), 1, "{:?}", kind);
    }

    assert_eq!(save::to_json(&restored).unwrap(), json);
}

#[test]
fn test_restored_colony_continues_identically() {
    let mut original = populated_colony();
    let json = save::to_json(&original).unwrap();
    let mut restored = save::from_json(&json, "resume.json", SimulationConfig::default()).unwrap();

    let flagged: Vec<_> = original.manager().ids().into_iter().map(Some).collect();
    for _ in 0..5 {
        let a = advance(&mut original, &flagged);
        let b = advance(&mut restored, &flagged);
        assert_eq!(a.events, b.events);
        assert_eq!(a.morale, b.morale);
    }

    assert_eq!(
        save::to_json(&original).unwrap(),
        save::to_json(&restored).unwrap()
    );
}

#[test]
fn test_pending_destruction_survives_save() {
    let mut colony = populated_colony();
    let park = colony.manager().structures_of_kind(StructureKind::Park)[0];
    assert!(colony.damage(park, 100).unwrap());

    let json = save::to_json(&colony).unwrap();
    let mut restored = save::from_json(&json, "pending.json", SimulationConfig::default()).unwrap();

    let report = advance(&mut restored, &[]);
    assert!(report.events.contains(&TurnEvent::StructureDestroyed {
        id: park,
        kind: StructureKind::Park
    }));
}

#[test]
fn test_save_and_load_file() {
    let colony = populated_colony();
    let path = temp_path("file");

    save::save(&colony, &path).unwrap();
    let loaded = save::load(&path, SimulationConfig::default()).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.turn(), colony.turn());
    assert_eq!(loaded.difficulty(), Difficulty::Hard);
    assert_eq!(loaded.morale(), colony.morale());
}

#[test]
fn test_version_mismatch_rejected() {
    let colony = populated_colony();
    let mut doc = SaveDocument::capture(&colony);
    doc.version = "0.6.0".to_string();
    let path = temp_path("old_version");
    std::fs::write(&path, doc.to_json().unwrap()).unwrap();

    let result = save::load(&path, SimulationConfig::default());
    std::fs::remove_file(&path).ok();

    match result {
        Err(ColonyError::VersionMismatch {
            filename,
            expected,
            found,
        }) => {
            assert_eq!(filename, path.display().to_string());
            assert_eq!(expected, SAVEGAME_VERSION);
            assert_eq!(found, "0.6.0");
        }
        other => panic!("expected version mismatch, got {:?}", other.map(|c| c.turn())),
    }
}

#[test]
fn test_missing_root_rejected() {
    let result = save::from_json(r#"["not", "a", "save"]"#, "list.json", SimulationConfig::default());
    assert!(matches!(result, Err(ColonyError::MissingRoot { .. })));
}

#[test]
fn test_malformed_json_is_serde_error() {
    let result = save::from_json("{ version", "broken.json", SimulationConfig::default());
    assert!(matches!(result, Err(ColonyError::SerdeError(_))));
}
