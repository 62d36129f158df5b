use thiserror::Error;

use crate::city::product::ProductType;
use crate::city::structure::StructureKind;
use crate::core::types::{StructureId, TileCoord};

#[derive(Error, Debug)]
pub enum ColonyError {
    #[error("Unsupported structure type: {0}")]
    UnsupportedStructureType(u32),

    #[error("Structure {0} is not managed")]
    UnmanagedStructure(StructureId),

    #[error("Tile {tile} already hosts structure {occupant}")]
    TileOccupied { tile: TileCoord, occupant: StructureId },

    #[error("{0:?} has an empty production list")]
    EmptyProductionList(StructureKind),

    #[error("{kind:?} cannot produce {product:?}")]
    ProductNotAllowed { kind: StructureKind, product: ProductType },

    #[error("Structure {id} has no {expected} capability")]
    CapabilityMismatch { id: StructureId, expected: &'static str },

    #[error("Savegame version mismatch: '{filename}'. Expected {expected}, found {found}.")]
    VersionMismatch {
        filename: String,
        expected: String,
        found: String,
    },

    #[error("Savegame '{filename}' is missing its root node")]
    MissingRoot { filename: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ColonyError>;
