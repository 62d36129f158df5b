//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Simulation turn counter
pub type Turn = u32;

/// Stable handle for a managed structure (index into the manager's arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructureId(pub u32);

impl StructureId {
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Tile position on the colony map. Depth 0 is the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
    pub depth: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32, depth: i32) -> Self {
        Self { x, y, depth }
    }

    pub const fn surface(x: i32, y: i32) -> Self {
        Self { x, y, depth: 0 }
    }

    /// The four orthogonal neighbours on the same level
    pub fn neighbors(&self) -> [TileCoord; 4] {
        [
            TileCoord::new(self.x, self.y - 1, self.depth),
            TileCoord::new(self.x + 1, self.y, self.depth),
            TileCoord::new(self.x, self.y + 1, self.depth),
            TileCoord::new(self.x - 1, self.y, self.depth),
        ]
    }

    pub fn above(&self) -> TileCoord {
        TileCoord::new(self.x, self.y, self.depth - 1)
    }

    pub fn below(&self) -> TileCoord {
        TileCoord::new(self.x, self.y, self.depth + 1)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.depth)
    }
}

/// Game difficulty. Scales crime losses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Beginner,
        Difficulty::Easy,
        Difficulty::Medium,
        Difficulty::Hard,
    ];

    /// Multiplier applied to the amount stolen by a crime event
    pub fn theft_multiplier(&self) -> f64 {
        match self {
            Difficulty::Beginner => 0.5,
            Difficulty::Easy => 0.75,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "Beginner",
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown difficulty '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_neighbors_stay_on_level() {
        let tile = TileCoord::new(3, 4, 2);
        for n in tile.neighbors() {
            assert_eq!(n.depth, 2);
            assert_eq!((n.x - 3).abs() + (n.y - 4).abs(), 1);
        }
        assert_eq!(tile.below(), TileCoord::new(3, 4, 3));
        assert_eq!(tile.above(), TileCoord::new(3, 4, 1));
    }

    #[test]
    fn test_difficulty_multipliers_ordered() {
        let multipliers: Vec<f64> = Difficulty::ALL.iter().map(|d| d.theft_multiplier()).collect();
        assert!(multipliers.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(Difficulty::Medium.theft_multiplier(), 1.0);
    }

    #[test]
    fn test_difficulty_parse() {
        assert_eq!("hard".parse::<Difficulty>(), Ok(Difficulty::Hard));
        assert_eq!("Beginner".parse::<Difficulty>(), Ok(Difficulty::Beginner));
        assert!("nightmare".parse::<Difficulty>().is_err());
    }
}
