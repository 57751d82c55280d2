// Core value types shared across the generator.
//
// Defines grid coordinates (`Coord`), the flat arena index (`CellIndex`),
// placed game objects (`Tile`, `TileState`), and the unit the GA evolves
// (`MapCandidate`). All types derive `Serialize`/`Deserialize` so a ranked
// population can be handed to an external renderer as JSON.
//
// See also: `grid.rs` for the arena these coordinates index into,
// `candidate.rs` which creates `MapCandidate`s, `ga.rs` which recombines them.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A cell position on the level grid.
///
/// Components are signed so direction arithmetic (`x - dx`) never needs
/// casts; a coordinate with a negative component is simply out of bounds.
/// X grows east, Y grows south, origin is the top-left corner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Offset by a direction vector.
    pub const fn step(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Absolute per-axis deltas to `other`.
    pub fn delta(self, other: Self) -> (u32, u32) {
        (
            (self.x - other.x).unsigned_abs(),
            (self.y - other.y).unsigned_abs(),
        )
    }

    /// Floating-point view, for distance math.
    pub fn as_f64(self) -> (f64, f64) {
        (self.x as f64, self.y as f64)
    }

    /// True when the two cells touch, orthogonally or (if `diagonal`)
    /// diagonally. A cell is not adjacent to itself.
    pub fn is_adjacent(self, other: Self, diagonal: bool) -> bool {
        let (dx, dy) = self.delta(other);
        match (dx, dy) {
            (0, 1) | (1, 0) => true,
            (1, 1) => diagonal,
            _ => false,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Row-major index into a `Grid` arena: `y * width + x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIndex(pub u32);

impl CellIndex {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

// ---------------------------------------------------------------------------
// Placed objects
// ---------------------------------------------------------------------------

/// What a placed tile represents in the finished level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TileState {
    Start,
    End,
    Item,
    Obstacle,
    Enemy,
    Objective,
}

impl TileState {
    /// States that mutation may introduce or switch between. START and END
    /// are structural and never drawn at random.
    pub const MUTABLE: [TileState; 4] = [
        TileState::Item,
        TileState::Obstacle,
        TileState::Enemy,
        TileState::Objective,
    ];

    pub fn is_structural(self) -> bool {
        matches!(self, TileState::Start | TileState::End)
    }

    /// Single-character glyph used by text previews.
    pub fn glyph(self) -> char {
        match self {
            TileState::Start => 'S',
            TileState::End => 'E',
            TileState::Item => 'i',
            TileState::Obstacle => '#',
            TileState::Enemy => 'x',
            TileState::Objective => 'O',
        }
    }
}

/// A game object placed on the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub state: TileState,
    pub position: Coord,
    pub active: bool,
}

impl Tile {
    pub fn new(state: TileState, position: Coord) -> Self {
        Self {
            state,
            position,
            active: true,
        }
    }
}

/// One complete level-object layout and its score.
///
/// A candidate references positions on a heightmap but does not own it; the
/// same heightmap backs the whole population of a generation run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapCandidate {
    pub tiles: Vec<Tile>,
    pub fitness: f64,
}

impl MapCandidate {
    pub fn new(tiles: Vec<Tile>) -> Self {
        Self {
            tiles,
            fitness: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// The first START tile, if any.
    pub fn start(&self) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.state == TileState::Start)
    }

    /// Number of active tiles in the given state.
    pub fn count(&self, state: TileState) -> usize {
        self.tiles
            .iter()
            .filter(|t| t.active && t.state == state)
            .count()
    }

    /// Deactivate every non-structural tile that shares a cell with an
    /// earlier active tile or with an active START/END. Returns how many
    /// tiles were switched off.
    pub fn deactivate_overlaps(&mut self) -> usize {
        let mut occupied: FxHashSet<Coord> = self
            .tiles
            .iter()
            .filter(|t| t.active && t.state.is_structural())
            .map(|t| t.position)
            .collect();
        let mut switched = 0;
        for tile in self.tiles.iter_mut() {
            if !tile.active || tile.state.is_structural() {
                continue;
            }
            if !occupied.insert(tile.position) {
                tile.active = false;
                switched += 1;
            }
        }
        switched
    }
}
