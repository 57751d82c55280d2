// Dense 2D walkability grid: the shared substrate for pathfinding and
// placement checks.
//
// Cells live in a flat `Vec<bool>` indexed by `y * width + x` (see
// `CellIndex`), giving O(1) reads. Out-of-bounds reads are non-walkable;
// out-of-bounds writes are no-ops. The grid carries only terrain truth:
// search scores live in `pathfinding::SearchScratch`, never here.
//
// The `diagonal` flag is fixed at construction and selects 4- or 8-connected
// movement for every neighbor query. Diagonal steps are allowed whenever the
// destination is walkable, including between two blocked orthogonals; A*,
// JPS, and reachability checks all share this rule so they agree on which
// cells connect.
//
// Fitness evaluation needs obstacles to block movement for the duration of
// one candidate's scoring. `overlay_obstacles()` returns an
// `ObstacleOverlay` guard that marks the cells non-walkable and restores
// exactly those cells when dropped, so terrain walkability can never leak
// from one candidate into the next.
//
// See also: `heightmap.rs` which builds the grid from elevation,
// `pathfinding.rs` and `jps.rs` which search it, `fitness.rs` which overlays
// obstacles on it.

use std::ops::{Deref, DerefMut};

use smallvec::SmallVec;

use crate::types::{CellIndex, Coord};

/// Orthogonal directions in expansion order: north, east, south, west.
pub const ORTHOGONAL: [(i32, i32); 4] = [(0, -1), (1, 0), (0, 1), (-1, 0)];

/// Diagonal directions in expansion order: NE, SE, SW, NW.
pub const DIAGONAL: [(i32, i32); 4] = [(1, -1), (1, 1), (-1, 1), (-1, -1)];

/// Neighbor list sized for the 8-connected case without heap allocation.
pub type Neighbors = SmallVec<[Coord; 8]>;

/// Fixed-size walkability grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Grid {
    walkable: Vec<bool>,
    pub width: u32,
    pub height: u32,
    diagonal: bool,
}

impl Grid {
    /// Grid with every cell blocked.
    pub fn new(width: u32, height: u32, diagonal: bool) -> Self {
        Self {
            walkable: vec![false; width as usize * height as usize],
            width,
            height,
            diagonal,
        }
    }

    /// Grid with every cell walkable.
    pub fn open(width: u32, height: u32, diagonal: bool) -> Self {
        Self {
            walkable: vec![true; width as usize * height as usize],
            width,
            height,
            diagonal,
        }
    }

    /// Build from ASCII rows: `#` is blocked, anything else is walkable.
    /// Rows shorter than the first are padded with blocked cells.
    pub fn from_ascii(rows: &[&str], diagonal: bool) -> Self {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |r| r.chars().count()) as u32;
        let mut grid = Self::new(width, height, diagonal);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate().take(width as usize) {
                grid.set_walkable(Coord::new(x as i32, y as i32), ch != '#');
            }
        }
        grid
    }

    pub fn diagonal(&self) -> bool {
        self.diagonal
    }

    pub fn cell_count(&self) -> usize {
        self.walkable.len()
    }

    pub fn in_bounds(&self, c: Coord) -> bool {
        c.x >= 0 && c.y >= 0 && (c.x as u32) < self.width && (c.y as u32) < self.height
    }

    /// Flat index of a coordinate, or `None` if out of bounds.
    pub fn index(&self, c: Coord) -> Option<CellIndex> {
        if self.in_bounds(c) {
            Some(CellIndex(c.y as u32 * self.width + c.x as u32))
        } else {
            None
        }
    }

    pub fn coord(&self, index: CellIndex) -> Coord {
        Coord::new(
            (index.0 % self.width) as i32,
            (index.0 / self.width) as i32,
        )
    }

    /// Walkability; always `false` out of bounds.
    pub fn is_walkable(&self, c: Coord) -> bool {
        self.index(c)
            .map(|i| self.walkable[i.as_usize()])
            .unwrap_or(false)
    }

    pub fn set_walkable(&mut self, c: Coord, walkable: bool) {
        if let Some(i) = self.index(c) {
            self.walkable[i.as_usize()] = walkable;
        }
    }

    pub fn walkable_count(&self) -> usize {
        self.walkable.iter().filter(|&&w| w).count()
    }

    /// Iterate all walkable coordinates in row-major order.
    pub fn walkable_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        self.walkable
            .iter()
            .enumerate()
            .filter(|&(_, &w)| w)
            .map(|(i, _)| self.coord(CellIndex(i as u32)))
    }

    /// Walkable cells reachable in one step (4- or 8-connected per the
    /// grid's diagonal flag).
    pub fn neighbors(&self, c: Coord) -> Neighbors {
        let mut out = Neighbors::new();
        for (dx, dy) in ORTHOGONAL {
            let n = c.step(dx, dy);
            if self.is_walkable(n) {
                out.push(n);
            }
        }
        if self.diagonal {
            for (dx, dy) in DIAGONAL {
                let n = c.step(dx, dy);
                if self.is_walkable(n) {
                    out.push(n);
                }
            }
        }
        out
    }

    /// Walkable cells among the full 8-neighborhood, regardless of the
    /// diagonal flag. Used to measure how open an area is.
    pub fn open_neighbor_count(&self, c: Coord) -> usize {
        ORTHOGONAL
            .iter()
            .chain(DIAGONAL.iter())
            .filter(|&&(dx, dy)| self.is_walkable(c.step(dx, dy)))
            .count()
    }

    /// Neighbors for Jump Point Search, pruned by the direction of travel
    /// from `parent` into `c`.
    ///
    /// Without a parent (the start node) all neighbors are returned. With a
    /// parent, only the natural neighbors straight ahead plus forced
    /// neighbors next to an adjacent obstacle survive. Forced-neighbor
    /// candidates are returned without a walkability check on the candidate
    /// itself; the jump scan rejects blocked cells.
    pub fn pruned_neighbors(&self, c: Coord, parent: Option<Coord>) -> Neighbors {
        let Some(p) = parent else {
            return self.neighbors(c);
        };
        let dx = (c.x - p.x).signum();
        let dy = (c.y - p.y).signum();
        let mut out = Neighbors::new();
        let (x, y) = (c.x, c.y);
        let walk = |x: i32, y: i32| self.is_walkable(Coord::new(x, y));

        if self.diagonal {
            if dx != 0 && dy != 0 {
                if walk(x, y + dy) {
                    out.push(Coord::new(x, y + dy));
                }
                if walk(x + dx, y) {
                    out.push(Coord::new(x + dx, y));
                }
                if walk(x + dx, y + dy) {
                    out.push(Coord::new(x + dx, y + dy));
                }
                if !walk(x - dx, y) {
                    out.push(Coord::new(x - dx, y + dy));
                }
                if !walk(x, y - dy) {
                    out.push(Coord::new(x + dx, y - dy));
                }
            } else if dx == 0 {
                if walk(x, y + dy) {
                    out.push(Coord::new(x, y + dy));
                }
                if !walk(x + 1, y) {
                    out.push(Coord::new(x + 1, y + dy));
                }
                if !walk(x - 1, y) {
                    out.push(Coord::new(x - 1, y + dy));
                }
            } else {
                if walk(x + dx, y) {
                    out.push(Coord::new(x + dx, y));
                }
                if !walk(x, y + 1) {
                    out.push(Coord::new(x + dx, y + 1));
                }
                if !walk(x, y - 1) {
                    out.push(Coord::new(x + dx, y - 1));
                }
            }
        } else if dx != 0 {
            if walk(x, y - 1) {
                out.push(Coord::new(x, y - 1));
            }
            if walk(x, y + 1) {
                out.push(Coord::new(x, y + 1));
            }
            if walk(x + dx, y) {
                out.push(Coord::new(x + dx, y));
            }
        } else if dy != 0 {
            if walk(x - 1, y) {
                out.push(Coord::new(x - 1, y));
            }
            if walk(x + 1, y) {
                out.push(Coord::new(x + 1, y));
            }
            if walk(x, y + dy) {
                out.push(Coord::new(x, y + dy));
            }
        }
        out
    }

    /// Temporarily block `cells`. The returned guard restores them on drop.
    pub fn overlay_obstacles<I>(&mut self, cells: I) -> ObstacleOverlay<'_>
    where
        I: IntoIterator<Item = Coord>,
    {
        let mut blocked = Vec::new();
        for c in cells {
            if let Some(i) = self.index(c) {
                if self.walkable[i.as_usize()] {
                    self.walkable[i.as_usize()] = false;
                    blocked.push(i);
                }
            }
        }
        ObstacleOverlay {
            grid: self,
            blocked,
        }
    }
}

/// Scope guard for temporarily blocked cells. Derefs to the grid so searches
/// can run against the overlaid state.
pub struct ObstacleOverlay<'a> {
    grid: &'a mut Grid,
    blocked: Vec<CellIndex>,
}

impl ObstacleOverlay<'_> {
    /// Number of cells this overlay actually switched from walkable to
    /// blocked.
    pub fn blocked_count(&self) -> usize {
        self.blocked.len()
    }
}

impl Deref for ObstacleOverlay<'_> {
    type Target = Grid;

    fn deref(&self) -> &Grid {
        self.grid
    }
}

impl DerefMut for ObstacleOverlay<'_> {
    fn deref_mut(&mut self) -> &mut Grid {
        self.grid
    }
}

impl Drop for ObstacleOverlay<'_> {
    fn drop(&mut self) {
        for i in self.blocked.drain(..) {
            self.grid.walkable[i.as_usize()] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_bounds_is_blocked() {
        let grid = Grid::open(4, 3, true);
        assert!(grid.is_walkable(Coord::new(0, 0)));
        assert!(grid.is_walkable(Coord::new(3, 2)));
        assert!(!grid.is_walkable(Coord::new(-1, 0)));
        assert!(!grid.is_walkable(Coord::new(4, 0)));
        assert!(!grid.is_walkable(Coord::new(0, 3)));
    }

    #[test]
    fn out_of_bounds_write_is_noop() {
        let mut grid = Grid::new(2, 2, false);
        grid.set_walkable(Coord::new(5, 5), true);
        assert_eq!(grid.walkable_count(), 0);
    }

    #[test]
    fn index_roundtrip() {
        let grid = Grid::open(7, 5, false);
        for c in grid.walkable_cells() {
            let i = grid.index(c).unwrap();
            assert_eq!(grid.coord(i), c);
        }
        assert_eq!(grid.index(Coord::new(2, 3)), Some(CellIndex(23)));
    }

    #[test]
    fn neighbor_counts_follow_diagonal_flag() {
        let four = Grid::open(5, 5, false);
        let eight = Grid::open(5, 5, true);
        let centre = Coord::new(2, 2);
        assert_eq!(four.neighbors(centre).len(), 4);
        assert_eq!(eight.neighbors(centre).len(), 8);
        assert_eq!(eight.neighbors(Coord::new(0, 0)).len(), 3);
    }

    #[test]
    fn neighbors_skip_blocked() {
        let grid = Grid::from_ascii(&["...", ".#.", "..."], true);
        let n = grid.neighbors(Coord::new(1, 0));
        assert!(!n.contains(&Coord::new(1, 1)));
        assert!(n.contains(&Coord::new(0, 1)));
        assert!(n.contains(&Coord::new(2, 1)));
    }

    #[test]
    fn pruned_straight_move_without_obstacles() {
        let grid = Grid::open(5, 5, true);
        let n = grid.pruned_neighbors(Coord::new(2, 2), Some(Coord::new(1, 2)));
        assert_eq!(n.as_slice(), &[Coord::new(3, 2)]);
    }

    #[test]
    fn pruned_straight_move_adds_forced_neighbor() {
        // Moving east along y=1 with a wall directly north of (2,1).
        let grid = Grid::from_ascii(&["..#..", ".....", "....."], true);
        let n = grid.pruned_neighbors(Coord::new(2, 1), Some(Coord::new(1, 1)));
        assert!(n.contains(&Coord::new(3, 1)));
        assert!(n.contains(&Coord::new(3, 0)));
        assert_eq!(n.len(), 2);
    }

    #[test]
    fn pruned_diagonal_move_keeps_three_natural() {
        let grid = Grid::open(5, 5, true);
        let n = grid.pruned_neighbors(Coord::new(2, 2), Some(Coord::new(1, 1)));
        assert_eq!(n.len(), 3);
        assert!(n.contains(&Coord::new(2, 3)));
        assert!(n.contains(&Coord::new(3, 2)));
        assert!(n.contains(&Coord::new(3, 3)));
    }

    #[test]
    fn pruned_without_parent_is_full_neighborhood() {
        let grid = Grid::open(5, 5, false);
        assert_eq!(grid.pruned_neighbors(Coord::new(2, 2), None).len(), 4);
    }

    #[test]
    fn overlay_restores_on_drop() {
        let mut grid = Grid::from_ascii(&["....", ".#..", "...."], true);
        let original = grid.clone();
        {
            let overlay = grid.overlay_obstacles([
                Coord::new(0, 0),
                Coord::new(1, 1), // already blocked terrain
                Coord::new(0, 0), // duplicate
                Coord::new(9, 9), // out of bounds
            ]);
            assert_eq!(overlay.blocked_count(), 1);
            assert!(!overlay.is_walkable(Coord::new(0, 0)));
        }
        assert_eq!(grid, original);
        assert!(!grid.is_walkable(Coord::new(1, 1)));
    }

    #[test]
    fn open_neighbor_count_ignores_diagonal_flag() {
        let grid = Grid::from_ascii(&["#..", "...", "..."], false);
        assert_eq!(grid.open_neighbor_count(Coord::new(1, 1)), 7);
        assert_eq!(grid.open_neighbor_count(Coord::new(0, 2)), 3);
    }
}
