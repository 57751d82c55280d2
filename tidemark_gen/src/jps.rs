// Jump Point Search over the walkability grid.
//
// JPS is A* with two changes. Successors are generated from
// `Grid::pruned_neighbors`, which uses the direction of travel from a cell's
// parent to discard neighbors that some other, equally short path reaches
// anyway. Each surviving direction is then scanned by `jump()` until the scan
// hits the goal, leaves walkable ground, or lands on a cell with a forced
// neighbor (an obstacle beside the line of travel that opens a new shortest
// route). Only those jump points enter the open set.
//
// Diagonal scans recurse into horizontal and vertical scans at every step;
// on orthogonal-only grids the vertical scan recurses into horizontal ones.
// The recursion is at most two levels deep, and each level advances with a
// loop, so stack depth does not grow with map size.
//
// Jump points are separated by straight or 45° runs, so the final path is
// expanded cell by cell back into a grid-adjacent sequence. The result has
// the same contract as `find_path_astar` and the same cost on uniform grids,
// though it may choose a different equal-cost route.
//
// See also: `pathfinding.rs` for the shared scratch, open-set ordering, and
// cleanup contract; `grid.rs` for `pruned_neighbors`.

use std::collections::BinaryHeap;

use crate::grid::Grid;
use crate::heuristics;
use crate::pathfinding::{PathFinder, PathResult};
use crate::types::{CellIndex, Coord};

impl PathFinder {
    /// Shortest path by Jump Point Search. Returns `None` when the goal is
    /// unreachable.
    pub fn find_path_jps(&mut self, grid: &Grid, start: Coord, goal: Coord) -> Option<PathResult> {
        let (si, gi) = match Self::endpoints(grid, start, goal) {
            Ok(pair) => pair,
            Err(trivial) => return trivial,
        };
        let result = self.search_jps(grid, si, gi).map(|expanded| {
            let jump_points: Vec<Coord> = self
                .scratch
                .trace(si, gi)
                .into_iter()
                .map(|c| grid.coord(c))
                .collect();
            PathResult {
                nodes: expand_jump_points(&jump_points),
                total_cost: self.scratch.g(gi),
                expanded,
            }
        });
        self.scratch.clear();
        result
    }

    fn search_jps(&mut self, grid: &Grid, start: CellIndex, goal: CellIndex) -> Option<usize> {
        self.scratch.prepare(grid.cell_count());
        let heuristic = heuristics::for_connectivity(grid.diagonal());
        let goal_coord = grid.coord(goal);

        let mut open = BinaryHeap::new();
        let f = self
            .scratch
            .update(start, 0.0, heuristic(grid.coord(start), goal_coord), None);
        self.push(&mut open, start, f);

        let mut expanded = 0;
        while let Some(entry) = open.pop() {
            let ci = entry.cell;
            if ci == goal {
                return Some(expanded);
            }
            if self.scratch.is_closed(ci) {
                continue;
            }
            self.scratch.close(ci);
            expanded += 1;

            let current = grid.coord(ci);
            let parent = self.scratch.parent(ci).map(|p| grid.coord(p));
            let current_g = self.scratch.g(ci);

            for neighbor in grid.pruned_neighbors(current, parent) {
                let direction = (neighbor.x - current.x, neighbor.y - current.y);
                let Some(jump_point) = jump(grid, neighbor, direction, goal_coord) else {
                    continue;
                };
                let Some(ji) = grid.index(jump_point) else {
                    continue;
                };
                if self.scratch.is_closed(ji) {
                    continue;
                }
                let tentative = current_g + heuristics::octile(current, jump_point);
                if tentative < self.scratch.g(ji) {
                    let h = heuristic(jump_point, goal_coord);
                    let f = self.scratch.update(ji, tentative, h, Some(ci));
                    self.push(&mut open, ji, f);
                }
            }
        }
        None
    }
}

/// Scan from `at` in `direction` until a jump point, the goal, or a blocked
/// cell. Returns the jump point, if any.
fn jump(grid: &Grid, at: Coord, direction: (i32, i32), goal: Coord) -> Option<Coord> {
    if grid.diagonal() {
        jump_diagonal_grid(grid, at, direction, goal)
    } else {
        jump_orthogonal_grid(grid, at, direction, goal)
    }
}

fn jump_diagonal_grid(grid: &Grid, at: Coord, (dx, dy): (i32, i32), goal: Coord) -> Option<Coord> {
    let walk = |x: i32, y: i32| grid.is_walkable(Coord::new(x, y));
    let mut c = at;
    loop {
        let (x, y) = (c.x, c.y);
        if !walk(x, y) {
            return None;
        }
        if c == goal {
            return Some(c);
        }
        if dx != 0 && dy != 0 {
            if (walk(x - dx, y + dy) && !walk(x - dx, y))
                || (walk(x + dx, y - dy) && !walk(x, y - dy))
            {
                return Some(c);
            }
            // A diagonal run stops wherever a straight scan would find
            // something.
            if jump_diagonal_grid(grid, c.step(dx, 0), (dx, 0), goal).is_some()
                || jump_diagonal_grid(grid, c.step(0, dy), (0, dy), goal).is_some()
            {
                return Some(c);
            }
        } else if dx != 0 {
            if (walk(x + dx, y + 1) && !walk(x, y + 1))
                || (walk(x + dx, y - 1) && !walk(x, y - 1))
            {
                return Some(c);
            }
        } else if (walk(x + 1, y + dy) && !walk(x + 1, y))
            || (walk(x - 1, y + dy) && !walk(x - 1, y))
        {
            return Some(c);
        }
        c = c.step(dx, dy);
    }
}

fn jump_orthogonal_grid(
    grid: &Grid,
    at: Coord,
    (dx, dy): (i32, i32),
    goal: Coord,
) -> Option<Coord> {
    let walk = |x: i32, y: i32| grid.is_walkable(Coord::new(x, y));
    let mut c = at;
    loop {
        let (x, y) = (c.x, c.y);
        if !walk(x, y) {
            return None;
        }
        if c == goal {
            return Some(c);
        }
        if dx != 0 {
            if (walk(x, y - 1) && !walk(x - dx, y - 1)) || (walk(x, y + 1) && !walk(x - dx, y + 1))
            {
                return Some(c);
            }
        } else {
            if (walk(x - 1, y) && !walk(x - 1, y - dy)) || (walk(x + 1, y) && !walk(x + 1, y - dy))
            {
                return Some(c);
            }
            // Vertical runs stop where a horizontal scan would find something.
            if jump_orthogonal_grid(grid, c.step(1, 0), (1, 0), goal).is_some()
                || jump_orthogonal_grid(grid, c.step(-1, 0), (-1, 0), goal).is_some()
            {
                return Some(c);
            }
        }
        c = c.step(dx, dy);
    }
}

/// Fill in the cells between consecutive jump points.
fn expand_jump_points(jump_points: &[Coord]) -> Vec<Coord> {
    let mut path = Vec::new();
    let Some(&first) = jump_points.first() else {
        return path;
    };
    path.push(first);
    for pair in jump_points.windows(2) {
        let (from, to) = (pair[0], pair[1]);
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        let mut c = from;
        while c != to {
            c = c.step(dx, dy);
            path.push(c);
        }
    }
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pathfinding::tests::assert_valid_path;
    use tidemark_prng::LevelRng;

    #[test]
    fn open_grid_diagonal_run() {
        let grid = Grid::open(20, 20, true);
        let mut finder = PathFinder::new();
        let start = Coord::new(0, 0);
        let goal = Coord::new(15, 15);
        let path = finder.find_path_jps(&grid, start, goal).unwrap();
        assert_valid_path(&grid, &path, start, goal);
        assert!((path.total_cost - 15.0 * 2f64.sqrt()).abs() < 1e-9);
        assert!(finder.scratch().is_clean());
    }

    #[test]
    fn expands_fewer_nodes_than_astar_on_open_ground() {
        let grid = Grid::open(60, 40, true);
        let mut finder = PathFinder::new();
        let start = Coord::new(2, 3);
        let goal = Coord::new(57, 31);
        let astar = finder.find_path_astar(&grid, start, goal).unwrap();
        let jps = finder.find_path_jps(&grid, start, goal).unwrap();
        assert!((astar.total_cost - jps.total_cost).abs() < 1e-9);
        assert!(jps.expanded < astar.expanded);
    }

    #[test]
    fn routes_around_wall_with_forced_neighbors() {
        let grid = Grid::from_ascii(
            &[
                "..........",
                "....#.....",
                "....#.....",
                "....#.....",
                "..........",
            ],
            true,
        );
        let mut finder = PathFinder::new();
        let start = Coord::new(1, 2);
        let goal = Coord::new(8, 2);
        let path = finder.find_path_jps(&grid, start, goal).unwrap();
        assert_valid_path(&grid, &path, start, goal);
        let astar = finder.find_path_astar(&grid, start, goal).unwrap();
        assert!((astar.total_cost - path.total_cost).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_grid_path() {
        let grid = Grid::from_ascii(
            &[
                "........", //
                ".######.", //
                ".#......", //
                ".#.####.", //
                "........",
            ],
            false,
        );
        let mut finder = PathFinder::new();
        let start = Coord::new(2, 2);
        let goal = Coord::new(0, 0);
        let path = finder.find_path_jps(&grid, start, goal).unwrap();
        assert_valid_path(&grid, &path, start, goal);
        let astar = finder.find_path_astar(&grid, start, goal).unwrap();
        assert_eq!(path.total_cost, astar.total_cost);
        assert!(finder.scratch().is_clean());
    }

    #[test]
    fn unreachable_goal() {
        let grid = Grid::from_ascii(&["...#...", "...#...", "...#..."], true);
        let mut finder = PathFinder::new();
        assert!(
            finder
                .find_path_jps(&grid, Coord::new(0, 1), Coord::new(6, 1))
                .is_none()
        );
        assert!(finder.scratch().is_clean());
    }

    #[test]
    fn expand_fills_straight_and_diagonal_runs() {
        let expanded = expand_jump_points(&[Coord::new(0, 0), Coord::new(3, 0), Coord::new(5, 2)]);
        assert_eq!(
            expanded,
            vec![
                Coord::new(0, 0),
                Coord::new(1, 0),
                Coord::new(2, 0),
                Coord::new(3, 0),
                Coord::new(4, 1),
                Coord::new(5, 2),
            ]
        );
    }

    #[test]
    fn agrees_with_astar_on_random_grids() {
        let mut rng = LevelRng::new(77);
        let mut finder = PathFinder::new();
        for trial in 0..60 {
            let diagonal = trial % 3 != 0;
            let mut grid = Grid::open(16, 12, diagonal);
            for y in 0..12 {
                for x in 0..16 {
                    if rng.random_bool(0.3) {
                        grid.set_walkable(Coord::new(x, y), false);
                    }
                }
            }
            let start = Coord::new(rng.range_i32(0, 16), rng.range_i32(0, 12));
            let goal = Coord::new(rng.range_i32(0, 16), rng.range_i32(0, 12));
            let astar = finder.find_path_astar(&grid, start, goal);
            let jps = finder.find_path_jps(&grid, start, goal);
            assert_eq!(astar.is_some(), jps.is_some(), "trial {trial}");
            if let (Some(a), Some(j)) = (astar, jps) {
                assert_valid_path(&grid, &j, start, goal);
                assert!(
                    (a.total_cost - j.total_cost).abs() < 1e-6,
                    "trial {trial}: astar {} vs jps {}",
                    a.total_cost,
                    j.total_cost
                );
            }
            assert!(finder.scratch().is_clean());
        }
    }
}
