// A* pathfinding and reachability over the walkability grid.
//
// Search state never lives on the grid. `SearchScratch` holds `g`, `h`, `f`
// (sentinel `UNSET` = +∞), `came_from`, and closed flags in `Vec`s indexed by
// `CellIndex`, plus the list of cells the current search touched. A
// `PathFinder` owns one scratch and reuses it across thousands of fitness
// queries; after every search, success or failure, only the touched cells are
// reset, so no state leaks into the next query. `SearchScratch::is_clean()`
// exposes that invariant to tests.
//
// The open set is a `BinaryHeap` of `OpenEntry` (min-heap via reversed
// ordering). Ties on `f` are broken LIFO: every push takes a fresh sequence
// number and the larger sequence wins. This tie-break decides which of
// several equal-cost paths is returned, so it is part of the determinism
// contract.
//
// Path absence is a normal result (`None` / `false`), never an error. A
// non-walkable start or goal has no path.
//
// See also: `jps.rs` for Jump Point Search on the same scratch and queue,
// `grid.rs` for neighbor rules, `heuristics.rs` for the cost model,
// `fitness.rs` which calls `check_path_exists` per objective.
//
// **Critical constraint: determinism.** Search is a pure function of grid
// state and endpoints. `total_cmp` orders floats; no hashing.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::grid::Grid;
use crate::heuristics;
use crate::types::{CellIndex, Coord};

/// Sentinel for a score that has not been set by the current search.
pub const UNSET: f64 = f64::INFINITY;

/// The result of a successful search.
#[derive(Clone, Debug, PartialEq)]
pub struct PathResult {
    /// Cells from start to goal, inclusive, each grid-adjacent to the next.
    pub nodes: Vec<Coord>,
    /// Sum of Euclidean step costs along the path.
    pub total_cost: f64,
    /// Cells closed during the search (jump points, for JPS).
    pub expanded: usize,
}

impl PathResult {
    fn trivial(at: Coord) -> Self {
        Self {
            nodes: vec![at],
            total_cost: 0.0,
            expanded: 0,
        }
    }
}

/// Entry in the open set.
#[derive(Clone, Copy, Debug)]
pub(crate) struct OpenEntry {
    pub cell: CellIndex,
    pub f_score: f64,
    pub seq: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Smallest f is "greatest"; on equal f the most recent push wins.
        other
            .f_score
            .total_cmp(&self.f_score)
            .then_with(|| self.seq.cmp(&other.seq))
    }
}

/// Reusable per-search state, indexed by `CellIndex`.
#[derive(Clone, Debug, Default)]
pub struct SearchScratch {
    pub(crate) g: Vec<f64>,
    pub(crate) h: Vec<f64>,
    pub(crate) f: Vec<f64>,
    pub(crate) came_from: Vec<Option<CellIndex>>,
    pub(crate) closed: Vec<bool>,
    touched: Vec<CellIndex>,
}

impl SearchScratch {
    /// Size the arrays for a grid of `cells` cells. Reallocates (fully
    /// reset) only when the size changes.
    pub(crate) fn prepare(&mut self, cells: usize) {
        if self.g.len() != cells {
            self.g = vec![UNSET; cells];
            self.h = vec![UNSET; cells];
            self.f = vec![UNSET; cells];
            self.came_from = vec![None; cells];
            self.closed = vec![false; cells];
            self.touched.clear();
        }
    }

    /// Record a (better) route into `cell`.
    pub(crate) fn update(
        &mut self,
        cell: CellIndex,
        g: f64,
        h: f64,
        parent: Option<CellIndex>,
    ) -> f64 {
        let i = cell.as_usize();
        if self.g[i] == UNSET && self.h[i] == UNSET {
            self.touched.push(cell);
        }
        let f = g + h;
        self.g[i] = g;
        self.h[i] = h;
        self.f[i] = f;
        self.came_from[i] = parent;
        f
    }

    pub(crate) fn g(&self, cell: CellIndex) -> f64 {
        self.g[cell.as_usize()]
    }

    pub(crate) fn h(&self, cell: CellIndex) -> f64 {
        self.h[cell.as_usize()]
    }

    pub(crate) fn is_closed(&self, cell: CellIndex) -> bool {
        self.closed[cell.as_usize()]
    }

    pub(crate) fn close(&mut self, cell: CellIndex) {
        self.closed[cell.as_usize()] = true;
    }

    pub(crate) fn parent(&self, cell: CellIndex) -> Option<CellIndex> {
        self.came_from[cell.as_usize()]
    }

    /// Reset every cell the last search touched.
    pub fn clear(&mut self) {
        for cell in self.touched.drain(..) {
            let i = cell.as_usize();
            self.g[i] = UNSET;
            self.h[i] = UNSET;
            self.f[i] = UNSET;
            self.came_from[i] = None;
            self.closed[i] = false;
        }
    }

    /// True when no cell carries search state.
    pub fn is_clean(&self) -> bool {
        self.touched.is_empty()
            && self.g.iter().all(|&v| v == UNSET)
            && self.h.iter().all(|&v| v == UNSET)
            && self.f.iter().all(|&v| v == UNSET)
            && self.came_from.iter().all(Option::is_none)
            && self.closed.iter().all(|&c| !c)
    }

    /// Walk `came_from` back from `goal` to `start`.
    pub(crate) fn trace(&self, start: CellIndex, goal: CellIndex) -> Vec<CellIndex> {
        let mut cells = vec![goal];
        let mut current = goal;
        while current != start {
            match self.parent(current) {
                Some(prev) => {
                    cells.push(prev);
                    current = prev;
                }
                None => break,
            }
        }
        cells.reverse();
        cells
    }
}

/// One-shot planner with a reusable scratch.
#[derive(Clone, Debug, Default)]
pub struct PathFinder {
    pub(crate) scratch: SearchScratch,
    pub(crate) next_seq: u64,
}

/// How a search treats the goal.
#[derive(Clone, Copy, PartialEq, Eq)]
enum GoalTest {
    /// Stop when the goal is popped from the open set (optimal cost).
    OnExpand,
    /// Stop as soon as the goal is generated as a neighbor.
    OnDiscover,
}

impl PathFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access for cleanup assertions.
    pub fn scratch(&self) -> &SearchScratch {
        &self.scratch
    }

    pub(crate) fn push(
        &mut self,
        open: &mut BinaryHeap<OpenEntry>,
        cell: CellIndex,
        f_score: f64,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        open.push(OpenEntry { cell, f_score, seq });
    }

    /// Validate endpoints. `Err(Some(path))` is the trivial start == goal
    /// result, `Err(None)` means no path is possible.
    pub(crate) fn endpoints(
        grid: &Grid,
        start: Coord,
        goal: Coord,
    ) -> Result<(CellIndex, CellIndex), Option<PathResult>> {
        if !grid.is_walkable(start) || !grid.is_walkable(goal) {
            return Err(None);
        }
        if start == goal {
            return Err(Some(PathResult::trivial(start)));
        }
        match (grid.index(start), grid.index(goal)) {
            (Some(s), Some(g)) => Ok((s, g)),
            _ => Err(None),
        }
    }

    /// Shortest path by A*. Returns `None` when the goal is unreachable.
    pub fn find_path_astar(
        &mut self,
        grid: &Grid,
        start: Coord,
        goal: Coord,
    ) -> Option<PathResult> {
        let (si, gi) = match Self::endpoints(grid, start, goal) {
            Ok(pair) => pair,
            Err(trivial) => return trivial,
        };
        let outcome = self.search(grid, si, gi, GoalTest::OnExpand);
        let result = outcome.map(|expanded| PathResult {
            nodes: self
                .scratch
                .trace(si, gi)
                .into_iter()
                .map(|c| grid.coord(c))
                .collect(),
            total_cost: self.scratch.g(gi),
            expanded,
        });
        self.scratch.clear();
        result
    }

    /// Reachability only: no reconstruction, exits on the first goal hit.
    pub fn check_path_exists(&mut self, grid: &Grid, start: Coord, goal: Coord) -> bool {
        let (si, gi) = match Self::endpoints(grid, start, goal) {
            Ok(pair) => pair,
            Err(trivial) => return trivial.is_some(),
        };
        let found = self.search(grid, si, gi, GoalTest::OnDiscover).is_some();
        self.scratch.clear();
        found
    }

    /// Core A* loop. Returns the number of expanded cells if the goal was
    /// reached. Leaves scratch populated for reconstruction; callers clear.
    fn search(
        &mut self,
        grid: &Grid,
        start: CellIndex,
        goal: CellIndex,
        goal_test: GoalTest,
    ) -> Option<usize> {
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
            let current_g = self.scratch.g(ci);
            for neighbor in grid.neighbors(current) {
                let Some(ni) = grid.index(neighbor) else {
                    continue;
                };
                if self.scratch.is_closed(ni) {
                    continue;
                }
                if goal_test == GoalTest::OnDiscover && ni == goal {
                    self.scratch.update(ni, 0.0, 0.0, Some(ci));
                    return Some(expanded);
                }
                let tentative = current_g + heuristics::euclidean(current, neighbor);
                if tentative < self.scratch.g(ni) {
                    let known_h = self.scratch.h(ni);
                    let h = if known_h == UNSET {
                        heuristic(neighbor, goal_coord)
                    } else {
                        known_h
                    };
                    let f = self.scratch.update(ni, tentative, h, Some(ci));
                    self.push(&mut open, ni, f);
                }
            }
        }
        None
    }
}
