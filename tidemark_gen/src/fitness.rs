// Fitness function: scores one candidate layout against the terrain.
//
// A candidate is first bucketed in a single pass over its active tiles
// (start, objectives, obstacles, enemies, item count). Candidates without a
// START or without any enemy are disqualified: fitness 0 and excluded from
// the population mean. Everything else starts at 1.0 and loses points:
//
// - each enemy within `enemy_near_start_radius` (octile) of START,
// - no items; no obstacles,
// - each walkable START neighbor missing below `start_open_neighbors`,
//   counted after obstacles block their cells,
// - each objective whose walked path from START is shorter than
//   `objective_min_distance` or longer than the target length,
// - each objective pair closer than `objective_pair_min_distance`.
//
// Reachability gates everything: if START cannot reach any objective with
// obstacles in place, fitness is forced to 0 and scoring stops. For reachable
// objectives a JPS path is planned on the obstructed grid; its cost drives
// the distance window and the one positive term, a path bonus of up to
// `path_detour_bonus` for layouts whose obstacles bend the routes away from
// the straight line. The result is clamped to [0, 1], so a well-placed layout
// scores 1.0 with or without detours.
//
// Obstacles are applied through `Grid::overlay_obstacles`, whose guard
// restores the terrain when it goes out of scope on every return path.
//
// See also: `ga.rs` which calls `evaluate_candidate` for every individual,
// `pathfinding.rs` for `check_path_exists`, `jps.rs` for the path used in the
// distance window, `config.rs` for `FitnessWeights`.
//
// Evaluation draws no randomness, so sequential and parallel evaluation
// give identical scores.

use crate::config::FitnessWeights;
use crate::grid::Grid;
use crate::heuristics::{for_connectivity, octile};
use crate::pathfinding::PathFinder;
use crate::types::{Coord, MapCandidate, TileState};

/// Outcome of scoring one candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    pub fitness: f64,
    /// Missing START or enemies. Excluded from the population mean.
    pub disqualified: bool,
}

impl Evaluation {
    const DISQUALIFIED: Self = Self {
        fitness: 0.0,
        disqualified: true,
    };
}

/// Tiles grouped by what the fitness terms need.
#[derive(Default)]
struct Buckets {
    start: Option<Coord>,
    objectives: Vec<Coord>,
    obstacles: Vec<Coord>,
    enemies: Vec<Coord>,
    items: usize,
}

impl Buckets {
    fn scan(candidate: &MapCandidate) -> Self {
        let mut b = Self::default();
        for tile in candidate.tiles.iter().filter(|t| t.active) {
            match tile.state {
                TileState::Start => {
                    if b.start.is_none() {
                        b.start = Some(tile.position);
                    }
                }
                TileState::Objective => b.objectives.push(tile.position),
                TileState::Obstacle => b.obstacles.push(tile.position),
                TileState::Enemy => b.enemies.push(tile.position),
                TileState::Item => b.items += 1,
                TileState::End => {}
            }
        }
        b
    }
}

/// Score `candidate` on `grid`. The grid is borrowed mutably for the
/// obstacle overlay and is back to its original walkability on return.
pub fn evaluate_candidate(
    candidate: &MapCandidate,
    grid: &mut Grid,
    finder: &mut PathFinder,
    weights: &FitnessWeights,
    target_length: f64,
) -> Evaluation {
    let buckets = Buckets::scan(candidate);
    let Some(start) = buckets.start else {
        return Evaluation::DISQUALIFIED;
    };
    if buckets.enemies.is_empty() {
        return Evaluation::DISQUALIFIED;
    }

    let mut fitness = 1.0;

    let crowding = buckets
        .enemies
        .iter()
        .filter(|&&e| octile(start, e) <= weights.enemy_near_start_radius)
        .count();
    fitness -= crowding as f64 * weights.enemy_near_start_penalty;

    if buckets.items == 0 {
        fitness -= weights.no_items_penalty;
    }
    if buckets.obstacles.is_empty() {
        fitness -= weights.no_obstacles_penalty;
    }

    let overlay = grid.overlay_obstacles(buckets.obstacles.iter().copied());

    let open = overlay.open_neighbor_count(start);
    let missing = weights.start_open_neighbors.saturating_sub(open);
    fitness -= missing as f64 * weights.missing_start_neighbor_penalty;

    let straight = for_connectivity(overlay.diagonal());
    let mut detour: f64 = 0.0;
    for &objective in &buckets.objectives {
        let path = if finder.check_path_exists(&overlay, start, objective) {
            finder.find_path_jps(&overlay, start, objective)
        } else {
            None
        };
        let Some(path) = path else {
            return Evaluation {
                fitness: 0.0,
                disqualified: false,
            };
        };
        let length = path.total_cost;
        if length < weights.objective_min_distance || length > target_length {
            fitness -= weights.objective_distance_penalty;
        }
        let baseline = straight(start, objective);
        if baseline > 0.0 {
            detour += ((length - baseline) / baseline).max(0.0);
        }
    }
    drop(overlay);

    if !buckets.objectives.is_empty() {
        let mean_detour = detour / buckets.objectives.len() as f64;
        fitness += mean_detour.min(1.0) * weights.path_detour_bonus;
    }

    for (i, &a) in buckets.objectives.iter().enumerate() {
        for &b in &buckets.objectives[i + 1..] {
            if octile(a, b) < weights.objective_pair_min_distance {
                fitness -= weights.objective_pair_penalty;
            }
        }
    }

    Evaluation {
        fitness: f64::clamp(fitness, 0.0, 1.0),
        disqualified: false,
    }
}

/// Mean fitness over qualified evaluations; 0 when every candidate is
/// disqualified.
pub fn population_mean(evaluations: &[Evaluation]) -> f64 {
    let (sum, n) = evaluations
        .iter()
        .filter(|e| !e.disqualified)
        .fold((0.0, 0usize), |(s, n), e| (s + e.fitness, n + 1));
    if n == 0 { 0.0 } else { sum / n as f64 }
}
