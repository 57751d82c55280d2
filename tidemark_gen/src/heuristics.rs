// Distance functions shared by pathfinding and fitness scoring.
//
// Pure and side-effect free. A* uses `octile` (8-connected) or `manhattan`
// (4-connected) as its heuristic and `euclidean` as step cost; the fitness
// function measures placement distances with `octile`. Changing any of these
// changes both consumers together.

use crate::types::Coord;

/// `√2 − 1`, the extra cost of a diagonal step over an orthogonal one.
const DIAGONAL_EXTRA: f64 = std::f64::consts::SQRT_2 - 1.0;

/// `|dx| + |dy|`.
pub fn manhattan(a: Coord, b: Coord) -> f64 {
    let (dx, dy) = a.delta(b);
    (dx + dy) as f64
}

/// Octile distance: `min(dx, dy)·(√2 − 1) + max(dx, dy)`. Exact shortest
/// path length on an open 8-connected grid.
pub fn octile(a: Coord, b: Coord) -> f64 {
    let (dx, dy) = a.delta(b);
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    lo as f64 * DIAGONAL_EXTRA + hi as f64
}

/// Straight-line distance.
pub fn euclidean(a: Coord, b: Coord) -> f64 {
    let (ax, ay) = a.as_f64();
    let (bx, by) = b.as_f64();
    (ax - bx).hypot(ay - by)
}

/// The admissible A* heuristic for a grid's connectivity.
pub fn for_connectivity(diagonal: bool) -> fn(Coord, Coord) -> f64 {
    if diagonal { octile } else { manhattan }
}
