// Random, budgeted placement of level objects on a heightmap.
//
// `CandidateFactory` produces one `MapCandidate` per call. It places a START
// tile in the top-left corner region, draws a free-tile budget from the
// heightmap's above-water count, then fills categories in a fixed order
// (objectives, enemies, obstacles, items), each capped by whatever budget is
// left. The budget bounds the candidate's size: it never reaches
// `above_water / free_budget_divisor` once that quotient exceeds the floor.
//
// Every placement samples a uniform random cell and rejects it if it is
// under water or already occupied (`FxHashSet<Coord>`), resampling up to
// `PlacementParams::max_attempts_per_tile` times. A category that runs out of
// attempts is saturated: it stops early, logs a warning, and the candidate is
// returned with whatever was placed.
//
// The GA's add-tile mutation reuses `random_free_cell` so mutated tiles obey
// the same placement rules.
//
// See also: `heightmap.rs` for the terrain sampled here, `ga.rs` which
// builds the initial population, `config.rs` for `PlacementParams`.
//
// **Critical constraint: determinism.** All draws come from the caller's
// `LevelRng`, in the category order above. The occupancy set is only
// queried, never iterated.

use rustc_hash::FxHashSet;
use tidemark_prng::LevelRng;
use tracing::warn;

use crate::config::PlacementParams;
use crate::heightmap::Heightmap;
use crate::types::{Coord, MapCandidate, Tile, TileState};

/// Builds random candidates over one heightmap.
pub struct CandidateFactory<'a> {
    heightmap: &'a Heightmap,
    objectives_enabled: bool,
    params: PlacementParams,
}

impl<'a> CandidateFactory<'a> {
    pub fn new(
        heightmap: &'a Heightmap,
        objectives_enabled: bool,
        params: PlacementParams,
    ) -> Self {
        Self {
            heightmap,
            objectives_enabled,
            params,
        }
    }

    pub fn heightmap(&self) -> &'a Heightmap {
        self.heightmap
    }

    /// Build one random candidate at `difficulty`.
    pub fn create_candidate(&self, difficulty: u32, rng: &mut LevelRng) -> MapCandidate {
        let mut tiles = Vec::new();
        let mut occupied = FxHashSet::default();
        let mut free = self.free_budget(rng);

        if let Some(start) = self.place_start(&occupied, rng) {
            occupied.insert(start);
            tiles.push(Tile::new(TileState::Start, start));
            free = free.saturating_sub(1);
        }

        let objectives = self.objective_count(difficulty, rng);
        let wanted = objectives.min(free);
        free -= self.place(TileState::Objective, wanted, &mut tiles, &mut occupied, rng);

        let enemies = (difficulty as usize * 10).min(free);
        free -= self.place(TileState::Enemy, enemies, &mut tiles, &mut occupied, rng);

        let obstacles = rng.below(free / 2);
        free -= self.place(TileState::Obstacle, obstacles, &mut tiles, &mut occupied, rng);

        let mut items = rng.below(free / 6);
        if difficulty >= self.params.item_halving_difficulty {
            items /= 2;
        }
        self.place(TileState::Item, items, &mut tiles, &mut occupied, rng);

        MapCandidate::new(tiles)
    }

    /// Free-tile budget: uniform in `[floor, above_water / divisor)` when
    /// that range is non-empty, else the floor.
    pub fn free_budget(&self, rng: &mut LevelRng) -> usize {
        let floor = self.params.free_budget_floor;
        let ceiling = self.heightmap.above_water / self.params.free_budget_divisor.max(1);
        if ceiling > floor {
            rng.range_usize(floor, ceiling)
        } else {
            floor
        }
    }

    /// 0 with objectives disabled, 1 at difficulty 1, otherwise
    /// `max(random(difficulty - 1) + 1, difficulty / 2)`.
    pub fn objective_count(&self, difficulty: u32, rng: &mut LevelRng) -> usize {
        if !self.objectives_enabled {
            return 0;
        }
        if difficulty <= 1 {
            return 1;
        }
        let d = difficulty as usize;
        (rng.below(d - 1) + 1).max(d / 2)
    }

    /// A uniformly sampled walkable cell not in `occupied`, or `None` after
    /// `max_attempts_per_tile` rejections.
    pub fn random_free_cell(
        &self,
        occupied: &FxHashSet<Coord>,
        rng: &mut LevelRng,
    ) -> Option<Coord> {
        let (w, h) = (self.heightmap.width as i32, self.heightmap.height as i32);
        if w <= 0 || h <= 0 {
            return None;
        }
        self.sample_in(w, h, occupied, rng)
    }

    fn sample_in(
        &self,
        max_x: i32,
        max_y: i32,
        occupied: &FxHashSet<Coord>,
        rng: &mut LevelRng,
    ) -> Option<Coord> {
        let grid = &self.heightmap.grid;
        for _ in 0..self.params.max_attempts_per_tile {
            let c = Coord::new(rng.range_i32(0, max_x), rng.range_i32(0, max_y));
            if grid.is_walkable(c) && !occupied.contains(&c) {
                return Some(c);
            }
        }
        None
    }

    /// START position: a random free cell in the top-left corner region,
    /// falling back to the walkable cell nearest the corner.
    fn place_start(&self, occupied: &FxHashSet<Coord>, rng: &mut LevelRng) -> Option<Coord> {
        let fraction = self.params.start_region_fraction;
        let region_w = ((self.heightmap.width as f64 * fraction) as i32).max(1);
        let region_h = ((self.heightmap.height as f64 * fraction) as i32).max(1);
        self.sample_in(region_w, region_h, occupied, rng).or_else(|| {
            self.heightmap
                .grid
                .walkable_cells()
                .filter(|c| !occupied.contains(c))
                .min_by_key(|c| (c.x * c.x + c.y * c.y, c.y, c.x))
        })
    }

    /// Place up to `count` tiles of `state`. Returns how many were placed.
    fn place(
        &self,
        state: TileState,
        count: usize,
        tiles: &mut Vec<Tile>,
        occupied: &mut FxHashSet<Coord>,
        rng: &mut LevelRng,
    ) -> usize {
        for placed in 0..count {
            let Some(c) = self.random_free_cell(occupied, rng) else {
                warn!(
                    target: "tidemark::factory",
                    ?state,
                    placed,
                    requested = count,
                    "placement saturated; category cut short"
                );
                return placed;
            };
            occupied.insert(c);
            tiles.push(Tile::new(state, c));
        }
        count
    }
}
