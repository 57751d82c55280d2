// Data-driven generation constraints.
//
// Every tunable of a generation run lives in `Constraints`, loaded from JSON
// or built programmatically. The generator never hard-codes a penalty, a
// threshold, or a budget; it reads them from here. Tunables are grouped into
// nested structs: `GaParams` (loop and operator settings), `FitnessWeights`
// (the scoring terms), and `PlacementParams` (candidate factory budgets).
//
// All structs use `#[serde(default)]`, so a constraints file only needs the
// fields it overrides. Map dimensions and noise extents are deliberately
// *not* validated here: rejecting those is the heightmap generator's job and
// surfaces as a `GenerationError`. `validate()` covers the knobs that would
// otherwise make the GA loop meaningless (difficulty range, population size).
//
// See also: `error.rs` for `ConstraintsError`, `pipeline.rs` which consumes a
// validated `Constraints`, `weather.rs` for the water-level input.
//
// **Critical constraint: determinism.** With `seed = Some(n)` (n > 0) the
// whole run is reproducible, so every value here feeds a deterministic
// computation.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConstraintsError;

// ---------------------------------------------------------------------------
// Nested parameter groups
// ---------------------------------------------------------------------------

/// Generation-loop and operator settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaParams {
    /// Individuals sampled per tournament; the best two become parents.
    pub tournament_size: usize,
    /// Probability that a child is mutated at all.
    pub mutation_chance: f64,
    /// Given a mutation, probability it adds a tile rather than changing one.
    pub add_tile_chance: f64,
    /// Stop once the population mean fitness exceeds this.
    pub fitness_threshold: f64,
    /// Wall-clock budget for the loop, in milliseconds.
    pub time_budget_ms: u64,
    /// Mean-fitness changes smaller than this count as stagnant.
    pub stagnation_epsilon: f64,
    /// Stop after more than this many consecutive stagnant generations.
    pub stagnation_generations: u32,
    /// Carry the best individual into the next generation unchanged.
    /// Off by default.
    pub elitism: bool,
    /// Score candidates on the rayon pool, each worker on its own grid clone.
    pub parallel_evaluation: bool,
}

impl Default for GaParams {
    fn default() -> Self {
        Self {
            tournament_size: 4,
            mutation_chance: 1.0 / 3.0,
            add_tile_chance: 0.5,
            fitness_threshold: 0.9,
            time_budget_ms: 25_000,
            stagnation_epsilon: 0.001,
            stagnation_generations: 10,
            elitism: false,
            parallel_evaluation: false,
        }
    }
}

/// Penalty magnitudes and distance thresholds used by the fitness function.
/// Penalties are stored as positive numbers and subtracted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Enemies within this octile distance of START are "poorly placed".
    pub enemy_near_start_radius: f64,
    pub enemy_near_start_penalty: f64,
    pub no_items_penalty: f64,
    pub no_obstacles_penalty: f64,
    /// Walkable neighbors START should have after obstacles are applied.
    pub start_open_neighbors: usize,
    pub missing_start_neighbor_penalty: f64,
    /// Objectives whose path from START is shorter than this are penalized.
    pub objective_min_distance: f64,
    /// Applied when an objective's path is too short or longer than the
    /// target length.
    pub objective_distance_penalty: f64,
    /// Maximum bonus for paths that bend around obstacles. Scaled by the mean
    /// detour ratio (path cost over straight-line distance, minus one),
    /// capped at 1.
    pub path_detour_bonus: f64,
    /// Objective pairs closer than this are penalized.
    pub objective_pair_min_distance: f64,
    pub objective_pair_penalty: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            enemy_near_start_radius: 10.0,
            enemy_near_start_penalty: 0.05,
            no_items_penalty: 0.1,
            no_obstacles_penalty: 0.1,
            start_open_neighbors: 8,
            missing_start_neighbor_penalty: 0.05,
            objective_min_distance: 20.0,
            objective_distance_penalty: 0.075,
            path_detour_bonus: 0.05,
            objective_pair_min_distance: 15.0,
            objective_pair_penalty: 0.05,
        }
    }
}

/// Candidate factory budgets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementParams {
    /// Lower bound of the free-tile budget.
    pub free_budget_floor: usize,
    /// The budget's upper bound is `above_water / free_budget_divisor`.
    pub free_budget_divisor: usize,
    /// Resampling attempts per tile before a category is declared saturated.
    pub max_attempts_per_tile: u32,
    /// Fraction of each map axis forming the START corner region.
    pub start_region_fraction: f64,
    /// Difficulty at which the item budget is halved.
    pub item_halving_difficulty: u32,
}

impl Default for PlacementParams {
    fn default() -> Self {
        Self {
            free_budget_floor: 200,
            free_budget_divisor: 5,
            max_attempts_per_tile: 1_000,
            start_region_fraction: 0.2,
            item_halving_difficulty: 4,
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level constraints
// ---------------------------------------------------------------------------

/// Everything a generation run needs besides the optional weather input.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    /// Output map width in cells. Signed so a bad value reaches the
    /// generator's dimension check instead of failing to parse.
    pub map_width: i32,
    pub map_height: i32,
    /// Noise-space extent sampled across the map width.
    pub noise_width: f64,
    pub noise_height: f64,
    /// Noise-space origin, in units of the sample extent. Adjacent origins
    /// tile seamlessly.
    pub noise_origin: (i32, i32),
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
    /// Exponent applied to normalized elevation; > 1 biases toward water.
    pub elevation_exponent: f64,
    /// Allow 8-connected movement in pathfinding.
    pub diagonal_movement: bool,
    pub population_size: usize,
    pub max_generations: u32,
    /// 1 (easiest) to 10.
    pub difficulty: u32,
    pub objectives_enabled: bool,
    /// `Some(n)` with n > 0 enables deterministic mode.
    pub seed: Option<u64>,
    /// Objectives whose shortest path from START costs more than this are
    /// penalized.
    pub target_length: f64,
    pub ga: GaParams,
    pub fitness: FitnessWeights,
    pub placement: PlacementParams,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            map_width: 78,
            map_height: 48,
            noise_width: 4.0,
            noise_height: 4.0,
            noise_origin: (0, 0),
            octaves: 8,
            persistence: 0.5,
            lacunarity: 2.0,
            elevation_exponent: 1.5,
            diagonal_movement: true,
            population_size: 100,
            max_generations: 50,
            difficulty: 5,
            objectives_enabled: true,
            seed: None,
            target_length: 60.0,
            ga: GaParams::default(),
            fitness: FitnessWeights::default(),
            placement: PlacementParams::default(),
        }
    }
}

impl Constraints {
    /// Parse and validate constraints from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, ConstraintsError> {
        let constraints: Constraints = serde_json::from_str(json)?;
        constraints.validate()?;
        Ok(constraints)
    }

    /// Read, parse, and validate a constraints file.
    pub fn from_file(path: &Path) -> Result<Self, ConstraintsError> {
        let contents = fs::read_to_string(path).map_err(|source| ConstraintsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Replace `self` with the contents of `path`. On any error `self` is
    /// left exactly as it was.
    pub fn reload_from_file(&mut self, path: &Path) -> Result<(), ConstraintsError> {
        let fresh = Self::from_file(path)?;
        *self = fresh;
        Ok(())
    }

    /// The seed to run with, if deterministic mode is on.
    pub fn effective_seed(&self) -> Option<u64> {
        self.seed.filter(|&s| s > 0)
    }

    pub fn validate(&self) -> Result<(), ConstraintsError> {
        if !(1..=10).contains(&self.difficulty) {
            return Err(ConstraintsError::Invalid(format!(
                "difficulty must be in 1..=10, got {}",
                self.difficulty
            )));
        }
        if self.population_size < 2 {
            return Err(ConstraintsError::Invalid(format!(
                "population_size must be at least 2, got {}",
                self.population_size
            )));
        }
        if self.ga.tournament_size < 2 {
            return Err(ConstraintsError::Invalid(format!(
                "tournament_size must be at least 2, got {}",
                self.ga.tournament_size
            )));
        }
        if self.octaves == 0 {
            return Err(ConstraintsError::Invalid("octaves must be at least 1".into()));
        }
        if !(self.persistence > 0.0 && self.persistence <= 1.0) {
            return Err(ConstraintsError::Invalid(format!(
                "persistence must be in (0, 1], got {}",
                self.persistence
            )));
        }
        if self.placement.free_budget_divisor == 0 {
            return Err(ConstraintsError::Invalid(
                "placement.free_budget_divisor must be non-zero".into(),
            ));
        }
        Ok(())
    }
}
