// Genetic-algorithm engine: evolves a population of candidate layouts.
//
// The engine walks a small state machine per run:
//
//   Idle → Initialized → Evaluating → Done
//                            ↑    ↓
//                 Reproducing ← Selecting
//
// - **Initialize**: `population_size` candidates from `CandidateFactory`.
// - **Evaluate**: score every individual with `fitness::evaluate_candidate`
//   on the engine's private grid copy. Optionally parallel (rayon), each
//   worker on its own grid clone and `PathFinder`.
// - **Terminate** (checked after each evaluation, in this order):
//   cancelled; `max_generations` reached; mean fitness above the threshold;
//   wall clock past the time budget; mean change below epsilon for more than
//   the stagnation window.
// - **Select**: tournament; sample `tournament_size` individuals with
//   replacement, the best two become parents.
// - **Reproduce**: two-point crossover over the shorter parent's length
//   (middle segment swapped, tails kept), then mutation of each child.
//   Crossover can land two tiles on one cell; the later non-structural one
//   is deactivated so fitness and renderers see one object per cell. With
//   elitism on, the best individual is carried over unchanged first.
//
// On exit the last generation is sorted by fitness, descending, and returned
// in full along with a `GenerationReport`.
//
// See also: `fitness.rs` for scoring, `candidate.rs` for initialization and
// add-tile placement, `pipeline.rs` which drives a run, `worker.rs` which
// owns the cancel flag.
//
// **Critical constraint: determinism.** Every random draw (initialization,
// tournaments, cut points, mutation) comes from the single `LevelRng` passed
// to `run()`, in a fixed order. Evaluation draws nothing, so parallel mode
// produces identical scores. Only the wall-clock budget depends on the
// machine; a run that stops on it is not reproducible.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use tidemark_prng::LevelRng;
use tracing::debug;

use crate::candidate::CandidateFactory;
use crate::config::{Constraints, FitnessWeights, GaParams};
use crate::fitness::{Evaluation, evaluate_candidate, population_mean};
use crate::grid::Grid;
use crate::pathfinding::PathFinder;
use crate::types::{MapCandidate, Tile, TileState};

/// Where the engine is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Initialized,
    Evaluating,
    Selecting,
    Reproducing,
    Done,
}

/// Why the generation loop stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TerminationReason {
    MaxGenerations,
    FitnessThreshold,
    TimeBudget,
    Stagnation,
    Cancelled,
}

/// Fitness summary of one evaluated generation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationStats {
    /// 0 is the initial population.
    pub generation: u32,
    /// Mean over qualified candidates.
    pub mean_fitness: f64,
    pub best_fitness: f64,
    pub disqualified: usize,
}

/// What happened during a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub termination: TerminationReason,
    /// Reproduction rounds completed.
    pub generations: u32,
    pub initial_mean: f64,
    pub history: Vec<GenerationStats>,
    pub elapsed_ms: u64,
}

impl GenerationReport {
    pub fn final_mean(&self) -> f64 {
        self.history.last().map_or(self.initial_mean, |s| s.mean_fitness)
    }
}

pub struct GaEngine<'a> {
    factory: CandidateFactory<'a>,
    /// Working copy of the terrain grid; obstacle overlays land here.
    grid: Grid,
    finder: PathFinder,
    params: GaParams,
    weights: FitnessWeights,
    target_length: f64,
    population_size: usize,
    max_generations: u32,
    difficulty: u32,
    state: EngineState,
    cancel: Option<Arc<AtomicBool>>,
}

impl<'a> GaEngine<'a> {
    pub fn new(factory: CandidateFactory<'a>, constraints: &Constraints) -> Self {
        let grid = factory.heightmap().grid.clone();
        Self {
            factory,
            grid,
            finder: PathFinder::new(),
            params: constraints.ga.clone(),
            weights: constraints.fitness.clone(),
            target_length: constraints.target_length,
            population_size: constraints.population_size,
            max_generations: constraints.max_generations,
            difficulty: constraints.difficulty,
            state: EngineState::Idle,
            cancel: None,
        }
    }

    /// Stop at the next generation boundary once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Run to termination. Returns the final population, best first.
    pub fn run(&mut self, rng: &mut LevelRng) -> (Vec<MapCandidate>, GenerationReport) {
        let started = Instant::now();
        let budget = Duration::from_millis(self.params.time_budget_ms);

        let mut population = self.initialize(rng);
        let first = self.evaluate(&mut population, 0);
        let initial_mean = first.mean_fitness;
        let mut history = vec![first];
        let mut previous_mean = initial_mean;
        let mut stagnant = 0u32;
        let mut generation = 0u32;

        let termination = loop {
            if let Some(reason) = self.check_termination(
                generation,
                previous_mean,
                stagnant,
                started.elapsed() > budget,
            ) {
                break reason;
            }

            let next = self.next_generation(&population, rng);
            population = next;
            generation += 1;

            let stats = self.evaluate(&mut population, generation);
            if (stats.mean_fitness - previous_mean).abs() < self.params.stagnation_epsilon {
                stagnant += 1;
            } else {
                stagnant = 0;
            }
            previous_mean = stats.mean_fitness;
            history.push(stats);
        };

        rank(&mut population);
        self.state = EngineState::Done;

        let report = GenerationReport {
            termination,
            generations: generation,
            initial_mean,
            history,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        (population, report)
    }

    /// Build the initial population.
    pub fn initialize(&mut self, rng: &mut LevelRng) -> Vec<MapCandidate> {
        let population = (0..self.population_size)
            .map(|_| self.factory.create_candidate(self.difficulty, rng))
            .collect();
        self.state = EngineState::Initialized;
        population
    }

    /// Score every individual in place and summarize the generation.
    pub fn evaluate(
        &mut self,
        population: &mut [MapCandidate],
        generation: u32,
    ) -> GenerationStats {
        self.state = EngineState::Evaluating;
        let evaluations: Vec<Evaluation> = if self.params.parallel_evaluation {
            let grid = &self.grid;
            let weights = &self.weights;
            let target = self.target_length;
            population
                .par_iter()
                .map_init(
                    || (grid.clone(), PathFinder::new()),
                    |(grid, finder), candidate| {
                        evaluate_candidate(candidate, grid, finder, weights, target)
                    },
                )
                .collect()
        } else {
            population
                .iter()
                .map(|candidate| {
                    evaluate_candidate(
                        candidate,
                        &mut self.grid,
                        &mut self.finder,
                        &self.weights,
                        self.target_length,
                    )
                })
                .collect()
        };

        for (candidate, eval) in population.iter_mut().zip(&evaluations) {
            candidate.fitness = eval.fitness;
        }

        let stats = GenerationStats {
            generation,
            mean_fitness: population_mean(&evaluations),
            best_fitness: evaluations.iter().map(|e| e.fitness).fold(0.0, f64::max),
            disqualified: evaluations.iter().filter(|e| e.disqualified).count(),
        };
        debug!(
            target: "tidemark::ga",
            generation,
            mean = stats.mean_fitness,
            best = stats.best_fitness,
            disqualified = stats.disqualified,
            "generation evaluated"
        );
        stats
    }

    fn check_termination(
        &self,
        generation: u32,
        mean: f64,
        stagnant: u32,
        over_budget: bool,
    ) -> Option<TerminationReason> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
        {
            Some(TerminationReason::Cancelled)
        } else if generation >= self.max_generations {
            Some(TerminationReason::MaxGenerations)
        } else if mean > self.params.fitness_threshold {
            Some(TerminationReason::FitnessThreshold)
        } else if over_budget {
            Some(TerminationReason::TimeBudget)
        } else if stagnant > self.params.stagnation_generations {
            Some(TerminationReason::Stagnation)
        } else {
            None
        }
    }

    /// Select, recombine, and mutate a full replacement population.
    /// Children carry fitness 0 until evaluated.
    pub fn next_generation(
        &mut self,
        population: &[MapCandidate],
        rng: &mut LevelRng,
    ) -> Vec<MapCandidate> {
        let target = self.population_size.max(1);
        let mut next = Vec::with_capacity(target);
        if population.is_empty() {
            return next;
        }

        if self.params.elitism {
            if let Some(best) = population.iter().max_by(|a, b| a.fitness.total_cmp(&b.fitness)) {
                next.push(best.clone());
            }
        }

        while next.len() < target {
            self.state = EngineState::Selecting;
            let (a, b) = tournament(population, self.params.tournament_size, rng);
            self.state = EngineState::Reproducing;
            let (mut first, mut second) = crossover(&population[a], &population[b], rng);
            self.mutate(&mut first, rng);
            self.mutate(&mut second, rng);
            first.deactivate_overlaps();
            second.deactivate_overlaps();
            next.push(first);
            if next.len() < target {
                next.push(second);
            }
        }
        next
    }

    /// With `mutation_chance`, either add a tile of a random mutable state at
    /// a free walkable cell, or switch one non-structural tile to a different
    /// mutable state.
    pub fn mutate(&self, candidate: &mut MapCandidate, rng: &mut LevelRng) {
        if !rng.random_bool(self.params.mutation_chance) {
            return;
        }
        if rng.random_bool(self.params.add_tile_chance) {
            let Some(&state) = rng.choose(&TileState::MUTABLE) else {
                return;
            };
            let occupied: FxHashSet<_> = candidate.tiles.iter().map(|t| t.position).collect();
            if let Some(cell) = self.factory.random_free_cell(&occupied, rng) {
                candidate.tiles.push(Tile::new(state, cell));
            }
        } else {
            let eligible: Vec<usize> = candidate
                .tiles
                .iter()
                .enumerate()
                .filter(|(_, t)| !t.state.is_structural())
                .map(|(i, _)| i)
                .collect();
            let Some(&index) = rng.choose(&eligible) else {
                return;
            };
            let current = candidate.tiles[index].state;
            let others: Vec<TileState> = TileState::MUTABLE
                .into_iter()
                .filter(|&s| s != current)
                .collect();
            if let Some(&state) = rng.choose(&others) {
                candidate.tiles[index].state = state;
            }
        }
        candidate.fitness = 0.0;
    }
}

/// Sample `size` individuals with replacement; return the indices of the
/// best and second best.
pub fn tournament(population: &[MapCandidate], size: usize, rng: &mut LevelRng) -> (usize, usize) {
    let mut picks: Vec<usize> = (0..size.max(2))
        .map(|_| rng.below(population.len()))
        .collect();
    // Stable: equal fitness keeps draw order.
    picks.sort_by(|&a, &b| population[b].fitness.total_cmp(&population[a].fitness));
    (picks[0], picks[1])
}

/// Two-point crossover with random cut points over the shorter parent.
pub fn crossover(
    a: &MapCandidate,
    b: &MapCandidate,
    rng: &mut LevelRng,
) -> (MapCandidate, MapCandidate) {
    let n = a.len().min(b.len());
    let p = rng.below(n + 1);
    let q = rng.below(n + 1);
    crossover_at(a, b, p.min(q), p.max(q))
}

/// Two-point crossover at fixed cuts: positions `[p1, p2)` (clamped to the
/// shorter parent) are swapped; everything else, including either parent's
/// extra tail, stays with its parent.
pub fn crossover_at(
    a: &MapCandidate,
    b: &MapCandidate,
    p1: usize,
    p2: usize,
) -> (MapCandidate, MapCandidate) {
    let n = a.len().min(b.len());
    let hi = p2.min(n);
    let lo = p1.min(hi);
    let mut first = a.tiles.clone();
    let mut second = b.tiles.clone();
    first[lo..hi].copy_from_slice(&b.tiles[lo..hi]);
    second[lo..hi].copy_from_slice(&a.tiles[lo..hi]);
    (MapCandidate::new(first), MapCandidate::new(second))
}

/// Sort by fitness, descending. Stable for ties.
pub fn rank(population: &mut [MapCandidate]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlacementParams;
    use crate::heightmap::{Heightmap, HeightmapGenerator};
    use crate::types::Coord;

    fn tile(state: TileState, x: i32) -> Tile {
        Tile::new(state, Coord::new(x, 0))
    }

    fn candidate(states: &[TileState], offset: i32) -> MapCandidate {
        MapCandidate::new(
            states
                .iter()
                .enumerate()
                .map(|(i, &s)| tile(s, offset + i as i32))
                .collect(),
        )
    }

    fn small_map(seed: u64) -> Heightmap {
        HeightmapGenerator::new(&mut LevelRng::new(seed))
            .generate(40, 30, 0.25)
            .unwrap()
    }

    fn small_constraints() -> Constraints {
        Constraints {
            map_width: 40,
            map_height: 30,
            population_size: 16,
            max_generations: 6,
            difficulty: 3,
            ..Default::default()
        }
    }

    #[test]
    fn crossover_swaps_middle_and_keeps_tails() {
        use TileState::*;
        let a = candidate(&[Start, Enemy, Enemy, Item, Obstacle, Item, Item], 0);
        let b = candidate(&[Start, Objective, Objective, Objective, Enemy], 100);
        let (c1, c2) = crossover_at(&a, &b, 1, 3);

        assert_eq!(c1.len(), a.len());
        assert_eq!(c2.len(), b.len());
        for i in 0..a.len() {
            let expected = if (1..3).contains(&i) { b.tiles[i] } else { a.tiles[i] };
            assert_eq!(c1.tiles[i], expected, "first child at {i}");
        }
        for i in 0..b.len() {
            let expected = if (1..3).contains(&i) { a.tiles[i] } else { b.tiles[i] };
            assert_eq!(c2.tiles[i], expected, "second child at {i}");
        }
        assert_eq!(c1.fitness, 0.0);
    }

    #[test]
    fn crossover_cuts_clamp_to_shorter_parent() {
        use TileState::*;
        let a = candidate(&[Start, Enemy, Enemy, Item, Item], 0);
        let b = candidate(&[Start, Objective], 50);
        let (c1, c2) = crossover_at(&a, &b, 1, 99);
        assert_eq!(c1.tiles[1], b.tiles[1]);
        assert_eq!(&c1.tiles[2..], &a.tiles[2..]);
        assert_eq!(c2.tiles, vec![b.tiles[0], a.tiles[1]]);
    }

    #[test]
    fn random_crossover_preserves_multiset() {
        use TileState::*;
        let a = candidate(&[Start, Enemy, Enemy, Item, Obstacle, Item], 0);
        let b = candidate(&[Start, Objective, Objective, Enemy, Enemy, Item], 10);
        let mut rng = LevelRng::new(8);
        for _ in 0..50 {
            let (c1, c2) = crossover(&a, &b, &mut rng);
            let positions = |x: &MapCandidate, y: &MapCandidate| -> Vec<Coord> {
                x.tiles.iter().chain(&y.tiles).map(|t| t.position).collect()
            };
            let mut parents = positions(&a, &b);
            let mut children = positions(&c1, &c2);
            parents.sort();
            children.sort();
            assert_eq!(parents, children);
        }
    }

    #[test]
    fn tournament_returns_best_two_of_sample() {
        let mut population: Vec<MapCandidate> = (0..6).map(|_| MapCandidate::default()).collect();
        for (i, c) in population.iter_mut().enumerate() {
            c.fitness = i as f64 / 10.0;
        }
        let mut rng = LevelRng::new(3);
        for _ in 0..100 {
            let (best, second) = tournament(&population, 4, &mut rng);
            assert!(population[best].fitness >= population[second].fitness);
        }
        // A tournament the size of a huge sample almost surely sees the top two.
        let (best, _) = tournament(&population, 200, &mut rng);
        assert_eq!(best, 5);
    }

    #[test]
    fn mutation_never_touches_structural_tiles() {
        let map = small_map(12);
        let factory = CandidateFactory::new(&map, true, PlacementParams::default());
        let constraints = Constraints {
            ga: GaParams {
                mutation_chance: 1.0,
                add_tile_chance: 0.0,
                ..Default::default()
            },
            ..small_constraints()
        };
        let engine = GaEngine::new(factory, &constraints);
        let mut rng = LevelRng::new(12);
        let mut c = candidate(&[TileState::Start, TileState::End, TileState::Enemy], 0);
        for _ in 0..30 {
            engine.mutate(&mut c, &mut rng);
            assert_eq!(c.tiles[0].state, TileState::Start);
            assert_eq!(c.tiles[1].state, TileState::End);
            assert!(!c.tiles[2].state.is_structural());
        }
    }

    #[test]
    fn change_mutation_always_changes_state() {
        let map = small_map(13);
        let factory = CandidateFactory::new(&map, true, PlacementParams::default());
        let constraints = Constraints {
            ga: GaParams {
                mutation_chance: 1.0,
                add_tile_chance: 0.0,
                ..Default::default()
            },
            ..small_constraints()
        };
        let engine = GaEngine::new(factory, &constraints);
        let mut rng = LevelRng::new(13);
        let mut c = candidate(&[TileState::Start, TileState::Item], 0);
        for _ in 0..30 {
            let before = c.tiles[1].state;
            engine.mutate(&mut c, &mut rng);
            assert_ne!(c.tiles[1].state, before);
        }
    }

    #[test]
    fn add_mutation_places_on_free_walkable_cell() {
        let map = small_map(14);
        let factory = CandidateFactory::new(&map, true, PlacementParams::default());
        let constraints = Constraints {
            ga: GaParams {
                mutation_chance: 1.0,
                add_tile_chance: 1.0,
                ..Default::default()
            },
            ..small_constraints()
        };
        let engine = GaEngine::new(factory, &constraints);
        let mut rng = LevelRng::new(14);
        let mut c = MapCandidate::default();
        for _ in 0..20 {
            engine.mutate(&mut c, &mut rng);
        }
        assert_eq!(c.len(), 20);
        let mut seen = FxHashSet::default();
        for t in &c.tiles {
            assert!(map.grid.is_walkable(t.position));
            assert!(seen.insert(t.position));
            assert!(!t.state.is_structural());
        }
    }

    #[test]
    fn run_returns_sorted_full_population() {
        let map = small_map(21);
        let constraints = small_constraints();
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let mut engine = GaEngine::new(factory, &constraints);
        assert_eq!(engine.state(), EngineState::Idle);
        let (population, report) = engine.run(&mut LevelRng::new(21));
        assert_eq!(engine.state(), EngineState::Done);
        assert_eq!(population.len(), 16);
        assert!(population.windows(2).all(|w| w[0].fitness >= w[1].fitness));
        assert_eq!(report.history.len() as u32, report.generations + 1);
        assert!(report.generations <= 6);
        for c in &population {
            assert!((0.0..=1.0).contains(&c.fitness));
        }
    }

    #[test]
    fn elitism_keeps_best_individual() {
        let map = small_map(31);
        let constraints = Constraints {
            ga: GaParams {
                elitism: true,
                ..Default::default()
            },
            ..small_constraints()
        };
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let mut engine = GaEngine::new(factory, &constraints);
        let mut rng = LevelRng::new(31);
        let mut population = engine.initialize(&mut rng);
        engine.evaluate(&mut population, 0);
        let best = population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
            .cloned()
            .unwrap();
        let next = engine.next_generation(&population, &mut rng);
        assert_eq!(next.len(), population.len());
        assert_eq!(next[0], best);
    }

    #[test]
    fn parallel_and_sequential_scores_match() {
        let map = small_map(41);
        let sequential = small_constraints();
        let parallel = Constraints {
            ga: GaParams {
                parallel_evaluation: true,
                ..Default::default()
            },
            ..small_constraints()
        };
        let mut population = {
            let factory = CandidateFactory::new(&map, true, sequential.placement.clone());
            GaEngine::new(factory, &sequential).initialize(&mut LevelRng::new(41))
        };
        let mut copy = population.clone();

        let factory = CandidateFactory::new(&map, true, sequential.placement.clone());
        let seq_stats = GaEngine::new(factory, &sequential).evaluate(&mut population, 0);
        let factory = CandidateFactory::new(&map, true, parallel.placement.clone());
        let par_stats = GaEngine::new(factory, &parallel).evaluate(&mut copy, 0);

        assert_eq!(seq_stats, par_stats);
        assert_eq!(population, copy);
    }

    #[test]
    fn preset_cancel_flag_stops_before_reproduction() {
        let map = small_map(51);
        let constraints = small_constraints();
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let flag = Arc::new(AtomicBool::new(true));
        let mut engine = GaEngine::new(factory, &constraints).with_cancel_flag(flag);
        let (population, report) = engine.run(&mut LevelRng::new(51));
        assert_eq!(report.termination, TerminationReason::Cancelled);
        assert_eq!(report.generations, 0);
        assert_eq!(population.len(), 16);
    }

    #[test]
    fn zero_generations_stops_immediately() {
        let map = small_map(61);
        let constraints = Constraints {
            max_generations: 0,
            ..small_constraints()
        };
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let (_, report) = GaEngine::new(factory, &constraints).run(&mut LevelRng::new(61));
        assert_eq!(report.termination, TerminationReason::MaxGenerations);
        assert_eq!(report.history.len(), 1);
    }

    #[test]
    fn children_never_share_a_cell() {
        let map = small_map(71);
        let constraints = small_constraints();
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let mut engine = GaEngine::new(factory, &constraints);
        let mut rng = LevelRng::new(71);
        let mut population = engine.initialize(&mut rng);
        for generation in 0..5 {
            engine.evaluate(&mut population, generation);
            population = engine.next_generation(&population, &mut rng);
            for c in &population {
                let mut seen = FxHashSet::default();
                for t in c.tiles.iter().filter(|t| t.active) {
                    assert!(seen.insert(t.position), "two active tiles on {:?}", t.position);
                }
            }
        }
    }

    #[test]
    fn threshold_stops_when_mean_exceeds_it() {
        let map = small_map(62);
        let constraints = Constraints {
            ga: GaParams {
                fitness_threshold: -1.0,
                ..Default::default()
            },
            ..small_constraints()
        };
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let (population, report) = GaEngine::new(factory, &constraints).run(&mut LevelRng::new(62));
        assert_eq!(report.termination, TerminationReason::FitnessThreshold);
        assert_eq!(report.generations, 0);
        assert_eq!(population.len(), 16);
    }

    #[test]
    fn zero_time_budget_stops_after_first_evaluation() {
        let map = small_map(63);
        let constraints = Constraints {
            ga: GaParams {
                fitness_threshold: 2.0,
                time_budget_ms: 0,
                ..Default::default()
            },
            ..small_constraints()
        };
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let (_, report) = GaEngine::new(factory, &constraints).run(&mut LevelRng::new(63));
        assert_eq!(report.termination, TerminationReason::TimeBudget);
        assert_eq!(report.generations, 0);
        assert_eq!(report.history.len(), 1);
    }

    #[test]
    fn flat_mean_stops_after_more_than_window_generations() {
        // Every qualified candidate has enemies near START at a penalty that
        // floors it to 0, so the mean never moves.
        let map = small_map(64);
        let constraints = Constraints {
            max_generations: 50,
            ga: GaParams {
                fitness_threshold: 2.0,
                time_budget_ms: 600_000,
                ..Default::default()
            },
            fitness: FitnessWeights {
                enemy_near_start_radius: 1_000.0,
                enemy_near_start_penalty: 2.0,
                path_detour_bonus: 0.0,
                ..Default::default()
            },
            ..small_constraints()
        };
        let factory = CandidateFactory::new(&map, true, constraints.placement.clone());
        let (_, report) = GaEngine::new(factory, &constraints).run(&mut LevelRng::new(64));
        assert_eq!(report.termination, TerminationReason::Stagnation);
        assert_eq!(report.generations, 11);
        assert_eq!(report.history.len(), 12);
        assert!(report.history.iter().all(|s| s.mean_fitness == 0.0));
    }

    #[test]
    fn rank_sorts_descending() {
        let mut population: Vec<MapCandidate> = [0.3, 0.9, 0.0, 0.5]
            .into_iter()
            .map(|f| MapCandidate {
                tiles: Vec::new(),
                fitness: f,
            })
            .collect();
        rank(&mut population);
        let order: Vec<f64> = population.iter().map(|c| c.fitness).collect();
        assert_eq!(order, vec![0.9, 0.5, 0.3, 0.0]);
    }
}
