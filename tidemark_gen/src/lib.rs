// tidemark_gen: procedural level generation library.
//
// Generates a 2D level in three stages: a fractal-noise heightmap whose
// above-water cells form a walkability grid, a population of random object
// layouts (start, objectives, enemies, obstacles, items) placed on that
// grid, and a genetic algorithm that evolves the layouts toward ones that
// are fully traversable and well spread out. Rendering, input, and the
// weather service live outside this crate; it consumes a `Constraints`
// value and an optional weather sample and returns ranked candidates plus
// the heightmap.
//
// Module overview:
// - `types.rs`:       Coord, CellIndex, Tile/TileState, MapCandidate.
// - `error.rs`:       GenerationError, ConstraintsError.
// - `config.rs`:      Constraints + nested GaParams/FitnessWeights/PlacementParams (JSON).
// - `noise.rs`:       Seeded 2D simplex noise with octave accumulation.
// - `heightmap.rs`:   HeightmapGenerator: noise → elevation → walkability grid.
// - `grid.rs`:        Flat walkability arena, neighbor queries, obstacle overlay guard.
// - `heuristics.rs`:  Manhattan, octile, Euclidean distances.
// - `pathfinding.rs`: A*, reachability checks, reusable search scratch.
// - `jps.rs`:         Jump Point Search on the same scratch.
// - `candidate.rs`:   CandidateFactory: budgeted random tile placement.
// - `fitness.rs`:     Candidate scoring and population mean.
// - `ga.rs`:          GA engine: selection, crossover, mutation, termination, ranking.
// - `weather.rs`:     Weather sample → water level.
// - `pipeline.rs`:    generate_level: the whole run, synchronous.
// - `worker.rs`:      Background thread with poll/wait/cancel handle.
// - `prng`:           Re-exported from `tidemark_prng`: xoshiro256++ with SplitMix64 seeding.
//
// **Critical constraint: determinism.** With a seed, a run is a pure
// function of `(constraints, weather)`. All randomness comes from one
// `LevelRng` threaded through the stages in a fixed order; hash sets are
// only queried, never iterated; floats are compared with `total_cmp`. The
// GA's wall-clock budget is the single exception.

pub mod candidate;
pub mod config;
pub mod error;
pub mod fitness;
pub mod ga;
pub mod grid;
pub mod heightmap;
pub mod heuristics;
pub mod jps;
pub mod noise;
pub mod pathfinding;
pub mod pipeline;
pub use tidemark_prng as prng;
pub mod types;
pub mod weather;
pub mod worker;
