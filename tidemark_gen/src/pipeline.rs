// End-to-end generation: constraints in, ranked candidates out.
//
// `generate_level` is the synchronous pipeline a caller (or `worker.rs`)
// runs: pick the seed, derive the water level from the optional weather
// sample, build the heightmap, then hand a `CandidateFactory` over it to the
// GA engine. One `LevelRng` is created from the seed and threaded through
// every stage in that order (noise permutation, then initial population,
// then GA operators), which is what makes a seeded run reproducible.
//
// Unseeded runs (`seed` absent or 0) draw a seed from the system clock. The
// seed actually used is returned so an interesting level can be replayed.
//
// Constraints built in code skip the checks a constraints file gets, so they
// are validated again on entry. Dimensions and water level are checked in
// `HeightmapGenerator::generate` before any grid work. Those failures are the
// only errors this module returns.

use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::{SystemTime, UNIX_EPOCH};

use tidemark_prng::LevelRng;
use tracing::info;

use crate::candidate::CandidateFactory;
use crate::config::Constraints;
use crate::error::GenerationError;
use crate::ga::{GaEngine, GenerationReport};
use crate::heightmap::{Heightmap, HeightmapGenerator};
use crate::types::MapCandidate;
use crate::weather::{WeatherSample, water_level_for};

/// Everything a renderer needs from one run.
#[derive(Clone, Debug)]
pub struct GeneratedLevel {
    /// Final population, best first.
    pub candidates: Vec<MapCandidate>,
    pub heightmap: Heightmap,
    pub report: GenerationReport,
    /// The seed the run used; feeding it back reproduces the level.
    pub seed: u64,
}

impl GeneratedLevel {
    pub fn best(&self) -> Option<&MapCandidate> {
        self.candidates.first()
    }
}

pub fn generate_level(
    constraints: &Constraints,
    weather: Option<&WeatherSample>,
) -> Result<GeneratedLevel, GenerationError> {
    generate_level_with_cancel(constraints, weather, None)
}

/// As `generate_level`, stopping at the next generation boundary once
/// `cancel` is set.
pub fn generate_level_with_cancel(
    constraints: &Constraints,
    weather: Option<&WeatherSample>,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<GeneratedLevel, GenerationError> {
    constraints.validate()?;
    let seed = constraints.effective_seed().unwrap_or_else(clock_seed);
    let water_level = water_level_for(weather);
    info!(
        target: "tidemark::pipeline",
        seed,
        water_level,
        width = constraints.map_width,
        height = constraints.map_height,
        difficulty = constraints.difficulty,
        "generation started"
    );

    let mut rng = LevelRng::new(seed);
    let terrain = HeightmapGenerator::from_constraints(constraints, &mut rng);
    let heightmap = terrain.generate(constraints.map_width, constraints.map_height, water_level)?;

    let factory = CandidateFactory::new(
        &heightmap,
        constraints.objectives_enabled,
        constraints.placement.clone(),
    );
    let mut engine = GaEngine::new(factory, constraints);
    if let Some(flag) = cancel {
        engine = engine.with_cancel_flag(flag);
    }
    let (candidates, report) = engine.run(&mut rng);

    info!(
        target: "tidemark::pipeline",
        seed,
        termination = ?report.termination,
        generations = report.generations,
        best = candidates.first().map_or(0.0, |c| c.fitness),
        elapsed_ms = report.elapsed_ms,
        "generation finished"
    );

    Ok(GeneratedLevel {
        candidates,
        heightmap,
        report,
        seed,
    })
}

/// A non-zero seed from the wall clock.
fn clock_seed() -> u64 {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0x5eed);
    nanos.max(1)
}
