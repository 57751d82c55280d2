// Terrain generation: fractal noise → elevation → walkability.
//
// `HeightmapGenerator` owns a seeded `NoiseField` plus the sampling
// parameters (noise-space extent, origin, octave settings, elevation
// exponent, grid connectivity). `generate()` samples one noise point per
// cell, remaps the fractal sum from [-1, 1] to [0, 1], clamps, and raises it
// to `exponent` (1.5 by default, which flattens lowlands and pushes more of
// the map under water). Cells strictly above the water level are walkable.
//
// Cell `(x, y)` samples noise-space point
// `(origin.x * noise_width + x * noise_width / width,
//   origin.y * noise_height + y * noise_height / height)`, so maps generated
// at adjacent integer origins continue each other without a seam.
//
// The resulting `Heightmap` is immutable. Fitness evaluation overlays
// obstacles on a clone of its grid, never on the heightmap itself.
//
// See also: `noise.rs` for the lattice, `grid.rs` for the walkability arena,
// `weather.rs` which chooses the water level, `pipeline.rs` which builds the
// generator from `Constraints`.
//
// **Critical constraint: determinism.** The generator draws from the RNG
// only when constructed (the noise permutation); `generate()` itself is a
// pure function of its inputs.

use tidemark_prng::LevelRng;
use tracing::debug;

use crate::config::Constraints;
use crate::error::GenerationError;
use crate::grid::Grid;
use crate::noise::{FractalParams, NoiseField};
use crate::types::{Coord, Tile};

/// Default elevation exponent.
pub const DEFAULT_EXPONENT: f64 = 1.5;

/// Elevation at and above which the preview draws high ground.
const HIGH_GROUND: f64 = 0.6;

/// Generated terrain: per-cell elevation and the derived walkability grid.
#[derive(Clone, Debug)]
pub struct Heightmap {
    elevation: Vec<f64>,
    pub width: u32,
    pub height: u32,
    pub water_level: f64,
    pub grid: Grid,
    /// Number of walkable (strictly above water) cells.
    pub above_water: usize,
}

impl Heightmap {
    /// Elevation in [0, 1], or `None` out of bounds.
    pub fn elevation_at(&self, c: Coord) -> Option<f64> {
        self.grid.index(c).map(|i| self.elevation[i.as_usize()])
    }

    /// Row-major elevation values.
    pub fn elevations(&self) -> &[f64] {
        &self.elevation
    }

    /// Text rendering: `~` water, `.` land, `^` high ground.
    pub fn ascii_preview(&self) -> String {
        self.ascii_preview_with(&[])
    }

    /// Text rendering with active tile glyphs drawn over the terrain. Later
    /// tiles win when two share a cell.
    pub fn ascii_preview_with(&self, tiles: &[Tile]) -> String {
        let w = self.width as usize;
        let mut glyphs: Vec<char> = self
            .elevation
            .iter()
            .map(|&e| {
                if e <= self.water_level {
                    '~'
                } else if e >= HIGH_GROUND {
                    '^'
                } else {
                    '.'
                }
            })
            .collect();
        for tile in tiles.iter().filter(|t| t.active) {
            if let Some(i) = self.grid.index(tile.position) {
                glyphs[i.as_usize()] = tile.state.glyph();
            }
        }
        let mut out = String::with_capacity(glyphs.len() + self.height as usize);
        for row in glyphs.chunks(w.max(1)) {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}

/// Samples fractal noise into a `Heightmap`.
#[derive(Clone)]
pub struct HeightmapGenerator {
    noise: NoiseField,
    pub fractal: FractalParams,
    /// Noise-space extent covered by the map's width.
    pub noise_width: f64,
    pub noise_height: f64,
    /// Noise-space origin, in units of the extent.
    pub origin: (i32, i32),
    pub exponent: f64,
    /// Connectivity of the produced grid.
    pub diagonal: bool,
}

impl HeightmapGenerator {
    /// A generator with default sampling settings (4×4 noise extent, 8
    /// octaves, exponent 1.5, 8-connected).
    pub fn new(rng: &mut LevelRng) -> Self {
        Self {
            noise: NoiseField::new(rng),
            fractal: FractalParams::default(),
            noise_width: 4.0,
            noise_height: 4.0,
            origin: (0, 0),
            exponent: DEFAULT_EXPONENT,
            diagonal: true,
        }
    }

    /// A generator configured from the terrain fields of `constraints`.
    pub fn from_constraints(constraints: &Constraints, rng: &mut LevelRng) -> Self {
        Self {
            noise: NoiseField::new(rng),
            fractal: FractalParams {
                octaves: constraints.octaves,
                persistence: constraints.persistence,
                lacunarity: constraints.lacunarity,
            },
            noise_width: constraints.noise_width,
            noise_height: constraints.noise_height,
            origin: constraints.noise_origin,
            exponent: constraints.elevation_exponent,
            diagonal: constraints.diagonal_movement,
        }
    }

    /// Build the heightmap for a `width × height` map.
    pub fn generate(
        &self,
        width: i32,
        height: i32,
        water_level: f64,
    ) -> Result<Heightmap, GenerationError> {
        if width <= 0 || height <= 0 {
            return Err(GenerationError::InvalidDimensions {
                width: width.into(),
                height: height.into(),
            });
        }
        if self.noise_width == 0.0 || self.noise_height == 0.0 {
            return Err(GenerationError::ZeroNoiseExtent {
                width: self.noise_width,
                height: self.noise_height,
            });
        }
        if !water_level.is_finite() || water_level < 0.0 {
            return Err(GenerationError::InvalidWaterLevel(water_level));
        }

        let (w, h) = (width as u32, height as u32);
        let step_x = self.noise_width / width as f64;
        let step_y = self.noise_height / height as f64;
        let base_x = self.origin.0 as f64 * self.noise_width;
        let base_y = self.origin.1 as f64 * self.noise_height;

        let mut elevation = Vec::with_capacity(w as usize * h as usize);
        let mut grid = Grid::new(w, h, self.diagonal);
        let mut above_water = 0;
        for y in 0..height {
            let ny = base_y + y as f64 * step_y;
            for x in 0..width {
                let nx = base_x + x as f64 * step_x;
                let raw = self.noise.fractal(nx, ny, self.fractal);
                let e = ((raw + 1.0) / 2.0).clamp(0.0, 1.0).powf(self.exponent);
                elevation.push(e);
                if e > water_level {
                    grid.set_walkable(Coord::new(x, y), true);
                    above_water += 1;
                }
            }
        }

        debug!(
            target: "tidemark::heightmap",
            width,
            height,
            water_level,
            above_water,
            "heightmap generated"
        );

        Ok(Heightmap {
            elevation,
            width: w,
            height: h,
            water_level,
            grid,
            above_water,
        })
    }
}
