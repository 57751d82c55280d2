// Seeded 2D simplex noise and fractal (octave) accumulation.
//
// `NoiseField` is a classic 2D simplex lattice (skewed triangular cells, 12
// gradient directions, radial falloff `(0.5 - r²)^4`) whose permutation table
// is a Fisher–Yates shuffle drawn from the run's `LevelRng`. Once built, the
// field is a pure function of its coordinates: it holds no mutable state and
// can be shared freely.
//
// `NoiseField::fractal` sums octaves with amplitude decaying by `persistence`
// and frequency growing by `lacunarity`, normalized by the total amplitude so
// the result stays in roughly [-1, 1] regardless of octave count.
//
// See also: `heightmap.rs`, the only consumer, which remaps fractal output to
// [0, 1] elevation.
//
// **Critical constraint: determinism.** Lattice hashing uses integer
// arithmetic on the permutation table; floating-point work is limited to
// basic arithmetic, so identical seeds give bit-identical samples.

use tidemark_prng::LevelRng;

/// Skew factor: `(sqrt(3) - 1) / 2`.
const F2: f64 = 0.366_025_403_784_438_6;
/// Unskew factor: `(3 - sqrt(3)) / 6`.
const G2: f64 = 0.211_324_865_405_187_1;

/// Output scale that brings the summed corner contributions to about ±1.
const SIMPLEX_SCALE: f64 = 70.0;

const GRADIENTS: [(f64, f64); 12] = [
    (1.0, 1.0),
    (-1.0, 1.0),
    (1.0, -1.0),
    (-1.0, -1.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (1.0, 0.0),
    (-1.0, 0.0),
    (0.0, 1.0),
    (0.0, -1.0),
    (0.0, 1.0),
    (0.0, -1.0),
];

/// Octave settings for fractal accumulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractalParams {
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl Default for FractalParams {
    fn default() -> Self {
        Self {
            octaves: 8,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

/// Seeded 2D simplex noise.
#[derive(Clone)]
pub struct NoiseField {
    /// Permutation of 0..=255, repeated once so lookups never wrap.
    perm: [u8; 512],
}

impl NoiseField {
    /// Build a field whose lattice is shuffled by `rng`. Consumes exactly 255
    /// draws from the stream.
    pub fn new(rng: &mut LevelRng) -> Self {
        let mut table: [u8; 256] = std::array::from_fn(|i| i as u8);
        rng.shuffle(&mut table);
        let mut perm = [0u8; 512];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = table[i & 255];
        }
        Self { perm }
    }

    fn hash(&self, i: usize, j: usize) -> usize {
        self.perm[i + self.perm[j] as usize] as usize % GRADIENTS.len()
    }

    /// Single-octave simplex noise at `(x, y)`, approximately in [-1, 1].
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let s = (x + y) * F2;
        let i = (x + s).floor();
        let j = (y + s).floor();
        let t = (i + j) * G2;
        let x0 = x - (i - t);
        let y0 = y - (j - t);

        // Which of the two triangles in the skewed cell we are in.
        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f64 + G2;
        let y1 = y0 - j1 as f64 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let ii = (i as i64 & 255) as usize;
        let jj = (j as i64 & 255) as usize;
        let g0 = self.hash(ii, jj);
        let g1 = self.hash(ii + i1, jj + j1);
        let g2 = self.hash(ii + 1, jj + 1);

        let n0 = corner(g0, x0, y0);
        let n1 = corner(g1, x1, y1);
        let n2 = corner(g2, x2, y2);

        SIMPLEX_SCALE * (n0 + n1 + n2)
    }

    /// Octave-summed noise normalized by total amplitude, in about [-1, 1].
    pub fn fractal(&self, x: f64, y: f64, params: FractalParams) -> f64 {
        let mut amplitude = 1.0;
        let mut frequency = 1.0;
        let mut sum = 0.0;
        let mut total_amplitude = 0.0;
        for _ in 0..params.octaves {
            sum += self.sample(x * frequency, y * frequency) * amplitude;
            total_amplitude += amplitude;
            amplitude *= params.persistence;
            frequency *= params.lacunarity;
        }
        if total_amplitude > 0.0 {
            sum / total_amplitude
        } else {
            0.0
        }
    }
}

fn corner(gradient: usize, x: f64, y: f64) -> f64 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let (gx, gy) = GRADIENTS[gradient];
        let t2 = t * t;
        t2 * t2 * (gx * x + gy * y)
    }
}
