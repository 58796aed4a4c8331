//! Coherent noise sampled into normalized heights.

use noise::{NoiseFn, Perlin, Seedable};

/// Anything that can produce a normalized height for a 2D coordinate.
///
/// Implementations must be deterministic: the same input always yields the
/// same value.
pub trait HeightSource {
    /// Height at (x, y), in [0, 1].
    fn sample(&self, x: f64, y: f64) -> f64;

    /// Switch to a new seed. Sources without a seed ignore this.
    fn reseed(&mut self, _seed: u64) {}
}

/// Perlin noise rescaled from [-1, 1] into [0, 1].
///
/// Sampled on the plane z = `depth` of 3D noise.
#[derive(Clone, Debug)]
pub struct PerlinSource {
    noise: Perlin,
    depth: f64,
}

impl PerlinSource {
    pub const DEFAULT_DEPTH: f64 = 0.5;

    /// Perlin takes a 32-bit seed; the upper half of `seed` is dropped.
    pub fn new(seed: u64) -> Self {
        Self {
            noise: Perlin::new(seed as u32),
            depth: Self::DEFAULT_DEPTH,
        }
    }

    pub fn seed(&self) -> u32 {
        self.noise.seed()
    }

    /// Raw noise value, nominally in [-1, 1].
    pub fn raw(&self, x: f64, y: f64) -> f64 {
        self.noise.get([x, y, self.depth])
    }
}

impl HeightSource for PerlinSource {
    fn sample(&self, x: f64, y: f64) -> f64 {
        normalize(self.raw(x, y))
    }

    /// Only the permutation table is rebuilt.
    fn reseed(&mut self, seed: u64) {
        self.noise = Perlin::new(seed as u32);
    }
}

/// Map a [-1, 1] noise value into [0, 1].
pub fn normalize(raw: f64) -> f64 {
    (raw / 2.0 + 0.5).clamp(0.0, 1.0)
}
