//! Random colour jitter.
//!
//! Adjacent cells of the same biome would otherwise share one flat colour,
//! so each biome draws its varying channel from a small byte range. Two
//! strategies are provided:
//!
//! - [`Palette`]: one seeded generator per biome, advanced every draw. The
//!   result depends on the order cells are visited (row-major, x innermost).
//! - [`CoordinateJitter`]: each draw is hashed from (seed, x, y, biome), so
//!   a cell's colour is independent of visiting order and of other cells.

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::biomes::Biome;

/// Source of jitter bytes for a biome's varying channel.
pub trait JitterSource {
    /// Next byte for `biome`, inside `biome.jitter_range()`.
    /// Biomes without a range return 0.
    fn draw(&mut self, biome: Biome) -> u8;
}

/// Which jitter strategy a generation pass uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum JitterMode {
    /// Hash of (seed, x, y); order independent, parallel friendly.
    #[default]
    Coordinate,
    /// Stateful per-biome generators consumed in row-major order.
    Sequential,
}

impl std::fmt::Display for JitterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Coordinate => write!(f, "coordinate"),
            Self::Sequential => write!(f, "sequential"),
        }
    }
}

/// Seeded uniform byte generator over an inclusive range.
#[derive(Clone, Debug)]
pub struct ColorJitter {
    lo: u8,
    hi: u8,
    rng: ChaCha8Rng,
}

impl ColorJitter {
    pub fn new(lo: u8, hi: u8, seed: u64) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        Self {
            lo,
            hi,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Full [0, 255] range, used for static fills.
    pub fn full(seed: u64) -> Self {
        Self::new(0, 255, seed)
    }

    /// Restart the whole sequence from a new seed.
    pub fn reseed(&mut self, seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
    }

    pub fn next_byte(&mut self) -> u8 {
        self.rng.gen_range(self.lo..=self.hi)
    }
}

/// One [`ColorJitter`] per jittered biome, all derived from a single seed.
#[derive(Clone, Debug)]
pub struct Palette {
    jitters: Vec<Option<ColorJitter>>,
}

impl Palette {
    pub fn new(seed: u64) -> Self {
        let jitters = Biome::ALL
            .iter()
            .map(|biome| {
                biome
                    .jitter_range()
                    .map(|(lo, hi)| ColorJitter::new(lo, hi, derive_seed(seed, biome.index() as u64)))
            })
            .collect();
        Self { jitters }
    }

    /// Reseed every biome's generator.
    pub fn reseed(&mut self, seed: u64) {
        for (biome, jitter) in Biome::ALL.iter().zip(self.jitters.iter_mut()) {
            if let Some(jitter) = jitter {
                jitter.reseed(derive_seed(seed, biome.index() as u64));
            }
        }
    }
}

impl JitterSource for Palette {
    fn draw(&mut self, biome: Biome) -> u8 {
        match &mut self.jitters[biome.index()] {
            Some(jitter) => jitter.next_byte(),
            None => 0,
        }
    }
}

/// Jitter keyed on a cell position rather than on draw order.
#[derive(Clone, Copy, Debug)]
pub struct CoordinateJitter {
    pub seed: u64,
    pub x: usize,
    pub y: usize,
}

impl CoordinateJitter {
    pub fn new(seed: u64, x: usize, y: usize) -> Self {
        Self { seed, x, y }
    }
}

impl JitterSource for CoordinateJitter {
    fn draw(&mut self, biome: Biome) -> u8 {
        let Some((lo, hi)) = biome.jitter_range() else {
            return 0;
        };
        let mut h = derive_seed(self.seed, self.x as u64);
        h = derive_seed(h, self.y as u64);
        h = derive_seed(h, biome.index() as u64);
        let span = u64::from(hi - lo) + 1;
        lo + (h % span) as u8
    }
}

/// Derive a sub-seed from a parent seed and a salt.
///
/// splitmix64 finalizer; the output must not change between releases.
pub fn derive_seed(seed: u64, salt: u64) -> u64 {
    let mut z = seed ^ salt.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_jitter_stays_in_range() {
        let mut jitter = ColorJitter::new(100, 160, 5);
        for _ in 0..1000 {
            let b = jitter.next_byte();
            assert!((100..=160).contains(&b));
        }
    }

    #[test]
    fn test_reseed_restarts_sequence() {
        let mut a = ColorJitter::full(11);
        let first: Vec<u8> = (0..16).map(|_| a.next_byte()).collect();
        a.reseed(11);
        let again: Vec<u8> = (0..16).map(|_| a.next_byte()).collect();
        assert_eq!(first, again);

        a.reseed(12);
        let other: Vec<u8> = (0..16).map(|_| a.next_byte()).collect();
        assert_ne!(first, other);
    }

    #[test]
    fn test_palette_respects_biome_ranges() {
        let mut palette = Palette::new(99);
        for biome in Biome::ALL {
            for _ in 0..200 {
                let b = palette.draw(biome);
                match biome.jitter_range() {
                    Some((lo, hi)) => assert!((lo..=hi).contains(&b), "{biome:?} drew {b}"),
                    None => assert_eq!(b, 0),
                }
            }
        }
    }

    #[test]
    fn test_palette_reseed_matches_new() {
        let mut a = Palette::new(1);
        a.draw(Biome::Grassland);
        a.reseed(2);
        let mut b = Palette::new(2);
        for _ in 0..20 {
            assert_eq!(a.draw(Biome::Snow), b.draw(Biome::Snow));
        }
    }

    #[test]
    fn test_coordinate_jitter_is_order_independent() {
        let mut first = CoordinateJitter::new(42, 10, 20);
        let a = first.draw(Biome::Mountain);
        // Drawing other cells in between changes nothing.
        for x in 0..50 {
            CoordinateJitter::new(42, x, 3).draw(Biome::Mountain);
        }
        let mut again = CoordinateJitter::new(42, 10, 20);
        assert_eq!(a, again.draw(Biome::Mountain));
        let (lo, hi) = Biome::Mountain.jitter_range().unwrap();
        assert!((lo..=hi).contains(&a));
    }

    #[test]
    fn test_derive_seed_spreads() {
        assert_ne!(derive_seed(1, 0), derive_seed(1, 1));
        assert_ne!(derive_seed(1, 0), derive_seed(2, 0));
        assert_eq!(derive_seed(123, 456), derive_seed(123, 456));
    }
}
