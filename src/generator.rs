//! Map generation passes.
//!
//! Every pass overwrites the whole grid. Available passes:
//! - biome map: noise height -> biome -> jittered colour
//! - greyscale noise: noise height shown as grey
//! - colour / greyscale static: uniform random bytes
//! - land growth: cellular automaton spreading land from sparse seeds

use clap::ValueEnum;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use crate::biomes::{self, Biome, HEIGHT_EPSILON};
use crate::error::Result;
use crate::jitter::{derive_seed, ColorJitter, CoordinateJitter, JitterMode, JitterSource, Palette};
use crate::noise_source::{HeightSource, PerlinSource};
use crate::tilemap::{checked_dimensions, Tilemap};

const STATIC_SALT: u64 = 0x5747_4154;
const AUTOMATON_SALT: u64 = 0x4C41_4E44;

/// Sea and land colours of the land-growth map.
pub const SEA_COLOR: [u8; 3] = [0, 0, 200];
pub const LAND_COLOR: [u8; 3] = [0, 200, 0];

/// One grid element. Its coordinates are its position in the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub biome: Biome,
    pub color: [u8; 3],
    /// Normalized height, strictly inside (0, 1).
    pub height: f64,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            biome: Biome::Empty,
            color: [0, 0, 0],
            height: HEIGHT_EPSILON,
        }
    }
}

impl Cell {
    fn unclassified(color: [u8; 3]) -> Self {
        Self { color, ..Self::default() }
    }

    fn of_biome(biome: Biome, color: [u8; 3]) -> Self {
        Self {
            biome,
            color,
            height: biome.representative_height(),
        }
    }
}

pub type Grid = Tilemap<Cell>;

/// Allocate a grid of empty cells.
pub fn new_grid(width: i64, height: i64) -> Result<Grid> {
    let (w, h) = checked_dimensions(width, height)?;
    Tilemap::try_new_with(w, h, Cell::default(), "grid")
}

/// How the land-growth automaton applies each iteration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AutomatonMode {
    /// Read the previous iteration, write a fresh buffer.
    #[default]
    DoubleBuffered,
    /// Read and write the same buffer. Land converted earlier in an
    /// iteration can spread again later in that iteration, so results depend
    /// on visiting order (row-major).
    InPlace,
}

/// Land-growth automaton settings.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AutomatonParams {
    /// Chance a cell starts as land.
    pub seed_chance: f64,
    /// Chance a land cell converts its 3x3 neighborhood in one iteration.
    pub spread_chance: f64,
    pub iterations: usize,
    pub mode: AutomatonMode,
}

impl Default for AutomatonParams {
    fn default() -> Self {
        Self {
            seed_chance: 4.0 / 262_145.0,
            spread_chance: 0.4,
            iterations: 150,
            mode: AutomatonMode::DoubleBuffered,
        }
    }
}

/// Classify one noise sample into a finished cell.
fn sample_cell<S: HeightSource + ?Sized>(
    source: &S,
    frequency: f64,
    x: usize,
    y: usize,
    jitter: &mut impl JitterSource,
) -> Cell {
    let height = biomes::nudge(source.sample(frequency * x as f64, frequency * y as f64));
    let biome = biomes::classify(height);
    Cell {
        biome,
        color: biomes::color_for(biome, jitter),
        height,
    }
}

/// Biome pass using stateful per-biome jitter.
///
/// Cells are visited row-major with x innermost; the colour sequence, and so
/// the output, depends on that order.
pub fn generate_sequential<S: HeightSource + ?Sized>(
    grid: &mut Grid,
    source: &S,
    frequency: f64,
    palette: &mut Palette,
) {
    for (x, y, cell) in grid.iter_mut() {
        *cell = sample_cell(source, frequency, x, y, palette);
    }
}

/// Biome pass using coordinate-hashed jitter. Rows are generated in parallel.
pub fn generate_by_coordinate<S: HeightSource + Sync + ?Sized>(
    grid: &mut Grid,
    source: &S,
    frequency: f64,
    seed: u64,
) {
    let width = grid.width;
    grid.as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, cell) in row.iter_mut().enumerate() {
                let mut jitter = CoordinateJitter::new(seed, x, y);
                *cell = sample_cell(source, frequency, x, y, &mut jitter);
            }
        });
}

/// Owns the noise source and random state shared by all passes.
#[derive(Clone, Debug)]
pub struct Generator<S = PerlinSource> {
    seed: u64,
    source: S,
    jitter_mode: JitterMode,
    palette: Palette,
    static_jitter: ColorJitter,
    automaton_rng: ChaCha8Rng,
    automaton: AutomatonParams,
}

impl Generator<PerlinSource> {
    pub fn new(seed: u64, jitter_mode: JitterMode, automaton: AutomatonParams) -> Self {
        Self::with_source(PerlinSource::new(seed), seed, jitter_mode, automaton)
    }
}

impl<S: HeightSource + Sync> Generator<S> {
    pub fn with_source(source: S, seed: u64, jitter_mode: JitterMode, automaton: AutomatonParams) -> Self {
        Self {
            seed,
            source,
            jitter_mode,
            palette: Palette::new(seed),
            static_jitter: ColorJitter::full(derive_seed(seed, STATIC_SALT)),
            automaton_rng: ChaCha8Rng::seed_from_u64(derive_seed(seed, AUTOMATON_SALT)),
            automaton,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Reseed the noise source and every random generator.
    pub fn reseed(&mut self, seed: u64) {
        self.seed = seed;
        self.source.reseed(seed);
        self.palette.reseed(seed);
        self.static_jitter.reseed(derive_seed(seed, STATIC_SALT));
        self.automaton_rng = ChaCha8Rng::seed_from_u64(derive_seed(seed, AUTOMATON_SALT));
    }

    /// Noise biome map. The same seed and frequency always give the same map.
    pub fn fill_biome_map(&mut self, grid: &mut Grid, frequency: f64) {
        debug!(frequency, mode = %self.jitter_mode, "generating biome map");
        match self.jitter_mode {
            JitterMode::Coordinate => generate_by_coordinate(grid, &self.source, frequency, self.seed),
            JitterMode::Sequential => {
                self.palette.reseed(self.seed);
                generate_sequential(grid, &self.source, frequency, &mut self.palette);
            }
        }
    }

    /// Noise height as grey, without classification.
    pub fn fill_greyscale_noise(&self, grid: &mut Grid, frequency: f64) {
        let source = &self.source;
        let width = grid.width;
        grid.as_mut_slice()
            .par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| {
                for (x, cell) in row.iter_mut().enumerate() {
                    let raw = source.sample(frequency * x as f64, frequency * y as f64);
                    let grey = (raw * 255.0) as u8;
                    *cell = Cell {
                        biome: Biome::Empty,
                        color: [grey, grey, grey],
                        height: biomes::nudge(raw),
                    };
                }
            });
    }

    /// Independent random red, green and blue per cell.
    pub fn fill_color_static(&mut self, grid: &mut Grid) {
        for (_, _, cell) in grid.iter_mut() {
            let r = self.static_jitter.next_byte();
            let g = self.static_jitter.next_byte();
            let b = self.static_jitter.next_byte();
            *cell = Cell::unclassified([r, g, b]);
        }
    }

    /// One random grey byte per cell.
    pub fn fill_static(&mut self, grid: &mut Grid) {
        for (_, _, cell) in grid.iter_mut() {
            let v = self.static_jitter.next_byte();
            *cell = Cell::unclassified([v, v, v]);
        }
    }

    /// Land-growth map: sparse land seeds spread over a sea.
    ///
    /// Consecutive calls continue the automaton's random stream, so each call
    /// draws a new map.
    pub fn grow_land(&mut self, grid: &mut Grid) -> Result<()> {
        let params = self.automaton.clone();
        let mut land = Tilemap::try_new_with(grid.width, grid.height, false, "land mask")?;

        for (_, _, cell) in land.iter_mut() {
            *cell = self.automaton_rng.gen_bool(params.seed_chance);
        }
        debug!(
            seeds = land.as_slice().iter().filter(|&&l| l).count(),
            iterations = params.iterations,
            mode = ?params.mode,
            "growing land"
        );

        match params.mode {
            AutomatonMode::DoubleBuffered => {
                let mut next = land.clone();
                for _ in 0..params.iterations {
                    next.copy_from(&land);
                    spread_land(&land, &mut next, params.spread_chance, &mut self.automaton_rng);
                    std::mem::swap(&mut land, &mut next);
                }
            }
            AutomatonMode::InPlace => {
                for _ in 0..params.iterations {
                    spread_land_in_place(&mut land, params.spread_chance, &mut self.automaton_rng);
                }
            }
        }

        for (x, y, cell) in grid.iter_mut() {
            *cell = if *land.get(x, y) {
                Cell::of_biome(Biome::Grassland, LAND_COLOR)
            } else {
                Cell::of_biome(Biome::DeepSea, SEA_COLOR)
            };
        }
        Ok(())
    }
}

/// Set the 3x3 block centred on (x, y). Caller guarantees (x, y) is interior.
fn convert_neighborhood(map: &mut Tilemap<bool>, x: usize, y: usize) {
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            map.set(nx, ny, true);
        }
    }
}

/// One automaton iteration reading `current` and writing `next`.
/// Border cells never spread.
fn spread_land(current: &Tilemap<bool>, next: &mut Tilemap<bool>, chance: f64, rng: &mut impl Rng) {
    if current.width < 3 || current.height < 3 {
        return;
    }
    for y in 1..current.height - 1 {
        for x in 1..current.width - 1 {
            if *current.get(x, y) && rng.gen_bool(chance) {
                convert_neighborhood(next, x, y);
            }
        }
    }
}

/// One automaton iteration reading and writing the same buffer.
fn spread_land_in_place(map: &mut Tilemap<bool>, chance: f64, rng: &mut impl Rng) {
    if map.width < 3 || map.height < 3 {
        return;
    }
    for y in 1..map.height - 1 {
        for x in 1..map.width - 1 {
            if *map.get(x, y) && rng.gen_bool(chance) {
                convert_neighborhood(map, x, y);
            }
        }
    }
}
