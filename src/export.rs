//! Bitmap export of a generated grid.
//!
//! Two 32-bit RGBA images the size of the grid: a greyscale height map and
//! the biome colour map.

use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgba, RgbaImage};
use tracing::info;

use crate::error::Result;
use crate::generator::Grid;

/// Grey level for a normalized height.
pub fn height_to_grey(height: f64) -> u8 {
    (height.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Greyscale height map.
pub fn heightmap_image(grid: &Grid) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(grid.width as u32, grid.height as u32);
    for (x, y, cell) in grid.iter() {
        let v = height_to_grey(cell.height);
        img.put_pixel(x as u32, y as u32, Rgba([v, v, v, 255]));
    }
    img
}

/// Biome colour map, as displayed.
pub fn biome_image(grid: &Grid) -> RgbaImage {
    let mut img: RgbaImage = ImageBuffer::new(grid.width as u32, grid.height as u32);
    for (x, y, cell) in grid.iter() {
        let [r, g, b] = cell.color;
        img.put_pixel(x as u32, y as u32, Rgba([r, g, b, 255]));
    }
    img
}

/// Write both images into `dir` as BMP files tagged with `seed`.
/// Returns the (height map, biome map) paths.
pub fn export_maps(grid: &Grid, dir: &Path, seed: u64) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)?;
    let height_path = dir.join(format!("heightmap_{seed}.bmp"));
    let biome_path = dir.join(format!("biomes_{seed}.bmp"));

    heightmap_image(grid).save(&height_path)?;
    biome_image(grid).save(&biome_path)?;

    info!(
        heightmap = %height_path.display(),
        biomes = %biome_path.display(),
        "exported {}x{} map",
        grid.width,
        grid.height
    );
    Ok((height_path, biome_path))
}
