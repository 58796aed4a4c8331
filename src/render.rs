//! Software rendering: the grid is drawn once into an offscreen image, and
//! each frame copies the viewport's part of it onto the screen buffer.
//!
//! Pixels are packed `0x00RRGGBB`, the layout minifb expects.

use rayon::prelude::*;

use crate::error::{MapError, Result};
use crate::generator::Grid;
use crate::viewport::ViewRect;

/// Pack an RGB triple into a `0x00RRGGBB` pixel.
pub fn pack_rgb([r, g, b]: [u8; 3]) -> u32 {
    (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b)
}

/// Rectangle in image pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl PixelRect {
    /// Image-space rectangle covering a viewport, for cells drawn as
    /// `pixel_length`-sized squares.
    pub fn from_view(view: ViewRect, pixel_length: usize) -> Self {
        Self {
            x: view.x.max(0) as usize * pixel_length,
            y: view.y.max(0) as usize * pixel_length,
            w: view.w.max(1) as usize * pixel_length,
            h: view.h.max(1) as usize * pixel_length,
        }
    }
}

/// Offscreen pixel buffer the whole grid is drawn into.
#[derive(Clone, Debug)]
pub struct OffscreenImage {
    pub width: usize,
    pub height: usize,
    pixels: Vec<u32>,
}

impl OffscreenImage {
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(MapError::RenderTargetFailure(format!("bad offscreen size {width}x{height}")));
        }
        let alloc_err = || MapError::AllocationFailure { what: "offscreen image", width, height };
        let len = width.checked_mul(height).ok_or_else(alloc_err)?;
        let mut pixels = Vec::new();
        pixels.try_reserve_exact(len).map_err(|_| alloc_err())?;
        pixels.resize(len, 0);
        Ok(Self { width, height, pixels })
    }

    /// Offscreen image sized for `grid` at `pixel_length` pixels per cell.
    pub fn for_grid(grid: &Grid, pixel_length: usize) -> Result<Self> {
        let pl = pixel_length.max(1);
        match (grid.width.checked_mul(pl), grid.height.checked_mul(pl)) {
            (Some(w), Some(h)) => Self::try_new(w, h),
            _ => Err(MapError::AllocationFailure {
                what: "offscreen image",
                width: grid.width.saturating_mul(pl),
                height: grid.height.saturating_mul(pl),
            }),
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Fill a rectangle with a solid colour, clipped to the image.
    pub fn fill_rect(&mut self, rect: PixelRect, color: [u8; 3]) {
        let packed = pack_rgb(color);
        let x_end = (rect.x + rect.w).min(self.width);
        let y_end = (rect.y + rect.h).min(self.height);
        if rect.x >= x_end {
            return;
        }
        for y in rect.y..y_end {
            let row = y * self.width;
            self.pixels[row + rect.x..row + x_end].fill(packed);
        }
    }

    /// Draw every cell of `grid` as a `pixel_length` square.
    pub fn draw_grid(&mut self, grid: &Grid, pixel_length: usize) {
        let pl = pixel_length.max(1);
        let image_width = self.width;
        let band = image_width * pl;
        self.pixels
            .par_chunks_mut(band)
            .zip(grid.as_slice().par_chunks(grid.width))
            .for_each(|(pixels, cells)| {
                for line in pixels.chunks_mut(image_width) {
                    for (x, cell) in cells.iter().enumerate() {
                        let start = x * pl;
                        let end = (start + pl).min(line.len());
                        if start >= end {
                            break;
                        }
                        line[start..end].fill(pack_rgb(cell.color));
                    }
                }
            });
    }

    /// Copy `src` of this image onto `dst` (a `dst_w` x `dst_h` frame),
    /// scaling with nearest-neighbour sampling to fill all of `dst`.
    pub fn blit(&self, src: PixelRect, dst: &mut [u32], dst_w: usize, dst_h: usize) {
        if dst_w == 0 || dst_h == 0 || src.w == 0 || src.h == 0 {
            return;
        }
        let src_x_end = (src.x + src.w).min(self.width);
        let src_y_end = (src.y + src.h).min(self.height);
        if src.x >= src_x_end || src.y >= src_y_end {
            return;
        }
        let (sw, sh) = (src_x_end - src.x, src_y_end - src.y);

        let columns: Vec<usize> = (0..dst_w).map(|dx| src.x + dx * sw / dst_w).collect();
        dst.par_chunks_mut(dst_w)
            .take(dst_h)
            .enumerate()
            .for_each(|(dy, line)| {
                let sy = src.y + dy * sh / dst_h;
                let row = &self.pixels[sy * self.width..(sy + 1) * self.width];
                for (out, &sx) in line.iter_mut().zip(&columns) {
                    *out = row[sx];
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::Biome;
    use crate::generator::{new_grid, Cell};

    #[test]
    fn test_pack_rgb() {
        assert_eq!(pack_rgb([0x12, 0x34, 0x56]), 0x0012_3456);
    }

    #[test]
    fn test_try_new_rejects_empty() {
        assert!(matches!(OffscreenImage::try_new(0, 10), Err(MapError::RenderTargetFailure(_))));
    }

    #[test]
    fn test_oversized_image_is_allocation_failure() {
        let grid = new_grid(64, 48).unwrap();
        let result = OffscreenImage::for_grid(&grid, 1 << 20);
        assert!(matches!(
            result,
            Err(MapError::AllocationFailure { what: "offscreen image", .. })
        ));
        assert_eq!(result.unwrap_err().exit_code(), 3);

        let result = OffscreenImage::for_grid(&grid, usize::MAX / 2);
        assert!(matches!(result, Err(MapError::AllocationFailure { .. })));
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut img = OffscreenImage::try_new(4, 4).unwrap();
        img.fill_rect(PixelRect { x: 2, y: 3, w: 10, h: 10 }, [255, 0, 0]);
        assert_eq!(img.pixel(3, 3), 0x00FF_0000);
        assert_eq!(img.pixel(1, 3), 0);
        assert_eq!(img.pixel(3, 2), 0);
    }

    #[test]
    fn test_draw_grid_with_pixel_length() {
        let mut grid = new_grid(2, 2).unwrap();
        grid.set(1, 1, Cell { biome: Biome::Beach, color: [1, 2, 3], height: 0.58 });
        let mut img = OffscreenImage::for_grid(&grid, 3).unwrap();
        img.draw_grid(&grid, 3);
        assert_eq!((img.width, img.height), (6, 6));
        assert_eq!(img.pixel(3, 3), pack_rgb([1, 2, 3]));
        assert_eq!(img.pixel(5, 5), pack_rgb([1, 2, 3]));
        assert_eq!(img.pixel(2, 2), 0);
    }

    #[test]
    fn test_blit_scales_sub_rectangle() {
        let mut img = OffscreenImage::try_new(4, 4).unwrap();
        img.fill_rect(PixelRect { x: 2, y: 2, w: 2, h: 2 }, [9, 9, 9]);
        let mut frame = vec![0u32; 8 * 8];
        img.blit(PixelRect { x: 2, y: 2, w: 2, h: 2 }, &mut frame, 8, 8);
        assert!(frame.iter().all(|&p| p == pack_rgb([9, 9, 9])));

        let mut frame = vec![0u32; 4 * 4];
        img.blit(PixelRect { x: 0, y: 0, w: 4, h: 4 }, &mut frame, 4, 4);
        assert_eq!(frame, img.pixels());
    }

    #[test]
    fn test_from_view() {
        let rect = PixelRect::from_view(ViewRect { x: 3, y: 4, w: 10, h: 5 }, 2);
        assert_eq!(rect, PixelRect { x: 6, y: 8, w: 20, h: 10 });
    }
}
