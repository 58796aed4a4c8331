//! Visible sub-rectangle of the grid, with clamped pan and zoom.
//!
//! The extent is the base (screen) size times the zoom factor, so a factor
//! below 1 shows fewer cells (zoomed in) and above 1 shows more. After every
//! change the rectangle is clamped back inside the grid:
//! `0 <= x`, `0 <= y`, `x + w <= grid_w`, `y + h <= grid_h`, `w, h >= 1`.

/// Source rectangle in grid cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ViewRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    rect: ViewRect,
    base_w: i32,
    base_h: i32,
    zoom: f64,
    grid_w: i32,
    grid_h: i32,
}

fn to_i32(v: usize) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// `base * factor`, rounded and clamped into `1..=limit`.
/// Values past `i32::MAX` saturate before the cast.
fn scaled_extent(base: i32, factor: f64, limit: i32) -> i32 {
    let v = (f64::from(base) * factor).round().min(f64::from(i32::MAX));
    (v as i32).clamp(1, limit.max(1))
}

impl Viewport {
    /// A viewport at the grid origin. A non-positive or non-finite zoom
    /// falls back to 1.0.
    pub fn new(grid_w: usize, grid_h: usize, base_w: usize, base_h: usize, zoom: f64) -> Self {
        let mut viewport = Self {
            rect: ViewRect { x: 0, y: 0, w: 1, h: 1 },
            base_w: to_i32(base_w).max(1),
            base_h: to_i32(base_h).max(1),
            zoom: 1.0,
            grid_w: to_i32(grid_w).max(1),
            grid_h: to_i32(grid_h).max(1),
        };
        viewport.apply_zoom(if zoom > 0.0 && zoom.is_finite() { zoom } else { 1.0 });
        viewport
    }

    pub fn rect(&self) -> ViewRect {
        self.rect
    }

    pub fn x(&self) -> i32 {
        self.rect.x
    }

    pub fn y(&self) -> i32 {
        self.rect.y
    }

    pub fn width(&self) -> i32 {
        self.rect.w
    }

    pub fn height(&self) -> i32 {
        self.rect.h
    }

    pub fn zoom_factor(&self) -> f64 {
        self.zoom
    }

    pub fn grid_size(&self) -> (i32, i32) {
        (self.grid_w, self.grid_h)
    }

    /// Smallest factor at which the viewport already covers the whole grid.
    fn max_zoom(&self) -> f64 {
        let zx = f64::from(self.grid_w) / f64::from(self.base_w);
        let zy = f64::from(self.grid_h) / f64::from(self.base_h);
        zx.max(zy)
    }

    /// Move by (dx, dy) cells. Deltas past an edge stop at that edge.
    pub fn pan(&mut self, dx: i64, dy: i64) {
        let x = i64::from(self.rect.x) + dx;
        let y = i64::from(self.rect.y) + dy;
        self.set_position(x, y);
    }

    /// Move the top-left corner, clamped inside the grid.
    pub fn set_position(&mut self, x: i64, y: i64) {
        let max_x = i64::from(self.grid_w - self.rect.w);
        let max_y = i64::from(self.grid_h - self.rect.h);
        self.rect.x = x.clamp(0, max_x) as i32;
        self.rect.y = y.clamp(0, max_y) as i32;
    }

    /// Set an absolute zoom factor. Non-positive factors are ignored.
    pub fn zoom(&mut self, factor: f64) {
        if factor > 0.0 && factor.is_finite() {
            self.apply_zoom(factor);
        }
    }

    /// Change the zoom factor by `delta`. Ignored if the result would be
    /// negative.
    pub fn increment_zoom(&mut self, delta: f64) {
        if self.zoom + delta < 0.0 {
            return;
        }
        self.zoom(self.zoom + delta);
    }

    fn apply_zoom(&mut self, factor: f64) {
        self.zoom = factor.min(self.max_zoom());
        self.rect.w = scaled_extent(self.base_w, self.zoom, self.grid_w);
        self.rect.h = scaled_extent(self.base_h, self.zoom, self.grid_h);
        self.set_position(i64::from(self.rect.x), i64::from(self.rect.y));
    }

    /// Grid cells per screen pixel along each axis, for a screen of the
    /// given size showing this viewport.
    pub fn cells_per_pixel(&self, screen_w: usize, screen_h: usize) -> (f64, f64) {
        (
            f64::from(self.rect.w) / screen_w.max(1) as f64,
            f64::from(self.rect.h) / screen_h.max(1) as f64,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn assert_inside(v: &Viewport) {
        let r = v.rect();
        let (gw, gh) = v.grid_size();
        assert!(r.x >= 0 && r.y >= 0, "{r:?}");
        assert!(r.w > 0 && r.h > 0, "{r:?}");
        assert!(r.x + r.w <= gw && r.y + r.h <= gh, "{r:?} outside {gw}x{gh}");
    }

    #[test]
    fn test_initial_rect() {
        let v = Viewport::new(2000, 2000, 512, 512, 1.0);
        assert_eq!(v.rect(), ViewRect { x: 0, y: 0, w: 512, h: 512 });
    }

    #[test]
    fn test_pan_clamps_to_edges() {
        let mut v = Viewport::new(2000, 2000, 512, 512, 1.0);
        v.pan(-100, 0);
        assert_eq!(v.x(), 0);

        v.pan(10_000, 10_000);
        assert_eq!((v.x(), v.y()), (2000 - 512, 2000 - 512));

        v.pan(-20, -30);
        assert_eq!((v.x(), v.y()), (2000 - 532, 2000 - 542));
    }

    #[test]
    fn test_zoom_scales_base_size() {
        let mut v = Viewport::new(2000, 2000, 512, 512, 1.0);
        v.zoom(0.5);
        assert_eq!((v.width(), v.height()), (256, 256));
        v.zoom(1.25);
        assert_eq!((v.width(), v.height()), (640, 640));
    }

    #[test]
    fn test_zoom_out_past_grid_clamps() {
        let mut v = Viewport::new(2000, 1000, 512, 512, 1.0);
        v.pan(1000, 400);
        v.zoom(50.0);
        assert_eq!((v.width(), v.height()), (2000, 1000));
        assert_eq!((v.x(), v.y()), (0, 0));
        assert_inside(&v);
    }

    #[test]
    fn test_zoom_never_reaches_zero() {
        let mut v = Viewport::new(2000, 2000, 512, 512, 1.0);
        v.zoom(1e-9);
        assert_eq!((v.width(), v.height()), (1, 1));
    }

    #[test]
    fn test_non_positive_zoom_ignored() {
        let mut v = Viewport::new(2000, 2000, 512, 512, 1.0);
        v.zoom(0.5);
        let before = v.clone();
        v.zoom(0.0);
        v.zoom(-2.0);
        v.zoom(f64::NAN);
        assert_eq!(v, before);
    }

    #[test]
    fn test_increment_zoom_below_zero_is_noop() {
        let mut v = Viewport::new(2000, 2000, 512, 512, 1.0);
        v.zoom(0.5);
        let before = v.rect();
        v.increment_zoom(-0.6);
        assert_eq!(v.rect(), before);
        assert_eq!(v.zoom_factor(), 0.5);

        v.increment_zoom(0.25);
        assert_eq!(v.width(), 384);
    }

    #[test]
    fn test_overflowing_extent_saturates() {
        assert_eq!(scaled_extent(i32::MAX, 4.0, i32::MAX), i32::MAX);
        assert_eq!(scaled_extent(1000, 1e300, 700), 700);
    }

    #[test]
    fn test_invariant_after_random_operations() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let mut v = Viewport::new(2000, 2000, 512, 512, 1.0);
        for _ in 0..5000 {
            match rng.gen_range(0..3) {
                0 => v.pan(rng.gen_range(-3000..3000), rng.gen_range(-3000..3000)),
                1 => v.zoom(rng.gen_range(-1.0..6.0)),
                _ => v.increment_zoom(rng.gen_range(-0.5..0.5)),
            }
            assert_inside(&v);
        }
    }

    #[test]
    fn test_cells_per_pixel() {
        let mut v = Viewport::new(2000, 2000, 1024, 768, 1.0);
        assert_eq!(v.cells_per_pixel(1024, 768), (1.0, 1.0));
        v.zoom(0.5);
        assert_eq!(v.cells_per_pixel(1024, 768), (0.5, 0.5));
    }
}
