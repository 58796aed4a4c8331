//! Application state driven by the control loop.
//!
//! Owns the grid, the offscreen image and the viewport. Input is turned into
//! [`Action`]s and drag/scroll calls by the window layer; nothing here
//! touches the window, so the whole state machine runs headless in tests.

use tracing::{debug, error, info};

use crate::config::MapConfig;
use crate::error::Result;
use crate::export;
use crate::generator::{new_grid, Generator, Grid};
use crate::noise_source::{HeightSource, PerlinSource};
use crate::render::{OffscreenImage, PixelRect};
use crate::viewport::Viewport;

/// What fills the grid on regeneration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillMode {
    ColorStatic,
    GreyStatic,
    GreyscaleNoise,
    BiomeMap,
    LandGrowth,
}

impl FillMode {
    /// Whether the mode samples noise, and so changes with frequency.
    pub fn uses_frequency(self) -> bool {
        matches!(self, FillMode::GreyscaleNoise | FillMode::BiomeMap)
    }

    pub fn label(self) -> &'static str {
        match self {
            FillMode::ColorStatic => "colour static",
            FillMode::GreyStatic => "greyscale static",
            FillMode::GreyscaleNoise => "greyscale noise",
            FillMode::BiomeMap => "biome map",
            FillMode::LandGrowth => "land growth",
        }
    }
}

/// Discrete user commands.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Regenerate(FillMode),
    /// Draw a fresh seed and regenerate the biome map.
    NewSeed,
    FrequencyUp,
    FrequencyDown,
    Export,
    Quit,
}

pub struct Session<S = PerlinSource> {
    config: MapConfig,
    generator: Generator<S>,
    grid: Grid,
    back: Grid,
    image: OffscreenImage,
    image_stale: bool,
    viewport: Viewport,
    frequency: f64,
    mode: FillMode,
    /// Sub-cell drag distance not yet applied to the viewport.
    pan_remainder: (f64, f64),
    running: bool,
}

impl Session<PerlinSource> {
    /// Build the session and generate the first biome map.
    pub fn new(config: MapConfig) -> Result<Self> {
        let seed = config.seed.unwrap_or_else(rand::random);
        Self::with_source(config, PerlinSource::new(seed), seed)
    }
}

impl<S: HeightSource + Sync> Session<S> {
    pub fn with_source(config: MapConfig, source: S, seed: u64) -> Result<Self> {
        let config = config.validate()?;
        let grid = new_grid(config.grid_width, config.grid_height)?;
        let back = new_grid(config.grid_width, config.grid_height)?;
        let image = OffscreenImage::for_grid(&grid, config.pixel_length)?;
        let viewport = Viewport::new(
            grid.width,
            grid.height,
            config.screen_width,
            config.screen_height,
            config.zoom,
        );
        let generator = Generator::with_source(source, seed, config.jitter, config.automaton.clone());
        info!(
            seed,
            width = grid.width,
            height = grid.height,
            jitter = %config.jitter,
            "created map"
        );

        let mut session = Self {
            frequency: config.frequency,
            config,
            generator,
            grid,
            back,
            image,
            image_stale: true,
            viewport,
            mode: FillMode::BiomeMap,
            pan_remainder: (0.0, 0.0),
            running: true,
        };
        session.regenerate(FillMode::BiomeMap)?;
        Ok(session)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }

    pub fn mode(&self) -> FillMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    /// Fill the back buffer with `mode`, then swap it in. The visible grid
    /// is never partially written.
    pub fn regenerate(&mut self, mode: FillMode) -> Result<()> {
        let started = std::time::Instant::now();
        match mode {
            FillMode::ColorStatic => self.generator.fill_color_static(&mut self.back),
            FillMode::GreyStatic => self.generator.fill_static(&mut self.back),
            FillMode::GreyscaleNoise => self.generator.fill_greyscale_noise(&mut self.back, self.frequency),
            FillMode::BiomeMap => self.generator.fill_biome_map(&mut self.back, self.frequency),
            FillMode::LandGrowth => self.generator.grow_land(&mut self.back)?,
        }
        std::mem::swap(&mut self.grid, &mut self.back);
        self.mode = mode;
        self.image_stale = true;
        info!(
            mode = mode.label(),
            seed = self.seed(),
            frequency = self.frequency,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "regenerated"
        );
        Ok(())
    }

    /// Switch seeds and redraw the biome map.
    pub fn reseed(&mut self, seed: u64) -> Result<()> {
        self.generator.reseed(seed);
        self.regenerate(FillMode::BiomeMap)
    }

    /// Apply one command. Export failures are logged and do not stop the
    /// session.
    pub fn handle(&mut self, action: Action) -> Result<()> {
        debug!(?action, "handling action");
        match action {
            Action::Regenerate(mode) => self.regenerate(mode)?,
            Action::NewSeed => self.reseed(rand::random())?,
            Action::FrequencyUp => self.change_frequency(self.config.frequency_step)?,
            Action::FrequencyDown => self.change_frequency(-self.config.frequency_step)?,
            Action::Export => {
                if let Err(err) = export::export_maps(&self.grid, &self.config.export_dir, self.seed()) {
                    error!("export failed: {err}");
                }
            }
            Action::Quit => {
                info!("quit requested");
                self.running = false;
            }
        }
        Ok(())
    }

    /// Adjust frequency, keeping it positive, and redraw noise-based maps.
    fn change_frequency(&mut self, delta: f64) -> Result<()> {
        let next = self.frequency + delta;
        if next <= 0.0 {
            debug!(frequency = self.frequency, "frequency already at minimum");
            return Ok(());
        }
        self.frequency = next;
        info!(frequency = self.frequency, "frequency changed");
        if self.mode.uses_frequency() {
            self.regenerate(self.mode)?;
        }
        Ok(())
    }

    /// Pan by a mouse drag of (dx, dy) screen pixels. The map follows the
    /// cursor, so the viewport moves the opposite way.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        let (cx, cy) = self
            .viewport
            .cells_per_pixel(self.config.screen_width, self.config.screen_height);
        let total_x = self.pan_remainder.0 - f64::from(dx) * cx;
        let total_y = self.pan_remainder.1 - f64::from(dy) * cy;
        let (step_x, step_y) = (total_x.trunc(), total_y.trunc());
        self.pan_remainder = (total_x - step_x, total_y - step_y);
        if step_x != 0.0 || step_y != 0.0 {
            self.viewport.pan(step_x as i64, step_y as i64);
        }
    }

    /// Zoom by wheel notches: scrolling up shows fewer cells.
    pub fn scroll(&mut self, notches: f32) {
        if notches == 0.0 {
            return;
        }
        self.viewport.increment_zoom(-f64::from(notches) * self.config.zoom_step);
        debug!(zoom = self.viewport.zoom_factor(), rect = ?self.viewport.rect(), "zoomed");
    }

    /// Draw the visible part of the map into a screen-sized frame.
    pub fn render_frame(&mut self, frame: &mut [u32], frame_w: usize, frame_h: usize) {
        if self.image_stale {
            self.image.draw_grid(&self.grid, self.config.pixel_length);
            self.image_stale = false;
        }
        let src = PixelRect::from_view(self.viewport.rect(), self.config.pixel_length);
        self.image.blit(src, frame, frame_w, frame_h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biomes::Biome;
    use crate::jitter::JitterMode;
    use crate::render::pack_rgb;

    struct Gradient;

    impl HeightSource for Gradient {
        fn sample(&self, x: f64, _y: f64) -> f64 {
            (x / 64.0).fract()
        }
    }

    fn small_config() -> MapConfig {
        MapConfig {
            grid_width: 64,
            grid_height: 48,
            screen_width: 32,
            screen_height: 24,
            frequency: 1.0,
            frequency_step: 0.5,
            jitter: JitterMode::Sequential,
            export_dir: std::env::temp_dir().join(format!("biome_mapper_session_{}", std::process::id())),
            log_file: None,
            ..MapConfig::default()
        }
    }

    fn session() -> Session<Gradient> {
        Session::with_source(small_config(), Gradient, 5).unwrap()
    }

    #[test]
    fn test_starts_with_biome_map() {
        let s = session();
        assert_eq!(s.mode(), FillMode::BiomeMap);
        assert_eq!(s.grid().get(0, 0).biome, Biome::DeepSea);
        assert_eq!(s.grid().get(40, 10).biome, Biome::Grassland);
        assert_eq!(s.grid().get(63, 10).biome, Biome::Mountain);
        assert!(s.is_running());
    }

    #[test]
    fn test_invalid_grid_is_rejected() {
        let config = MapConfig { grid_width: 0, ..small_config() };
        assert!(Session::with_source(config, Gradient, 1).is_err());
    }

    #[test]
    fn test_regenerate_swaps_complete_grid() {
        let mut s = session();
        s.handle(Action::Regenerate(FillMode::GreyStatic)).unwrap();
        assert_eq!(s.mode(), FillMode::GreyStatic);
        assert!(s.grid().iter().all(|(_, _, c)| c.biome == Biome::Empty));
        s.handle(Action::Regenerate(FillMode::LandGrowth)).unwrap();
        assert!(s
            .grid()
            .iter()
            .all(|(_, _, c)| c.biome == Biome::DeepSea || c.biome == Biome::Grassland));
    }

    #[test]
    fn test_frequency_never_reaches_zero() {
        let mut s = session();
        s.handle(Action::FrequencyDown).unwrap();
        assert_eq!(s.frequency(), 0.5);
        s.handle(Action::FrequencyDown).unwrap();
        assert_eq!(s.frequency(), 0.5);
        s.handle(Action::FrequencyUp).unwrap();
        assert_eq!(s.frequency(), 1.0);
    }

    #[test]
    fn test_quit_stops_session() {
        let mut s = session();
        s.handle(Action::Quit).unwrap();
        assert!(!s.is_running());
    }

    #[test]
    fn test_drag_moves_against_cursor() {
        let mut s = session();
        s.viewport.set_position(10, 10);
        s.drag(4.0, -3.0);
        assert_eq!((s.viewport().x(), s.viewport().y()), (6, 13));
    }

    #[test]
    fn test_drag_accumulates_sub_cell_motion() {
        let mut s = session();
        s.viewport.zoom(0.5);
        s.viewport.set_position(10, 10);
        s.drag(-1.0, 0.0);
        assert_eq!(s.viewport().x(), 10);
        s.drag(-1.0, 0.0);
        assert_eq!(s.viewport().x(), 11);
    }

    #[test]
    fn test_scroll_up_zooms_in() {
        let mut s = session();
        let before = s.viewport().width();
        s.scroll(2.0);
        assert!(s.viewport().width() < before);
        s.scroll(-2.0);
        assert_eq!(s.viewport().width(), before);
    }

    #[test]
    fn test_render_frame_shows_viewport() {
        let mut s = session();
        let mut frame = vec![0u32; 32 * 24];
        s.render_frame(&mut frame, 32, 24);
        assert_eq!(frame[0], pack_rgb(s.grid().get(0, 0).color));
        assert_eq!(frame[31], pack_rgb(s.grid().get(31, 0).color));
    }

    #[test]
    fn test_export_action_writes_files() {
        let mut s = session();
        s.handle(Action::Export).unwrap();
        let dir = s.config().export_dir.clone();
        assert!(dir.join("heightmap_5.bmp").exists());
        assert!(dir.join("biomes_5.bmp").exists());
        std::fs::remove_dir_all(dir).unwrap();
    }
}
