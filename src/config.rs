//! Runtime configuration.
//!
//! Defaults can be overridden by a JSON file, and the command line overrides
//! both. Every field is optional in the file.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::error::{MapError, Result};
use crate::generator::AutomatonParams;
use crate::jitter::JitterMode;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// Grid size in cells. Signed so bad input reaches validation.
    pub grid_width: i64,
    pub grid_height: i64,

    /// Window size in pixels; also the viewport's size at zoom 1.
    pub screen_width: usize,
    pub screen_height: usize,

    /// Side of the square each cell is drawn as in the offscreen image.
    pub pixel_length: usize,

    pub zoom: f64,
    /// Zoom change per wheel notch.
    pub zoom_step: f64,

    /// Random seed; a fresh one is drawn when absent.
    pub seed: Option<u64>,

    pub frequency: f64,
    pub frequency_step: f64,

    pub jitter: JitterMode,
    pub automaton: AutomatonParams,

    pub export_dir: PathBuf,

    pub log_level: String,
    /// Log file written alongside the console; `None` disables it.
    pub log_file: Option<PathBuf>,

    pub target_fps: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid_width: 2000,
            grid_height: 2000,
            screen_width: 1024,
            screen_height: 768,
            pixel_length: 1,
            zoom: 1.0,
            zoom_step: 0.05,
            seed: None,
            frequency: 0.005,
            frequency_step: 0.001,
            jitter: JitterMode::default(),
            automaton: AutomatonParams::default(),
            export_dir: PathBuf::from("."),
            log_level: "info".to_string(),
            log_file: Some(PathBuf::from("generate.log")),
            target_fps: 60,
        }
    }
}

impl MapConfig {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reject sizes nothing can be built from and pull soft settings back
    /// into range.
    pub fn validate(mut self) -> Result<Self> {
        if self.grid_width <= 0 || self.grid_height <= 0 {
            return Err(MapError::InvalidDimension {
                width: self.grid_width,
                height: self.grid_height,
            });
        }
        if self.screen_width == 0 || self.screen_height == 0 {
            return Err(MapError::InvalidDimension {
                width: self.screen_width as i64,
                height: self.screen_height as i64,
            });
        }
        if !(self.frequency_step > 0.0) {
            warn!(step = self.frequency_step, "frequency step must be positive, using 0.001");
            self.frequency_step = 0.001;
        }
        if !(self.frequency > 0.0) {
            warn!(frequency = self.frequency, "frequency must be positive, using the step size");
            self.frequency = self.frequency_step;
        }
        if !(self.zoom > 0.0) {
            self.zoom = 1.0;
        }
        self.pixel_length = self.pixel_length.max(1);
        self.automaton.seed_chance = clamp_probability(self.automaton.seed_chance);
        self.automaton.spread_chance = clamp_probability(self.automaton.spread_chance);
        Ok(self)
    }
}

fn clamp_probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
