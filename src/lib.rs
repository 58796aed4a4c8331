//! Noise-driven biome map generator with a pannable, zoomable viewer.
//!
//! Re-exports modules for use by binaries and tools.

pub mod app;
pub mod biomes;
pub mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod jitter;
pub mod logging;
pub mod noise_source;
pub mod render;
pub mod session;
pub mod tilemap;
pub mod viewport;
