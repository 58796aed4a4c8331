//! Error types for map generation, rendering and export.

use thiserror::Error;

/// Everything that can go wrong while setting up or exporting a map.
///
/// Generation, classification and viewport changes never fail; they clamp or
/// ignore bad input instead. Only resource acquisition ends up here.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimension { width: i64, height: i64 },

    #[error("failed to allocate {what} of {width}x{height} cells")]
    AllocationFailure {
        what: &'static str,
        width: usize,
        height: usize,
    },

    #[error("render target unavailable: {0}")]
    RenderTargetFailure(String),

    #[error("image export failed: {0}")]
    Export(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl MapError {
    /// Process exit code for this error. Window/renderer failures and memory
    /// failures get distinct codes.
    pub fn exit_code(&self) -> u8 {
        match self {
            MapError::RenderTargetFailure(_) => 2,
            MapError::AllocationFailure { .. } => 3,
            MapError::InvalidDimension { .. } => 4,
            MapError::Export(_) | MapError::Io(_) | MapError::Config(_) => 1,
        }
    }
}

impl From<minifb::Error> for MapError {
    fn from(err: minifb::Error) -> Self {
        MapError::RenderTargetFailure(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MapError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_are_distinct() {
        let render = MapError::RenderTargetFailure("no display".into());
        let alloc = MapError::AllocationFailure { what: "grid", width: 10, height: 10 };
        assert_ne!(render.exit_code(), alloc.exit_code());
        assert_ne!(render.exit_code(), 0);
        assert_ne!(alloc.exit_code(), 0);
    }

    #[test]
    fn test_messages_are_readable() {
        let err = MapError::InvalidDimension { width: 0, height: -3 };
        assert_eq!(
            err.to_string(),
            "invalid grid dimensions 0x-3: both must be positive"
        );
    }
}
