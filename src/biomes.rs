//! Biome classification from normalized height.
//!
//! Heights are bucketed by a fixed threshold ladder, evaluated from the
//! lowest band upwards. Each band's upper bound is exclusive, so the seven
//! bands cover (0, 1) without gaps or overlap. Changing any threshold
//! changes every reference map, so they are constants rather than config.

use crate::jitter::JitterSource;

/// Smallest distance a height is kept from exactly 0.0 or 1.0.
pub const HEIGHT_EPSILON: f64 = 1e-6;

/// Upper bounds (exclusive) of each band, in ladder order.
pub const DEEP_SEA_MAX: f64 = 0.55;
pub const SHORE_MAX: f64 = 0.57;
pub const BEACH_MAX: f64 = 0.59;
pub const GRASSLAND_MAX: f64 = 0.80;
pub const WOODLAND_MAX: f64 = 0.90;
pub const MOUNTAIN_MAX: f64 = 0.99999;

/// Fixed beach colour; the only band without jitter.
pub const BEACH_COLOR: [u8; 3] = [240, 255, 140];

/// Terrain category of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Biome {
    /// Not classified (static and greyscale fills).
    #[default]
    Empty,
    DeepSea,
    Shore,
    Beach,
    Grassland,
    Woodland,
    Mountain,
    Snow,
}

impl Biome {
    pub const ALL: [Biome; 8] = [
        Biome::Empty,
        Biome::DeepSea,
        Biome::Shore,
        Biome::Beach,
        Biome::Grassland,
        Biome::Woodland,
        Biome::Mountain,
        Biome::Snow,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Biome::Empty => "empty",
            Biome::DeepSea => "deep sea",
            Biome::Shore => "shore",
            Biome::Beach => "beach",
            Biome::Grassland => "grassland",
            Biome::Woodland => "woodland",
            Biome::Mountain => "mountain",
            Biome::Snow => "snow",
        }
    }

    /// Single character used by text dumps of a map.
    pub fn ascii(self) -> char {
        match self {
            Biome::Empty => ' ',
            Biome::DeepSea => '~',
            Biome::Shore => '-',
            Biome::Beach => '.',
            Biome::Grassland => '"',
            Biome::Woodland => 'T',
            Biome::Mountain => '^',
            Biome::Snow => '*',
        }
    }

    /// Inclusive byte range the biome's varying channel is drawn from.
    pub fn jitter_range(self) -> Option<(u8, u8)> {
        match self {
            Biome::DeepSea => Some((100, 160)),
            Biome::Shore => Some((200, 255)),
            Biome::Grassland => Some((150, 200)),
            Biome::Woodland => Some((130, 150)),
            Biome::Mountain => Some((85, 196)),
            Biome::Snow => Some((240, 255)),
            Biome::Empty | Biome::Beach => None,
        }
    }

    /// Midpoint of the biome's height band. Used for cells whose biome is
    /// decided without sampling a height.
    pub fn representative_height(self) -> f64 {
        match self {
            Biome::Empty => HEIGHT_EPSILON,
            Biome::DeepSea => DEEP_SEA_MAX / 2.0,
            Biome::Shore => (DEEP_SEA_MAX + SHORE_MAX) / 2.0,
            Biome::Beach => (SHORE_MAX + BEACH_MAX) / 2.0,
            Biome::Grassland => (BEACH_MAX + GRASSLAND_MAX) / 2.0,
            Biome::Woodland => (GRASSLAND_MAX + WOODLAND_MAX) / 2.0,
            Biome::Mountain => (WOODLAND_MAX + MOUNTAIN_MAX) / 2.0,
            Biome::Snow => (MOUNTAIN_MAX + 1.0) / 2.0,
        }
    }
}

impl std::fmt::Display for Biome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Move a height that sits exactly on 0.0 or 1.0 inward by [`HEIGHT_EPSILON`].
pub fn nudge(height: f64) -> f64 {
    if height <= 0.0 {
        HEIGHT_EPSILON
    } else if height >= 1.0 {
        1.0 - HEIGHT_EPSILON
    } else {
        height
    }
}

/// Classify a normalized height. First matching band wins.
pub fn classify(height: f64) -> Biome {
    if height < DEEP_SEA_MAX {
        Biome::DeepSea
    } else if height < SHORE_MAX {
        Biome::Shore
    } else if height < BEACH_MAX {
        Biome::Beach
    } else if height < GRASSLAND_MAX {
        Biome::Grassland
    } else if height < WOODLAND_MAX {
        Biome::Woodland
    } else if height < MOUNTAIN_MAX {
        Biome::Mountain
    } else {
        Biome::Snow
    }
}

/// Colour of a cell of `biome`, drawing at most one jitter byte.
///
/// Mountain and snow are grey: one shared sample fills all three channels.
pub fn color_for(biome: Biome, jitter: &mut impl JitterSource) -> [u8; 3] {
    match biome {
        Biome::Empty => [0, 0, 0],
        Biome::DeepSea | Biome::Shore => [0, 0, jitter.draw(biome)],
        Biome::Beach => BEACH_COLOR,
        Biome::Grassland | Biome::Woodland => [0, jitter.draw(biome), 0],
        Biome::Mountain | Biome::Snow => {
            let v = jitter.draw(biome);
            [v, v, v]
        }
    }
}
