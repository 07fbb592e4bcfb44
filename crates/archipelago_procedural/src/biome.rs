//! # Biome Profiles
//!
//! Each island gets exactly one biome, drawn once when the island is planned.
//! The biome decides how the terrain is shaped and which placement passes run.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{WorldGenError, WorldGenResult};

/// Biome types an island can have.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BiomeTag {
    /// Wet, hilly, dense trees
    Forest = 0,
    /// Gentle hills, sparse trees
    Grassland = 1,
    /// Tall ridged peaks, no vegetation
    Snow = 2,
    /// Low dry dunes, no vegetation
    Desert = 3,
    /// Flattened core with houses
    Village = 4,
}

impl BiomeTag {
    /// Every biome, in draw order.
    pub const ALL: [Self; 5] = [
        Self::Forest,
        Self::Grassland,
        Self::Snow,
        Self::Desert,
        Self::Village,
    ];

    /// Returns the shaping and placement profile for this biome.
    #[must_use]
    pub fn profile(self) -> &'static BiomeProfile {
        &PROFILES[self as usize]
    }

    /// Returns whether the tree pass runs on this biome.
    #[must_use]
    pub fn has_trees(self) -> bool {
        self.profile().tree_density > 0.0
    }

    /// Returns whether the house pass runs on this biome.
    #[must_use]
    pub fn has_houses(self) -> bool {
        self.profile().houses
    }

    /// Lowercase display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Forest => "forest",
            Self::Grassland => "grassland",
            Self::Snow => "snow",
            Self::Desert => "desert",
            Self::Village => "village",
        }
    }
}

impl std::fmt::Display for BiomeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Terrain-shaping multipliers for one biome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeShapingParams {
    /// Scales the big/mid/small noise bands.
    pub height_mul: f32,
    /// Scales the ridge term.
    pub ridge_mul: f32,
    /// Scales the moisture band.
    pub moisture_mul: f32,
    /// Mask-weighted lift added to the whole island, in world units.
    pub base_lift: f32,
}

/// Shaping plus placement tuning for one biome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BiomeProfile {
    /// Terrain shaping.
    pub shaping: BiomeShapingParams,
    /// Fraction of the configured tree count this biome asks for (0 = no trees).
    pub tree_density: f32,
    /// Moisture below which trees never grow.
    pub tree_min_moisture: f32,
    /// Whether houses are placed.
    pub houses: bool,
}

/// Indexed by `BiomeTag as usize`.
static PROFILES: [BiomeProfile; 5] = [
    // Forest
    BiomeProfile {
        shaping: BiomeShapingParams {
            height_mul: 1.0,
            ridge_mul: 0.8,
            moisture_mul: 1.25,
            base_lift: 3.0,
        },
        tree_density: 1.0,
        tree_min_moisture: 0.30,
        houses: false,
    },
    // Grassland
    BiomeProfile {
        shaping: BiomeShapingParams {
            height_mul: 0.75,
            ridge_mul: 0.45,
            moisture_mul: 1.05,
            base_lift: 2.6,
        },
        tree_density: 0.35,
        tree_min_moisture: 0.40,
        houses: false,
    },
    // Snow
    BiomeProfile {
        shaping: BiomeShapingParams {
            height_mul: 1.35,
            ridge_mul: 1.5,
            moisture_mul: 0.7,
            base_lift: 3.6,
        },
        tree_density: 0.0,
        tree_min_moisture: 1.0,
        houses: false,
    },
    // Desert
    BiomeProfile {
        shaping: BiomeShapingParams {
            height_mul: 0.6,
            ridge_mul: 0.3,
            moisture_mul: 0.35,
            base_lift: 2.2,
        },
        tree_density: 0.0,
        tree_min_moisture: 1.0,
        houses: false,
    },
    // Village
    BiomeProfile {
        shaping: BiomeShapingParams {
            height_mul: 0.7,
            ridge_mul: 0.35,
            moisture_mul: 1.0,
            base_lift: 2.8,
        },
        tree_density: 0.0,
        tree_min_moisture: 1.0,
        houses: true,
    },
];

/// Cumulative thresholds for the per-island biome draw.
///
/// A uniform draw `u` in [0, 1) picks the first biome whose threshold is
/// above `u`; anything past `desert` is a village.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BiomeWeights {
    /// Upper bound for forest.
    pub forest: f32,
    /// Upper bound for grassland.
    pub grassland: f32,
    /// Upper bound for snow.
    pub snow: f32,
    /// Upper bound for desert.
    pub desert: f32,
}

impl Default for BiomeWeights {
    fn default() -> Self {
        Self {
            forest: 0.28,
            grassland: 0.52,
            snow: 0.66,
            desert: 0.80,
        }
    }
}

impl BiomeWeights {
    /// Maps a uniform value in [0, 1) to a biome.
    #[must_use]
    pub fn pick(&self, u: f32) -> BiomeTag {
        if u < self.forest {
            BiomeTag::Forest
        } else if u < self.grassland {
            BiomeTag::Grassland
        } else if u < self.snow {
            BiomeTag::Snow
        } else if u < self.desert {
            BiomeTag::Desert
        } else {
            BiomeTag::Village
        }
    }

    /// Draws one biome from the stream (consumes exactly one `f32`).
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> BiomeTag {
        self.pick(rng.gen::<f32>())
    }

    /// Checks that thresholds are finite, non-decreasing and inside [0, 1].
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::InvalidConfig`] otherwise.
    pub fn validate(&self) -> WorldGenResult<()> {
        let steps = [0.0, self.forest, self.grassland, self.snow, self.desert, 1.0];
        let ordered = steps.windows(2).all(|w| w[0].is_finite() && w[0] <= w[1]);
        if ordered {
            Ok(())
        } else {
            Err(WorldGenError::InvalidConfig(format!(
                "biome thresholds must be non-decreasing in [0, 1]: {self:?}"
            )))
        }
    }
}
