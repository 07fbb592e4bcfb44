//! # World Configuration
//!
//! Every tunable of the generator, loaded once from TOML (or built in code)
//! and treated as read-only for the duration of a generation call.
//!
//! Every field has a default, so an empty file is a valid config:
//!
//! ```toml
//! seed = 1337
//! force_biome = "forest"
//!
//! [islands]
//! count = 7
//! spawn_radius = 260.0
//!
//! [terrain]
//! grid = 250
//! sea_level = 2.5
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::biome::{BiomeTag, BiomeWeights};
use crate::error::{WorldGenError, WorldGenResult};
use crate::noise::{FbmParams, WorldSeed};
use crate::scatter::ScaleRange;

/// Largest grid whose `(grid + 1)^2` vertices are addressable by `u32` indices.
pub const MAX_GRID: u32 = 65_534;

/// Top-level generator configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed used when the caller does not supply one.
    pub seed: WorldSeed,
    /// Island count and layout.
    pub islands: LayoutConfig,
    /// Height field synthesis.
    pub terrain: TerrainConfig,
    /// Biome draw thresholds.
    pub biomes: BiomeWeights,
    /// Skip the biome draw and give every island this biome.
    pub force_biome: Option<BiomeTag>,
    /// Tree pass.
    pub trees: TreeConfig,
    /// House pass (village islands).
    pub houses: HouseConfig,
    /// Lighthouse site search.
    pub lighthouse: LighthouseConfig,
    /// Collectible rings.
    pub rings: RingConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: WorldSeed::new(1337),
            islands: LayoutConfig::default(),
            terrain: TerrainConfig::default(),
            biomes: BiomeWeights::default(),
            force_biome: None,
            trees: TreeConfig::default(),
            houses: HouseConfig::default(),
            lighthouse: LighthouseConfig::default(),
            rings: RingConfig::default(),
        }
    }
}

impl WorldConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::InvalidConfig`] on parse failure, or the
    /// matching error from [`WorldConfig::validate`].
    pub fn from_toml_str(text: &str) -> WorldGenResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::Io`] if the file cannot be read, otherwise as
    /// [`WorldConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> WorldGenResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks that a generation call with this config can run.
    ///
    /// # Errors
    ///
    /// - [`WorldGenError::InvalidGrid`] for a zero grid or one above [`MAX_GRID`]
    /// - [`WorldGenError::InvalidSpacing`] for a non-positive spacing
    /// - [`WorldGenError::ImpossibleLayout`] when islands cannot be spaced at all
    /// - [`WorldGenError::InvalidConfig`] for any other out-of-range value
    pub fn validate(&self) -> WorldGenResult<()> {
        self.terrain.validate()?;
        self.islands.validate()?;
        self.biomes.validate()?;
        self.trees.validate()?;
        self.houses.validate()?;
        self.lighthouse.validate()?;
        self.rings.validate()
    }
}

/// Island count and layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Number of islands (zero is a valid, empty world).
    pub count: u32,
    /// Radius of the disc island centers are sampled from.
    pub spawn_radius: f32,
    /// Minimum distance between island centers.
    pub min_spacing: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            count: 7,
            spawn_radius: 260.0,
            min_spacing: 110.0,
        }
    }
}

impl LayoutConfig {
    fn validate(&self) -> WorldGenResult<()> {
        let impossible = WorldGenError::ImpossibleLayout {
            count: self.count,
            spawn_radius: self.spawn_radius,
            min_spacing: self.min_spacing,
        };
        if !(self.spawn_radius.is_finite() && self.spawn_radius >= 0.0) {
            return Err(impossible);
        }
        if !(self.min_spacing.is_finite() && self.min_spacing >= 0.0) {
            return Err(impossible);
        }
        // No two points of a disc are farther apart than its diameter
        if self.count >= 2 && 2.0 * self.spawn_radius < self.min_spacing {
            return Err(impossible);
        }
        Ok(())
    }
}

/// Height field synthesis parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Quads per island side; the grid has `(grid + 1)^2` vertices.
    pub grid: u32,
    /// Distance between neighbouring vertices.
    pub spacing: f32,
    /// Height of the ocean plane.
    pub sea_level: f32,
    /// Vertical scale applied to the combined noise bands.
    pub height_scale: f32,
    /// Exponent of the silhouette mask; larger values give steeper coasts.
    pub edge_power: f32,
    /// Octave settings shared by every band.
    pub octaves: FbmParams,
    /// Frequency of the continent-scale band, per world unit.
    pub big_frequency: f32,
    /// Frequency of the hill band (also drives ridges).
    pub mid_frequency: f32,
    /// Frequency of the detail band.
    pub small_frequency: f32,
    /// Weight of the ridge term before the biome multiplier.
    pub ridge_weight: f32,
    /// Frequency of the moisture band.
    pub moisture_frequency: f32,
    /// How strongly altitude dries out moisture (0 = not at all).
    pub moisture_altitude_damping: f32,
    /// Mask parameter where the coastal shelf starts pulling toward sea level.
    pub coast_start: f32,
    /// Strength of the coastal shelf pull at the very edge.
    pub coast_strength: f32,
    /// Mask parameter where the rim starts forcing sea level.
    pub rim_start: f32,
    /// Village plateau height above sea level.
    pub village_flat_height: f32,
    /// Mask parameter where the village plateau fades out.
    pub village_flat_radius: f32,
    /// Blend strength toward the plateau inside the radius.
    pub village_flat_strength: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            grid: 250,
            spacing: 0.4,
            sea_level: 2.5,
            height_scale: 12.0,
            edge_power: 0.8,
            octaves: FbmParams::default(),
            big_frequency: 0.018,
            mid_frequency: 0.05,
            small_frequency: 0.16,
            ridge_weight: 0.35,
            moisture_frequency: 0.03,
            moisture_altitude_damping: 0.6,
            coast_start: 0.6,
            coast_strength: 0.35,
            rim_start: 0.86,
            village_flat_height: 1.4,
            village_flat_radius: 0.5,
            village_flat_strength: 0.9,
        }
    }
}

impl TerrainConfig {
    /// Half the side length of an island footprint.
    #[must_use]
    pub fn half_extent(&self) -> f32 {
        self.grid as f32 * self.spacing * 0.5
    }

    fn validate(&self) -> WorldGenResult<()> {
        if self.grid == 0 || self.grid > MAX_GRID {
            return Err(WorldGenError::InvalidGrid(self.grid));
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(WorldGenError::InvalidSpacing(self.spacing));
        }
        if self.octaves.octaves == 0 {
            return Err(WorldGenError::InvalidConfig(
                "terrain.octaves.octaves must be at least 1".into(),
            ));
        }
        let finite = [
            self.sea_level,
            self.height_scale,
            self.edge_power,
            self.big_frequency,
            self.mid_frequency,
            self.small_frequency,
            self.ridge_weight,
            self.moisture_frequency,
            self.moisture_altitude_damping,
            self.village_flat_height,
            self.octaves.lacunarity,
            self.octaves.gain,
        ];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(WorldGenError::InvalidConfig(
                "terrain parameters must be finite".into(),
            ));
        }
        if self.edge_power <= 0.0 {
            return Err(WorldGenError::InvalidConfig(format!(
                "terrain.edge_power must be positive, got {}",
                self.edge_power
            )));
        }
        check_unit("terrain.coast_start", self.coast_start)?;
        check_unit("terrain.coast_strength", self.coast_strength)?;
        check_unit("terrain.rim_start", self.rim_start)?;
        check_unit("terrain.village_flat_radius", self.village_flat_radius)?;
        check_unit("terrain.village_flat_strength", self.village_flat_strength)
    }
}

/// Tree pass tuning (forest and grassland islands).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Trees wanted on a full-density (forest) island.
    pub count: u32,
    /// Trial budget per wanted tree.
    pub tries_per_instance: u32,
    /// Minimum XZ distance between two trees.
    pub min_spacing: f32,
    /// Minimum surface normal Y (1 = flat only).
    pub slope_limit: f32,
    /// Minimum height above sea level.
    pub min_height_above_sea: f32,
    /// Random offset from the picked vertex, as a fraction of the vertex spacing.
    pub jitter: f32,
    /// Uniform scale range.
    pub scale: ScaleRange,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            count: 450,
            tries_per_instance: 12,
            min_spacing: 1.4,
            slope_limit: 0.80,
            min_height_above_sea: 0.35,
            jitter: 0.45,
            scale: ScaleRange::new(0.75, 1.3),
        }
    }
}

impl TreeConfig {
    fn validate(&self) -> WorldGenResult<()> {
        check_non_negative("trees.min_spacing", self.min_spacing)?;
        check_non_negative("trees.jitter", self.jitter)?;
        check_finite("trees.slope_limit", self.slope_limit)?;
        check_finite("trees.min_height_above_sea", self.min_height_above_sea)?;
        self.scale.validate("trees.scale")
    }
}

/// House pass tuning (village islands).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HouseConfig {
    /// Houses wanted per village.
    pub count: u32,
    /// Trial budget per wanted house.
    pub tries_per_instance: u32,
    /// Minimum XZ distance between two houses.
    pub min_spacing: f32,
    /// Minimum surface normal Y.
    pub slope_limit: f32,
    /// Minimum height above sea level.
    pub min_height_above_sea: f32,
    /// Inner edge of the placement band, as a fraction of the half extent.
    pub inner_radius: f32,
    /// Outer edge of the placement band, as a fraction of the half extent.
    pub outer_radius: f32,
    /// Uniform scale range.
    pub scale: ScaleRange,
    /// Number of house models; each house gets a variant index below this.
    pub variants: u32,
}

impl Default for HouseConfig {
    fn default() -> Self {
        Self {
            count: 14,
            tries_per_instance: 25,
            min_spacing: 6.0,
            slope_limit: 0.92,
            min_height_above_sea: 0.4,
            inner_radius: 0.06,
            outer_radius: 0.42,
            scale: ScaleRange::new(0.9, 1.15),
            variants: 3,
        }
    }
}

impl HouseConfig {
    fn validate(&self) -> WorldGenResult<()> {
        check_non_negative("houses.min_spacing", self.min_spacing)?;
        check_finite("houses.slope_limit", self.slope_limit)?;
        check_finite("houses.min_height_above_sea", self.min_height_above_sea)?;
        check_band("houses", self.inner_radius, self.outer_radius)?;
        if self.variants == 0 {
            return Err(WorldGenError::InvalidConfig(
                "houses.variants must be at least 1".into(),
            ));
        }
        self.scale.validate("houses.scale")
    }
}

/// Lighthouse site search and gate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LighthouseConfig {
    /// Probability that an island gets a lighthouse.
    pub chance: f32,
    /// Uniform model scale.
    pub scale: f32,
    /// Score weight of being near the coast.
    pub edge_weight: f32,
    /// Score weight of flat ground.
    pub flat_weight: f32,
    /// Minimum height above sea level of a site.
    pub min_clearance: f32,
    /// Distance (fraction of half extent) at which edge closeness saturates.
    pub edge_radius: f32,
}

impl Default for LighthouseConfig {
    fn default() -> Self {
        Self {
            chance: 0.65,
            scale: 1.0,
            edge_weight: 0.65,
            flat_weight: 0.35,
            min_clearance: 0.3,
            edge_radius: 0.85,
        }
    }
}

impl LighthouseConfig {
    fn validate(&self) -> WorldGenResult<()> {
        check_unit("lighthouse.chance", self.chance)?;
        check_finite("lighthouse.edge_weight", self.edge_weight)?;
        check_finite("lighthouse.flat_weight", self.flat_weight)?;
        check_finite("lighthouse.min_clearance", self.min_clearance)?;
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(WorldGenError::InvalidConfig(format!(
                "lighthouse.scale must be positive, got {}",
                self.scale
            )));
        }
        if !(self.edge_radius.is_finite() && self.edge_radius > 0.0) {
            return Err(WorldGenError::InvalidConfig(format!(
                "lighthouse.edge_radius must be positive, got {}",
                self.edge_radius
            )));
        }
        Ok(())
    }
}

/// Collectible ring placement.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Rings wanted per island.
    pub count: u32,
    /// Trial budget per wanted ring.
    pub tries_per_ring: u32,
    /// Inner edge of the ring band, as a fraction of the half extent.
    pub inner_radius: f32,
    /// Outer edge of the ring band, as a fraction of the half extent.
    pub outer_radius: f32,
    /// Minimum surface normal Y under a ring.
    pub min_normal_y: f32,
    /// Minimum hover height above the ground.
    pub hover_min: f32,
    /// Random extra hover height.
    pub hover_range: f32,
    /// Tilt about the ring's local X axis, in degrees.
    pub tilt_degrees: f32,
    /// Uniform scale range.
    pub scale: ScaleRange,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            count: 6,
            tries_per_ring: 20,
            inner_radius: 0.18,
            outer_radius: 0.62,
            min_normal_y: 0.88,
            hover_min: 5.0,
            hover_range: 4.0,
            tilt_degrees: 85.0,
            scale: ScaleRange::new(0.9, 1.35),
        }
    }
}

impl RingConfig {
    fn validate(&self) -> WorldGenResult<()> {
        check_band("rings", self.inner_radius, self.outer_radius)?;
        check_finite("rings.min_normal_y", self.min_normal_y)?;
        check_finite("rings.hover_min", self.hover_min)?;
        check_non_negative("rings.hover_range", self.hover_range)?;
        check_finite("rings.tilt_degrees", self.tilt_degrees)?;
        self.scale.validate("rings.scale")
    }
}

fn check_finite(name: &str, value: f32) -> WorldGenResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(WorldGenError::InvalidConfig(format!("{name} must be finite")))
    }
}

fn check_non_negative(name: &str, value: f32) -> WorldGenResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(WorldGenError::InvalidConfig(format!(
            "{name} must be a non-negative number, got {value}"
        )))
    }
}

fn check_unit(name: &str, value: f32) -> WorldGenResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(WorldGenError::InvalidConfig(format!(
            "{name} must be in [0, 1], got {value}"
        )))
    }
}

fn check_band(name: &str, inner: f32, outer: f32) -> WorldGenResult<()> {
    check_unit(&format!("{name}.inner_radius"), inner)?;
    check_unit(&format!("{name}.outer_radius"), outer)?;
    if inner > outer {
        return Err(WorldGenError::InvalidConfig(format!(
            "{name}: inner_radius {inner} exceeds outer_radius {outer}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = WorldConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.islands.count, 7);
        assert_eq!(config.terrain.grid, 250);
        assert_eq!(config.terrain.sea_level, 2.5);
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = WorldConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let text = r#"
            seed = 42
            force_biome = "village"

            [islands]
            count = 3

            [terrain]
            grid = 16
            spacing = 1.0

            [houses.scale]
            min = 1.0
            max = 1.0
        "#;
        let config = WorldConfig::from_toml_str(text).expect("valid config");
        assert_eq!(config.seed, WorldSeed::new(42));
        assert_eq!(config.force_biome, Some(BiomeTag::Village));
        assert_eq!(config.islands.count, 3);
        assert_eq!(config.islands.spawn_radius, 260.0);
        assert_eq!(config.terrain.grid, 16);
        assert_eq!(config.terrain.sea_level, 2.5);
        assert_eq!(config.houses.scale, ScaleRange::new(1.0, 1.0));
        assert_eq!(config.houses.count, 14);
    }

    #[test]
    fn test_rejects_zero_grid() {
        let mut config = WorldConfig::default();
        config.terrain.grid = 0;
        assert!(matches!(config.validate(), Err(WorldGenError::InvalidGrid(0))));
    }

    #[test]
    fn test_rejects_grid_past_index_range() {
        let mut config = WorldConfig::default();
        config.terrain.grid = MAX_GRID + 1;
        assert!(matches!(
            config.validate(),
            Err(WorldGenError::InvalidGrid(g)) if g == MAX_GRID + 1
        ));

        config.terrain.grid = MAX_GRID;
        assert!(config.validate().is_ok());
        let last = (u64::from(MAX_GRID) + 1).pow(2) - 1;
        assert!(u32::try_from(last).is_ok());
    }

    #[test]
    fn test_rejects_bad_spacing() {
        for spacing in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let mut config = WorldConfig::default();
            config.terrain.spacing = spacing;
            assert!(
                matches!(config.validate(), Err(WorldGenError::InvalidSpacing(_))),
                "spacing {spacing} accepted"
            );
        }
    }

    #[test]
    fn test_rejects_impossible_layout() {
        let mut config = WorldConfig::default();
        config.islands = LayoutConfig {
            count: 5,
            spawn_radius: 10.0,
            min_spacing: 50.0,
        };
        assert!(matches!(
            config.validate(),
            Err(WorldGenError::ImpossibleLayout { count: 5, .. })
        ));

        // A single island never conflicts with anything
        config.islands.count = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tight_layout_is_allowed() {
        // Hard to pack but not provably impossible: the planner relaxes instead
        let mut config = WorldConfig::default();
        config.islands = LayoutConfig {
            count: 5,
            spawn_radius: 100.0,
            min_spacing: 200.0,
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_probability_and_ranges() {
        let mut config = WorldConfig::default();
        config.lighthouse.chance = 1.5;
        assert!(matches!(config.validate(), Err(WorldGenError::InvalidConfig(_))));

        let mut config = WorldConfig::default();
        config.trees.scale = ScaleRange::new(2.0, 1.0);
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.rings.inner_radius = 0.9;
        assert!(config.validate().is_err());

        let mut config = WorldConfig::default();
        config.houses.variants = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_error_is_config_error() {
        let err = WorldConfig::from_toml_str("islands = 3").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(_)));

        let err = WorldConfig::from_toml_str("[islands]\ncount = -1").unwrap_err();
        assert!(matches!(err, WorldGenError::InvalidConfig(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = WorldConfig::from_file("/definitely/not/here/world.toml").unwrap_err();
        assert!(matches!(err, WorldGenError::Io(_)));
    }

    #[test]
    fn test_half_extent() {
        let terrain = TerrainConfig {
            grid: 8,
            spacing: 1.0,
            ..TerrainConfig::default()
        };
        assert_eq!(terrain.half_extent(), 4.0);
    }
}
