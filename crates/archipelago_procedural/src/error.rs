//! # World Generation Error Types
//!
//! Only structurally invalid configuration aborts a generation call.
//! Under-filled placement passes and relaxed island spacing are reported
//! on the returned values instead (see `ScatterOutcome` and `LayoutPlan`).

use thiserror::Error;

/// Errors that can occur while configuring or generating a world.
#[derive(Error, Debug)]
pub enum WorldGenError {
    /// Terrain grid has no cells, or too many vertices for `u32` indices.
    #[error("invalid terrain grid: size must be between 1 and 65534, got {0}")]
    InvalidGrid(u32),

    /// Terrain vertex spacing is not a positive finite number.
    #[error("invalid terrain spacing: must be positive and finite, got {0}")]
    InvalidSpacing(f32),

    /// Island layout cannot possibly satisfy the spacing rule.
    #[error(
        "impossible island layout: {count} islands within radius {spawn_radius} \
         cannot be {min_spacing} apart"
    )]
    ImpossibleLayout {
        /// Requested island count.
        count: u32,
        /// Spawn disc radius.
        spawn_radius: f32,
        /// Required center spacing.
        min_spacing: f32,
    },

    /// Any other out-of-range configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for WorldGenError {
    fn from(err: toml::de::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Result type for world generation operations.
pub type WorldGenResult<T> = Result<T, WorldGenError>;
