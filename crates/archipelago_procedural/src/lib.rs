//! # ARCHIPELAGO Procedural Generation
//!
//! Deterministic generation of a small archipelago from a single seed.
//!
//! ## Design Principles
//!
//! 1. **Deterministic**: Same seed and config always produce the same world,
//!    down to the bytes of every vertex buffer
//! 2. **Bounded**: Every rejection loop has a trial cap; running out is a
//!    reported outcome, not an error
//! 3. **Pure**: No global state; `generate` is a function of its arguments
//!
//! ## Core Components
//!
//! - `noise`: value noise, fBm, seeds and stream tags
//! - `heightfield`: island terrain grids with normals and index buffers
//! - `biome`: per-biome shaping and placement tuning
//! - `layout`: island centers by bounded rejection sampling
//! - `scatter`: the generic constrained scatterer (trees, houses)
//! - `lighthouse`, `rings`: the remaining placement passes
//! - `world`: assembly of all of the above
//!
//! ## Example
//!
//! ```rust,ignore
//! use archipelago_procedural::{generate, WorldConfig, WorldSeed};
//!
//! let config = WorldConfig::default();
//! let world = generate(WorldSeed::new(42), &config)?;
//!
//! for island in &world.islands {
//!     upload(island.field.as_bytes(), island.field.indices());
//! }
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod biome;
pub mod config;
pub mod error;
pub mod heightfield;
pub mod layout;
pub mod lighthouse;
pub mod noise;
pub mod rings;
pub mod sampler;
pub mod scatter;
pub mod world;

pub use biome::{BiomeProfile, BiomeShapingParams, BiomeTag, BiomeWeights};
pub use config::{
    HouseConfig, LayoutConfig, LighthouseConfig, RingConfig, TerrainConfig, TreeConfig, WorldConfig,
    MAX_GRID,
};
pub use error::{WorldGenError, WorldGenResult};
pub use heightfield::{HeightField, TerrainVertex};
pub use layout::{place_islands, IslandLayoutPlanner, LayoutPlan, LAYOUT_MAX_TRIES};
pub use lighthouse::Lighthouse;
pub use noise::{fbm, value_noise, FbmParams, NoiseField, WorldSeed};
pub use rings::Ring;
pub use sampler::{PlacementCandidate, TerrainSampler};
pub use scatter::{scatter, ScaleRange, ScatterOutcome, ScatterRules};
pub use world::{generate, House, Island, PassStats, PlacementStats, World};
