//! # Terrain Sampling Interface
//!
//! The placement passes only see terrain through [`TerrainSampler`], so they
//! work on anything that can answer height, normal and moisture queries.
//! [`crate::heightfield::HeightField`] is the production implementation.

use archipelago_shared::{Vec2, Vec3};

/// Read-only terrain queries in island-local coordinates.
///
/// Local coordinates are centered on the island; the footprint spans
/// `[-half_extent, half_extent]` on both axes.
pub trait TerrainSampler {
    /// Terrain height at a local point.
    fn sample_height(&self, x: f32, z: f32) -> f32;

    /// Surface normal at a local point.
    fn sample_normal(&self, x: f32, z: f32) -> Vec3;

    /// Moisture in [0, 1] at a local point.
    fn sample_moisture(&self, x: f32, z: f32) -> f32;

    /// Half the side length of the footprint.
    fn half_extent(&self) -> f32;

    /// Distance between neighbouring samples.
    fn cell_size(&self) -> f32;

    /// Number of discrete samples (grid vertices).
    fn sample_count(&self) -> usize;

    /// Local XZ position of sample `index`.
    fn sample_point(&self, index: usize) -> Vec2;

    /// Everything the placement rules need about one point.
    fn probe(&self, x: f32, z: f32) -> PlacementCandidate {
        PlacementCandidate {
            local: Vec2::new(x, z),
            height: self.sample_height(x, z),
            normal: self.sample_normal(x, z),
            moisture: self.sample_moisture(x, z),
        }
    }
}

/// One rejection-sampling trial. Built, checked, and dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementCandidate {
    /// Local XZ position.
    pub local: Vec2,
    /// Terrain height.
    pub height: f32,
    /// Surface normal.
    pub normal: Vec3,
    /// Moisture.
    pub moisture: f32,
}
