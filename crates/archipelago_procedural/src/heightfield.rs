//! # Island Height Fields
//!
//! Each island is a square grid of `(grid + 1)^2` vertices centered on the
//! origin of its own local frame. Heights come from three fBm bands plus a
//! ridge term, shaped by the biome and pulled down to sea level toward the
//! border so every island ends in a closed coastline.
//!
//! ## Shaping Pipeline (per vertex)
//!
//! ```text
//! t      = max(|u|, |v|)                      u, v in [-1, 1]
//! mask   = (1 - smoothstep(0, 1, t))^edge_power
//! shape  = bands * height_mul + ridge * ridge_weight * ridge_mul
//! h      = shape * height_scale * mask + base_lift * mask
//! h      = village plateau blend          (village only)
//! h      = coastal shelf pull toward sea
//! h      = rim blend, exactly sea at t = 1
//! ```
//!
//! The field is rebuilt wholesale and never patched in place.

use bytemuck::{Pod, Zeroable};

use archipelago_shared::{Vec2, Vec3};

use crate::biome::{BiomeShapingParams, BiomeTag};
use crate::config::{TerrainConfig, MAX_GRID};
use crate::error::{WorldGenError, WorldGenResult};
use crate::noise::{lerp, smoothstep, FbmParams, NoiseField, WorldSeed};
use crate::sampler::TerrainSampler;

/// Seed offsets of the noise bands. Distinct so bands are uncorrelated.
const BIG_BAND: i32 = 0;
const MID_BAND: i32 = 1013;
const SMALL_BAND: i32 = 2029;
const MOISTURE_BAND: i32 = 4099;

/// One terrain vertex as uploaded to the GPU.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct TerrainVertex {
    /// Island-local position.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
    /// Moisture in [0, 1].
    pub moisture: f32,
}

impl TerrainVertex {
    /// Position as a vector.
    #[inline]
    #[must_use]
    pub const fn pos(&self) -> Vec3 {
        Vec3::from_array(self.position)
    }

    /// Normal as a vector.
    #[inline]
    #[must_use]
    pub const fn norm(&self) -> Vec3 {
        Vec3::from_array(self.normal)
    }
}

/// A finished island terrain grid.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightField {
    grid: u32,
    spacing: f32,
    half: f32,
    vertices: Vec<TerrainVertex>,
    indices: Vec<u32>,
}

/// Noise fields and tuning for one build.
struct Synth<'a> {
    terrain: &'a TerrainConfig,
    shaping: BiomeShapingParams,
    village: bool,
    big: NoiseField,
    mid: NoiseField,
    small: NoiseField,
    moisture: NoiseField,
    octaves: FbmParams,
    /// Maps raw fBm output onto [0, 1].
    norm: f32,
}

impl Synth<'_> {
    /// Normalized fBm in [0, 1].
    #[inline]
    fn band(&self, field: NoiseField, x: f32, z: f32, frequency: f32) -> f32 {
        field.fbm(x * frequency, z * frequency, &self.octaves) * self.norm
    }

    /// Elevation and moisture at local point `(x, z)` with edge parameter `t`.
    fn sample(&self, x: f32, z: f32, t: f32) -> (f32, f32) {
        let cfg = self.terrain;
        let sea = cfg.sea_level;

        let mask = (1.0 - smoothstep(0.0, 1.0, t)).powf(cfg.edge_power);

        let big = self.band(self.big, x, z, cfg.big_frequency);
        let mid = self.band(self.mid, x, z, cfg.mid_frequency);
        let small = self.band(self.small, x, z, cfg.small_frequency);
        let ridge = (1.0 - (2.0 * mid - 1.0).abs()).powi(2);

        let bands = big * 0.7 + (mid - 0.5) * 0.3 + (small - 0.5) * 0.12;
        let shape = bands * self.shaping.height_mul
            + ridge * cfg.ridge_weight * self.shaping.ridge_mul;

        let mut h = shape * cfg.height_scale * mask + self.shaping.base_lift * mask;

        if self.village {
            let plateau = sea + cfg.village_flat_height;
            let radius = cfg.village_flat_radius;
            let inside = 1.0 - smoothstep(radius * 0.6, radius, t);
            h = lerp(h, plateau, inside * cfg.village_flat_strength);
        }

        let coast = smoothstep(cfg.coast_start, 1.0, t) * cfg.coast_strength;
        h = lerp(h, sea, coast);

        // Written out so t = 1 lands on sea level bit-exactly
        let rim = smoothstep(cfg.rim_start, 1.0, t);
        h = h * (1.0 - rim) + sea * rim;

        let mut m = self.band(self.moisture, x, z, cfg.moisture_frequency);
        let relief = (cfg.height_scale * 1.5).max(f32::EPSILON);
        let altitude = ((h - sea) / relief).clamp(0.0, 1.0);
        m *= 1.0 - altitude * cfg.moisture_altitude_damping;
        m *= self.shaping.moisture_mul;

        (h, m.clamp(0.0, 1.0))
    }
}

impl HeightField {
    /// Synthesizes the terrain of one island.
    ///
    /// # Errors
    ///
    /// Returns [`WorldGenError::InvalidGrid`] for a zero grid or one above
    /// [`MAX_GRID`], and [`WorldGenError::InvalidSpacing`] for a
    /// non-positive spacing.
    pub fn build(
        terrain: &TerrainConfig,
        seed: WorldSeed,
        biome: BiomeTag,
    ) -> WorldGenResult<Self> {
        if terrain.grid == 0 || terrain.grid > MAX_GRID {
            return Err(WorldGenError::InvalidGrid(terrain.grid));
        }
        if !(terrain.spacing.is_finite() && terrain.spacing > 0.0) {
            return Err(WorldGenError::InvalidSpacing(terrain.spacing));
        }

        let grid = terrain.grid;
        let half = terrain.half_extent();
        let row = grid as usize + 1;

        let amplitude_sum = terrain.octaves.amplitude_sum();
        let base = NoiseField::new(seed);
        let synth = Synth {
            terrain,
            shaping: biome.profile().shaping,
            village: biome.has_houses(),
            big: base.band(BIG_BAND),
            mid: base.band(MID_BAND),
            small: base.band(SMALL_BAND),
            moisture: base.band(MOISTURE_BAND),
            octaves: terrain.octaves,
            norm: if amplitude_sum > 0.0 { 1.0 / amplitude_sum } else { 0.0 },
        };

        let mut vertices = Vec::with_capacity(row * row);
        for iz in 0..=grid {
            let v = iz as f32 / grid as f32 * 2.0 - 1.0;
            for ix in 0..=grid {
                let u = ix as f32 / grid as f32 * 2.0 - 1.0;
                let x = u * half;
                let z = v * half;
                let t = u.abs().max(v.abs()).clamp(0.0, 1.0);

                let (h, m) = synth.sample(x, z, t);
                vertices.push(TerrainVertex {
                    position: [x, h, z],
                    normal: Vec3::Y.to_array(),
                    moisture: m,
                });
            }
        }

        let mut field = Self {
            grid,
            spacing: terrain.spacing,
            half,
            vertices,
            indices: build_indices(grid),
        };
        field.recompute_normals();
        Ok(field)
    }

    /// Quads per side.
    #[inline]
    #[must_use]
    pub const fn grid_size(&self) -> u32 {
        self.grid
    }

    /// Distance between neighbouring vertices.
    #[inline]
    #[must_use]
    pub const fn spacing(&self) -> f32 {
        self.spacing
    }

    /// Vertex buffer, row-major by Z then X.
    #[inline]
    #[must_use]
    pub fn vertices(&self) -> &[TerrainVertex] {
        &self.vertices
    }

    /// Triangle list, `grid^2 * 6` indices.
    #[inline]
    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Vertex buffer as raw bytes for upload.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer as raw bytes for upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Vertex at grid coordinates.
    #[inline]
    #[must_use]
    pub fn vertex(&self, ix: u32, iz: u32) -> Option<&TerrainVertex> {
        if ix > self.grid || iz > self.grid {
            return None;
        }
        self.vertices.get(self.index_of(ix as usize, iz as usize))
    }

    /// Lowest and highest vertex elevation.
    #[must_use]
    pub fn height_range(&self) -> (f32, f32) {
        self.vertices
            .iter()
            .map(|v| v.position[1])
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), h| {
                (lo.min(h), hi.max(h))
            })
    }

    /// Rebuilds every normal from the current positions.
    ///
    /// Each vertex gets the sum of the unnormalized face normals of its
    /// triangles, so larger faces weigh more, then is normalized.
    pub fn recompute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let (ia, ib, ic) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let a = self.vertices[ia].pos();
            let b = self.vertices[ib].pos();
            let c = self.vertices[ic].pos();
            let face = (b - a).cross(c - a);
            acc[ia] += face;
            acc[ib] += face;
            acc[ic] += face;
        }

        for (vertex, n) in self.vertices.iter_mut().zip(acc) {
            vertex.normal = n.normalize_or_up().to_array();
        }
    }

    #[inline]
    fn index_of(&self, ix: usize, iz: usize) -> usize {
        iz * (self.grid as usize + 1) + ix
    }

    /// Continuous grid coordinate of a local position, clamped to the grid.
    #[inline]
    fn grid_coord(&self, local: f32) -> f32 {
        ((local + self.half) / self.spacing).clamp(0.0, self.grid as f32)
    }

    /// Lower cell index and fraction along one axis.
    #[inline]
    fn cell(&self, local: f32) -> (usize, f32) {
        let g = self.grid_coord(local);
        let i = (g.floor() as usize).min(self.grid as usize - 1);
        (i, g - i as f32)
    }

    #[inline]
    fn nearest(&self, x: f32, z: f32) -> &TerrainVertex {
        let ix = (self.grid_coord(x).round() as usize).min(self.grid as usize);
        let iz = (self.grid_coord(z).round() as usize).min(self.grid as usize);
        &self.vertices[self.index_of(ix, iz)]
    }
}

impl TerrainSampler for HeightField {
    fn sample_height(&self, x: f32, z: f32) -> f32 {
        let (ix, fx) = self.cell(x);
        let (iz, fz) = self.cell(z);
        let h = |dx: usize, dz: usize| self.vertices[self.index_of(ix + dx, iz + dz)].position[1];
        lerp(lerp(h(0, 0), h(1, 0), fx), lerp(h(0, 1), h(1, 1), fx), fz)
    }

    fn sample_normal(&self, x: f32, z: f32) -> Vec3 {
        self.nearest(x, z).norm()
    }

    fn sample_moisture(&self, x: f32, z: f32) -> f32 {
        self.nearest(x, z).moisture
    }

    fn half_extent(&self) -> f32 {
        self.half
    }

    fn cell_size(&self) -> f32 {
        self.spacing
    }

    fn sample_count(&self) -> usize {
        self.vertices.len()
    }

    fn sample_point(&self, index: usize) -> Vec2 {
        self.vertices
            .get(index)
            .map_or(Vec2::ZERO, |v| Vec2::new(v.position[0], v.position[2]))
    }
}

/// Two upward-facing triangles per quad.
fn build_indices(grid: u32) -> Vec<u32> {
    let row = grid + 1;
    let mut indices = Vec::with_capacity(grid as usize * grid as usize * 6);
    for z in 0..grid {
        let row1 = z * row;
        let row2 = (z + 1) * row;
        for x in 0..grid {
            let i0 = row1 + x;
            let i1 = row1 + x + 1;
            let i2 = row2 + x;
            let i3 = row2 + x + 1;
            indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
        }
    }
    indices
}
