//! # Value Noise Implementation
//!
//! Deterministic lattice value noise and fractal Brownian motion.
//!
//! ## Why value noise?
//!
//! - One integer hash per lattice corner, no gradient tables
//! - Output is already in [0, 1], which is what height masks and
//!   moisture rules want
//! - Smoothstep easing keeps it C1 across lattice lines (no grid seams)
//!
//! ## Determinism Guarantee
//!
//! Every function here is a pure function of its arguments. Integer
//! arithmetic wraps explicitly, so results do not depend on build profile.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use archipelago_shared::{LCG_INCREMENT, LCG_MULTIPLIER};

/// Seed offset between consecutive fBm octaves.
pub const OCTAVE_SEED_STRIDE: i32 = 101;

/// Stream tag of the shared world stream (island layout, then biome draws).
pub const STREAM_WORLD: u64 = 0x574F_524C_44;
/// Stream tag of an island's tree pass.
pub const STREAM_TREES: u64 = 0x5452_4545;
/// Stream tag of an island's house pass.
pub const STREAM_HOUSES: u64 = 0x484F_5553;
/// Stream tag of an island's lighthouse gate.
pub const STREAM_LIGHTHOUSE: u64 = 0x4C49_4748;
/// Stream tag of an island's ring pass.
pub const STREAM_RINGS: u64 = 0x5249_4E47;

/// World seed for deterministic generation.
///
/// All procedural generation derives from this seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldSeed(u32);

impl WorldSeed {
    /// Creates a new world seed.
    #[inline]
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self(seed)
    }

    /// Returns the raw seed value.
    #[inline]
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The seed reinterpreted for the signed noise hash.
    #[inline]
    #[must_use]
    pub const fn noise_seed(self) -> i32 {
        self.0 as i32
    }

    /// Advances the seed one LCG step (`seed * 1664525 + 1013904223`).
    ///
    /// This is how "regenerate" picks the next world.
    #[inline]
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT))
    }

    /// Seed of the `index`-th member of a family (`seed + index * stride`).
    #[inline]
    #[must_use]
    pub const fn offset(self, index: u32, stride: u32) -> Self {
        Self(self.0.wrapping_add(index.wrapping_mul(stride)))
    }

    /// Mixes the seed with a purpose tag into 64 bits.
    ///
    /// Different tags give independent streams from one seed.
    #[inline]
    #[must_use]
    pub const fn mix(self, purpose: u64) -> u64 {
        let mut hash = self.0 as u64;
        hash ^= purpose;
        hash = hash.wrapping_mul(0x517c_c1b7_2722_0a95);
        hash ^= hash >> 32;
        hash
    }

    /// Opens a fresh random stream seeded from this seed and a purpose tag.
    #[must_use]
    pub fn stream(self, purpose: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(self.mix(purpose))
    }
}

impl From<u32> for WorldSeed {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Hashes an integer lattice point and a seed to a value in [0, 1).
///
/// Multiply-xor-shift on wrapping `i32` arithmetic.
#[inline]
#[must_use]
pub fn hash2d(ix: i32, iz: i32, seed: i32) -> f32 {
    let mut h = ix
        .wrapping_mul(374_761_393)
        .wrapping_add(iz.wrapping_mul(668_265_263))
        .wrapping_add(seed.wrapping_mul(1_442_695_041));
    h = (h ^ (h >> 13)).wrapping_mul(1_274_126_177);
    h ^= h >> 16;
    (h & 0x00FF_FFFF) as f32 / 16_777_216.0
}

/// Cubic smoothstep easing `3t^2 - 2t^3` on t in [0, 1].
#[inline]
#[must_use]
pub fn smooth(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

/// Hermite smoothstep between two edges, clamped.
#[inline]
#[must_use]
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    smooth(((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0))
}

/// Linear interpolation.
#[inline]
#[must_use]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Samples 2D value noise.
///
/// # Returns
///
/// A value in the range [0, 1].
#[must_use]
pub fn value_noise(x: f32, z: f32, seed: i32) -> f32 {
    let fx = x.floor();
    let fz = z.floor();
    let x0 = fx as i32;
    let z0 = fz as i32;
    let x1 = x0.wrapping_add(1);
    let z1 = z0.wrapping_add(1);

    let sx = smooth(x - fx);
    let sz = smooth(z - fz);

    let n00 = hash2d(x0, z0, seed);
    let n10 = hash2d(x1, z0, seed);
    let n01 = hash2d(x0, z1, seed);
    let n11 = hash2d(x1, z1, seed);

    let ix0 = lerp(n00, n10, sx);
    let ix1 = lerp(n01, n11, sx);
    lerp(ix0, ix1, sz)
}

/// Octave settings for fractal noise.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FbmParams {
    /// Number of noise layers.
    pub octaves: u32,
    /// Frequency multiplier per octave.
    pub lacunarity: f32,
    /// Amplitude multiplier per octave.
    pub gain: f32,
}

impl FbmParams {
    /// Amplitude of the first octave.
    pub const BASE_AMPLITUDE: f32 = 0.5;

    /// Creates octave settings.
    #[must_use]
    pub const fn new(octaves: u32, lacunarity: f32, gain: f32) -> Self {
        Self {
            octaves,
            lacunarity,
            gain,
        }
    }

    /// Upper bound of [`fbm`] output: the sum of all octave amplitudes.
    #[must_use]
    pub fn amplitude_sum(&self) -> f32 {
        let mut amplitude = Self::BASE_AMPLITUDE;
        let mut sum = 0.0;
        for _ in 0..self.octaves {
            sum += amplitude;
            amplitude *= self.gain;
        }
        sum
    }
}

impl Default for FbmParams {
    fn default() -> Self {
        Self::new(5, 2.0, 0.5)
    }
}

/// Fractal Brownian motion over [`value_noise`].
///
/// Octave `i` samples at `frequency = lacunarity^i` with amplitude
/// `0.5 * gain^i` and its own seed `seed + i * 101`, so octaves never
/// phase-lock.
///
/// # Returns
///
/// A value in `[0, params.amplitude_sum()]`.
#[must_use]
pub fn fbm(x: f32, z: f32, seed: i32, params: &FbmParams) -> f32 {
    let mut amplitude = FbmParams::BASE_AMPLITUDE;
    let mut frequency = 1.0;
    let mut sum = 0.0;
    let mut octave_seed = seed;

    for _ in 0..params.octaves {
        sum += amplitude * value_noise(x * frequency, z * frequency, octave_seed);
        frequency *= params.lacunarity;
        amplitude *= params.gain;
        octave_seed = octave_seed.wrapping_add(OCTAVE_SEED_STRIDE);
    }

    sum
}

/// A seeded noise source.
///
/// Thin value wrapper so terrain code can carry one seed per band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NoiseField {
    seed: i32,
}

impl NoiseField {
    /// Creates a noise field for a seed.
    #[must_use]
    pub const fn new(seed: WorldSeed) -> Self {
        Self {
            seed: seed.noise_seed(),
        }
    }

    /// A field whose seed is shifted by `delta` (one per terrain band).
    #[must_use]
    pub const fn band(self, delta: i32) -> Self {
        Self {
            seed: self.seed.wrapping_add(delta),
        }
    }

    /// Fractal noise in `[0, params.amplitude_sum()]`.
    #[inline]
    #[must_use]
    pub fn fbm(&self, x: f32, z: f32, params: &FbmParams) -> f32 {
        fbm(x, z, self.seed, params)
    }
}
