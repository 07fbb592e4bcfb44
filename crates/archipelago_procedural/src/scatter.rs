//! # Constrained Scattering
//!
//! One generic rejection sampler places every kind of instance that comes
//! in numbers (trees, houses). A pass draws candidate points, throws away
//! the ones that break a rule, and keeps the rest until it has enough or
//! runs out of trials.
//!
//! ## Rules, in evaluation order
//!
//! 1. Height below `min_height` (underwater or beach)
//! 2. Normal Y below `slope_limit` (too steep)
//! 3. Moisture below `min_moisture`, then a stochastic cut with acceptance
//!    `clamp((m - min) / (1 - min), 0, 1)^2` so density fades out smoothly
//! 4. Closer than `min_spacing` to anything this pass already placed
//!
//! Only instances of the same pass are spacing-checked against each other.
//! A tree may stand next to a house.
//!
//! ## Termination
//!
//! Trials are capped by `max_tries`. Running out before `desired_count` is a
//! normal outcome: the pass returns what it has.

use rand::Rng;
use serde::{Deserialize, Serialize};

use archipelago_shared::{Transform, Vec2, Vec3, TAU};

use crate::error::{WorldGenError, WorldGenResult};
use crate::noise::lerp;
use crate::sampler::TerrainSampler;

/// Inclusive range for a uniformly drawn scale.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    /// Smallest scale.
    pub min: f32,
    /// Largest scale.
    pub max: f32,
}

impl ScaleRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// Draws a scale. A degenerate range returns `min` without consuming
    /// randomness.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }

    /// Returns true if `value` lies in the range.
    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    pub(crate) fn validate(&self, name: &str) -> WorldGenResult<()> {
        if self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
        {
            Ok(())
        } else {
            Err(WorldGenError::InvalidConfig(format!(
                "{name} must satisfy 0 < min <= max, got {}..{}",
                self.min, self.max
            )))
        }
    }
}

/// Where candidate points come from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SampleRegion {
    /// A uniformly chosen grid vertex, offset by up to `jitter` cells.
    FieldVertices {
        /// Maximum offset per axis, as a fraction of the cell size.
        jitter: f32,
    },
    /// A point uniform by area in the annulus `[inner, outer]`, both radii
    /// as fractions of the half extent.
    RadialBand {
        /// Inner radius fraction.
        inner: f32,
        /// Outer radius fraction.
        outer: f32,
    },
}

/// Moisture gate used by vegetation passes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoistureRule {
    /// Hard floor; also the zero point of the acceptance curve.
    pub min_moisture: f32,
}

impl MoistureRule {
    /// Probability of keeping a candidate with moisture `m` that passed the floor.
    #[must_use]
    pub fn acceptance(&self, moisture: f32) -> f32 {
        let span = 1.0 - self.min_moisture;
        if span <= f32::EPSILON {
            return 1.0;
        }
        let t = ((moisture - self.min_moisture) / span).clamp(0.0, 1.0);
        t * t
    }
}

/// Full rule set for one placement pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScatterRules {
    /// Instances wanted.
    pub desired_count: u32,
    /// Trial cap.
    pub max_tries: u32,
    /// Candidate source.
    pub region: SampleRegion,
    /// Lowest allowed terrain height.
    pub min_height: f32,
    /// Lowest allowed normal Y.
    pub slope_limit: f32,
    /// Optional moisture gate.
    pub moisture: Option<MoistureRule>,
    /// Minimum XZ distance between instances of this pass.
    pub min_spacing: f32,
    /// Scale range for accepted instances.
    pub scale: ScaleRange,
}

/// What a pass produced.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScatterOutcome {
    /// Accepted instances, in acceptance order, in sampler-local coordinates.
    pub placements: Vec<Transform>,
    /// Trials spent.
    pub tries: u32,
    /// Instances asked for.
    pub requested: u32,
}

impl ScatterOutcome {
    /// Returns true if the pass stopped short of its target.
    #[must_use]
    pub fn is_underfilled(&self) -> bool {
        (self.placements.len() as u64) < u64::from(self.requested)
    }
}

/// Runs one bounded rejection-sampling pass.
///
/// # Returns
///
/// The accepted instances. Never more than `desired_count`, never more
/// than `max_tries` trials.
pub fn scatter<S, R>(sampler: &S, rng: &mut R, rules: &ScatterRules) -> ScatterOutcome
where
    S: TerrainSampler + ?Sized,
    R: Rng + ?Sized,
{
    let desired = rules.desired_count as usize;
    let min_spacing_sq = rules.min_spacing * rules.min_spacing;
    let mut placements: Vec<Transform> = Vec::with_capacity(desired.min(4096));
    let mut tries = 0;

    while placements.len() < desired && tries < rules.max_tries {
        tries += 1;

        let Some(point) = pick_point(sampler, rng, rules.region) else {
            break;
        };
        let candidate = sampler.probe(point.x, point.y);

        if candidate.height < rules.min_height {
            continue;
        }
        if candidate.normal.y < rules.slope_limit {
            continue;
        }
        if let Some(rule) = rules.moisture {
            if candidate.moisture < rule.min_moisture {
                continue;
            }
            if rng.gen::<f32>() > rule.acceptance(candidate.moisture) {
                continue;
            }
        }
        let crowded = placements
            .iter()
            .any(|p| p.position.xz().distance_squared(candidate.local) < min_spacing_sq);
        if crowded {
            continue;
        }

        let yaw = rng.gen_range(0.0..TAU);
        let scale = rules.scale.sample(rng);
        placements.push(Transform::new(
            Vec3::new(candidate.local.x, candidate.height, candidate.local.y),
            yaw,
            scale,
        ));
    }

    ScatterOutcome {
        placements,
        tries,
        requested: rules.desired_count,
    }
}

/// Draws one candidate point, or `None` if the sampler has nothing to offer.
fn pick_point<S, R>(sampler: &S, rng: &mut R, region: SampleRegion) -> Option<Vec2>
where
    S: TerrainSampler + ?Sized,
    R: Rng + ?Sized,
{
    let half = sampler.half_extent();
    match region {
        SampleRegion::FieldVertices { jitter } => {
            let count = sampler.sample_count();
            if count == 0 {
                return None;
            }
            let base = sampler.sample_point(rng.gen_range(0..count));
            if jitter <= 0.0 {
                return Some(base);
            }
            let reach = jitter * sampler.cell_size();
            let dx = (rng.gen::<f32>() * 2.0 - 1.0) * reach;
            let dz = (rng.gen::<f32>() * 2.0 - 1.0) * reach;
            Some(Vec2::new(
                (base.x + dx).clamp(-half, half),
                (base.y + dz).clamp(-half, half),
            ))
        }
        SampleRegion::RadialBand { inner, outer } => {
            let angle = rng.gen::<f32>() * TAU;
            let radius = lerp(inner * inner, outer * outer, rng.gen::<f32>()).sqrt() * half;
            Some(Vec2::from_polar(angle, radius))
        }
    }
}
