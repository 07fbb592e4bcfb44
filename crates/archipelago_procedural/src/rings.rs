//! Collectible rings floating over each island.
//!
//! Rings sit in an annulus around the island center, away from both the
//! peak and the coastline, hovering a few units above flat-ish ground.

use rand::Rng;

use archipelago_shared::{Transform, Vec2, Vec3, TAU};

use crate::config::RingConfig;
use crate::noise::lerp;
use crate::sampler::TerrainSampler;

/// One collectible ring.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ring {
    /// Island-local transform (yaw tangent to the annulus, tilted upright).
    pub transform: Transform,
}

/// Spawns up to `cfg.count` rings.
///
/// Trials are capped at `count * tries_per_ring`; a crowded or steep
/// island simply gets fewer rings.
pub fn spawn_rings<S, R>(sampler: &S, rng: &mut R, sea_level: f32, cfg: &RingConfig) -> Vec<Ring>
where
    S: TerrainSampler + ?Sized,
    R: Rng + ?Sized,
{
    let half = sampler.half_extent();
    let r_min = half * cfg.inner_radius;
    let r_max = half * cfg.outer_radius;
    let budget = cfg.count.saturating_mul(cfg.tries_per_ring);
    let tilt = cfg.tilt_degrees.to_radians();

    let mut rings = Vec::with_capacity(cfg.count as usize);
    let mut tries = 0;
    while rings.len() < cfg.count as usize && tries < budget {
        tries += 1;

        let angle = rng.gen::<f32>() * TAU;
        let radius = lerp(r_min, r_max, rng.gen::<f32>());
        let local = Vec2::from_polar(angle, radius);

        if sampler.sample_normal(local.x, local.y).y < cfg.min_normal_y {
            continue;
        }
        let ground = sampler.sample_height(local.x, local.y);
        if ground < sea_level {
            continue;
        }

        let hover = cfg.hover_min + rng.gen::<f32>() * cfg.hover_range;
        let yaw = angle + TAU * 0.25;
        let scale = cfg.scale.sample(rng);
        rings.push(Ring {
            transform: Transform::new(Vec3::new(local.x, ground + hover, local.y), yaw, scale)
                .with_pitch(tilt),
        });
    }

    rings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::biome::BiomeTag;
    use crate::config::TerrainConfig;
    use crate::heightfield::HeightField;
    use crate::noise::WorldSeed;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn island(biome: BiomeTag) -> (HeightField, f32) {
        let terrain = TerrainConfig {
            grid: 40,
            spacing: 1.0,
            ..TerrainConfig::default()
        };
        let field = HeightField::build(&terrain, WorldSeed::new(77), biome).expect("valid terrain");
        (field, terrain.sea_level)
    }

    #[test]
    fn test_rings_hover_inside_band() {
        let (field, sea) = island(BiomeTag::Grassland);
        let cfg = RingConfig {
            min_normal_y: 0.0,
            ..RingConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let rings = spawn_rings(&field, &mut rng, sea, &cfg);

        assert_eq!(rings.len(), cfg.count as usize);
        let half = field.half_extent();
        for ring in &rings {
            let t = ring.transform;
            let r = t.position.xz().length();
            assert!(r >= half * cfg.inner_radius - 1e-3 && r <= half * cfg.outer_radius + 1e-3);

            let ground = field.sample_height(t.position.x, t.position.z);
            let hover = t.position.y - ground;
            assert!(hover >= cfg.hover_min - 1e-3);
            assert!(hover <= cfg.hover_min + cfg.hover_range + 1e-3);
            assert!((t.pitch - cfg.tilt_degrees.to_radians()).abs() < 1e-6);
            assert!(cfg.scale.contains(t.scale));
        }
    }

    #[test]
    fn test_impossible_slope_is_bounded() {
        let (field, sea) = island(BiomeTag::Snow);
        let cfg = RingConfig {
            min_normal_y: 1.5,
            ..RingConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        assert!(spawn_rings(&field, &mut rng, sea, &cfg).is_empty());
    }

    #[test]
    fn test_zero_count() {
        let (field, sea) = island(BiomeTag::Forest);
        let cfg = RingConfig {
            count: 0,
            ..RingConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(spawn_rings(&field, &mut rng, sea, &cfg).is_empty());
    }

    #[test]
    fn test_deterministic() {
        let (field, sea) = island(BiomeTag::Village);
        let cfg = RingConfig::default();
        let a = spawn_rings(&field, &mut ChaCha8Rng::seed_from_u64(8), sea, &cfg);
        let b = spawn_rings(&field, &mut ChaCha8Rng::seed_from_u64(8), sea, &cfg);
        assert_eq!(a, b);
    }
}
