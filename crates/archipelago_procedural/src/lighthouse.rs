//! # Lighthouse Site Search
//!
//! At most one lighthouse per island. The site is the best-scoring vertex
//! that clears sea level, preferring the coast and flat ground:
//!
//! ```text
//! score = edge_weight * clamp(dist / (half * edge_radius), 0, 1)
//!       + flat_weight * normal.y
//! ```
//!
//! The scan is deterministic. Only the existence of the lighthouse is
//! random: one Bernoulli draw against `chance`.

use rand::Rng;

use archipelago_shared::{Transform, Vec3};

use crate::config::LighthouseConfig;
use crate::sampler::{PlacementCandidate, TerrainSampler};

/// A placed lighthouse, facing away from the island center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lighthouse {
    /// Island-local transform; local +Z points out to sea.
    pub transform: Transform,
    /// Site score it won with.
    pub score: f32,
}

/// Scores one candidate site.
#[must_use]
pub fn site_score(candidate: &PlacementCandidate, half_extent: f32, cfg: &LighthouseConfig) -> f32 {
    let reach = (half_extent * cfg.edge_radius).max(f32::EPSILON);
    let edge = (candidate.local.length() / reach).clamp(0.0, 1.0);
    cfg.edge_weight * edge + cfg.flat_weight * candidate.normal.y
}

/// Scans every sample above `sea_level + min_clearance` and returns the best.
///
/// Ties keep the earliest sample. `None` when nothing clears the water.
pub fn find_site<S>(
    sampler: &S,
    sea_level: f32,
    cfg: &LighthouseConfig,
) -> Option<(PlacementCandidate, f32)>
where
    S: TerrainSampler + ?Sized,
{
    let floor = sea_level + cfg.min_clearance;
    let half = sampler.half_extent();
    let mut best: Option<(PlacementCandidate, f32)> = None;

    for index in 0..sampler.sample_count() {
        let point = sampler.sample_point(index);
        let candidate = sampler.probe(point.x, point.y);
        if candidate.height <= floor {
            continue;
        }
        let score = site_score(&candidate, half, cfg);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((candidate, score));
        }
    }

    best
}

/// Rolls the gate and, if it passes, builds the lighthouse on the best site.
///
/// Always consumes exactly one `f32` from `rng`.
pub fn place_lighthouse<S, R>(
    sampler: &S,
    rng: &mut R,
    sea_level: f32,
    cfg: &LighthouseConfig,
) -> Option<Lighthouse>
where
    S: TerrainSampler + ?Sized,
    R: Rng + ?Sized,
{
    if rng.gen::<f32>() >= cfg.chance {
        return None;
    }
    let (site, score) = find_site(sampler, sea_level, cfg)?;
    let yaw = site.local.x.atan2(site.local.y);
    Some(Lighthouse {
        transform: Transform::new(
            Vec3::new(site.local.x, site.height, site.local.y),
            yaw,
            cfg.scale,
        ),
        score,
    })
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

    fn terrain() -> TerrainConfig {
        TerrainConfig {
            grid: 40,
            spacing: 1.0,
            ..TerrainConfig::default()
        }
    }

    fn field(seed: u32) -> HeightField {
        HeightField::build(&terrain(), WorldSeed::new(seed), BiomeTag::Grassland)
            .expect("valid terrain")
    }

    #[test]
    fn test_site_is_best_eligible_vertex() {
        let cfg = LighthouseConfig::default();
        let sea = terrain().sea_level;
        let field = field(17);
        let (site, score) = find_site(&field, sea, &cfg).expect("island has land");

        assert!(site.height > sea + cfg.min_clearance);
        let half = field.half_extent();
        for i in 0..field.sample_count() {
            let p = field.sample_point(i);
            let c = field.probe(p.x, p.y);
            if c.height > sea + cfg.min_clearance {
                assert!(site_score(&c, half, &cfg) <= score);
            }
        }
    }

    #[test]
    fn test_site_search_is_deterministic() {
        let cfg = LighthouseConfig::default();
        let a = find_site(&field(3), 2.5, &cfg);
        let b = find_site(&field(3), 2.5, &cfg);
        assert_eq!(a, b);
    }

    #[test]
    fn test_gate_closed_and_open() {
        let field = field(9);
        let sea = terrain().sea_level;
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let never = LighthouseConfig {
            chance: 0.0,
            ..LighthouseConfig::default()
        };
        for _ in 0..20 {
            assert!(place_lighthouse(&field, &mut rng, sea, &never).is_none());
        }

        let always = LighthouseConfig {
            chance: 1.0,
            ..LighthouseConfig::default()
        };
        assert!(place_lighthouse(&field, &mut rng, sea, &always).is_some());
    }

    #[test]
    fn test_faces_out_to_sea() {
        let always = LighthouseConfig {
            chance: 1.0,
            ..LighthouseConfig::default()
        };
        let field = field(23);
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let lh = place_lighthouse(&field, &mut rng, terrain().sea_level, &always).expect("placed");

        let pos = lh.transform.position.xz();
        let len = pos.length();
        assert!(len > 0.0);
        let facing = lh.transform.yaw.sin() * pos.x / len + lh.transform.yaw.cos() * pos.y / len;
        assert!((facing - 1.0).abs() < 1e-4);
        assert_eq!(lh.transform.scale, always.scale);
    }

    #[test]
    fn test_drowned_island_has_no_site() {
        let drowned = TerrainConfig {
            sea_level: 100.0,
            ..terrain()
        };
        let field = HeightField::build(&drowned, WorldSeed::new(4), BiomeTag::Desert)
            .expect("valid terrain");
        let always = LighthouseConfig {
            chance: 1.0,
            ..LighthouseConfig::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert!(place_lighthouse(&field, &mut rng, 100.0, &always).is_none());
    }

    #[test]
    fn test_edge_weight_pulls_site_outward() {
        let sea = terrain().sea_level;
        let field = field(31);
        let coastal = LighthouseConfig {
            edge_weight: 1.0,
            flat_weight: 0.0,
            ..LighthouseConfig::default()
        };
        let flat = LighthouseConfig {
            edge_weight: 0.0,
            flat_weight: 1.0,
            ..LighthouseConfig::default()
        };
        let (a, _) = find_site(&field, sea, &coastal).expect("land");
        let (b, _) = find_site(&field, sea, &flat).expect("land");
        let half = field.half_extent();
        assert!(site_score(&a, half, &coastal) >= site_score(&b, half, &coastal));
        assert!(b.normal.y >= a.normal.y);
    }
}
