//! # World Assembly
//!
//! `generate(seed, config)` is the only entry point that touches every other
//! module. It runs in two phases:
//!
//! 1. **Plan** (sequential): one shared world stream yields island `i`'s
//!    center, then island `i`'s biome, then island `i + 1`'s center, and so
//!    on. Changing how many draws the layout consumes therefore shifts every
//!    later biome.
//! 2. **Build**: each island's terrain and placement passes depend only on
//!    its plan. Every pass opens its own stream from the island seed, so the
//!    passes neither share nor reorder randomness. With the `parallel`
//!    feature islands are built on the rayon pool; the result is identical.

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use archipelago_shared::{Transform, Vec2, Vec3};

use crate::biome::BiomeTag;
use crate::config::WorldConfig;
use crate::error::WorldGenResult;
use crate::heightfield::HeightField;
use crate::layout::IslandLayoutPlanner;
use crate::lighthouse::{place_lighthouse, Lighthouse};
use crate::noise::{
    WorldSeed, STREAM_HOUSES, STREAM_LIGHTHOUSE, STREAM_RINGS, STREAM_TREES, STREAM_WORLD,
};
use crate::rings::{spawn_rings, Ring};
use crate::sampler::TerrainSampler;
use crate::scatter::{scatter, MoistureRule, SampleRegion, ScatterOutcome, ScatterRules};

/// Island `i` is seeded with `world_seed + i * ISLAND_SEED_STRIDE`.
pub const ISLAND_SEED_STRIDE: u32 = 1337;

/// A placed house.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct House {
    /// Island-local transform.
    pub transform: Transform,
    /// Model variant, below `houses.variants`.
    pub variant: u32,
}

/// Requested versus placed for one pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Instances asked for.
    pub requested: u32,
    /// Instances placed.
    pub placed: u32,
    /// Trials spent.
    pub tries: u32,
}

impl PassStats {
    /// Returns true if the pass stopped short.
    #[must_use]
    pub const fn is_underfilled(&self) -> bool {
        self.placed < self.requested
    }
}

impl From<&ScatterOutcome> for PassStats {
    fn from(outcome: &ScatterOutcome) -> Self {
        Self {
            requested: outcome.requested,
            placed: outcome.placements.len() as u32,
            tries: outcome.tries,
        }
    }
}

/// Per-island placement report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PlacementStats {
    /// Tree pass.
    pub trees: PassStats,
    /// House pass.
    pub houses: PassStats,
    /// Ring pass (`tries` is not tracked).
    pub rings: PassStats,
    /// Whether the lighthouse gate passed and a site was found.
    pub lighthouse: bool,
}

/// Everything fixed for an island before its body is built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IslandPlan {
    /// Position in the world's island list.
    pub index: u32,
    /// World-space XZ center.
    pub center: Vec2,
    /// Drawn or forced biome.
    pub biome: BiomeTag,
    /// Island seed.
    pub seed: WorldSeed,
}

/// One finished island. Placements are island-local; add `center` for world space.
#[derive(Clone, Debug, PartialEq)]
pub struct Island {
    /// Position in the world's island list.
    pub index: u32,
    /// Biome.
    pub biome: BiomeTag,
    /// World-space XZ center.
    pub center: Vec2,
    /// Island seed.
    pub seed: WorldSeed,
    /// Terrain.
    pub field: HeightField,
    /// Tree transforms.
    pub trees: Vec<Transform>,
    /// Houses (village only).
    pub houses: Vec<House>,
    /// Optional lighthouse.
    pub lighthouse: Option<Lighthouse>,
    /// Collectible rings.
    pub rings: Vec<Ring>,
    /// Requested versus placed per pass.
    pub stats: PlacementStats,
}

impl Island {
    /// Converts a world XZ point to island-local, if it lies on the footprint.
    #[must_use]
    pub fn to_local(&self, x: f32, z: f32) -> Option<Vec2> {
        let local = Vec2::new(x - self.center.x, z - self.center.y);
        let half = self.field.half_extent();
        (local.x.abs() <= half && local.y.abs() <= half).then_some(local)
    }

    /// Moves an island-local transform into world space.
    #[must_use]
    pub fn to_world(&self, local: &Transform) -> Transform {
        Transform {
            position: local.position + Vec3::new(self.center.x, 0.0, self.center.y),
            ..*local
        }
    }

    /// Column-major model matrix placing the island's mesh in the world.
    #[must_use]
    pub fn model_matrix(&self) -> [[f32; 4]; 4] {
        self.to_world(&Transform::IDENTITY).to_cols_array()
    }

    /// Terrain height at a world point, `None` off the footprint.
    #[must_use]
    pub fn sample_height_at_world_xz(&self, x: f32, z: f32) -> Option<f32> {
        self.to_local(x, z).map(|p| self.field.sample_height(p.x, p.y))
    }

    /// Surface normal at a world point, `None` off the footprint.
    #[must_use]
    pub fn sample_normal_at_world_xz(&self, x: f32, z: f32) -> Option<Vec3> {
        self.to_local(x, z).map(|p| self.field.sample_normal(p.x, p.y))
    }

    /// Moisture at a world point, `None` off the footprint.
    #[must_use]
    pub fn sample_moisture_at_world_xz(&self, x: f32, z: f32) -> Option<f32> {
        self.to_local(x, z).map(|p| self.field.sample_moisture(p.x, p.y))
    }
}

/// A generated archipelago.
#[derive(Clone, Debug, PartialEq)]
pub struct World {
    /// Seed the world was generated from.
    pub seed: WorldSeed,
    /// Configuration it was generated with.
    pub config: WorldConfig,
    /// Islands in layout order.
    pub islands: Vec<Island>,
    /// Islands whose center broke the spacing rule.
    pub layout_relaxed: u32,
}

impl World {
    /// First island whose footprint contains the world point.
    #[must_use]
    pub fn island_at(&self, x: f32, z: f32) -> Option<&Island> {
        self.islands.iter().find(|i| i.to_local(x, z).is_some())
    }

    /// Terrain height at a world point, `None` over open sea.
    #[must_use]
    pub fn sample_height_at_world_xz(&self, x: f32, z: f32) -> Option<f32> {
        self.island_at(x, z)?.sample_height_at_world_xz(x, z)
    }

    /// Surface normal at a world point, `None` over open sea.
    #[must_use]
    pub fn sample_normal_at_world_xz(&self, x: f32, z: f32) -> Option<Vec3> {
        self.island_at(x, z)?.sample_normal_at_world_xz(x, z)
    }

    /// Moisture at a world point, `None` over open sea.
    #[must_use]
    pub fn sample_moisture_at_world_xz(&self, x: f32, z: f32) -> Option<f32> {
        self.island_at(x, z)?.sample_moisture_at_world_xz(x, z)
    }

    /// Total rings across all islands.
    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.islands.iter().map(|i| i.rings.len()).sum()
    }
}

/// Generates a world.
///
/// # Errors
///
/// Returns the first error from [`WorldConfig::validate`]. Nothing after
/// validation fails.
pub fn generate(seed: WorldSeed, config: &WorldConfig) -> WorldGenResult<World> {
    config.validate()?;

    let (plans, layout_relaxed) = plan_islands(seed, config);
    let islands = build_islands(&plans, config)?;

    tracing::info!(
        "Generated world seed={} islands={} relaxed={}",
        seed.value(),
        islands.len(),
        layout_relaxed
    );

    Ok(World {
        seed,
        config: config.clone(),
        islands,
        layout_relaxed,
    })
}

/// Runs the shared world stream: center, then biome, per island.
#[must_use]
pub fn plan_islands(seed: WorldSeed, config: &WorldConfig) -> (Vec<IslandPlan>, u32) {
    let layout = &config.islands;
    let mut rng = seed.stream(STREAM_WORLD);
    let mut planner = IslandLayoutPlanner::new(layout.spawn_radius, layout.min_spacing);

    let plans = (0..layout.count)
        .map(|index| {
            let center = planner.next_center(&mut rng);
            let biome = match config.force_biome {
                Some(forced) => forced,
                None => config.biomes.draw(&mut rng),
            };
            IslandPlan {
                index,
                center,
                biome,
                seed: seed.offset(index, ISLAND_SEED_STRIDE),
            }
        })
        .collect();

    (plans, planner.relaxed())
}

#[cfg(feature = "parallel")]
fn build_islands(plans: &[IslandPlan], config: &WorldConfig) -> WorldGenResult<Vec<Island>> {
    plans.par_iter().map(|plan| build_island(plan, config)).collect()
}

#[cfg(not(feature = "parallel"))]
fn build_islands(plans: &[IslandPlan], config: &WorldConfig) -> WorldGenResult<Vec<Island>> {
    plans.iter().map(|plan| build_island(plan, config)).collect()
}

/// Builds terrain and runs every placement pass for one island.
///
/// # Errors
///
/// Propagates terrain build errors (degenerate grid or spacing).
pub fn build_island(plan: &IslandPlan, config: &WorldConfig) -> WorldGenResult<Island> {
    let field = HeightField::build(&config.terrain, plan.seed, plan.biome)?;
    let sea = config.terrain.sea_level;
    let mut stats = PlacementStats::default();

    let trees = if plan.biome.has_trees() {
        let outcome = scatter_trees(&field, plan, config);
        stats.trees = PassStats::from(&outcome);
        report_underfill(plan, "trees", &stats.trees);
        outcome.placements
    } else {
        Vec::new()
    };

    let houses = if plan.biome.has_houses() {
        let (houses, pass) = scatter_houses(&field, plan, config);
        stats.houses = pass;
        report_underfill(plan, "houses", &stats.houses);
        houses
    } else {
        Vec::new()
    };

    let lighthouse = place_lighthouse(
        &field,
        &mut plan.seed.stream(STREAM_LIGHTHOUSE),
        sea,
        &config.lighthouse,
    );
    stats.lighthouse = lighthouse.is_some();

    let rings = spawn_rings(&field, &mut plan.seed.stream(STREAM_RINGS), sea, &config.rings);
    stats.rings = PassStats {
        requested: config.rings.count,
        placed: rings.len() as u32,
        tries: 0,
    };

    tracing::debug!(
        "Island {} ({}) at ({:.1}, {:.1}): {} trees, {} houses, lighthouse={}, {} rings",
        plan.index,
        plan.biome,
        plan.center.x,
        plan.center.y,
        trees.len(),
        houses.len(),
        stats.lighthouse,
        rings.len()
    );

    Ok(Island {
        index: plan.index,
        biome: plan.biome,
        center: plan.center,
        seed: plan.seed,
        field,
        trees,
        houses,
        lighthouse,
        rings,
        stats,
    })
}

fn scatter_trees(field: &HeightField, plan: &IslandPlan, config: &WorldConfig) -> ScatterOutcome {
    let trees = &config.trees;
    let profile = plan.biome.profile();
    let desired = (trees.count as f32 * profile.tree_density).round() as u32;
    let rules = ScatterRules {
        desired_count: desired,
        max_tries: desired.saturating_mul(trees.tries_per_instance),
        region: SampleRegion::FieldVertices {
            jitter: trees.jitter,
        },
        min_height: config.terrain.sea_level + trees.min_height_above_sea,
        slope_limit: trees.slope_limit,
        moisture: Some(MoistureRule {
            min_moisture: profile.tree_min_moisture,
        }),
        min_spacing: trees.min_spacing,
        scale: trees.scale,
    };
    scatter(field, &mut plan.seed.stream(STREAM_TREES), &rules)
}

fn scatter_houses(
    field: &HeightField,
    plan: &IslandPlan,
    config: &WorldConfig,
) -> (Vec<House>, PassStats) {
    let houses = &config.houses;
    let rules = ScatterRules {
        desired_count: houses.count,
        max_tries: houses.count.saturating_mul(houses.tries_per_instance),
        region: SampleRegion::RadialBand {
            inner: houses.inner_radius,
            outer: houses.outer_radius,
        },
        min_height: config.terrain.sea_level + houses.min_height_above_sea,
        slope_limit: houses.slope_limit,
        moisture: None,
        min_spacing: houses.min_spacing,
        scale: houses.scale,
    };
    let mut rng = plan.seed.stream(STREAM_HOUSES);
    let outcome = scatter(field, &mut rng, &rules);
    let stats = PassStats::from(&outcome);
    let placed = outcome
        .placements
        .into_iter()
        .map(|transform| House {
            transform,
            variant: rng.gen_range(0..houses.variants.max(1)),
        })
        .collect();
    (placed, stats)
}

fn report_underfill(plan: &IslandPlan, pass: &str, stats: &PassStats) {
    if stats.is_underfilled() {
        tracing::debug!(
            "Island {} {} pass under-filled: {}/{} after {} tries",
            plan.index,
            pass,
            stats.placed,
            stats.requested,
            stats.tries
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, TerrainConfig};
    use crate::error::WorldGenError;
    use crate::layout::place_islands;

    fn small_config() -> WorldConfig {
        WorldConfig {
            islands: LayoutConfig {
                count: 4,
                spawn_radius: 200.0,
                min_spacing: 70.0,
            },
            terrain: TerrainConfig {
                grid: 40,
                spacing: 1.5,
                ..TerrainConfig::default()
            },
            ..WorldConfig::default()
        }
    }

    #[test]
    fn test_generate_is_deterministic() {
        let config = small_config();
        let a = generate(WorldSeed::new(42), &config).expect("valid config");
        let b = generate(WorldSeed::new(42), &config).expect("valid config");
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_config_fails_before_work() {
        let mut config = small_config();
        config.terrain.grid = 0;
        assert!(matches!(
            generate(WorldSeed::new(1), &config),
            Err(WorldGenError::InvalidGrid(0))
        ));
    }

    #[test]
    fn test_zero_islands_is_empty_world() {
        let mut config = small_config();
        config.islands.count = 0;
        let world = generate(WorldSeed::new(1), &config).expect("valid config");
        assert!(world.islands.is_empty());
        assert_eq!(world.sample_height_at_world_xz(0.0, 0.0), None);
    }

    #[test]
    fn test_model_matrix_translates_to_center() {
        let world = generate(WorldSeed::new(10), &small_config()).expect("valid config");
        for island in &world.islands {
            let m = island.model_matrix();
            assert_eq!(m[3], [island.center.x, 0.0, island.center.y, 1.0]);
            assert_eq!(m[0], [1.0, 0.0, 0.0, 0.0]);
            assert_eq!(m[1], [0.0, 1.0, 0.0, 0.0]);
            assert_eq!(m[2], [0.0, 0.0, 1.0, 0.0]);
        }
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_build_matches_sequential() {
        let config = small_config();
        let seed = WorldSeed::new(42);
        let world = generate(seed, &config).expect("valid config");

        let (plans, relaxed) = plan_islands(seed, &config);
        assert_eq!(world.layout_relaxed, relaxed);
        assert_eq!(world.islands.len(), plans.len());
        for (island, plan) in world.islands.iter().zip(&plans) {
            let sequential = build_island(plan, &config).expect("valid config");
            assert_eq!(island, &sequential);
        }
    }

    #[test]
    fn test_island_seeds_follow_stride() {
        let world = generate(WorldSeed::new(10), &small_config()).expect("valid config");
        for (i, island) in world.islands.iter().enumerate() {
            assert_eq!(island.index as usize, i);
            assert_eq!(island.seed.value(), 10 + i as u32 * ISLAND_SEED_STRIDE);
        }
    }

    #[test]
    fn test_forced_biome_matches_standalone_layout() {
        let mut config = small_config();
        config.force_biome = Some(BiomeTag::Desert);
        let world = generate(WorldSeed::new(99), &config).expect("valid config");
        let plan = place_islands(4, 200.0, 70.0, WorldSeed::new(99));

        let centers: Vec<Vec2> = world.islands.iter().map(|i| i.center).collect();
        assert_eq!(centers, plan.centers);
        assert_eq!(world.layout_relaxed, plan.relaxed);
        assert!(world.islands.iter().all(|i| i.biome == BiomeTag::Desert));
    }

    #[test]
    fn test_passes_follow_biome() {
        for biome in BiomeTag::ALL {
            let mut config = small_config();
            config.force_biome = Some(biome);
            let world = generate(WorldSeed::new(5), &config).expect("valid config");
            for island in &world.islands {
                if !biome.has_trees() {
                    assert!(island.trees.is_empty(), "{biome} grew trees");
                }
                if !biome.has_houses() {
                    assert!(island.houses.is_empty(), "{biome} built houses");
                }
                assert_eq!(island.stats.trees.placed as usize, island.trees.len());
                assert_eq!(island.stats.houses.placed as usize, island.houses.len());
                assert_eq!(island.stats.lighthouse, island.lighthouse.is_some());
            }
        }
    }

    #[test]
    fn test_house_variants_in_range() {
        let mut config = small_config();
        config.force_biome = Some(BiomeTag::Village);
        let world = generate(WorldSeed::new(3), &config).expect("valid config");
        let houses: Vec<&House> = world.islands.iter().flat_map(|i| &i.houses).collect();
        assert!(!houses.is_empty());
        assert!(houses.iter().all(|h| h.variant < config.houses.variants));
    }

    #[test]
    fn test_world_queries_hit_islands() {
        let world = generate(WorldSeed::new(8), &small_config()).expect("valid config");
        let island = &world.islands[0];
        let (cx, cz) = (island.center.x, island.center.y);

        let expected = island.field.sample_height(0.0, 0.0);
        assert_eq!(world.sample_height_at_world_xz(cx, cz), Some(expected));
        assert!(world.sample_normal_at_world_xz(cx, cz).is_some());
        assert!(world.sample_moisture_at_world_xz(cx, cz).is_some());

        let off = island.field.half_extent() + 1.0;
        assert_eq!(island.sample_height_at_world_xz(cx + off, cz), None);
    }

    #[test]
    fn test_to_world_offsets_position_only() {
        let world = generate(WorldSeed::new(8), &small_config()).expect("valid config");
        let island = &world.islands[0];
        let local = Transform::new(Vec3::new(1.0, 2.0, 3.0), 0.5, 1.2);
        let moved = island.to_world(&local);
        assert_eq!(moved.position.x, 1.0 + island.center.x);
        assert_eq!(moved.position.y, 2.0);
        assert_eq!(moved.position.z, 3.0 + island.center.y);
        assert_eq!(moved.yaw, 0.5);
        assert_eq!(moved.scale, 1.2);
    }

    #[test]
    fn test_biome_draw_shifts_with_seed() {
        let config = small_config();
        let biomes = |seed: u32| -> Vec<BiomeTag> {
            let (plans, _) = plan_islands(WorldSeed::new(seed), &config);
            plans.iter().map(|p| p.biome).collect()
        };
        let distinct: std::collections::HashSet<Vec<BiomeTag>> = (0..20).map(biomes).collect();
        assert!(distinct.len() > 1);
    }
}
