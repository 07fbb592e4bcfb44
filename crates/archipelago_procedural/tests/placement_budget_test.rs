//! # Placement Budget Tests
//!
//! Every placement loop must stop on its trial cap, whatever the terrain.

use archipelago_procedural::scatter::{MoistureRule, SampleRegion};
use archipelago_procedural::{
    scatter, BiomeTag, HeightField, ScaleRange, ScatterRules, TerrainConfig, WorldSeed,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn forest_field() -> (HeightField, TerrainConfig) {
    let terrain = TerrainConfig {
        grid: 48,
        spacing: 1.0,
        ..TerrainConfig::default()
    };
    let field = HeightField::build(&terrain, WorldSeed::new(1337), BiomeTag::Forest)
        .expect("valid terrain");
    (field, terrain)
}

fn tree_rules(sea_level: f32) -> ScatterRules {
    ScatterRules {
        desired_count: 200,
        max_tries: 200 * 12,
        region: SampleRegion::FieldVertices { jitter: 0.45 },
        min_height: sea_level + 0.35,
        slope_limit: 0.8,
        moisture: Some(MoistureRule { min_moisture: 0.3 }),
        min_spacing: 1.4,
        scale: ScaleRange::new(0.75, 1.3),
    }
}

/// Test: an unreachable moisture floor exhausts the budget and places nothing.
#[test]
fn test_unreachable_moisture_terminates() {
    let (field, terrain) = forest_field();
    let rules = ScatterRules {
        moisture: Some(MoistureRule { min_moisture: 2.0 }),
        ..tree_rules(terrain.sea_level)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let outcome = scatter(&field, &mut rng, &rules);

    assert!(outcome.placements.is_empty());
    assert_eq!(outcome.tries, rules.max_tries);
    assert!(outcome.is_underfilled());
}

/// Test: a real island under-fills gracefully and never overshoots.
#[test]
fn test_overfull_request_stays_bounded() {
    let (field, terrain) = forest_field();
    let rules = ScatterRules {
        desired_count: 10_000,
        max_tries: 3_000,
        ..tree_rules(terrain.sea_level)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let outcome = scatter(&field, &mut rng, &rules);

    assert!(outcome.tries <= 3_000);
    assert!(outcome.is_underfilled());
    assert!(outcome.placements.len() < 3_000);
}

/// Test: zero trial budget does no work.
#[test]
fn test_zero_budget() {
    let (field, terrain) = forest_field();
    let rules = ScatterRules {
        max_tries: 0,
        ..tree_rules(terrain.sea_level)
    };
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    let outcome = scatter(&field, &mut rng, &rules);
    assert_eq!(outcome.tries, 0);
    assert!(outcome.placements.is_empty());
}
