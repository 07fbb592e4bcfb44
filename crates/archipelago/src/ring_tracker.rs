//! # Ring Collection
//!
//! Rings are collected by flying within [`COLLECT_RADIUS`] of their center.
//! Each ring scores once; the tracker is rebuilt whenever the world changes.

use archipelago_procedural::World;
use archipelago_shared::Vec3;

/// Distance at which a ring counts as collected.
pub const COLLECT_RADIUS: f32 = 2.25;

/// Score per collected ring.
pub const POINTS_PER_RING: u32 = 10;

#[derive(Clone, Copy, Debug, PartialEq)]
struct TrackedRing {
    position: Vec3,
    collected: bool,
}

/// Collection state for every ring of one world.
#[derive(Clone, Debug, PartialEq)]
pub struct RingTracker {
    rings: Vec<TrackedRing>,
    collect_radius: f32,
    points_per_ring: u32,
    score: u32,
    collected: u32,
}

impl RingTracker {
    /// Tracks every ring of `world` with the default radius and points.
    #[must_use]
    pub fn new(world: &World) -> Self {
        Self::with_rules(world, COLLECT_RADIUS, POINTS_PER_RING)
    }

    /// Tracks every ring of `world` with custom rules.
    #[must_use]
    pub fn with_rules(world: &World, collect_radius: f32, points_per_ring: u32) -> Self {
        let rings = world
            .islands
            .iter()
            .flat_map(|island| {
                island.rings.iter().map(move |ring| TrackedRing {
                    position: island.to_world(&ring.transform).position,
                    collected: false,
                })
            })
            .collect();

        Self {
            rings,
            collect_radius,
            points_per_ring,
            score: 0,
            collected: 0,
        }
    }

    /// Collects every ring within reach of `player` (world space).
    ///
    /// # Returns
    ///
    /// Rings collected by this call.
    pub fn update_collect(&mut self, player: Vec3) -> u32 {
        let reach_sq = self.collect_radius * self.collect_radius;
        let mut got = 0;

        for ring in self.rings.iter_mut().filter(|r| !r.collected) {
            if ring.position.distance_squared(player) <= reach_sq {
                ring.collected = true;
                got += 1;
            }
        }

        self.collected += got;
        self.score += got * self.points_per_ring;
        got
    }

    /// Points so far.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    /// Rings collected so far.
    #[must_use]
    pub const fn collected(&self) -> u32 {
        self.collected
    }

    /// Rings in the world.
    #[must_use]
    pub fn total(&self) -> usize {
        self.rings.len()
    }

    /// Returns true once every ring is collected.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.collected as usize == self.rings.len()
    }

    /// World positions of rings still in play.
    pub fn remaining(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.rings.iter().filter(|r| !r.collected).map(|r| r.position)
    }

    /// Puts every ring back and zeroes the score.
    pub fn reset(&mut self) {
        for ring in &mut self.rings {
            ring.collected = false;
        }
        self.score = 0;
        self.collected = 0;
    }
}
