//! # World Session
//!
//! Holds the live world. Regeneration builds the next world without holding
//! the state lock and then swaps it in, so readers never wait on generation
//! and a reader holding an old snapshot keeps it intact. Regenerations are
//! serialized among themselves: each one reads the seed the previous one
//! left behind.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use archipelago_procedural::{generate, World, WorldConfig, WorldGenResult, WorldSeed};
use archipelago_shared::Vec3;

use crate::ring_tracker::RingTracker;

/// A world and the ring progress made on it. Always swapped together.
struct SessionState {
    world: Arc<World>,
    rings: RingTracker,
}

/// The current world plus ring progress on it.
pub struct WorldSession {
    config: WorldConfig,
    state: RwLock<SessionState>,
    /// Held for the whole read-seed, generate, swap sequence.
    regen: Mutex<()>,
}

impl WorldSession {
    /// Generates the first world from `config.seed`.
    ///
    /// # Errors
    ///
    /// Returns the config validation error, if any.
    pub fn new(config: WorldConfig) -> WorldGenResult<Self> {
        let world = generate(config.seed, &config)?;
        let rings = RingTracker::new(&world);
        Ok(Self {
            config,
            state: RwLock::new(SessionState {
                world: Arc::new(world),
                rings,
            }),
            regen: Mutex::new(()),
        })
    }

    /// The config every world in this session is built with.
    #[must_use]
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Current world. Cheap; the lock is held only to clone the `Arc`.
    #[must_use]
    pub fn snapshot(&self) -> Arc<World> {
        Arc::clone(&self.state.read().world)
    }

    /// Seed of the current world.
    #[must_use]
    pub fn seed(&self) -> WorldSeed {
        self.state.read().world.seed
    }

    /// Replaces the world with the one built from the next LCG seed.
    ///
    /// Ring progress starts over. Concurrent calls each advance the seed
    /// once.
    ///
    /// # Errors
    ///
    /// As [`WorldSession::regenerate_with`].
    pub fn regenerate(&self) -> WorldGenResult<Arc<World>> {
        let _regen = self.regen.lock();
        self.swap_in(self.seed().next())
    }

    /// Replaces the world with the one built from `seed`.
    ///
    /// # Errors
    ///
    /// Propagates generation errors; the current world is kept on error.
    pub fn regenerate_with(&self, seed: WorldSeed) -> WorldGenResult<Arc<World>> {
        let _regen = self.regen.lock();
        self.swap_in(seed)
    }

    /// Caller holds `regen`.
    fn swap_in(&self, seed: WorldSeed) -> WorldGenResult<Arc<World>> {
        let next = Arc::new(generate(seed, &self.config)?);
        let rings = RingTracker::new(&next);

        *self.state.write() = SessionState {
            world: Arc::clone(&next),
            rings,
        };

        tracing::info!(
            "Regenerated world: seed={} islands={} rings={}",
            seed.value(),
            next.islands.len(),
            next.ring_count()
        );
        Ok(next)
    }

    /// Collects rings near `player`; returns how many this call.
    pub fn collect(&self, player: Vec3) -> u32 {
        let got = self.state.write().rings.update_collect(player);
        if got > 0 {
            tracing::debug!("Collected {} ring(s)", got);
        }
        got
    }

    /// Current ring score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.state.read().rings.score()
    }

    /// Copy of the ring progress.
    #[must_use]
    pub fn ring_progress(&self) -> RingTracker {
        self.state.read().rings.clone()
    }

    /// Current world together with the ring progress made on it.
    #[must_use]
    pub fn snapshot_with_progress(&self) -> (Arc<World>, RingTracker) {
        let state = self.state.read();
        (Arc::clone(&state.world), state.rings.clone())
    }
}
