//! # ARCHIPELAGO
//!
//! Runtime glue around the generator.
//!
//! ## Modules
//!
//! - `session`: the current world, regenerated from the next LCG seed on demand
//! - `ring_tracker`: which rings the player has flown through, and the score
//!
//! The rendering layer reads `World` snapshots from a [`WorldSession`]; it
//! never holds the lock while drawing.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod ring_tracker;
pub mod session;

// Re-export the generator
pub use archipelago_procedural as procedural;

pub use ring_tracker::{RingTracker, COLLECT_RADIUS, POINTS_PER_RING};
pub use session::WorldSession;
