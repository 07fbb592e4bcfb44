//! # ARCHIPELAGO Shared
//!
//! Plain value types used by the generator and by whatever consumes its output.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on a GPU, window, or audio crate. The
//! rendering layer converts these types into its own representation.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{LCG_INCREMENT, LCG_MULTIPLIER, TAU};
pub use math::{Transform, Vec2, Vec3};
