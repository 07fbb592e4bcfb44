//! # Shared Constants
//!
//! Values that both the generator and the runtime layer must agree on.

/// Full turn in radians.
pub const TAU: f32 = std::f32::consts::TAU;

/// Multiplier of the seed-advancing LCG step (`seed * a + c`).
pub const LCG_MULTIPLIER: u32 = 1_664_525;

/// Increment of the seed-advancing LCG step.
pub const LCG_INCREMENT: u32 = 1_013_904_223;
