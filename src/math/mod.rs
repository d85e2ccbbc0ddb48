//! Vector, matrix and table-driven trigonometry for the pipeline
//!
//! Angles are in degrees everywhere outside this module. Rotation code goes
//! through the lookup table rather than calling `sin`/`cos` directly.

mod matrix;
mod trig;
mod vector;

pub use matrix::*;
pub use trig::*;
pub use vector::*;

/// Tolerance used by the geometric guards (edge lengths, normal lengths).
pub const EPSILON: f32 = 1e-5;
