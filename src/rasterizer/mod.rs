//! Software rasterizer
//!
//! Features:
//! - One scanline algorithm for every mode (see [`draw_triangle`])
//! - Reciprocal depth buffer (1/z, nearer wins)
//! - Affine or perspective-correct texture mapping
//! - Constant, flat and Gouraud shading
//! - Nearest or bilinear filtering, fixed-ratio alpha blending

mod bitmap;
mod framebuffer;
mod shader;
mod triangle;
mod types;

pub use bitmap::*;
pub use framebuffer::*;
pub use shader::*;
pub use triangle::*;
pub use types::*;

/// Default viewport dimensions
pub const WIDTH: usize = 320;
pub const HEIGHT: usize = 240;
