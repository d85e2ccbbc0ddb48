//! Scanline Engine: software 3D rasterizer
//!
//! Renders triangle meshes into an in-memory framebuffer, without a GPU:
//! - One scanline triangle filler for every shading and texture mode
//! - Reciprocal depth buffer (1/z)
//! - Affine or perspective-correct texturing, nearest or bilinear
//! - Constant, flat and Gouraud shading with ambient, infinite and point lights
//! - Euler and U-V-N cameras, back-face removal, frustum culling, near clipping
//! - RON scene and settings files
//!
//! The hot path (everything under [`rasterizer`]) never allocates or
//! returns errors; loaders validate scenes before the first frame.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod camera;
pub mod config;
pub mod error;
pub mod lighting;
pub mod math;
pub mod pipeline;
pub mod rasterizer;
pub mod render;
pub mod scene;

pub use camera::{Camera, ViewParams};
pub use config::RasterSettings;
pub use error::{RenderError, RenderResult};
pub use lighting::{Light, LightKind};
pub use rasterizer::{Framebuffer, HEIGHT, WIDTH};
pub use render::{FrameStats, Renderer};
pub use scene::{load_scene, load_scene_from_str, save_scene, Scene};
