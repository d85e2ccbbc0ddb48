//! Coordinate pipeline and visibility stages
//!
//! A frame's geometry lives in one preallocated [`RenderList`]: a vertex
//! pool, faces that index into it, and a tag recording which coordinate
//! space the pool is currently in. Each stage checks the tag before it runs
//! and advances it afterward:
//!
//! ```text
//! World --world_to_camera--> Camera --clip_near--> Clipped --project--> Screen
//! ```
//!
//! Back-face removal and frustum culling run in camera space; depth sorting
//! runs last, on screen-space vertices that still carry camera depth.

mod clip;
mod cull;
mod list;
mod sort;
mod transform;

pub use clip::*;
pub use cull::*;
pub use list::*;
pub use sort::*;
pub use transform::*;

/// Which space the vertices of a render list are expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSpace {
    /// Objects placed in the world
    World,
    /// Relative to the camera: X right, Y up, Z forward
    Camera,
    /// Camera space with every active face in front of the near plane
    Clipped,
    /// Pixel X/Y, camera depth in Z
    Screen,
}
