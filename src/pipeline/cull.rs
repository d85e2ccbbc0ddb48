//! Back-face removal and frustum culling
//!
//! Both run in camera space, where the camera sits at the origin looking
//! down +Z. The view volume is the intersection of six half-spaces:
//!
//! ```text
//! near <= z <= far,  |x| * dov <= z,  |y| * dov * aspect <= z
//! ```
//!
//! A face or sphere entirely outside any one of them cannot be visible.

use super::{CoordSpace, RenderList};
use crate::camera::ViewParams;
use crate::error::RenderResult;
use crate::math::Vec3;

/// Deactivate faces turned away from the camera: the normal and the vector
/// from the camera to a face vertex point the same way (dot >= 0).
/// Double-sided faces are kept and their normal flipped toward the viewer.
pub fn remove_backfaces(list: &mut RenderList) -> RenderResult<usize> {
    list.require("remove_backfaces", CoordSpace::Camera)?;
    let mut removed = 0;
    for i in 0..list.faces.len() {
        let face = list.faces[i];
        if !face.active {
            continue;
        }
        let to_face = list.vertices[face.indices[0]].pos;
        if face.normal.dot(to_face) >= 0.0 {
            if face.double_sided {
                list.faces[i].normal = -face.normal;
            } else {
                list.faces[i].active = false;
                removed += 1;
            }
        }
    }
    log::trace!("back faces removed: {}", removed);
    Ok(removed)
}

/// The six planes of a view volume, with their normalizing factors
struct Frustum {
    near: f32,
    far: f32,
    kx: f32,
    ky: f32,
    side: f32,
    vert: f32,
}

impl Frustum {
    fn new(view: &ViewParams) -> Self {
        let kx = view.dov();
        let ky = kx * view.aspect();
        Self {
            near: view.near,
            far: view.far,
            kx,
            ky,
            side: (kx * kx + 1.0).sqrt(),
            vert: (ky * ky + 1.0).sqrt(),
        }
    }

    /// Signed distances of a camera-space point to the six planes, positive
    /// outside (near, far, right, left, top, bottom).
    fn distances(&self, p: Vec3) -> [f32; 6] {
        [
            self.near - p.z,
            p.z - self.far,
            (self.kx * p.x - p.z) / self.side,
            (-self.kx * p.x - p.z) / self.side,
            (self.ky * p.y - p.z) / self.vert,
            (-self.ky * p.y - p.z) / self.vert,
        ]
    }
}

/// Deactivate faces that lie entirely outside one plane of the view volume.
pub fn cull_faces(list: &mut RenderList, view: &ViewParams) -> RenderResult<usize> {
    list.require("cull_faces", CoordSpace::Camera)?;
    let frustum = Frustum::new(view);
    let mut culled = 0;
    for i in 0..list.faces.len() {
        if !list.faces[i].active {
            continue;
        }
        let [a, b, c] = list.corners(&list.faces[i]).map(|v| frustum.distances(v.pos));
        let outside = (0..6).any(|p| a[p] > 0.0 && b[p] > 0.0 && c[p] > 0.0);
        if outside {
            list.faces[i].active = false;
            culled += 1;
        }
    }
    log::trace!("faces culled: {}", culled);
    Ok(culled)
}

/// True when a camera-space sphere is entirely outside the view volume.
pub fn sphere_outside(center: Vec3, radius: f32, view: &ViewParams) -> bool {
    Frustum::new(view).distances(center).iter().any(|&d| d > radius)
}
