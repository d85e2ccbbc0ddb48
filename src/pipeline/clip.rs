//! Near-plane clipping
//!
//! Faces crossing `z = near` are cut against the plane instead of being
//! dropped. New vertices are placed where the edges cross the plane, with
//! every attribute interpolated at the same parameter:
//!
//! - two vertices behind: the face shrinks to the triangle in front,
//! - one vertex behind: the remaining quad is split into two triangles
//!   (the face itself plus one appended face).
//!
//! Winding order is preserved in both cases, so clipped faces stay front
//! facing.

use super::{CoordSpace, Face, RenderList, Vertex};
use crate::error::RenderResult;

/// Parameter along `a -> b` where the segment crosses `z = near`.
#[inline]
fn crossing(a: &Vertex, b: &Vertex, near: f32) -> f32 {
    (near - a.pos.z) / (b.pos.z - a.pos.z)
}

/// Clip every active face against the near plane. Faces entirely behind it
/// are deactivated. Returns how many faces were cut or dropped.
pub fn clip_near(list: &mut RenderList, near: f32) -> RenderResult<usize> {
    list.require("clip_near", CoordSpace::Camera)?;
    let mut clipped = 0;
    let face_count = list.faces.len();

    for i in 0..face_count {
        let face = list.faces[i];
        if !face.active {
            continue;
        }
        let corners = list.corners(&face);
        let inside = corners.map(|v| v.pos.z >= near);
        let inside_count = inside.iter().filter(|&&b| b).count();

        match inside_count {
            3 => {}
            0 => {
                list.faces[i].active = false;
                clipped += 1;
            }
            1 => {
                // Rotate so the vertex in front comes first
                let k = inside.iter().position(|&b| b).unwrap_or(0);
                let [a, b, c] = rotate(face.indices, k);
                let (va, vb, vc) = (list.vertices[a], list.vertices[b], list.vertices[c]);
                let ab = list.push_vertex(va.lerp(&vb, crossing(&va, &vb, near)));
                let ac = list.push_vertex(va.lerp(&vc, crossing(&va, &vc, near)));
                list.faces[i].indices = [a, ab, ac];
                clipped += 1;
            }
            _ => {
                // Rotate so the vertex behind comes first
                let k = inside.iter().position(|&b| !b).unwrap_or(0);
                let [o, b, c] = rotate(face.indices, k);
                let (vo, vb, vc) = (list.vertices[o], list.vertices[b], list.vertices[c]);
                let ob = list.push_vertex(vo.lerp(&vb, crossing(&vo, &vb, near)));
                let oc = list.push_vertex(vo.lerp(&vc, crossing(&vo, &vc, near)));
                list.faces[i].indices = [ob, b, c];
                let split = Face {
                    indices: [ob, c, oc],
                    ..list.faces[i]
                };
                list.push_face(split);
                clipped += 1;
            }
        }
    }

    log::trace!("faces clipped at near plane: {}", clipped);
    list.set_space(CoordSpace::Clipped);
    Ok(clipped)
}

/// Cyclic rotation of a face's indices starting at position `k`.
fn rotate(indices: [usize; 3], k: usize) -> [usize; 3] {
    [indices[k % 3], indices[(k + 1) % 3], indices[(k + 2) % 3]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;
    use crate::math::{Mat4, Vec2, Vec3};
    use crate::pipeline::world_to_camera;
    use crate::rasterizer::Color;
    use crate::scene::{Mesh, MeshFace, MeshVertex};
    use approx::assert_abs_diff_eq;

    const NEAR: f32 = 1.0;

    fn camera_list(points: [Vec3; 3]) -> RenderList {
        let mut mesh = Mesh {
            vertices: points.iter().map(|&p| MeshVertex::new(p)).collect(),
            faces: vec![MeshFace::tri(0, 1, 2, Color::WHITE)],
        };
        for (i, v) in mesh.vertices.iter_mut().enumerate() {
            v.uv = Vec2::new(i as f32 * 0.5, 0.0);
        }
        let mut list = RenderList::default();
        list.push_mesh(&mesh, &Mat4::IDENTITY).unwrap();
        world_to_camera(&mut list, &Camera::default()).unwrap();
        list
    }

    fn winding(list: &RenderList, face: &Face) -> Vec3 {
        let [a, b, c] = list.corners(face).map(|v| v.pos);
        (b - a).cross(c - a)
    }

    #[test]
    fn test_face_in_front_untouched() {
        let mut list = camera_list([Vec3::new(0.0, 1.0, 5.0), Vec3::new(1.0, -1.0, 5.0), Vec3::new(-1.0, -1.0, 5.0)]);
        assert_eq!(clip_near(&mut list, NEAR).unwrap(), 0);
        assert_eq!(list.faces.len(), 1);
        assert_eq!(list.vertices.len(), 3);
    }

    #[test]
    fn test_face_behind_dropped() {
        let mut list = camera_list([Vec3::new(0.0, 1.0, -5.0), Vec3::new(1.0, -1.0, 0.5), Vec3::new(-1.0, -1.0, 0.0)]);
        assert_eq!(clip_near(&mut list, NEAR).unwrap(), 1);
        assert!(!list.faces[0].active);
    }

    #[test]
    fn test_two_behind_shrinks_to_one_triangle() {
        // Apex in front at z = 3, base behind at z = -1
        let mut list = camera_list([Vec3::new(0.0, 1.0, 3.0), Vec3::new(1.0, -1.0, -1.0), Vec3::new(-1.0, -1.0, -1.0)]);
        let before = winding(&list, &list.faces[0]);
        assert_eq!(clip_near(&mut list, NEAR).unwrap(), 1);
        assert_eq!(list.faces.len(), 1);
        let face = list.faces[0];
        for v in list.corners(&face) {
            assert!(v.pos.z >= NEAR - 1e-5);
        }
        // Crossing halfway along each edge
        let [_, ab, ac] = list.corners(&face);
        assert_abs_diff_eq!(ab.pos.z, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(ab.pos.x, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(ab.uv.x, 0.25, epsilon = 1e-5);
        assert_abs_diff_eq!(ac.pos.x, -0.5, epsilon = 1e-5);
        assert!(winding(&list, &face).dot(before) > 0.0);
    }

    #[test]
    fn test_one_behind_splits_into_two() {
        let mut list = camera_list([Vec3::new(0.0, 1.0, -1.0), Vec3::new(1.0, -1.0, 3.0), Vec3::new(-1.0, -1.0, 3.0)]);
        let before = winding(&list, &list.faces[0]);
        assert_eq!(clip_near(&mut list, NEAR).unwrap(), 1);
        assert_eq!(list.faces.len(), 2);
        assert_eq!(list.vertices.len(), 5);
        for face in &list.faces {
            assert!(face.active);
            for v in list.corners(face) {
                assert!(v.pos.z >= NEAR - 1e-5);
            }
            assert!(winding(&list, face).dot(before) > 0.0);
        }
        assert_eq!(list.space(), CoordSpace::Clipped);
    }
}
