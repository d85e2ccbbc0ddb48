//! World to camera and camera to screen transforms

use super::{CoordSpace, RenderList};
use crate::camera::{Camera, ViewParams};
use crate::error::RenderResult;

/// Move every vertex (and normal) of the list into camera space.
pub fn world_to_camera(list: &mut RenderList, camera: &Camera) -> RenderResult<()> {
    list.require("world_to_camera", CoordSpace::World)?;
    let m = camera.world_to_camera();
    for v in &mut list.vertices {
        v.pos = m.transform_point(v.pos);
        v.normal = v.normal.map(|n| m.transform_vector(n).normalize());
    }
    list.update_normals_from(0);
    list.set_space(CoordSpace::Camera);
    Ok(())
}

/// Project the vertices of active faces onto the screen. Depth stays in Z.
///
/// Requires a near-clipped list, so every vertex an active face uses has
/// positive depth. Vertices only referenced by inactive faces are left in
/// camera space.
pub fn project(list: &mut RenderList, view: &ViewParams) -> RenderResult<()> {
    list.require("project", CoordSpace::Clipped)?;
    let projector = view.projector();
    let (vertices, faces, projected) = list.marked_parts();
    for face in faces.iter().filter(|f| f.active) {
        for &i in &face.indices {
            if !projected[i] {
                vertices[i].pos = projector.project(vertices[i].pos);
                projected[i] = true;
            }
        }
    }
    list.set_space(CoordSpace::Screen);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Mat4, Vec3};
    use crate::pipeline::clip_near;
    use crate::rasterizer::Color;
    use crate::scene::Mesh;
    use approx::assert_abs_diff_eq;

    fn view() -> ViewParams {
        ViewParams {
            fov: 90.0,
            near: 0.5,
            far: 100.0,
            width: 100,
            height: 100,
        }
    }

    #[test]
    fn test_world_to_camera_moves_vertices_and_normals() {
        let mut list = RenderList::default();
        list.push_mesh(&Mesh::quad(2.0, 2.0, Color::WHITE), &Mat4::IDENTITY).unwrap();
        // Looking along +X from x = -5
        let cam = Camera::euler(Vec3::new(-5.0, 0.0, 0.0), 0.0, 90.0, 0.0, view());
        world_to_camera(&mut list, &cam).unwrap();
        assert_eq!(list.space(), CoordSpace::Camera);
        for v in &list.vertices {
            // World x of -1 or 1 becomes depth 4 or 6
            assert!((v.pos.z - 4.0).abs() < 1e-4 || (v.pos.z - 6.0).abs() < 1e-4);
            assert_abs_diff_eq!(v.pos.y, 0.0, epsilon = 1e-5);
            assert_abs_diff_eq!(v.normal.unwrap().y, 1.0, epsilon = 1e-4);
        }
        for f in &list.faces {
            assert_abs_diff_eq!(f.normal.y, 1.0, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_stage_order_enforced() {
        let mut list = RenderList::default();
        assert!(project(&mut list, &view()).is_err());
        let cam = Camera::default();
        world_to_camera(&mut list, &cam).unwrap();
        assert!(world_to_camera(&mut list, &cam).is_err());
        assert!(project(&mut list, &view()).is_err());
        clip_near(&mut list, 0.5).unwrap();
        project(&mut list, &view()).unwrap();
        assert_eq!(list.space(), CoordSpace::Screen);
    }

    #[test]
    fn test_shared_vertices_projected_once() {
        let mut list = RenderList::default();
        let quad = Mesh::quad(2.0, 2.0, Color::WHITE).transformed(&Mat4::rotation_x(-90.0));
        list.push_mesh(&quad, &Mat4::translation(Vec3::new(0.0, 0.0, 10.0))).unwrap();
        world_to_camera(&mut list, &Camera::euler(Vec3::ZERO, 0.0, 0.0, 0.0, view())).unwrap();
        clip_near(&mut list, 0.5).unwrap();
        project(&mut list, &view()).unwrap();
        // Corner (1, 1, 10) maps to 50 + 1/10 * 50 on both axes
        let corner = list
            .vertices
            .iter()
            .find(|v| v.pos.x > 50.0 && v.pos.y > 50.0)
            .unwrap();
        assert_abs_diff_eq!(corner.pos.x, 55.0, epsilon = 1e-3);
        assert_abs_diff_eq!(corner.pos.y, 55.0, epsilon = 1e-3);
        assert_abs_diff_eq!(corner.pos.z, 10.0, epsilon = 1e-4);
    }
}
