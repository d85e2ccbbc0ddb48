//! Lighting
//!
//! Lights are defined in world space by the scene. Each frame the renderer
//! derives a camera-space copy with [`Light::to_camera_space`] and passes
//! that copy to [`illuminate`]; the world-space lights are never modified,
//! so nothing has to be restored afterward and re-lighting with the same
//! inputs always gives the same color.

use serde::{Deserialize, Serialize};

use crate::error::RenderResult;
use crate::math::{Mat4, Vec3, EPSILON};
use crate::pipeline::{CoordSpace, RenderList};
use crate::rasterizer::{Color, ShadingMode};

/// Light type and its geometric parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum LightKind {
    /// Uniform light, independent of normals
    Ambient,
    /// Directional light; `direction` points from the light into the scene
    Infinite { direction: Vec3 },
    /// Positioned light with distance attenuation
    /// `intensity / (kc + kl * d + kq * d^2)`. Shading uses the fixed
    /// `direction`, not the direction from the light to each point.
    Point {
        position: Vec3,
        direction: Vec3,
        kc: f32,
        kl: f32,
        kq: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: Color,
    /// 0.0-1.0
    pub intensity: f32,
    pub kind: LightKind,
    #[serde(default = "enabled")]
    pub enabled: bool,
}

fn enabled() -> bool {
    true
}

impl Light {
    fn new(color: Color, intensity: f32, kind: LightKind) -> Self {
        Self {
            color,
            intensity: intensity.clamp(0.0, 1.0),
            kind,
            enabled: true,
        }
    }

    pub fn ambient(color: Color, intensity: f32) -> Self {
        Self::new(color, intensity, LightKind::Ambient)
    }

    pub fn infinite(color: Color, intensity: f32, direction: Vec3) -> Self {
        Self::new(
            color,
            intensity,
            LightKind::Infinite {
                direction: direction.normalize(),
            },
        )
    }

    pub fn point(color: Color, intensity: f32, position: Vec3, direction: Vec3, kc: f32, kl: f32, kq: f32) -> Self {
        Self::new(
            color,
            intensity,
            LightKind::Point {
                position,
                direction: direction.normalize(),
                kc,
                kl,
                kq,
            },
        )
    }

    /// Same light with intensity clamped and direction normalized (for
    /// lights that came from a file rather than a constructor).
    pub fn normalized(self) -> Self {
        let kind = match self.kind {
            LightKind::Ambient => LightKind::Ambient,
            LightKind::Infinite { direction } => LightKind::Infinite {
                direction: direction.normalize(),
            },
            LightKind::Point {
                position,
                direction,
                kc,
                kl,
                kq,
            } => LightKind::Point {
                position,
                direction: direction.normalize(),
                kc,
                kl,
                kq,
            },
        };
        Self {
            intensity: self.intensity.clamp(0.0, 1.0),
            kind,
            ..self
        }
    }

    /// This light expressed in the space `world_to_camera` maps into.
    pub fn to_camera_space(&self, world_to_camera: &Mat4) -> Light {
        let kind = match self.kind {
            LightKind::Ambient => LightKind::Ambient,
            LightKind::Infinite { direction } => LightKind::Infinite {
                direction: world_to_camera.transform_vector(direction).normalize(),
            },
            LightKind::Point {
                position,
                direction,
                kc,
                kl,
                kq,
            } => LightKind::Point {
                position: world_to_camera.transform_point(position),
                direction: world_to_camera.transform_vector(direction).normalize(),
                kc,
                kl,
                kq,
            },
        };
        Light { kind, ..*self }
    }

    /// Scalar contribution (0.0-1.0) of this light at a point with the
    /// given normal.
    pub fn factor(&self, normal: Vec3, point: Vec3) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let f = match self.kind {
            LightKind::Ambient => self.intensity,
            LightKind::Infinite { direction } => self.intensity * (-direction).dot(normal).max(0.0),
            LightKind::Point {
                position,
                direction,
                kc,
                kl,
                kq,
            } => {
                let d = position.distance(point);
                let denom = kc + kl * d + kq * d * d;
                let attenuated = if denom > EPSILON { self.intensity / denom } else { self.intensity };
                attenuated * (-direction).dot(normal).max(0.0)
            }
        };
        f.clamp(0.0, 1.0)
    }
}

/// Lit color of a surface point: for each light,
/// `base * light_color * factor`, summed and clamped per channel.
/// Alpha is kept from `base`.
pub fn illuminate(base: Color, normal: Vec3, point: Vec3, lights: &[Light]) -> Color {
    let (mut r, mut g, mut b) = (0.0f32, 0.0f32, 0.0f32);
    for light in lights {
        let f = light.factor(normal, point);
        if f <= 0.0 {
            continue;
        }
        r += base.r as f32 * light.color.r as f32 / 255.0 * f;
        g += base.g as f32 * light.color.g as f32 / 255.0 * f;
        b += base.b as f32 * light.color.b as f32 / 255.0 * f;
    }
    Color::from_f32(r + 0.5, g + 0.5, b + 0.5, base.a)
}

/// Light the active faces of a near-clipped list with camera-space lights.
///
/// Flat faces get one color from the face normal at the centroid. Gouraud
/// faces light each of their vertices once, from the vertex normal when the
/// mesh has one and otherwise from the mean normal of the Gouraud faces
/// sharing the vertex. Normals are turned toward the face's front, so
/// double-sided faces seen from behind stay lit.
pub fn light_faces(list: &mut RenderList, lights: &[Light]) -> RenderResult<()> {
    list.require("light_faces", CoordSpace::Clipped)?;
    fill_missing_normals(list);
    let (vertices, faces, lit) = list.marked_parts();
    for face in faces.iter_mut().filter(|f| f.active) {
        match face.shading {
            ShadingMode::Constant => {}
            ShadingMode::Flat => {
                let [a, b, c] = face.indices.map(|i| vertices[i].pos);
                let centroid = (a + b + c) * (1.0 / 3.0);
                face.lit = illuminate(face.color, face.normal, centroid, lights);
            }
            ShadingMode::Gouraud => {
                for &i in &face.indices {
                    if lit[i] {
                        continue;
                    }
                    let v = &mut vertices[i];
                    let mut n = match v.normal {
                        Some(n) if n.len_squared() > EPSILON => n,
                        // Opposed faces cancel out
                        _ => face.normal,
                    };
                    if n.dot(face.normal) < 0.0 {
                        n = -n;
                    }
                    v.lit = Some(illuminate(v.color, n, v.pos, lights));
                    lit[i] = true;
                }
            }
        }
    }
    Ok(())
}

/// Give every vertex of an active Gouraud face that has no normal the
/// normalized sum of the normals of the active Gouraud faces using it.
fn fill_missing_normals(list: &mut RenderList) {
    let (vertices, faces, derived) = list.marked_parts();
    for face in faces.iter().filter(|f| f.active && f.shading == ShadingMode::Gouraud) {
        for &i in &face.indices {
            let v = &mut vertices[i];
            match v.normal {
                None => {
                    v.normal = Some(face.normal);
                    derived[i] = true;
                }
                Some(n) if derived[i] => v.normal = Some(n + face.normal),
                Some(_) => {}
            }
        }
    }
    for (v, &d) in vertices.iter_mut().zip(derived.iter()) {
        if d {
            v.normal = v.normal.map(Vec3::normalize);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_infinite_light_faces_normal() {
        let light = Light::infinite(Color::WHITE, 1.0, Vec3::new(0.0, -1.0, 0.0));
        let up = Vec3::UP;
        assert_abs_diff_eq!(light.factor(up, Vec3::ZERO), 1.0, epsilon = 1e-6);
        assert_eq!(light.factor(-up, Vec3::ZERO), 0.0);
        let lit = illuminate(Color::new(200, 100, 50), up, Vec3::ZERO, &[light]);
        assert_eq!(lit, Color::new(200, 100, 50));
    }

    #[test]
    fn test_point_light_attenuates() {
        let light = Light::point(Color::WHITE, 1.0, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 1.0, 0.0, 1.0);
        let n = Vec3::new(0.0, 0.0, -1.0);
        // d = 3: 1 / (1 + 9)
        assert_abs_diff_eq!(light.factor(n, Vec3::new(0.0, 0.0, 3.0)), 0.1, epsilon = 1e-6);
        // Zero coefficients fall back to the raw intensity
        let flat = Light::point(Color::WHITE, 0.5, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.0, 0.0, 0.0);
        assert_abs_diff_eq!(flat.factor(n, Vec3::new(0.0, 0.0, 3.0)), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_intensity_clamped_at_construction() {
        assert_eq!(Light::ambient(Color::WHITE, 4.0).intensity, 1.0);
        assert_eq!(Light::ambient(Color::WHITE, -1.0).intensity, 0.0);
    }

    #[test]
    fn test_lighting_never_overflows() {
        let lights = [
            Light::ambient(Color::WHITE, 1.0),
            Light::infinite(Color::WHITE, 1.0, Vec3::new(0.0, 0.0, 1.0)),
            Light::point(Color::WHITE, 1.0, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 0.0, 0.0, 0.0),
        ];
        let n = Vec3::new(0.0, 0.0, -1.0);
        let lit = illuminate(Color::new(250, 255, 1), n, Vec3::new(0.0, 0.0, 0.1), &lights);
        assert_eq!((lit.r, lit.g), (255, 255));

        // A single light never exceeds the base color
        for &base in &[0u8, 1, 17, 128, 254, 255] {
            for &li in &[0u8, 99, 255] {
                for intensity in [0.0, 0.3, 1.0, 7.0] {
                    let light = Light::ambient(Color::new(li, li, li), intensity);
                    let c = illuminate(Color::new(base, base, base), n, Vec3::ZERO, &[light]);
                    assert!(c.r <= base);
                }
            }
        }
    }

    #[test]
    fn test_illuminate_is_idempotent() {
        let world = [
            Light::infinite(Color::new(255, 200, 100), 0.8, Vec3::new(1.0, -1.0, 0.5)),
            Light::point(Color::WHITE, 1.0, Vec3::new(2.0, 3.0, 4.0), Vec3::new(0.0, -1.0, 0.0), 1.0, 0.1, 0.01),
        ];
        let to_cam = Mat4::rotation_y(30.0) * Mat4::translation(Vec3::new(-1.0, 0.0, 2.0));
        let first: Vec<Light> = world.iter().map(|l| l.to_camera_space(&to_cam)).collect();
        let second: Vec<Light> = world.iter().map(|l| l.to_camera_space(&to_cam)).collect();
        assert_eq!(first, second);

        let base = Color::new(180, 90, 45);
        let n = Vec3::new(0.0, 1.0, 0.0);
        let p = Vec3::new(1.0, 0.0, 5.0);
        let a = illuminate(base, n, p, &first);
        let b = illuminate(base, n, p, &first);
        assert_eq!(a, b);
    }

    #[test]
    fn test_camera_space_direction() {
        let light = Light::infinite(Color::WHITE, 1.0, Vec3::new(1.0, 0.0, 0.0));
        let cam = light.to_camera_space(&Mat4::rotation_y(-90.0));
        match cam.kind {
            LightKind::Infinite { direction } => {
                assert_abs_diff_eq!(direction.z, 1.0, epsilon = 1e-4);
            }
            _ => unreachable!(),
        }
        // World light untouched
        assert_eq!(light.kind, LightKind::Infinite { direction: Vec3::RIGHT });
    }

    #[test]
    fn test_disabled_light_contributes_nothing() {
        let mut light = Light::ambient(Color::WHITE, 1.0);
        light.enabled = false;
        assert_eq!(illuminate(Color::WHITE, Vec3::UP, Vec3::ZERO, &[light]), Color::new(0, 0, 0));
    }

    fn clipped_cube(shading: ShadingMode) -> RenderList {
        use crate::camera::Camera;
        use crate::pipeline::{clip_near, world_to_camera};
        use crate::scene::Mesh;

        let mut list = RenderList::default();
        let cube = Mesh::cube(2.0, Color::new(200, 100, 50)).with_shading(shading);
        list.push_mesh(&cube, &Mat4::translation(Vec3::new(0.0, 0.0, 5.0))).unwrap();
        world_to_camera(&mut list, &Camera::default()).unwrap();
        clip_near(&mut list, 0.1).unwrap();
        list
    }

    #[test]
    fn test_light_faces_flat_uses_face_normal() {
        let mut list = clipped_cube(ShadingMode::Flat);
        // Shines along +Z, straight onto the side facing the camera
        let lights = [Light::infinite(Color::WHITE, 1.0, Vec3::new(0.0, 0.0, 1.0))];
        light_faces(&mut list, &lights).unwrap();
        for face in &list.faces {
            if face.normal.z < -0.99 {
                assert_eq!(face.lit, Color::new(200, 100, 50));
            } else {
                assert_eq!(face.lit, Color::new(0, 0, 0));
            }
        }
    }

    #[test]
    fn test_light_faces_gouraud_lights_vertices() {
        let mut list = clipped_cube(ShadingMode::Gouraud);
        let lights = [Light::ambient(Color::WHITE, 0.5)];
        light_faces(&mut list, &lights).unwrap();
        assert!(list.vertices.iter().all(|v| v.lit == Some(Color::new(100, 50, 25))));
    }

    /// Two Gouraud faces folded along a shared vertical edge, each turned
    /// 45 degrees from the view axis. Vertices carry no normals.
    fn folded_pair(swap: bool) -> RenderList {
        use crate::camera::Camera;
        use crate::pipeline::{clip_near, world_to_camera};
        use crate::scene::{Mesh, MeshFace, MeshVertex};

        let base = Color::new(200, 100, 50);
        let points = [
            Vec3::new(0.0, 1.0, 5.0),
            Vec3::new(0.0, -1.0, 5.0),
            Vec3::new(-1.0, 0.0, 4.0),
            Vec3::new(1.0, 0.0, 4.0),
        ];
        let mut faces = vec![MeshFace::tri(0, 1, 2, base), MeshFace::tri(1, 0, 3, base)];
        if swap {
            faces.reverse();
        }
        let mesh = Mesh {
            vertices: points
                .iter()
                .map(|&p| MeshVertex {
                    color: base,
                    ..MeshVertex::new(p)
                })
                .collect(),
            faces,
        }
        .with_shading(ShadingMode::Gouraud);

        let mut list = RenderList::default();
        list.push_mesh(&mesh, &Mat4::IDENTITY).unwrap();
        world_to_camera(&mut list, &Camera::default()).unwrap();
        clip_near(&mut list, 0.1).unwrap();
        list
    }

    #[test]
    fn test_gouraud_shared_vertex_averages_face_normals() {
        // Straight down the view axis: full strength only on the mean normal
        let lights = [Light::infinite(Color::WHITE, 1.0, Vec3::new(0.0, 0.0, 1.0))];
        for swap in [false, true] {
            let mut list = folded_pair(swap);
            light_faces(&mut list, &lights).unwrap();
            let shared = Some(Color::new(200, 100, 50));
            assert_eq!(list.vertices[0].lit, shared, "swap {}", swap);
            assert_eq!(list.vertices[1].lit, shared, "swap {}", swap);
            // Wing vertices only see their own face: cos 45
            assert_eq!(list.vertices[2].lit, Some(Color::new(141, 71, 35)), "swap {}", swap);
            assert_eq!(list.vertices[3].lit, Some(Color::new(141, 71, 35)), "swap {}", swap);
            let n = list.vertices[0].normal.unwrap();
            assert_abs_diff_eq!(n.z, -1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_light_faces_requires_clipped_list() {
        let mut list = RenderList::default();
        assert!(light_faces(&mut list, &[]).is_err());
    }
}
