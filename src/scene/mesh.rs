//! Static mesh definitions
//!
//! Pure data: vertices and faces in object space. Faces are triangles that
//! reference vertices by index; front faces wind clockwise as seen by the
//! viewer.

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::math::{Mat4, Vec2, Vec3};
use crate::rasterizer::{Color, ShadingMode};

fn white() -> Color {
    Color::WHITE
}

/// A mesh vertex
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshVertex {
    pub pos: Vec3,
    /// Normalized texture coordinate (0..1)
    #[serde(default)]
    pub uv: Vec2,
    /// Base color for Gouraud shading
    #[serde(default = "white")]
    pub color: Color,
    /// Optional vertex normal; Gouraud faces use the mean of the
    /// normals of the faces sharing the vertex when absent
    #[serde(default)]
    pub normal: Option<Vec3>,
}

impl MeshVertex {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            uv: Vec2::default(),
            color: Color::WHITE,
            normal: None,
        }
    }
}

/// A triangle referencing three vertices of its mesh
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeshFace {
    pub indices: [usize; 3],
    #[serde(default)]
    pub shading: ShadingMode,
    /// Texture slot in the scene's texture list
    #[serde(default)]
    pub texture: Option<usize>,
    /// Face color for constant and flat shading
    #[serde(default = "white")]
    pub color: Color,
    /// Drawn blended, after all opaque faces
    #[serde(default)]
    pub translucent: bool,
    /// Never removed as a back face
    #[serde(default)]
    pub double_sided: bool,
}

impl MeshFace {
    pub fn tri(v0: usize, v1: usize, v2: usize, color: Color) -> Self {
        Self {
            indices: [v0, v1, v2],
            shading: ShadingMode::default(),
            texture: None,
            color,
            translucent: false,
            double_sided: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub faces: Vec<MeshFace>,
}

impl Mesh {
    /// Append a quad as two triangles. Corners go `c - t - b`, `c - t + b`,
    /// `c + t + b`, `c + t - b`; with `b x t` pointing outward the quad is
    /// clockwise from outside.
    fn push_quad(&mut self, center: Vec3, t: Vec3, b: Vec3, color: Color) {
        let base = self.vertices.len();
        let normal = b.cross(t).normalize();
        let corners = [
            (center - t - b, Vec2::new(0.0, 0.0)),
            (center - t + b, Vec2::new(0.0, 1.0)),
            (center + t + b, Vec2::new(1.0, 1.0)),
            (center + t - b, Vec2::new(1.0, 0.0)),
        ];
        for (pos, uv) in corners {
            self.vertices.push(MeshVertex {
                pos,
                uv,
                color,
                normal: Some(normal),
            });
        }
        self.faces.push(MeshFace::tri(base, base + 1, base + 2, color));
        self.faces.push(MeshFace::tri(base, base + 2, base + 3, color));
    }

    /// Axis-aligned cube centred on the origin, four vertices per side so
    /// each side gets its own normal and texture coordinates.
    pub fn cube(size: f32, color: Color) -> Self {
        let h = size * 0.5;
        let x = Vec3::new(h, 0.0, 0.0);
        let y = Vec3::new(0.0, h, 0.0);
        let z = Vec3::new(0.0, 0.0, h);

        let mut mesh = Mesh::default();
        // (outward offset, t, b) with b x t = outward
        let sides = [
            (x, z, y),
            (-x, -z, y),
            (y, x, z),
            (-y, -x, z),
            (z, y, x),
            (-z, -y, x),
        ];
        for (n, t, b) in sides {
            mesh.push_quad(n, t, b, color);
        }
        mesh
    }

    /// Horizontal quad in the XZ plane facing +Y (a floor).
    pub fn quad(width: f32, depth: f32, color: Color) -> Self {
        let mut mesh = Mesh::default();
        mesh.push_quad(
            Vec3::ZERO,
            Vec3::new(width * 0.5, 0.0, 0.0),
            Vec3::new(0.0, 0.0, depth * 0.5),
            color,
        );
        mesh
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        for face in &mut self.faces {
            face.shading = shading;
        }
        self
    }

    pub fn with_texture(mut self, texture: usize) -> Self {
        for face in &mut self.faces {
            face.texture = Some(texture);
        }
        self
    }

    pub fn with_translucent(mut self, translucent: bool) -> Self {
        for face in &mut self.faces {
            face.translucent = translucent;
        }
        self
    }

    /// Apply a transform to positions and normals.
    pub fn transformed(mut self, m: &Mat4) -> Self {
        for v in &mut self.vertices {
            v.pos = m.transform_point(v.pos);
            v.normal = v.normal.map(|n| m.transform_vector(n).normalize());
        }
        self
    }

    /// Radius of the origin-centred sphere enclosing every vertex
    pub fn bounding_radius(&self) -> f32 {
        self.vertices.iter().map(|v| v.pos.len()).fold(0.0, f32::max)
    }

    /// Check every face index against the vertex pool and every texture
    /// slot against the number of textures available.
    pub fn validate(&self, object: &str, textures: usize) -> RenderResult<()> {
        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face.indices.iter().find(|&&i| i >= vertex_count) {
                return Err(RenderError::InvalidMesh {
                    object: object.to_string(),
                    face: face_idx,
                    index,
                    vertex_count,
                });
            }
            if let Some(texture) = face.texture.filter(|&t| t >= textures) {
                return Err(RenderError::InvalidTexture {
                    object: object.to_string(),
                    face: face_idx,
                    texture,
                    loaded: textures,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn face_normal(mesh: &Mesh, face: &MeshFace) -> Vec3 {
        let [a, b, c] = face.indices.map(|i| mesh.vertices[i].pos);
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn test_cube_winding_points_outward() {
        let mesh = Mesh::cube(2.0, Color::WHITE);
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.faces.len(), 12);
        for face in &mesh.faces {
            let n = face_normal(&mesh, face);
            let center = face
                .indices
                .iter()
                .fold(Vec3::ZERO, |acc, &i| acc + mesh.vertices[i].pos)
                * (1.0 / 3.0);
            // Outward: normal points away from the cube center
            assert!(n.dot(center) > 0.0);
            let vn = mesh.vertices[face.indices[0]].normal.unwrap();
            assert_abs_diff_eq!(n.dot(vn), 1.0, epsilon = 1e-5);
        }
        assert_abs_diff_eq!(mesh.bounding_radius(), 3.0f32.sqrt(), epsilon = 1e-5);
    }

    #[test]
    fn test_quad_faces_up() {
        let mesh = Mesh::quad(4.0, 2.0, Color::RED);
        for face in &mesh.faces {
            let n = face_normal(&mesh, face);
            assert_abs_diff_eq!(n.y, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_validate_catches_bad_index() {
        let mut mesh = Mesh::cube(1.0, Color::WHITE);
        assert!(mesh.validate("cube", 0).is_ok());
        mesh.faces[5].indices[1] = 99;
        match mesh.validate("cube", 0) {
            Err(RenderError::InvalidMesh { face, index, vertex_count, .. }) => {
                assert_eq!((face, index, vertex_count), (5, 99, 24));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validate_catches_missing_texture() {
        let mesh = Mesh::quad(1.0, 1.0, Color::WHITE).with_texture(2);
        assert!(mesh.validate("floor", 3).is_ok());
        assert!(matches!(
            mesh.validate("floor", 2),
            Err(RenderError::InvalidTexture { texture: 2, loaded: 2, .. })
        ));
    }

    #[test]
    fn test_transformed_rotates_normals() {
        let mesh = Mesh::quad(1.0, 1.0, Color::WHITE).transformed(&Mat4::rotation_x(90.0));
        let n = mesh.vertices[0].normal.unwrap();
        assert_abs_diff_eq!(n.z, 1.0, epsilon = 1e-4);
    }
}
