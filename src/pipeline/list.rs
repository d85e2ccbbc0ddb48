//! Per-frame working buffers
//!
//! Vertices are copied out of static meshes into the list's pool once per
//! frame and transformed there; faces keep indices into the same pool. The
//! buffers are cleared, not freed, between frames.

use super::CoordSpace;
use crate::error::{RenderError, RenderResult};
use crate::math::{Mat4, Vec2, Vec3};
use crate::rasterizer::{Color, ShadingMode};
use crate::scene::Mesh;

/// A vertex in the working pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub pos: Vec3,
    pub uv: Vec2,
    /// Base color (Gouraud)
    pub color: Color,
    pub normal: Option<Vec3>,
    /// Lit color, filled by the lighting stage for Gouraud faces
    pub lit: Option<Color>,
}

impl Vertex {
    pub fn new(pos: Vec3) -> Self {
        Self {
            pos,
            uv: Vec2::default(),
            color: Color::WHITE,
            normal: None,
            lit: None,
        }
    }

    /// Point at `t` along the segment to `other`, every attribute interpolated.
    pub fn lerp(&self, other: &Vertex, t: f32) -> Vertex {
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t + 0.5) as u8;
        Vertex {
            pos: self.pos.lerp(other.pos, t),
            uv: self.uv.lerp(other.uv, t),
            color: Color::with_alpha(
                mix(self.color.r, other.color.r),
                mix(self.color.g, other.color.g),
                mix(self.color.b, other.color.b),
                mix(self.color.a, other.color.a),
            ),
            normal: match (self.normal, other.normal) {
                (Some(a), Some(b)) => Some(a.lerp(b, t).normalize()),
                _ => None,
            },
            lit: None,
        }
    }
}

/// A triangle in the working list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub indices: [usize; 3],
    /// Inactive faces are skipped by every later stage
    pub active: bool,
    pub shading: ShadingMode,
    pub texture: Option<usize>,
    pub color: Color,
    /// Unit normal, recomputed whenever the list changes space
    pub normal: Vec3,
    pub translucent: bool,
    pub double_sided: bool,
    /// Flat-shaded color, filled by the lighting stage
    pub lit: Color,
}

/// Vertex pool, faces and draw order for one frame
#[derive(Debug)]
pub struct RenderList {
    pub vertices: Vec<Vertex>,
    pub faces: Vec<Face>,
    /// Indices of faces to rasterize, in drawing order
    pub order: Vec<usize>,
    /// Per-vertex scratch flags for stages that visit shared vertices once
    marks: Vec<bool>,
    /// Counting-sort scratch
    pub(crate) sort_counts: Vec<usize>,
    pub(crate) sort_tmp: Vec<usize>,
    space: CoordSpace,
}

impl Default for RenderList {
    fn default() -> Self {
        Self::with_capacity(0, 0)
    }
}

impl RenderList {
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
            order: Vec::with_capacity(faces),
            marks: Vec::with_capacity(vertices),
            sort_counts: Vec::new(),
            sort_tmp: Vec::with_capacity(faces),
            space: CoordSpace::World,
        }
    }

    /// Empty the list for a new frame, keeping its allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
        self.order.clear();
        self.space = CoordSpace::World;
    }

    pub fn space(&self) -> CoordSpace {
        self.space
    }

    /// Fail unless the list is in `expected` space.
    pub fn require(&self, stage: &'static str, expected: CoordSpace) -> RenderResult<()> {
        if self.space == expected {
            Ok(())
        } else {
            Err(RenderError::StageOrder {
                stage,
                expected,
                found: self.space,
            })
        }
    }

    pub(crate) fn set_space(&mut self, space: CoordSpace) {
        self.space = space;
    }

    /// Split borrow of the pool, the faces and a cleared mark per vertex.
    pub(crate) fn marked_parts(&mut self) -> (&mut [Vertex], &mut [Face], &mut [bool]) {
        self.marks.clear();
        self.marks.resize(self.vertices.len(), false);
        (&mut self.vertices, &mut self.faces, &mut self.marks)
    }

    /// Copy a mesh into the pool, moving it from object to world space.
    /// Returns the index of its first face.
    pub fn push_mesh(&mut self, mesh: &Mesh, local_to_world: &Mat4) -> RenderResult<usize> {
        self.require("push_mesh", CoordSpace::World)?;
        let base = self.vertices.len();
        let first_face = self.faces.len();

        self.vertices.extend(mesh.vertices.iter().map(|v| Vertex {
            pos: local_to_world.transform_point(v.pos),
            uv: v.uv,
            color: v.color,
            normal: v.normal.map(|n| local_to_world.transform_vector(n).normalize()),
            lit: None,
        }));

        for f in &mesh.faces {
            let indices = f.indices.map(|i| base + i);
            self.faces.push(Face {
                indices,
                active: true,
                shading: f.shading,
                texture: f.texture,
                color: f.color,
                normal: Vec3::ZERO,
                translucent: f.translucent,
                double_sided: f.double_sided,
                lit: f.color,
            });
        }
        self.update_normals_from(first_face);
        Ok(first_face)
    }

    /// Append a single face; used by clipping to add split triangles.
    pub fn push_face(&mut self, face: Face) -> usize {
        self.faces.push(face);
        self.faces.len() - 1
    }

    pub fn push_vertex(&mut self, vertex: Vertex) -> usize {
        self.vertices.push(vertex);
        self.vertices.len() - 1
    }

    /// The three vertices of a face
    #[inline]
    pub fn corners(&self, face: &Face) -> [Vertex; 3] {
        face.indices.map(|i| self.vertices[i])
    }

    /// Recompute unit normals of faces starting at `first`, from their
    /// edge vectors: `(v1 - v0) x (v2 - v0)`.
    pub fn update_normals_from(&mut self, first: usize) {
        for i in first..self.faces.len() {
            let [a, b, c] = self.faces[i].indices.map(|idx| self.vertices[idx].pos);
            self.faces[i].normal = (b - a).cross(c - a).normalize();
        }
    }

    /// Mean depth (Z) of a face's vertices
    pub fn face_depth(&self, face: &Face) -> f32 {
        let [a, b, c] = self.corners(face);
        (a.pos.z + b.pos.z + c.pos.z) * (1.0 / 3.0)
    }
}
