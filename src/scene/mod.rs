//! Scene description: objects, lights, textures and the starting camera
//!
//! Scenes are plain data, stored as RON. Everything is checked when a scene
//! is loaded, so the renderer never meets a dangling index.

mod loader;
mod mesh;

pub use loader::*;
pub use mesh::*;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::camera::{Camera, ViewParams};
use crate::error::{RenderError, RenderResult};
use crate::lighting::Light;
use crate::math::{Mat4, Vec3};
use crate::rasterizer::{Color, ShadingMode, Texture};

fn one() -> f32 {
    1.0
}

/// Where an object's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MeshSource {
    Cube { size: f32, color: Color },
    Quad { width: f32, depth: f32, color: Color },
    Custom(Mesh),
}

impl MeshSource {
    pub fn build(&self) -> Mesh {
        match self {
            MeshSource::Cube { size, color } => Mesh::cube(*size, *color),
            MeshSource::Quad { width, depth, color } => Mesh::quad(*width, *depth, *color),
            MeshSource::Custom(mesh) => mesh.clone(),
        }
    }
}

/// A placed mesh. Rotation is baked into the object-space mesh when the
/// object is prepared; position and uniform scale are applied per frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Object {
    pub name: String,
    pub mesh: MeshSource,
    #[serde(default)]
    pub position: Vec3,
    /// Euler angles in degrees (X, then Y, then Z)
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "one")]
    pub scale: f32,
    /// Overrides applied to every face
    #[serde(default)]
    pub shading: Option<ShadingMode>,
    #[serde(default)]
    pub texture: Option<usize>,
    #[serde(default)]
    pub translucent: bool,

    #[serde(skip)]
    baked: Mesh,
    #[serde(skip)]
    radius: f32,
}

impl Object {
    pub fn new(name: &str, mesh: MeshSource) -> Self {
        let mut object = Self {
            name: name.to_string(),
            mesh,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.0,
            shading: None,
            texture: None,
            translucent: false,
            baked: Mesh::default(),
            radius: 0.0,
        };
        object.prepare();
        object
    }

    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Vec3) -> Self {
        self.rotation = rotation;
        self.prepare();
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = Some(shading);
        self.prepare();
        self
    }

    pub fn with_texture(mut self, texture: usize) -> Self {
        self.texture = Some(texture);
        self.prepare();
        self
    }

    pub fn with_translucent(mut self, translucent: bool) -> Self {
        self.translucent = translucent;
        self.prepare();
        self
    }

    /// Rebuild the object-space mesh from the source, overrides and rotation.
    pub fn prepare(&mut self) {
        let mut mesh = self.mesh.build();
        if let Some(shading) = self.shading {
            mesh = mesh.with_shading(shading);
        }
        if let Some(texture) = self.texture {
            mesh = mesh.with_texture(texture);
        }
        if self.translucent {
            mesh = mesh.with_translucent(true);
        }
        if self.rotation != Vec3::ZERO {
            mesh = mesh.transformed(&Mat4::rotation_xyz(self.rotation));
        }
        self.radius = mesh.bounding_radius();
        self.baked = mesh;
    }

    /// Object-space mesh with rotation applied
    pub fn mesh(&self) -> &Mesh {
        &self.baked
    }

    pub fn local_to_world(&self) -> Mat4 {
        Mat4::translation(self.position) * Mat4::scale(Vec3::new(self.scale, self.scale, self.scale))
    }

    /// World-space radius of the sphere around `position` enclosing the object
    pub fn bounding_radius(&self) -> f32 {
        self.radius * self.scale.abs()
    }
}

/// Texture slot contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TextureSource {
    /// Image file, relative to the scene file
    File(String),
    Checkerboard { size: usize, a: Color, b: Color },
    Solid { size: usize, color: Color },
}

/// Starting camera
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CameraSetup {
    Euler {
        position: Vec3,
        pitch: f32,
        yaw: f32,
        #[serde(default)]
        roll: f32,
    },
    LookAt {
        position: Vec3,
        target: Vec3,
    },
    Spherical {
        position: Vec3,
        elevation: f32,
        heading: f32,
    },
}

impl Default for CameraSetup {
    fn default() -> Self {
        CameraSetup::Euler {
            position: Vec3::new(0.0, 2.0, -8.0),
            pitch: -10.0,
            yaw: 0.0,
            roll: 0.0,
        }
    }
}

impl CameraSetup {
    pub fn build(&self, view: ViewParams) -> Camera {
        match *self {
            CameraSetup::Euler {
                position,
                pitch,
                yaw,
                roll,
            } => Camera::euler(position, pitch, yaw, roll, view),
            CameraSetup::LookAt { position, target } => Camera::look_at(position, target, Vec3::UP, view),
            CameraSetup::Spherical {
                position,
                elevation,
                heading,
            } => Camera::spherical(position, elevation, heading, view),
        }
    }
}

/// A complete scene
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub textures: Vec<TextureSource>,
    #[serde(default)]
    pub objects: Vec<Object>,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub camera: CameraSetup,

    /// Decoded textures, one per entry of `textures`
    #[serde(skip)]
    pub loaded: Vec<Texture>,
}

impl Scene {
    /// Bake object meshes and normalize lights after deserialization.
    pub fn prepare(&mut self) {
        for object in &mut self.objects {
            object.prepare();
        }
        for light in &mut self.lights {
            *light = light.normalized();
        }
    }

    /// Decode every texture slot. File paths are resolved against `base`.
    pub fn load_textures(&mut self, base: &Path) -> RenderResult<()> {
        self.loaded.clear();
        for source in &self.textures {
            let texture = match source {
                TextureSource::File(path) => Texture::from_file(base.join(path))?,
                TextureSource::Checkerboard { size, a, b } => Texture::checkerboard(*size, *size, *a, *b),
                TextureSource::Solid { size, color } => Texture::solid(*size, *size, *color),
            };
            if texture.width == 0 || texture.height == 0 {
                return Err(RenderError::InvalidBitmap(format!("texture slot {} is empty", self.loaded.len())));
            }
            self.loaded.push(texture);
        }
        Ok(())
    }

    /// Reject scenes the pipeline cannot render.
    pub fn validate(&self) -> RenderResult<()> {
        for object in &self.objects {
            if !(object.scale > 0.0 && object.scale.is_finite()) {
                return Err(RenderError::InvalidConfig(format!(
                    "object '{}': scale must be positive, got {}",
                    object.name, object.scale
                )));
            }
            object.mesh().validate(&object.name, self.textures.len())?;
        }
        for (i, light) in self.lights.iter().enumerate() {
            if !light.intensity.is_finite() {
                return Err(RenderError::InvalidConfig(format!("light {}: intensity is not finite", i)));
            }
        }
        Ok(())
    }

    /// Built-in scene used when no scene file is available: a textured
    /// floor, an opaque cube per shading mode and a translucent cube.
    pub fn demo() -> Scene {
        let mut scene = Scene {
            textures: vec![
                TextureSource::Checkerboard {
                    size: 64,
                    a: Color::new(200, 200, 200),
                    b: Color::new(60, 60, 80),
                },
                TextureSource::Checkerboard {
                    size: 32,
                    a: Color::new(255, 220, 120),
                    b: Color::new(180, 90, 40),
                },
            ],
            objects: vec![
                Object::new(
                    "floor",
                    MeshSource::Quad {
                        width: 20.0,
                        depth: 20.0,
                        color: Color::WHITE,
                    },
                )
                .with_texture(0)
                .with_shading(ShadingMode::Flat)
                .with_position(Vec3::new(0.0, -1.0, 0.0)),
                Object::new(
                    "flat_cube",
                    MeshSource::Cube {
                        size: 2.0,
                        color: Color::new(220, 60, 60),
                    },
                )
                .with_shading(ShadingMode::Flat)
                .with_position(Vec3::new(-3.0, 0.0, 2.0)),
                Object::new(
                    "gouraud_cube",
                    MeshSource::Cube {
                        size: 2.0,
                        color: Color::new(60, 200, 90),
                    },
                )
                .with_shading(ShadingMode::Gouraud)
                .with_rotation(Vec3::new(0.0, 45.0, 0.0))
                .with_position(Vec3::new(0.0, 0.0, 4.0)),
                Object::new(
                    "textured_cube",
                    MeshSource::Cube {
                        size: 2.0,
                        color: Color::WHITE,
                    },
                )
                .with_texture(1)
                .with_shading(ShadingMode::Gouraud)
                .with_rotation(Vec3::new(20.0, 30.0, 0.0))
                .with_position(Vec3::new(3.0, 0.0, 2.0)),
                Object::new(
                    "glass_cube",
                    MeshSource::Cube {
                        size: 1.5,
                        color: Color::new(80, 140, 255),
                    },
                )
                .with_translucent(true)
                .with_position(Vec3::new(0.0, 0.5, 0.0)),
            ],
            lights: vec![
                Light::ambient(Color::WHITE, 0.3),
                Light::infinite(Color::new(255, 240, 220), 0.8, Vec3::new(-1.0, -2.0, 1.0)),
                Light::point(
                    Color::new(255, 180, 120),
                    1.0,
                    Vec3::new(0.0, 3.0, 0.0),
                    Vec3::new(0.0, -1.0, 0.0),
                    1.0,
                    0.05,
                    0.01,
                ),
            ],
            camera: CameraSetup::default(),
            loaded: Vec::new(),
        };
        scene.prepare();
        if let Err(e) = scene.load_textures(Path::new(".")) {
            // Only generated textures are used here
            log::warn!("demo scene textures failed to load: {}", e);
        }
        scene
    }
}
