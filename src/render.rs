//! Per-frame orchestration
//!
//! A frame runs the stages in a fixed order over one reused render list:
//!
//! 1. Clear color and depth.
//! 2. Copy every object whose bounding sphere touches the view volume into
//!    the list, in world space.
//! 3. World to camera, back-face removal, frustum culling, near clipping.
//! 4. Lighting with camera-space copies of the scene's lights.
//! 5. Projection, depth ordering, scan conversion.

use crate::camera::{Camera, ViewParams};
use crate::config::RasterSettings;
use crate::error::RenderResult;
use crate::lighting::{light_faces, Light};
use crate::pipeline::{clip_near, cull_faces, project, remove_backfaces, sort_faces, sphere_outside, world_to_camera, RenderList};
use crate::rasterizer::{draw_triangle, BlendMode, Framebuffer, RasterMode, ScreenVertex, ShadingMode, TexelView, TextureMode};
use crate::scene::Scene;

/// What happened to the geometry of one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Objects skipped whole by the bounding-sphere test
    pub objects_culled: usize,
    pub faces_backfacing: usize,
    /// Faces outside the view volume
    pub faces_culled: usize,
    /// Faces cut or dropped at the near plane
    pub faces_clipped: usize,
    /// Faces handed to the scan converter
    pub faces_rasterized: usize,
    pub pixels_drawn: usize,
}

/// Owns the framebuffer and the per-frame working buffers
pub struct Renderer {
    settings: RasterSettings,
    framebuffer: Framebuffer,
    list: RenderList,
    lights: Vec<Light>,
}

impl Renderer {
    pub fn new(settings: RasterSettings) -> RenderResult<Self> {
        settings.validate()?;
        Ok(Self {
            framebuffer: Framebuffer::new(settings.width, settings.height),
            settings,
            list: RenderList::with_capacity(4096, 2048),
            lights: Vec::new(),
        })
    }

    pub fn settings(&self) -> &RasterSettings {
        &self.settings
    }

    /// Replace the settings, resizing the framebuffer if needed.
    pub fn set_settings(&mut self, settings: RasterSettings) -> RenderResult<()> {
        settings.validate()?;
        if settings.width != self.framebuffer.width || settings.height != self.framebuffer.height {
            self.framebuffer.resize(settings.width, settings.height);
        }
        self.settings = settings;
        Ok(())
    }

    /// View parameters matching the current settings, for building cameras
    pub fn view(&self) -> ViewParams {
        ViewParams::from_settings(&self.settings)
    }

    pub fn framebuffer(&self) -> &Framebuffer {
        &self.framebuffer
    }

    /// Render one frame of `scene` as seen by `camera`.
    ///
    /// Field of view and clip planes come from the camera; the viewport is
    /// always the framebuffer's.
    pub fn render_frame(&mut self, scene: &Scene, camera: &Camera) -> RenderResult<FrameStats> {
        let settings = &self.settings;
        let view = ViewParams {
            width: self.framebuffer.width,
            height: self.framebuffer.height,
            ..camera.view
        };
        let to_camera = camera.world_to_camera();
        let mut stats = FrameStats::default();

        self.framebuffer.clear(settings.background);
        self.list.clear();

        for object in &scene.objects {
            let center = to_camera.transform_point(object.position);
            if settings.frustum_cull && sphere_outside(center, object.bounding_radius(), &view) {
                stats.objects_culled += 1;
                continue;
            }
            self.list.push_mesh(object.mesh(), &object.local_to_world())?;
        }

        world_to_camera(&mut self.list, camera)?;
        if settings.backface_cull {
            stats.faces_backfacing = remove_backfaces(&mut self.list)?;
        }
        if settings.frustum_cull {
            stats.faces_culled = cull_faces(&mut self.list, &view)?;
        }
        stats.faces_clipped = clip_near(&mut self.list, view.near)?;

        self.lights.clear();
        self.lights.extend(scene.lights.iter().map(|l| l.to_camera_space(&to_camera)));
        light_faces(&mut self.list, &self.lights)?;

        project(&mut self.list, &view)?;
        sort_faces(&mut self.list, settings.sort, settings.sort_buckets)?;

        let mut missing_textures = 0;
        for &i in &self.list.order {
            let face = &self.list.faces[i];
            let texture = match face.texture {
                Some(slot) => match scene.loaded.get(slot) {
                    Some(t) => TexelView::new(t),
                    None => {
                        missing_textures += 1;
                        None
                    }
                },
                None => None,
            };
            let tri = self.list.corners(face).map(|v| ScreenVertex {
                x: v.pos.x,
                y: v.pos.y,
                z: v.pos.z,
                uv: v.uv,
                color: v.lit.unwrap_or(v.color),
            });
            let mode = RasterMode {
                shading: face.shading,
                texture: if texture.is_some() { settings.texture_mode } else { TextureMode::None },
                depth_test: settings.depth_test,
                blend: if face.translucent {
                    BlendMode::Alpha(settings.blend_ratio)
                } else {
                    BlendMode::Opaque
                },
                filter: settings.filter,
            };
            let color = match face.shading {
                ShadingMode::Flat => face.lit,
                ShadingMode::Constant | ShadingMode::Gouraud => face.color,
            };
            stats.pixels_drawn += draw_triangle(&mut self.framebuffer, &tri, &mode, color, texture);
            stats.faces_rasterized += 1;
        }
        if missing_textures > 0 {
            log::warn!("{} faces reference texture slots that are not loaded", missing_textures);
        }

        log::debug!("{:?}", stats);
        Ok(stats)
    }
}
