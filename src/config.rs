//! Render settings
//!
//! Stored as RON, like scenes. Missing fields fall back to their defaults so
//! a settings file only needs to name what it changes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::pipeline::SortPolicy;
use crate::rasterizer::{Color, FilterMode, TextureMode, HEIGHT, WIDTH};

/// Settings consumed by the renderer once per frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasterSettings {
    /// Viewport size in pixels
    pub width: usize,
    pub height: usize,
    /// Horizontal field of view in degrees
    pub fov: f32,
    /// Near and far clip distances (camera space Z)
    pub near: f32,
    pub far: f32,
    /// Color the frame is cleared to
    pub background: Color,
    /// Texture interpolation for textured faces
    pub texture_mode: TextureMode,
    pub filter: FilterMode,
    /// Per-pixel 1/z test
    pub depth_test: bool,
    pub backface_cull: bool,
    pub frustum_cull: bool,
    /// Depth ordering of faces before rasterization
    pub sort: SortPolicy,
    /// Buckets for the counting sort; 0 uses the comparison sort
    pub sort_buckets: usize,
    /// Ratio used for translucent faces (0.0-1.0)
    pub blend_ratio: f32,
    /// Ambient light intensity (0.0-1.0)
    pub ambient: f32,
}

impl Default for RasterSettings {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            fov: 90.0,
            near: 0.1,
            far: 1000.0,
            background: Color::new(20, 20, 30),
            texture_mode: TextureMode::Perspective,
            filter: FilterMode::Nearest,
            depth_test: true,
            backface_cull: true,
            frustum_cull: true,
            sort: SortPolicy::BackToFront,
            sort_buckets: 0,
            blend_ratio: 0.5,
            ambient: 0.3,
        }
    }
}

impl RasterSettings {
    /// Width over height
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> RenderResult<()> {
        let fail = |msg: String| Err(RenderError::InvalidConfig(msg));
        if self.width == 0 || self.height == 0 {
            return fail(format!("viewport must be non-empty, got {}x{}", self.width, self.height));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return fail(format!("field of view must be in (0, 180) degrees, got {}", self.fov));
        }
        if !(self.near > 0.0) {
            return fail(format!("near plane must be positive, got {}", self.near));
        }
        if !(self.far > self.near) {
            return fail(format!("far plane ({}) must lie beyond near plane ({})", self.far, self.near));
        }
        if !(0.0..=1.0).contains(&self.blend_ratio) {
            return fail(format!("blend ratio must be in [0, 1], got {}", self.blend_ratio));
        }
        if !(0.0..=1.0).contains(&self.ambient) {
            return fail(format!("ambient must be in [0, 1], got {}", self.ambient));
        }
        Ok(())
    }

    /// Parse and validate settings from a RON string
    pub fn from_ron_str(s: &str) -> RenderResult<Self> {
        let settings: RasterSettings = ron::from_str(s)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> RenderResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let settings = Self::from_ron_str(&contents)?;
        log::info!("Loaded render settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> RenderResult<()> {
        let config = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .indentor("  ".to_string());
        let contents = ron::ser::to_string_pretty(self, config)?;
        fs::write(path, contents)?;
        Ok(())
    }
}
