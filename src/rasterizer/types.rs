//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack `0xAARRGGBB`.
    pub const fn from_argb(packed: u32) -> Self {
        Self {
            a: (packed >> 24) as u8,
            r: (packed >> 16) as u8,
            g: (packed >> 8) as u8,
            b: packed as u8,
        }
    }

    /// Pack as `0xAARRGGBB`, the color buffer's pixel format.
    pub const fn to_argb(self) -> u32 {
        ((self.a as u32) << 24) | ((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
    }

    /// Convert to [u8; 4] in RGBA byte order (for presentation)
    pub fn to_bytes(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Channel-wise product, `self * other / 255`. Alpha is kept from `self`.
    pub fn modulate(self, other: Color) -> Self {
        Self {
            r: mul_channel(self.r, other.r),
            g: mul_channel(self.g, other.g),
            b: mul_channel(self.b, other.b),
            a: self.a,
        }
    }

    /// Fixed-ratio blend over `back`: `self * alpha + back * (1 - alpha)`.
    /// The result is opaque, since the color buffer has no use for alpha.
    pub fn blend_over(self, back: Color, alpha: f32) -> Self {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |f: u8, b: u8| (f as f32 * a + b as f32 * (1.0 - a) + 0.5) as u8;
        Self {
            r: mix(self.r, back.r),
            g: mix(self.g, back.g),
            b: mix(self.b, back.b),
            a: 255,
        }
    }

    /// Build a color from float channels in 0..=255, clamping each.
    pub fn from_f32(r: f32, g: f32, b: f32, a: u8) -> Self {
        Self {
            r: r.clamp(0.0, 255.0) as u8,
            g: g.clamp(0.0, 255.0) as u8,
            b: b.clamp(0.0, 255.0) as u8,
            a,
        }
    }
}

#[inline]
fn mul_channel(a: u8, b: u8) -> u8 {
    ((a as u32 * b as u32 + 127) / 255) as u8
}

/// How a face's color is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShadingMode {
    /// Raw face color, no lighting
    #[default]
    Constant,
    /// One light calculation per face
    Flat,
    /// Per-vertex lighting, interpolated across the face
    Gouraud,
}

/// How texture coordinates are interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TextureMode {
    /// No texture sampling
    #[default]
    None,
    /// Linear in screen space (warps on depth-varying faces)
    Affine,
    /// u/z and v/z interpolated, divided by 1/z per pixel
    Perspective,
}

/// Texel filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    Nearest,
    Bilinear,
}

/// How a fragment is combined with the color already in the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BlendMode {
    #[default]
    Opaque,
    /// `src * alpha + dst * (1 - alpha)` at a fixed ratio
    Alpha(f32),
}

impl BlendMode {
    /// Half-and-half translucency.
    pub const HALF: BlendMode = BlendMode::Alpha(0.5);
}

/// Full per-triangle configuration of the scan converter.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RasterMode {
    pub shading: ShadingMode,
    pub texture: TextureMode,
    /// When off, color is always written and depth still only moves nearer.
    pub depth_test: bool,
    pub blend: BlendMode,
    pub filter: FilterMode,
}

impl RasterMode {
    /// Untextured, unlit, depth-tested, opaque.
    pub fn solid() -> Self {
        Self {
            depth_test: true,
            ..Default::default()
        }
    }

    pub fn with_shading(mut self, shading: ShadingMode) -> Self {
        self.shading = shading;
        self
    }

    pub fn with_texture(mut self, texture: TextureMode) -> Self {
        self.texture = texture;
        self
    }

    pub fn with_depth_test(mut self, depth_test: bool) -> Self {
        self.depth_test = depth_test;
        self
    }

    pub fn with_blend(mut self, blend: BlendMode) -> Self {
        self.blend = blend;
        self
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }
}
