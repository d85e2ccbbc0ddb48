//! Per-pixel color strategies
//!
//! The scan converter is generic over [`PixelShader`], so each shading and
//! texturing combination is compiled into its own copy of the span loop.
//! Every shader reads the same interpolated [`Varyings`]; what the texture
//! slots hold (u, v or u/z, v/z) is decided once at triangle setup.

use std::ops::{Add, Mul, Sub};

use super::bitmap::TexelView;
use super::types::Color;

/// Attributes interpolated across a triangle.
///
/// `s`/`t` are texture coordinates in texel units for affine mapping, or
/// those coordinates divided by depth for perspective mapping. `r`/`g`/`b`
/// are vertex color channels in 0..=255.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Varyings {
    pub inv_z: f32,
    pub s: f32,
    pub t: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Add for Varyings {
    type Output = Varyings;
    #[inline]
    fn add(self, o: Varyings) -> Varyings {
        Varyings {
            inv_z: self.inv_z + o.inv_z,
            s: self.s + o.s,
            t: self.t + o.t,
            r: self.r + o.r,
            g: self.g + o.g,
            b: self.b + o.b,
        }
    }
}

impl Sub for Varyings {
    type Output = Varyings;
    #[inline]
    fn sub(self, o: Varyings) -> Varyings {
        Varyings {
            inv_z: self.inv_z - o.inv_z,
            s: self.s - o.s,
            t: self.t - o.t,
            r: self.r - o.r,
            g: self.g - o.g,
            b: self.b - o.b,
        }
    }
}

impl Mul<f32> for Varyings {
    type Output = Varyings;
    #[inline]
    fn mul(self, k: f32) -> Varyings {
        Varyings {
            inv_z: self.inv_z * k,
            s: self.s * k,
            t: self.t * k,
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
        }
    }
}

/// Computes the color of one covered pixel.
pub trait PixelShader {
    fn shade(&self, v: &Varyings) -> Color;
}

/// One color for every pixel (constant and flat shading).
pub struct SolidShader {
    pub color: Color,
}

impl PixelShader for SolidShader {
    #[inline]
    fn shade(&self, _v: &Varyings) -> Color {
        self.color
    }
}

/// Interpolated vertex colors.
pub struct GouraudShader;

impl PixelShader for GouraudShader {
    #[inline]
    fn shade(&self, v: &Varyings) -> Color {
        Color::from_f32(v.r, v.g, v.b, 255)
    }
}

/// Lighting applied on top of a texel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TexelLighting {
    /// Texel color as-is
    Unlit,
    /// Modulated by one lit face color
    Flat(Color),
    /// Modulated by the interpolated vertex color
    Gouraud,
}

/// Texture lookup, specialised at compile time on perspective division and
/// bilinear filtering.
pub struct TextureShader<'a, const PERSPECTIVE: bool, const BILINEAR: bool> {
    pub view: TexelView<'a>,
    pub lighting: TexelLighting,
}

impl<'a, const PERSPECTIVE: bool, const BILINEAR: bool> TextureShader<'a, PERSPECTIVE, BILINEAR> {
    pub fn new(view: TexelView<'a>, lighting: TexelLighting) -> Self {
        Self { view, lighting }
    }

    /// Texel-space coordinate for this pixel.
    #[inline]
    pub fn texel_coord(v: &Varyings) -> (f32, f32) {
        if PERSPECTIVE && v.inv_z > 0.0 {
            let z = 1.0 / v.inv_z;
            (v.s * z, v.t * z)
        } else {
            (v.s, v.t)
        }
    }
}

impl<const PERSPECTIVE: bool, const BILINEAR: bool> PixelShader for TextureShader<'_, PERSPECTIVE, BILINEAR> {
    #[inline]
    fn shade(&self, v: &Varyings) -> Color {
        let (s, t) = Self::texel_coord(v);
        let texel = if BILINEAR {
            self.view.sample_bilinear(s, t)
        } else {
            self.view.sample_nearest(s, t)
        };
        match self.lighting {
            TexelLighting::Unlit => texel,
            TexelLighting::Flat(c) => texel.modulate(c),
            TexelLighting::Gouraud => texel.modulate(Color::from_f32(v.r, v.g, v.b, 255)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rasterizer::Texture;

    #[test]
    fn test_varyings_arithmetic() {
        let a = Varyings { inv_z: 1.0, s: 2.0, t: 3.0, r: 4.0, g: 5.0, b: 6.0 };
        let d = (a - Varyings::default()) * 0.5;
        assert_eq!(d.s, 1.0);
        assert_eq!((a + d).b, 9.0);
    }

    #[test]
    fn test_perspective_divides_by_inv_z() {
        let v = Varyings { inv_z: 0.25, s: 2.0, t: 1.0, ..Default::default() };
        let (s, t) = TextureShader::<true, false>::texel_coord(&v);
        assert_eq!((s, t), (8.0, 4.0));
        let (s, t) = TextureShader::<false, false>::texel_coord(&v);
        assert_eq!((s, t), (2.0, 1.0));
    }

    #[test]
    fn test_texture_lighting_modulates() {
        let tex = Texture::solid(2, 2, Color::new(200, 100, 50));
        let view = TexelView::new(&tex).unwrap();
        let v = Varyings { inv_z: 1.0, r: 255.0, g: 0.0, b: 255.0, ..Default::default() };

        let unlit = TextureShader::<false, false>::new(view, TexelLighting::Unlit);
        assert_eq!(unlit.shade(&v), Color::new(200, 100, 50));

        let gouraud = TextureShader::<false, true>::new(view, TexelLighting::Gouraud);
        assert_eq!(gouraud.shade(&v), Color::new(200, 0, 50));

        let flat = TextureShader::<true, false>::new(view, TexelLighting::Flat(Color::BLACK));
        assert_eq!(flat.shade(&v), Color::BLACK);
    }
}
