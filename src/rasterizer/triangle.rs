//! Triangle scan conversion
//!
//! One algorithm serves every raster mode:
//!
//! 1. Sort vertices by descending screen Y (v1 top, v3 bottom). Ties put the
//!    smaller X first, so flat edges are ordered left to right.
//! 2. Reject degenerate input: coincident vertices, no vertical extent,
//!    collinear vertices, non-finite coordinates.
//! 3. Split at v2 into an upper half (rows between v1 and v2) and a lower
//!    half (rows between v2 and v3). The long edge v1→v3 bounds both halves;
//!    the middle vertex decides whether it is the left or the right bound.
//! 4. Every edge is evaluated from its upper endpoint with per-row
//!    increments. Starting each visible row from the edge origin, rather
//!    than accumulating, skips rows above the buffer for free and makes
//!    shared edges bit-identical between neighbouring triangles.
//! 5. Fill convention (Y up): row `y` is covered when `y_min < y <= y_max`;
//!    column `x` when `x_left <= x < x_right`. Pixel (x, y) samples the
//!    integer point (x, y).
//! 6. Along a span, attributes step by a per-pixel increment. The first
//!    pixel's value is advanced from the exact left crossing, so clipping
//!    at the left border never restarts interpolation.
//! 7. Per pixel: reciprocal depth test, shader, optional fixed-ratio
//!    blend, write color and depth.
//!
//! 1/z, u/z and v/z are linear in screen space under perspective
//! projection; that is what makes both the depth test and perspective
//! texturing correct with plain linear stepping.

use super::bitmap::TexelView;
use super::framebuffer::Framebuffer;
use super::shader::{GouraudShader, PixelShader, SolidShader, TexelLighting, TextureShader, Varyings};
use super::types::{BlendMode, Color, FilterMode, RasterMode, ShadingMode, TextureMode};
use crate::math::{Vec2, EPSILON};

/// A projected vertex ready for scan conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenVertex {
    /// Pixel coordinates, origin bottom-left
    pub x: f32,
    pub y: f32,
    /// Camera-space depth (positive in front of the camera)
    pub z: f32,
    /// Normalized texture coordinate
    pub uv: Vec2,
    /// Lit vertex color (used by Gouraud modes)
    pub color: Color,
}

impl ScreenVertex {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            x,
            y,
            z,
            uv: Vec2::default(),
            color: Color::WHITE,
        }
    }

    pub fn with_uv(mut self, u: f32, v: f32) -> Self {
        self.uv = Vec2::new(u, v);
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }
}

/// Draw one triangle and return the number of pixels written.
///
/// `face_color` is the constant (or already lit, for flat shading) color.
/// Without a texture, a textured mode falls back to the untextured shader.
pub fn draw_triangle(
    fb: &mut Framebuffer,
    tri: &[ScreenVertex; 3],
    mode: &RasterMode,
    face_color: Color,
    texture: Option<TexelView<'_>>,
) -> usize {
    let texture = texture.filter(|_| mode.texture != TextureMode::None);

    let Some(view) = texture else {
        return match mode.shading {
            ShadingMode::Gouraud => scan_triangle(fb, tri, mode, None, &GouraudShader),
            ShadingMode::Constant | ShadingMode::Flat => {
                scan_triangle(fb, tri, mode, None, &SolidShader { color: face_color })
            }
        };
    };

    let lighting = match mode.shading {
        ShadingMode::Constant => TexelLighting::Unlit,
        ShadingMode::Flat => TexelLighting::Flat(face_color),
        ShadingMode::Gouraud => TexelLighting::Gouraud,
    };
    let bilinear = mode.filter == FilterMode::Bilinear;
    let t = Some(view);

    match (mode.texture, bilinear) {
        (TextureMode::Perspective, false) => {
            scan_triangle(fb, tri, mode, t, &TextureShader::<true, false>::new(view, lighting))
        }
        (TextureMode::Perspective, true) => {
            scan_triangle(fb, tri, mode, t, &TextureShader::<true, true>::new(view, lighting))
        }
        (_, false) => scan_triangle(fb, tri, mode, t, &TextureShader::<false, false>::new(view, lighting)),
        (_, true) => scan_triangle(fb, tri, mode, t, &TextureShader::<false, true>::new(view, lighting)),
    }
}

/// Setup-time attribute values for one vertex.
fn vertex_varyings(v: &ScreenVertex, mode: &RasterMode, texture: Option<&TexelView<'_>>) -> Varyings {
    let inv_z = 1.0 / v.z;
    let (s, t) = match texture {
        Some(view) => {
            let (max_s, max_t) = view.extent();
            let s = v.uv.x * max_s;
            let t = v.uv.y * max_t;
            match mode.texture {
                TextureMode::Perspective => (s * inv_z, t * inv_z),
                _ => (s, t),
            }
        }
        None => (0.0, 0.0),
    };
    Varyings {
        inv_z,
        s,
        t,
        r: v.color.r as f32,
        g: v.color.g as f32,
        b: v.color.b as f32,
    }
}

/// One triangle edge, stepped downward from its upper endpoint.
struct Edge {
    x0: f32,
    y0: f32,
    x_min: f32,
    x_max: f32,
    /// X change per unit of downward travel
    dx: f32,
    a0: Varyings,
    da: Varyings,
}

impl Edge {
    fn new(top: &ScreenVertex, bottom: &ScreenVertex, a_top: Varyings, a_bottom: Varyings) -> Self {
        let height = top.y - bottom.y;
        let (dx, da) = if height > EPSILON {
            let inv_h = 1.0 / height;
            ((bottom.x - top.x) * inv_h, (a_bottom - a_top) * inv_h)
        } else {
            (0.0, Varyings::default())
        };
        Self {
            x0: top.x,
            y0: top.y,
            x_min: top.x.min(bottom.x),
            x_max: top.x.max(bottom.x),
            dx,
            a0: a_top,
            da,
        }
    }

    /// Crossing and attributes at row `y`. The crossing is kept within the
    /// edge's own X range so rounding never pushes it past an endpoint.
    #[inline]
    fn at(&self, y: f32) -> (f32, Varyings) {
        let steps = self.y0 - y;
        let x = (self.x0 + self.dx * steps).clamp(self.x_min, self.x_max);
        (x, self.a0 + self.da * steps)
    }
}

fn is_degenerate(p: &[ScreenVertex; 3]) -> bool {
    let finite = p.iter().all(|v| v.x.is_finite() && v.y.is_finite() && v.z.is_finite());
    if !finite || p.iter().any(|v| v.z <= EPSILON) {
        return true;
    }
    let coincident = |a: &ScreenVertex, b: &ScreenVertex| (a.x - b.x).abs() < EPSILON && (a.y - b.y).abs() < EPSILON;
    coincident(&p[0], &p[1]) || coincident(&p[1], &p[2]) || coincident(&p[0], &p[2])
}

/// Sort by descending Y, ascending X on ties.
fn sort_vertices(tri: &[ScreenVertex; 3]) -> [ScreenVertex; 3] {
    let mut v = *tri;
    let above = |a: &ScreenVertex, b: &ScreenVertex| a.y > b.y || (a.y == b.y && a.x < b.x);
    if above(&v[1], &v[0]) {
        v.swap(0, 1);
    }
    if above(&v[2], &v[1]) {
        v.swap(1, 2);
    }
    if above(&v[1], &v[0]) {
        v.swap(0, 1);
    }
    v
}

/// The scan converter shared by every mode.
pub fn scan_triangle<S: PixelShader>(
    fb: &mut Framebuffer,
    tri: &[ScreenVertex; 3],
    mode: &RasterMode,
    texture: Option<TexelView<'_>>,
    shader: &S,
) -> usize {
    if fb.width == 0 || fb.height == 0 || is_degenerate(tri) {
        return 0;
    }
    let [v1, v2, v3] = sort_vertices(tri);
    if v1.y - v3.y < EPSILON {
        return 0;
    }

    let a1 = vertex_varyings(&v1, mode, texture.as_ref());
    let a2 = vertex_varyings(&v2, mode, texture.as_ref());
    let a3 = vertex_varyings(&v3, mode, texture.as_ref());

    let long = Edge::new(&v1, &v3, a1, a3);
    let upper = Edge::new(&v1, &v2, a1, a2);
    let lower = Edge::new(&v2, &v3, a2, a3);

    // Which side of the long edge the middle vertex lies on
    let (long_x, _) = long.at(v2.y);
    let side = v2.x - long_x;
    if side.abs() < EPSILON {
        return 0;
    }
    let middle_on_left = side < 0.0;

    let last_row = fb.height as i64 - 1;
    let row = |y: f32| y.floor() as i64;

    let mut drawn = 0;
    for (edge, top_y, bottom_y) in [(&upper, v1.y, v2.y), (&lower, v2.y, v3.y)] {
        let y_hi = row(top_y).min(last_row);
        let y_lo = (row(bottom_y) + 1).max(0);
        if y_lo > y_hi {
            continue;
        }
        let (left, right) = if middle_on_left { (edge, &long) } else { (&long, edge) };
        drawn += fill_rows(fb, y_lo, y_hi, left, right, mode, shader);
    }
    drawn
}

/// Fill rows `y_hi` down to `y_lo` (inclusive, already clipped) between two edges.
fn fill_rows<S: PixelShader>(
    fb: &mut Framebuffer,
    y_lo: i64,
    y_hi: i64,
    left: &Edge,
    right: &Edge,
    mode: &RasterMode,
    shader: &S,
) -> usize {
    let last_col = fb.width as i64 - 1;
    let mut drawn = 0;

    for y in (y_lo..=y_hi).rev() {
        let yf = y as f32;
        let (xl, al) = left.at(yf);
        let (xr, ar) = right.at(yf);
        let span = xr - xl;
        if span <= 0.0 {
            continue;
        }

        let x_start = (xl.ceil() as i64).max(0);
        let x_end = (xr.ceil() as i64 - 1).min(last_col);
        if x_start > x_end {
            continue;
        }

        let da = if span > EPSILON { (ar - al) * (1.0 / span) } else { Varyings::default() };
        // Advance from the exact crossing to the first drawn pixel
        let mut a = al + da * (x_start as f32 - xl);

        let (colors, depths) = fb.row_mut(y as usize);
        for x in x_start as usize..=x_end as usize {
            if write_pixel(&mut colors[x], &mut depths[x], &a, mode, shader) {
                drawn += 1;
            }
            a = a + da;
        }
    }
    drawn
}

#[inline]
fn write_pixel<S: PixelShader>(
    color: &mut u32,
    depth: &mut f32,
    a: &Varyings,
    mode: &RasterMode,
    shader: &S,
) -> bool {
    let inv_z = a.inv_z;
    if mode.depth_test && inv_z <= *depth {
        return false;
    }
    let src = shader.shade(a);
    let out = match mode.blend {
        BlendMode::Opaque => src,
        BlendMode::Alpha(alpha) => src.blend_over(Color::from_argb(*color), alpha),
    };
    *color = out.to_argb();
    // With the test off the depth still only moves nearer
    if inv_z > *depth {
        *depth = inv_z;
    }
    true
}
