//! Texture storage and the texel view the rasterizer samples from
//!
//! Texels are fetched by direct offset, `y * pitch + x * bytes_per_pixel`,
//! into the bitmap's raw row-major bytes. The view checks its dimensions
//! once when it is built, so the per-pixel fetch only clamps coordinates.

use std::fs;
use std::path::Path;

use super::types::Color;
use crate::error::{RenderError, RenderResult};

/// Bytes per texel of an owned [`Texture`] (R, G, B, A).
pub const BYTES_PER_PIXEL: usize = 4;

/// Read-only access to a row-major bitmap.
pub trait Bitmap {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    /// Bytes from the start of one row to the start of the next.
    fn pitch(&self) -> usize;
    /// 3 (RGB) or 4 (RGBA).
    fn bytes_per_pixel(&self) -> usize;
    fn bytes(&self) -> &[u8];
}

/// RGBA8 texture owned by the scene layer.
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
    pub name: String,
}

impl Texture {
    /// Texture filled with one color.
    pub fn solid(width: usize, height: usize, color: Color) -> Self {
        let data = color.to_bytes().repeat(width * height);
        Self {
            width,
            height,
            data,
            name: String::new(),
        }
    }

    /// Wrap raw RGBA bytes. The length must be `width * height * 4`.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>, name: String) -> RenderResult<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidBitmap(format!("{}: zero-sized bitmap", name)));
        }
        let expected = width * height * BYTES_PER_PIXEL;
        if data.len() != expected {
            return Err(RenderError::InvalidBitmap(format!(
                "{}: expected {} bytes for {}x{}, got {}",
                name,
                expected,
                width,
                height,
                data.len()
            )));
        }
        Ok(Self { width, height, data, name })
    }

    /// Load texture from an image file
    pub fn from_file<P: AsRef<Path>>(path: P) -> RenderResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let texture = Self::from_bytes(&bytes, name)?;
        log::info!("Loaded texture: {} ({}x{})", texture.name, texture.width, texture.height);
        Ok(texture)
    }

    /// Decode a texture from encoded image bytes. The format is sniffed
    /// from the data.
    pub fn from_bytes(bytes: &[u8], name: String) -> RenderResult<Self> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba(width as usize, height as usize, rgba.into_raw(), name)
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, color1: Color, color2: Color) -> Self {
        let mut data = Vec::with_capacity(width * height * BYTES_PER_PIXEL);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / 4) + (y / 4)) % 2 == 0;
                let c = if checker { color1 } else { color2 };
                data.extend_from_slice(&c.to_bytes());
            }
        }
        Self {
            width,
            height,
            data,
            name: "checkerboard".to_string(),
        }
    }
}

impl Bitmap for Texture {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn pitch(&self) -> usize {
        self.width * BYTES_PER_PIXEL
    }

    fn bytes_per_pixel(&self) -> usize {
        BYTES_PER_PIXEL
    }

    fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Borrowed, validated view of a bitmap for texel fetches.
///
/// Texture coordinates arrive normalized (0..1) and are unnormalized against
/// `width - 1` / `height - 1`, so 0.0 is the first texel center and 1.0 the
/// last. Coordinates outside that range are clamped to the edge texel.
#[derive(Debug, Clone, Copy)]
pub struct TexelView<'a> {
    bytes: &'a [u8],
    width: usize,
    height: usize,
    pitch: usize,
    bpp: usize,
}

impl<'a> TexelView<'a> {
    /// Build a view, or `None` if the bitmap's layout cannot be sampled
    /// safely (empty, unsupported texel size, or bytes shorter than the
    /// last row).
    pub fn new<B: Bitmap + ?Sized>(bitmap: &'a B) -> Option<Self> {
        let (width, height) = (bitmap.width(), bitmap.height());
        let (pitch, bpp) = (bitmap.pitch(), bitmap.bytes_per_pixel());
        let bytes = bitmap.bytes();
        if width == 0 || height == 0 || !(bpp == 3 || bpp == 4) || pitch < width * bpp {
            return None;
        }
        if bytes.len() < (height - 1) * pitch + width * bpp {
            return None;
        }
        Some(Self { bytes, width, height, pitch, bpp })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Largest texel coordinate on each axis, the scale applied to normalized u, v.
    pub fn extent(&self) -> (f32, f32) {
        ((self.width - 1) as f32, (self.height - 1) as f32)
    }

    /// Fetch a texel; coordinates are clamped into the bitmap.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> Color {
        let x = x.clamp(0, self.width as i32 - 1) as usize;
        let y = y.clamp(0, self.height as i32 - 1) as usize;
        let i = y * self.pitch + x * self.bpp;
        let px = &self.bytes[i..i + self.bpp];
        let a = if self.bpp == 4 { px[3] } else { 255 };
        Color::with_alpha(px[0], px[1], px[2], a)
    }

    /// Nearest texel to a coordinate already in texel units.
    #[inline]
    pub fn sample_nearest(&self, s: f32, t: f32) -> Color {
        self.texel((s + 0.5).floor() as i32, (t + 0.5).floor() as i32)
    }

    /// Weighted blend of the four texels around a coordinate in texel units.
    #[inline]
    pub fn sample_bilinear(&self, s: f32, t: f32) -> Color {
        let (max_s, max_t) = self.extent();
        let s = s.clamp(0.0, max_s);
        let t = t.clamp(0.0, max_t);
        let x0 = s.floor();
        let y0 = t.floor();
        let fx = s - x0;
        let fy = t - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let c00 = self.texel(x0, y0);
        let c10 = self.texel(x0 + 1, y0);
        let c01 = self.texel(x0, y0 + 1);
        let c11 = self.texel(x0 + 1, y0 + 1);

        let mix = |a: u8, b: u8, c: u8, d: u8| {
            let top = a as f32 + (b as f32 - a as f32) * fx;
            let bottom = c as f32 + (d as f32 - c as f32) * fx;
            top + (bottom - top) * fy + 0.5
        };
        Color::with_alpha(
            mix(c00.r, c10.r, c01.r, c11.r) as u8,
            mix(c00.g, c10.g, c01.g, c11.g) as u8,
            mix(c00.b, c10.b, c01.b, c11.b) as u8,
            mix(c00.a, c10.a, c01.a, c11.a) as u8,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 texture: red, green / blue, white
    fn quad_texture() -> Texture {
        let mut data = Vec::new();
        for c in [Color::RED, Color::GREEN, Color::BLUE, Color::WHITE] {
            data.extend_from_slice(&c.to_bytes());
        }
        Texture::from_rgba(2, 2, data, "quad".to_string()).unwrap()
    }

    /// Minimal RGB bitmap with padded rows
    struct PaddedRgb {
        bytes: Vec<u8>,
    }

    impl Bitmap for PaddedRgb {
        fn width(&self) -> usize {
            2
        }
        fn height(&self) -> usize {
            2
        }
        fn pitch(&self) -> usize {
            8
        }
        fn bytes_per_pixel(&self) -> usize {
            3
        }
        fn bytes(&self) -> &[u8] {
            &self.bytes
        }
    }

    #[test]
    fn test_texel_offsets_use_pitch() {
        let bmp = PaddedRgb {
            bytes: vec![
                1, 2, 3, 4, 5, 6, 0, 0, // row 0 + 2 pad bytes
                7, 8, 9, 10, 11, 12, 0, 0,
            ],
        };
        let view = TexelView::new(&bmp).unwrap();
        assert_eq!(view.texel(1, 1), Color::with_alpha(10, 11, 12, 255));
        assert_eq!(view.texel(0, 1), Color::with_alpha(7, 8, 9, 255));
    }

    #[test]
    fn test_out_of_range_coordinates_clamp() {
        let tex = quad_texture();
        let view = TexelView::new(&tex).unwrap();
        assert_eq!(view.texel(-5, 0), Color::RED);
        assert_eq!(view.texel(9, 9), Color::WHITE);
        // u = 1.5 and u = -0.3 in texel units
        assert_eq!(view.sample_nearest(1.5, 0.0), Color::GREEN);
        assert_eq!(view.sample_nearest(-0.3, 0.0), Color::RED);
        assert_eq!(view.sample_bilinear(7.0, 7.0), Color::WHITE);
    }

    #[test]
    fn test_bilinear_midpoint() {
        let tex = quad_texture();
        let view = TexelView::new(&tex).unwrap();
        let c = view.sample_bilinear(0.5, 0.0);
        // halfway between red and green
        assert_eq!((c.r, c.g, c.b), (128, 128, 0));
    }

    #[test]
    fn test_view_rejects_short_buffer() {
        let bmp = PaddedRgb { bytes: vec![0; 10] };
        assert!(TexelView::new(&bmp).is_none());
    }

    #[test]
    fn test_from_rgba_checks_length() {
        assert!(Texture::from_rgba(4, 4, vec![0; 10], "bad".into()).is_err());
        assert!(Texture::from_rgba(0, 4, vec![], "empty".into()).is_err());
    }

    #[test]
    fn test_checkerboard_pattern() {
        let tex = Texture::checkerboard(8, 8, Color::WHITE, Color::BLACK);
        let view = TexelView::new(&tex).unwrap();
        assert_eq!(view.texel(0, 0), Color::WHITE);
        assert_eq!(view.texel(4, 0), Color::BLACK);
        assert_eq!(view.texel(4, 4), Color::WHITE);
    }

    #[test]
    fn test_from_bytes_decodes_png() {
        let mut img = image::RgbaImage::new(3, 2);
        img.put_pixel(2, 1, image::Rgba([10, 20, 30, 255]));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();

        let tex = Texture::from_bytes(png.get_ref(), "tiny".to_string()).unwrap();
        assert_eq!((tex.width, tex.height), (3, 2));
        assert_eq!(TexelView::new(&tex).unwrap().texel(2, 1), Color::new(10, 20, 30));
        assert!(Texture::from_bytes(b"not an image", "junk".to_string()).is_err());
    }

    #[test]
    fn test_from_file_reads_and_names() {
        let dir = std::env::temp_dir().join(format!("scanline-engine-tex-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("brick.png");
        image::RgbaImage::from_pixel(4, 4, image::Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let tex = Texture::from_file(&path).unwrap();
        assert_eq!(tex.name, "brick");
        assert_eq!(TexelView::new(&tex).unwrap().texel(3, 3), Color::new(1, 2, 3));
        assert!(Texture::from_file(dir.join("missing.png")).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
