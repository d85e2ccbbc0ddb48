//! Color and reciprocal-depth buffers
//!
//! Both buffers are flat, row-major and sized to the viewport. Row 0 is the
//! bottom of the image (screen origin at bottom-left, Y up); the presentation
//! layer flips rows when it copies the image out.
//!
//! The depth buffer holds 1/z per pixel. Zero means "infinitely far", so a
//! cleared buffer accepts any fragment in front of the camera, and a larger
//! value is nearer.

use super::types::Color;

/// Framebuffer for software rendering
pub struct Framebuffer {
    /// Packed `0xAARRGGBB`, one per pixel
    pub pixels: Vec<u32>,
    /// Reciprocal camera-space depth, one per pixel
    pub depth: Vec<f32>,
    pub width: usize,
    pub height: usize,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            pixels: vec![Color::BLACK.to_argb(); width * height],
            depth: vec![0.0; width * height],
            width,
            height,
        }
    }

    /// Reallocate for a new viewport size. A no-op when the size is unchanged.
    pub fn resize(&mut self, width: usize, height: usize) {
        if self.width != width || self.height != height {
            self.width = width;
            self.height = height;
            self.pixels = vec![Color::BLACK.to_argb(); width * height];
            self.depth = vec![0.0; width * height];
        }
    }

    /// Start-of-frame reset: background color everywhere, depth infinitely far.
    pub fn clear(&mut self, color: Color) {
        self.pixels.fill(color.to_argb());
        self.depth.fill(0.0);
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y * self.width + x)
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Color> {
        self.index(x, y).map(|i| Color::from_argb(self.pixels[i]))
    }

    pub fn depth_at(&self, x: usize, y: usize) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    /// Color and depth slices of one row, for span writes.
    #[inline]
    pub fn row_mut(&mut self, y: usize) -> (&mut [u32], &mut [f32]) {
        let start = y * self.width;
        let end = start + self.width;
        (&mut self.pixels[start..end], &mut self.depth[start..end])
    }

    /// Copy the image out as RGBA bytes, top row first.
    pub fn copy_rgba_top_down(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.width * self.height * 4);
        for y in (0..self.height).rev() {
            let row = &self.pixels[y * self.width..(y + 1) * self.width];
            for &px in row {
                out.extend_from_slice(&Color::from_argb(px).to_bytes());
            }
        }
    }
}
