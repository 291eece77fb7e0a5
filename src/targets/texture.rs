//! The texture-backed color target: native float RGBA, sampled by a later
//! pass.
use super::ColorTarget;
use glam::{IVec2, Vec2, Vec4};

/// Pixel format of a [`TextureTarget`]. Only one format is needed for the
/// core (native float RGBA); kept as an enum so a caller-extended build can
/// grow it without changing the target's public API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// 32-bit float per channel, four channels.
    Rgba32F,
}

/// A color target storing 4x32-bit float RGBA pixels, suitable for
/// nearest-neighbor sampling on a subsequent pass.
#[derive(Clone)]
pub struct TextureTarget {
    width: usize,
    height: usize,
    format: Format,
    pixels: Vec<Vec4>,
}
impl TextureTarget {
    /// Creates a texture target cleared to transparent black.
    pub fn new(width: usize, height: usize) -> Self {
        TextureTarget {
            width,
            height,
            format: Format::Rgba32F,
            pixels: vec![Vec4::ZERO; width * height],
        }
    }
    /// Pixel format of this target.
    pub fn format(&self) -> Format {
        self.format
    }
    /// Nearest-neighbor sample at normalized UV coordinates. `u`/`v` are
    /// taken modulo `1.0` before lookup, so values outside `[0, 1]` wrap
    /// rather than clamp.
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let u = uv.x - uv.x.floor();
        let v = uv.y - uv.y.floor();
        let x = ((u * self.width as f32) as usize).min(self.width - 1);
        let y = ((v * self.height as f32) as usize).min(self.height - 1);
        self.pixels[y * self.width + x]
    }
    /// Raw pixel storage, row-major, top-to-bottom.
    pub fn data(&self) -> &[Vec4] {
        &self.pixels
    }
    fn in_bounds(&self, coord: IVec2) -> bool {
        coord.x >= 0 && (coord.x as usize) < self.width && coord.y >= 0 && (coord.y as usize) < self.height
    }
    fn index_of(&self, coord: IVec2) -> usize {
        coord.y as usize * self.width + coord.x as usize
    }
}
impl ColorTarget for TextureTarget {
    fn clear(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }
    fn set_pixel(&mut self, coord: IVec2, color: Vec4) {
        // Stores floats verbatim, unlike the window target's clamped
        // encode-on-write.
        if self.in_bounds(coord) {
            let idx = self.index_of(coord);
            self.pixels[idx] = color;
        }
    }
    fn width(&self) -> usize {
        self.width
    }
    fn height(&self) -> usize {
        self.height
    }
}
