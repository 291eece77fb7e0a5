//! Color and depth render targets.
mod depth;
mod texture;
mod window;

pub use depth::DepthTarget;
pub use texture::{Format, TextureTarget};
pub use window::WindowTarget;

use glam::{IVec2, Vec4};

/// A 2D color render target: clear, set one pixel, report dimensions.
///
/// Pixel coordinates outside `[0, width) x [0, height)` are silently
/// ignored by [`ColorTarget::set_pixel`].
pub trait ColorTarget: Send + Sync {
    /// Fills every pixel with `color`.
    fn clear(&mut self, color: Vec4);
    /// Writes one pixel. Out-of-bounds coordinates are ignored.
    fn set_pixel(&mut self, coord: IVec2, color: Vec4);
    /// Target width, in pixels.
    fn width(&self) -> usize;
    /// Target height, in pixels.
    fn height(&self) -> usize;
}
