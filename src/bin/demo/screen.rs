//! Thin wrapper around the `pixels` surface this demo blits into.
use std::sync::Arc;

/// Deferred `pixels::Pixels` construction: the surface needs a live window,
/// which only exists once the event loop calls `resumed`.
pub struct Screen {
    width: u32,
    height: u32,
    pixels: Option<pixels::Pixels<'static>>,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Self {
        Screen {
            width,
            height,
            pixels: None,
        }
    }

    pub fn initialize(&mut self, window: Arc<winit::window::Window>) -> Result<(), pixels::Error> {
        let surface_texture = pixels::SurfaceTexture::new(self.width, self.height, window);
        self.pixels = Some(pixels::Pixels::new(self.width, self.height, surface_texture)?);
        Ok(())
    }

    pub fn pixels_mut(&mut self) -> Option<&mut pixels::Pixels<'static>> {
        self.pixels.as_mut()
    }
}
