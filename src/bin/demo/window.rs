//! Thin wrapper around the winit window this demo presents into.
use std::sync::Arc;
use winit::dpi;
use winit::error::OsError;
use winit::event_loop;
use winit::window;

/// Holds the window's requested size until the event loop hands back a
/// live winit window on `resumed`.
pub struct Window {
    pub width: u32,
    pub height: u32,
    pub winit_window: Option<Arc<window::Window>>,
}

impl Window {
    pub fn new(width: u32, height: u32) -> Window {
        Window {
            width,
            height,
            winit_window: None,
        }
    }

    pub fn initialize(&mut self, event_loop: &event_loop::ActiveEventLoop) -> Result<(), OsError> {
        let size = dpi::LogicalSize::new(self.width as f64, self.height as f64);
        let attributes = window::Window::default_attributes()
            .with_title("soft_rend demo")
            .with_inner_size(size)
            .with_min_inner_size(size);
        let winit_window = event_loop.create_window(attributes)?;
        self.winit_window = Some(Arc::new(winit_window));
        Ok(())
    }
}
