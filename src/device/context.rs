//! The device context: an immutable-per-draw snapshot of pipeline state.
use crate::buffers::{ConstantBuffer, IndexBuffer, VertexBuffer, Viewport};
use crate::error::ContextError;
use crate::shader::{PixelShader, VertexShader};
use crate::targets::ColorTarget;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// Which winding order a draw discards before rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullMode {
    /// Rasterize both orientations.
    #[default]
    None,
    /// Discard triangles with positive signed area.
    Front,
    /// Discard triangles with negative signed area.
    Back,
}

/// How a primitive's interior is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillMode {
    /// Draw each distinct vertex once, in its interpolated color.
    Point,
    /// Draw the three edges of each triangle in a fixed wire color.
    Wireframe,
    /// Rasterize the filled interior.
    #[default]
    Solid,
}

/// A shared handle to a color target, bindable as the active render target.
pub type RenderTargetHandle = Rc<RefCell<dyn ColorTarget>>;

/// The value-type snapshot a draw call consumes: shaders, buffers, render
/// target, viewport, and raster modes. Validated fresh before every draw;
/// nothing here is mutated mid-draw.
#[derive(Clone, Default)]
pub struct DeviceContext {
    vertex_shader: Option<Arc<VertexShader>>,
    pixel_shader: Option<Arc<PixelShader>>,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    constant_buffer: ConstantBuffer,
    render_target: Option<RenderTargetHandle>,
    viewport: Viewport,
    cull_mode: CullMode,
    fill_mode: FillMode,
    tiled_rendering: bool,
    tile_size: usize,
}

impl DeviceContext {
    /// A context with every optional field unset; `tile_size` defaults to
    /// `64` and `tiled_rendering` to `true` (the common solid-fill path).
    pub fn new() -> Self {
        DeviceContext {
            vertex_shader: None,
            pixel_shader: None,
            vertex_buffer: Vec::new(),
            index_buffer: Vec::new(),
            constant_buffer: ConstantBuffer::empty(),
            render_target: None,
            viewport: Viewport::default(),
            cull_mode: CullMode::None,
            fill_mode: FillMode::Solid,
            tiled_rendering: true,
            tile_size: 64,
        }
    }

    pub fn set_vertex_shader(&mut self, shader: VertexShader) {
        self.vertex_shader = Some(Arc::new(shader));
    }
    pub fn set_pixel_shader(&mut self, shader: PixelShader) {
        self.pixel_shader = Some(Arc::new(shader));
    }
    pub fn set_vertex_buffer(&mut self, buffer: VertexBuffer) {
        self.vertex_buffer = buffer;
    }
    pub fn set_index_buffer(&mut self, buffer: IndexBuffer) {
        self.index_buffer = buffer;
    }
    pub fn set_constant_buffer(&mut self, buffer: ConstantBuffer) {
        self.constant_buffer = buffer;
    }
    pub fn set_render_target(&mut self, target: Option<RenderTargetHandle>) {
        self.render_target = target;
    }
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }
    pub fn set_cull_mode(&mut self, mode: CullMode) {
        self.cull_mode = mode;
    }
    pub fn set_fill_mode(&mut self, mode: FillMode) {
        self.fill_mode = mode;
    }
    pub fn set_tiled_rendering(&mut self, enabled: bool) {
        self.tiled_rendering = enabled;
    }
    pub fn set_tile_size(&mut self, size: usize) {
        self.tile_size = size;
    }

    pub fn vertex_shader(&self) -> Option<&Arc<VertexShader>> {
        self.vertex_shader.as_ref()
    }
    pub fn pixel_shader(&self) -> Option<&Arc<PixelShader>> {
        self.pixel_shader.as_ref()
    }
    pub fn vertex_buffer(&self) -> &VertexBuffer {
        &self.vertex_buffer
    }
    pub fn index_buffer(&self) -> &IndexBuffer {
        &self.index_buffer
    }
    pub fn constant_buffer(&self) -> ConstantBuffer {
        self.constant_buffer
    }
    pub fn render_target(&self) -> Option<&RenderTargetHandle> {
        self.render_target.as_ref()
    }
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }
    pub fn cull_mode(&self) -> CullMode {
        self.cull_mode
    }
    pub fn fill_mode(&self) -> FillMode {
        self.fill_mode
    }
    pub fn tiled_rendering(&self) -> bool {
        self.tiled_rendering
    }
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Checks every draw precondition, accumulating every failure rather
    /// than stopping at the first.
    pub fn validate(&self) -> Result<(), ContextError> {
        let mut reasons = Vec::new();
        if self.vertex_shader.is_none() {
            reasons.push("vertex shader is not set");
        }
        if self.pixel_shader.is_none() {
            reasons.push("pixel shader is not set");
        }
        if self.vertex_buffer.is_empty() {
            reasons.push("vertex buffer is empty");
        }
        if self.index_buffer.is_empty() {
            reasons.push("index buffer is empty");
        }
        if self.render_target.is_none() {
            reasons.push("render target is not set");
        }
        if !(self.viewport.size.x > 0.0) || !(self.viewport.size.y > 0.0) {
            reasons.push("viewport size must be positive");
        }
        if self.tile_size == 0 {
            reasons.push("tile size must be greater than zero");
        }
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ContextError::new(reasons))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffers::{VertexInput, VertexOutput};
    use crate::targets::WindowTarget;
    use glam::Vec4;

    fn populated_context() -> DeviceContext {
        let mut ctx = DeviceContext::new();
        ctx.set_vertex_shader(Box::new(|v: &VertexInput, _| {
            VertexOutput::new(v.position.extend(1.0), v.color, v.uv)
        }));
        ctx.set_pixel_shader(Box::new(|v: &VertexOutput, _| v.color));
        ctx.set_vertex_buffer(vec![VertexInput::default()]);
        ctx.set_index_buffer(vec![0, 0, 0]);
        ctx.set_render_target(Some(Rc::new(RefCell::new(WindowTarget::new(4, 4)))));
        ctx.set_viewport(Viewport::full(4.0, 4.0));
        ctx
    }

    #[test]
    fn validate_passes_for_a_fully_populated_context() {
        assert!(populated_context().validate().is_ok());
    }

    #[test]
    fn validate_accumulates_every_failure() {
        let ctx = DeviceContext::new();
        let err = ctx.validate().unwrap_err();
        assert_eq!(err.reasons.len(), 6);
    }

    #[test]
    fn validate_rejects_zero_tile_size() {
        let mut ctx = populated_context();
        ctx.set_tile_size(0);
        let err = ctx.validate().unwrap_err();
        assert_eq!(err.reasons, vec!["tile size must be greater than zero"]);
    }

    #[test]
    fn validate_rejects_nonpositive_viewport() {
        let mut ctx = populated_context();
        ctx.set_viewport(Viewport::new(glam::Vec2::ZERO, glam::Vec2::new(0.0, 4.0), 0.0, 1.0));
        assert!(ctx.validate().is_err());
    }

    #[test]
    fn color_and_fill_mode_default_as_specified() {
        let ctx = DeviceContext::new();
        assert_eq!(ctx.cull_mode(), CullMode::None);
        assert_eq!(ctx.fill_mode(), FillMode::Solid);
        assert!(ctx.tiled_rendering());
    }

    #[test]
    fn vertex_shader_can_be_invoked_through_the_stored_handle() {
        let ctx = populated_context();
        let vs = ctx.vertex_shader().unwrap();
        let out = vs(&VertexInput::new(glam::Vec3::ONE, Vec4::ONE, glam::Vec2::ZERO), ctx.constant_buffer());
        assert_eq!(out.color, Vec4::ONE);
    }
}
