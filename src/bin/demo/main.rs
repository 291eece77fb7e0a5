//! Two-pass demo: bakes a procedural pattern into an offscreen texture
//! target once, then samples it every frame while drawing a rotating
//! textured quad into the window's back buffer.
mod screen;
mod window;

use glam::{Mat4, Vec2, Vec3, Vec4};
use soft_rend::buffers::{ConstantBuffer, VertexInput, VertexOutput, Viewport};
use soft_rend::device::{CullMode, Device, DeviceContext, FillMode};
use soft_rend::targets::TextureTarget;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

const WIDTH: u32 = 480;
const HEIGHT: u32 = 360;
const PATTERN_SIZE: usize = 128;

/// Per-draw uniform block for the textured-quad pass.
struct Uniforms {
    mvp: Mat4,
}

fn bake_pattern(device: &mut Device, texture: Rc<RefCell<TextureTarget>>) -> Arc<TextureTarget> {
    let mut ctx = DeviceContext::new();
    ctx.set_pixel_shader(Box::new(|v: &VertexOutput, _: ConstantBuffer| {
        let checker = ((v.uv.x * 8.0) as i32 + (v.uv.y * 8.0) as i32) % 2 == 0;
        if checker {
            Vec4::new(v.uv.x, v.uv.y, 1.0 - v.uv.x, 1.0)
        } else {
            Vec4::new(1.0 - v.uv.x, 1.0 - v.uv.y, v.uv.y, 1.0)
        }
    }));
    ctx.set_vertex_shader(Box::new(|v: &VertexInput, _| VertexOutput::new(v.position.extend(1.0), v.color, v.uv)));
    ctx.set_render_target(Some(texture.clone()));
    ctx.set_viewport(Viewport::full(PATTERN_SIZE as f32, PATTERN_SIZE as f32));
    ctx.set_tile_size(32);
    device.set_device_context(ctx);
    device.draw_full_screen_quad();

    Arc::new(texture.borrow().clone())
}

fn quad_buffers() -> (Vec<VertexInput>, Vec<u32>) {
    let vertices = vec![
        VertexInput::new(Vec3::new(-1.0, -1.0, 0.0), Vec4::ONE, Vec2::new(0.0, 1.0)),
        VertexInput::new(Vec3::new(1.0, -1.0, 0.0), Vec4::ONE, Vec2::new(1.0, 1.0)),
        VertexInput::new(Vec3::new(1.0, 1.0, 0.0), Vec4::ONE, Vec2::new(1.0, 0.0)),
        VertexInput::new(Vec3::new(-1.0, 1.0, 0.0), Vec4::ONE, Vec2::new(0.0, 0.0)),
    ];
    let indices = vec![0, 1, 2, 0, 2, 3];
    (vertices, indices)
}

struct Demo {
    window: window::Window,
    screen: screen::Screen,
    device: Device,
    baked_pattern: Option<Arc<TextureTarget>>,
    start: Instant,
}

impl Demo {
    fn new() -> Self {
        Demo {
            window: window::Window::new(WIDTH, HEIGHT),
            screen: screen::Screen::new(WIDTH, HEIGHT),
            device: Device::new(WIDTH as usize, HEIGHT as usize),
            baked_pattern: None,
            start: Instant::now(),
        }
    }

    fn render(&mut self) {
        let Some(pattern) = self.baked_pattern.clone() else { return };
        let elapsed = self.start.elapsed().as_secs_f32();

        let (vertices, indices) = quad_buffers();
        let model = Mat4::from_rotation_y(elapsed) * Mat4::from_rotation_x(elapsed * 0.6);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 3.0), Vec3::ZERO, Vec3::Y);
        let projection = Mat4::perspective_rh(1.0, WIDTH as f32 / HEIGHT as f32, 0.1, 100.0);
        let uniforms = Uniforms {
            mvp: projection * view * model,
        };

        let mut ctx = DeviceContext::new();
        ctx.set_vertex_shader(Box::new(|v: &VertexInput, constants: ConstantBuffer| {
            // SAFETY: `constants` is set below to reference `uniforms`, which
            // outlives this draw call.
            let uniforms = unsafe { constants.as_ref::<Uniforms>() };
            VertexOutput::new(uniforms.mvp * v.position.extend(1.0), v.color, v.uv)
        }));
        ctx.set_pixel_shader(Box::new(move |v: &VertexOutput, _| pattern.sample(v.uv)));
        ctx.set_vertex_buffer(vertices);
        ctx.set_index_buffer(indices);
        ctx.set_constant_buffer(ConstantBuffer::from_ref(&uniforms));
        ctx.set_viewport(Viewport::full(WIDTH as f32, HEIGHT as f32));
        ctx.set_cull_mode(CullMode::Back);
        ctx.set_fill_mode(FillMode::Solid);
        ctx.set_tiled_rendering(true);
        ctx.set_tile_size(64);

        self.device.set_device_context(ctx);
        self.device.clear(Vec4::new(0.05, 0.05, 0.08, 1.0));
        self.device.clear_depth(1.0);
        self.device.draw_indexed_all();
    }
}

impl ApplicationHandler for Demo {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if let Err(e) = self.window.initialize(event_loop) {
            log::error!("failed to create window: {e}");
            event_loop.exit();
            return;
        }
        let winit_window = self.window.winit_window.as_ref().unwrap().clone();
        if let Err(e) = self.screen.initialize(winit_window) {
            log::error!("failed to create pixel surface: {e}");
            event_loop.exit();
            return;
        }

        let texture = Rc::new(RefCell::new(TextureTarget::new(PATTERN_SIZE, PATTERN_SIZE)));
        self.baked_pattern = Some(bake_pattern(&mut self.device, texture));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::RedrawRequested => {
                self.render();
                if let Some(pixels) = self.screen.pixels_mut() {
                    self.device.present(pixels.frame_mut());
                    if let Err(e) = pixels.render() {
                        log::error!("pixels render failed: {e}");
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = self.window.winit_window.as_ref() {
            window.request_redraw();
        }
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    env_logger::init();
    let event_loop = EventLoop::new().unwrap();
    let mut demo = Demo::new();
    event_loop.run_app(&mut demo)
}
