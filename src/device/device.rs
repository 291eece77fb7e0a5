//! The device: owns the default targets and worker pool, and orchestrates
//! `draw_indexed` against the current context snapshot.
use crate::buffers::{ConstantBuffer, VertexOutput, Viewport};
use crate::device::context::{CullMode, DeviceContext, FillMode, RenderTargetHandle};
use crate::pool::WorkerPool;
use crate::raster::{self, Tile};
use crate::shader::PixelShader;
use crate::targets::{ColorTarget, DepthTarget, WindowTarget};
use glam::Vec4;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

const WIRE_COLOR: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);

/// A raw pointer to a `dyn ColorTarget`, shared across tile workers. Sound
/// because the dispatcher holds the borrow for the lifetime of the tiled
/// pass (`WorkerPool::wait` blocks the caller until every tile task has
/// returned) and tiles partition the pixel set, so writes never alias.
#[derive(Clone, Copy)]
struct TargetPtr(*mut dyn ColorTarget);
unsafe impl Send for TargetPtr {}
unsafe impl Sync for TargetPtr {}

/// Same reasoning as [`TargetPtr`], for the device's single depth target.
#[derive(Clone, Copy)]
struct DepthPtr(*mut DepthTarget);
unsafe impl Send for DepthPtr {}
unsafe impl Sync for DepthPtr {}

/// Owns the default back buffer, depth target, worker pool, and per-draw
/// scratch state (transformed-vertex cache, triangle list). Holds a
/// non-owning handle to whichever render target is currently active.
pub struct Device {
    back_buffer: Rc<RefCell<WindowTarget>>,
    depth_target: DepthTarget,
    pool: WorkerPool,
    context: DeviceContext,
    vertex_cache: Vec<VertexOutput>,
    processed: Vec<bool>,
    triangles: Vec<(usize, usize, usize)>,
}

impl Device {
    /// Creates a device with a window-backed back buffer of the given
    /// size and a worker pool sized to the platform's hardware
    /// concurrency.
    pub fn new(width: usize, height: usize) -> Self {
        Device {
            back_buffer: Rc::new(RefCell::new(WindowTarget::new(width, height))),
            depth_target: DepthTarget::new(width, height),
            pool: WorkerPool::new(WorkerPool::default_worker_count()),
            context: DeviceContext::new(),
            vertex_cache: Vec::new(),
            processed: Vec::new(),
            triangles: Vec::new(),
        }
    }

    /// Replaces the current context snapshot wholesale.
    pub fn set_device_context(&mut self, context: DeviceContext) {
        self.context = context;
    }
    /// Returns the current context snapshot.
    pub fn device_context(&self) -> &DeviceContext {
        &self.context
    }
    /// Returns the current context snapshot, mutably, for incremental
    /// setter calls between draws.
    pub fn device_context_mut(&mut self) -> &mut DeviceContext {
        &mut self.context
    }

    /// Clears the active render target to `color`.
    pub fn clear(&mut self, color: Vec4) {
        self.active_target().borrow_mut().clear(color);
    }
    /// Clears the depth target to `depth`.
    pub fn clear_depth(&mut self, depth: f32) {
        self.depth_target.clear(depth);
    }

    /// Read-only access to the device's depth target, for inspection
    /// between draws (e.g. depth-prepass feedback, or tests).
    pub fn depth_target(&self) -> &DepthTarget {
        &self.depth_target
    }

    /// Copies the back buffer into an external RGBA8 frame, in the layout
    /// an external presenter (e.g. a `pixels::Pixels` surface) expects.
    pub fn present(&self, frame: &mut [u8]) {
        self.back_buffer.borrow().present(frame);
    }

    fn active_target(&self) -> RenderTargetHandle {
        match self.context.render_target() {
            Some(target) => target.clone(),
            None => self.back_buffer.clone(),
        }
    }

    /// `DrawIndexed()` shorthand: draws the whole index buffer from 0.
    pub fn draw_indexed_all(&mut self) {
        let count = self.context.index_buffer().len();
        self.draw_indexed(count, 0);
    }

    /// Validates the context, runs the vertex stage over every unique
    /// referenced index, assembles triangles, and dispatches to the
    /// fill-mode-specific path.
    pub fn draw_indexed(&mut self, index_count: usize, start_index: usize) {
        if let Err(err) = self.context.validate() {
            log::warn!("{err}");
            return;
        }

        self.run_vertex_stage(start_index, index_count);
        self.assemble_triangles(start_index, index_count);

        log::trace!(
            "draw_indexed: {} triangle(s), fill={:?}, tiled={}",
            self.triangles.len(),
            self.context.fill_mode(),
            self.context.tiled_rendering()
        );

        match self.context.fill_mode() {
            FillMode::Solid if self.context.tiled_rendering() => self.dispatch_tiled(),
            FillMode::Solid => self.dispatch_untiled(),
            FillMode::Wireframe => self.dispatch_wireframe(),
            FillMode::Point => self.dispatch_points(),
        }
    }

    fn run_vertex_stage(&mut self, start_index: usize, index_count: usize) {
        let vertex_buffer = self.context.vertex_buffer();
        let index_buffer = self.context.index_buffer();
        let viewport = self.context.viewport();
        let vs = self.context.vertex_shader().expect("validated above").clone();
        let constants = self.context.constant_buffer();

        self.vertex_cache.clear();
        self.vertex_cache.resize(vertex_buffer.len(), VertexOutput::default());
        self.processed.clear();
        self.processed.resize(vertex_buffer.len(), false);

        let end = (start_index + index_count).min(index_buffer.len());
        for i in start_index..end {
            let k = index_buffer[i] as usize;
            if k >= vertex_buffer.len() {
                continue;
            }
            if !self.processed[k] {
                let clip_out = vs(&vertex_buffer[k], constants);
                let screen = raster::clip_to_screen(clip_out.position, &viewport);
                self.vertex_cache[k] = VertexOutput::new(screen, clip_out.color, clip_out.uv);
                self.processed[k] = true;
            }
        }
    }

    fn assemble_triangles(&mut self, start_index: usize, index_count: usize) {
        self.triangles.clear();
        let index_buffer = self.context.index_buffer();
        let end = (start_index + index_count).min(index_buffer.len());
        let count = end.saturating_sub(start_index);
        let triangle_count = count / 3;

        for t in 0..triangle_count {
            let base = start_index + t * 3;
            let i0 = index_buffer[base] as usize;
            let i1 = index_buffer[base + 1] as usize;
            let i2 = index_buffer[base + 2] as usize;
            if i0 < self.vertex_cache.len() && i1 < self.vertex_cache.len() && i2 < self.vertex_cache.len() {
                self.triangles.push((i0, i1, i2));
            }
        }
    }

    fn resolved_triangles(&self) -> Vec<(VertexOutput, VertexOutput, VertexOutput)> {
        self.triangles
            .iter()
            .map(|&(i0, i1, i2)| (self.vertex_cache[i0], self.vertex_cache[i1], self.vertex_cache[i2]))
            .collect()
    }

    fn dispatch_untiled(&mut self) {
        let cull = self.context.cull_mode();
        let pixel_shader = self.context.pixel_shader().expect("validated above").clone();
        let constants = self.context.constant_buffer();
        let resolved = self.resolved_triangles();

        let target_rc = self.active_target();
        let mut target_guard = target_rc.borrow_mut();
        for (v0, v1, v2) in &resolved {
            raster::rasterize_triangle_simd(
                &mut *target_guard,
                &mut self.depth_target,
                v0,
                v1,
                v2,
                cull,
                None,
                &pixel_shader,
                constants,
            );
        }
    }

    fn dispatch_tiled(&mut self) {
        let cull = self.context.cull_mode();
        let pixel_shader: Arc<PixelShader> = self.context.pixel_shader().expect("validated above").clone();
        let constants = self.context.constant_buffer();
        let tile_size = self.context.tile_size();
        let resolved = Arc::new(self.resolved_triangles());

        let target_rc = self.active_target();
        let (width, height) = {
            let target = target_rc.borrow();
            (target.width(), target.height())
        };
        let tiles: Arc<Vec<Tile>> = Arc::new(raster::build_tiles(width, height, tile_size));

        let bounds: Vec<_> = resolved
            .iter()
            .map(|(v0, v1, v2)| raster::triangle_bounds(v0.position, v1.position, v2.position, width, height))
            .collect();
        let bins = Arc::new(raster::bin_triangles(&tiles, &bounds));

        log::trace!("tiled dispatch: {} tile(s), tile_size={tile_size}", tiles.len());

        let mut target_guard = target_rc.borrow_mut();
        let target_ptr = TargetPtr(&mut *target_guard as *mut dyn ColorTarget);
        let depth_ptr = DepthPtr(&mut self.depth_target as *mut DepthTarget);

        for tile_index in 0..tiles.len() {
            if bins[tile_index].is_empty() {
                continue;
            }
            let tiles = Arc::clone(&tiles);
            let bins = Arc::clone(&bins);
            let resolved = Arc::clone(&resolved);
            let pixel_shader = Arc::clone(&pixel_shader);

            self.pool.enqueue(move || {
                let tile = tiles[tile_index];
                let clip = (tile.x, tile.y, tile.x + tile.width, tile.y + tile.height);
                // SAFETY: see `TargetPtr`/`DepthPtr` — tiles partition the
                // pixel set, so this worker never touches another tile's
                // pixels.
                let target = unsafe { &mut *target_ptr.0 };
                let depth = unsafe { &mut *depth_ptr.0 };
                for &tri_index in &bins[tile_index] {
                    let (v0, v1, v2) = &resolved[tri_index];
                    raster::rasterize_triangle_simd(target, depth, v0, v1, v2, cull, Some(clip), &pixel_shader, constants);
                }
            });
        }
        self.pool.wait();
    }

    fn dispatch_wireframe(&mut self) {
        let resolved = self.resolved_triangles();
        let target_rc = self.active_target();
        let mut target_guard = target_rc.borrow_mut();
        for (v0, v1, v2) in &resolved {
            draw_wire_edge(&mut *target_guard, &mut self.depth_target, v0, v1);
            draw_wire_edge(&mut *target_guard, &mut self.depth_target, v1, v2);
            draw_wire_edge(&mut *target_guard, &mut self.depth_target, v2, v0);
        }
    }

    fn dispatch_points(&mut self) {
        let mut drawn = vec![false; self.vertex_cache.len()];
        let target_rc = self.active_target();
        let mut target_guard = target_rc.borrow_mut();
        for &(i0, i1, i2) in &self.triangles {
            for idx in [i0, i1, i2] {
                if drawn[idx] {
                    continue;
                }
                drawn[idx] = true;
                let v = self.vertex_cache[idx];
                raster::draw_point(
                    &mut *target_guard,
                    &mut self.depth_target,
                    v.position.x.round() as i32,
                    v.position.y.round() as i32,
                    v.position.z,
                    v.color,
                );
            }
        }
    }

    /// Fills every pixel of the active target by invoking the pixel shader
    /// alone, with `uv = (x/(W-1), y/(H-1))`, tile-parallelized over the
    /// same worker pool the tiled solid-fill path uses.
    pub fn draw_full_screen_quad(&mut self) {
        let Some(pixel_shader) = self.context.pixel_shader().cloned() else {
            log::warn!("draw_full_screen_quad skipped: pixel shader is not set");
            return;
        };
        let constants = self.context.constant_buffer();
        let tile_size = self.context.tile_size().max(1);

        let target_rc = self.active_target();
        let (width, height) = {
            let target = target_rc.borrow();
            (target.width(), target.height())
        };
        let tiles = raster::build_tiles(width, height, tile_size);

        let mut target_guard = target_rc.borrow_mut();
        let target_ptr = TargetPtr(&mut *target_guard as *mut dyn ColorTarget);

        for tile in tiles {
            let pixel_shader = Arc::clone(&pixel_shader);
            self.pool.enqueue(move || {
                // SAFETY: see `TargetPtr` — tiles partition the pixel set.
                let target = unsafe { &mut *target_ptr.0 };
                for y in tile.y_range() {
                    for x in tile.x_range() {
                        let u = x as f32 / (width - 1).max(1) as f32;
                        let v = y as f32 / (height - 1).max(1) as f32;
                        let input = VertexOutput::new(Vec4::new(x as f32, y as f32, 0.0, 1.0), Vec4::ONE, glam::Vec2::new(u, v));
                        let color = pixel_shader(&input, constants);
                        target.set_pixel(glam::IVec2::new(x as i32, y as i32), color);
                    }
                }
            });
        }
        self.pool.wait();
    }
}

fn draw_wire_edge(target: &mut dyn ColorTarget, depth: &mut DepthTarget, a: &VertexOutput, b: &VertexOutput) {
    raster::draw_line(
        target,
        depth,
        a.position.x.round() as i32,
        a.position.y.round() as i32,
        b.position.x.round() as i32,
        b.position.y.round() as i32,
        a.position.z,
        b.position.z,
        WIRE_COLOR,
    );
}
