//! The triangle rasterizer: scalar and SIMD-quad variants over barycentric
//! edge-function coverage, affine screen-space attribute interpolation, and
//! a strict depth test.
use crate::buffers::{ConstantBuffer, VertexOutput};
use crate::device::context::CullMode;
use crate::shader::PixelShader;
use crate::targets::{ColorTarget, DepthTarget};
use glam::Vec2;
use wide::f32x4;

/// Degenerate-area threshold below which a triangle is discarded outright.
const AREA_EPSILON: f32 = 1e-6;

/// Linear coefficients of an edge function: `f(x, y) = dx*x + dy*y + c`.
#[derive(Clone, Copy)]
struct Edge {
    dx: f32,
    dy: f32,
    c: f32,
}
impl Edge {
    fn new(a: Vec2, b: Vec2) -> Self {
        let dx = b.y - a.y;
        let dy = -(b.x - a.x);
        let c = -a.x * dx - a.y * dy;
        Edge { dx, dy, c }
    }
    #[inline]
    fn eval(&self, x: f32, y: f32) -> f32 {
        self.dx * x + self.dy * y + self.c
    }
}

/// Doubled signed area of triangle `(v0, v1, v2)` in screen space.
fn signed_area(v0: Vec2, v1: Vec2, v2: Vec2) -> f32 {
    super::primitives::edge_function(v0, v1, v2)
}

fn is_culled(area: f32, cull: CullMode) -> bool {
    if area.abs() < AREA_EPSILON {
        return true;
    }
    match cull {
        CullMode::None => false,
        CullMode::Front => area > 0.0,
        CullMode::Back => area < 0.0,
    }
}

/// Clamps a triangle's screen-space bounding box to `[0, width) x [0,
/// height)`, further intersected with `clip` when given (the tiled path's
/// tile rectangle). Returns `None` when the resulting box is empty.
fn bounding_box(
    v0: Vec2,
    v1: Vec2,
    v2: Vec2,
    width: usize,
    height: usize,
    clip: Option<(usize, usize, usize, usize)>,
) -> Option<(usize, usize, usize, usize)> {
    let (mut min_x, mut min_y, mut max_x, mut max_y) =
        super::tile::triangle_bounds(v0.extend(0.0).extend(1.0), v1.extend(0.0).extend(1.0), v2.extend(0.0).extend(1.0), width, height)?;
    if let Some((cx0, cy0, cx1, cy1)) = clip {
        min_x = min_x.max(cx0);
        min_y = min_y.max(cy0);
        max_x = max_x.min(cx1);
        max_y = max_y.min(cy1);
    }
    if min_x >= max_x || min_y >= max_y {
        None
    } else {
        Some((min_x, min_y, max_x, max_y))
    }
}

/// Shared per-pixel epilogue: barycentric interpolation, depth test, and
/// pixel-shader invocation. `w0, w1, w2` are already normalized (sum to 1).
#[inline]
#[allow(clippy::too_many_arguments)]
fn shade_pixel(
    target: &mut dyn ColorTarget,
    depth: &mut DepthTarget,
    x: usize,
    y: usize,
    width: usize,
    w0: f32,
    w1: f32,
    w2: f32,
    v0: &VertexOutput,
    v1: &VertexOutput,
    v2: &VertexOutput,
    pixel_shader: &PixelShader,
    constants: ConstantBuffer,
) {
    let z = w0 * v0.position.z + w1 * v1.position.z + w2 * v2.position.z;
    let idx = y * width + x;
    if z < depth.at(idx) {
        let color = w0 * v0.color + w1 * v1.color + w2 * v2.color;
        let uv = w0 * v0.uv + w1 * v1.uv + w2 * v2.uv;
        let input = VertexOutput::new(glam::Vec4::new(x as f32, y as f32, z, 1.0), color, uv);
        let shaded = pixel_shader(&input, constants);
        depth.set(idx, z);
        target.set_pixel(glam::IVec2::new(x as i32, y as i32), shaded);
    }
}

/// Rasterizes one triangle, scanning every covered pixel one at a time.
/// `clip`, when given, additionally bounds the scan to that rectangle (the
/// tiled dispatch path).
#[allow(clippy::too_many_arguments)]
pub fn rasterize_triangle_scalar(
    target: &mut dyn ColorTarget,
    depth: &mut DepthTarget,
    v0: &VertexOutput,
    v1: &VertexOutput,
    v2: &VertexOutput,
    cull: CullMode,
    clip: Option<(usize, usize, usize, usize)>,
    pixel_shader: &PixelShader,
    constants: ConstantBuffer,
) {
    let p0 = v0.position.truncate().truncate();
    let p1 = v1.position.truncate().truncate();
    let p2 = v2.position.truncate().truncate();
    let area = signed_area(p0, p1, p2);
    if is_culled(area, cull) {
        return;
    }
    let width = target.width();
    let height = target.height();
    let Some((min_x, min_y, max_x, max_y)) = bounding_box(p0, p1, p2, width, height, clip) else {
        return;
    };

    let e0 = Edge::new(p1, p2);
    let e1 = Edge::new(p2, p0);
    let e2 = Edge::new(p0, p1);
    let inv_area = 1.0 / area;

    for y in min_y..max_y {
        let py = y as f32 + 0.5;
        for x in min_x..max_x {
            let px = x as f32 + 0.5;
            let f0 = e0.eval(px, py);
            let f1 = e1.eval(px, py);
            let f2 = e2.eval(px, py);
            if f0 * area >= 0.0 && f1 * area >= 0.0 && f2 * area >= 0.0 {
                let w0 = f0 * inv_area;
                let w1 = f1 * inv_area;
                let w2 = f2 * inv_area;
                shade_pixel(target, depth, x, y, width, w0, w1, w2, v0, v1, v2, pixel_shader, constants);
            }
        }
    }
}

/// Rasterizes one triangle four pixels at a time along each row, falling
/// back to the scalar inner loop for the row's remainder. Must produce
/// bit-identical output to [`rasterize_triangle_scalar`] for identical
/// inputs: the quad path evaluates the exact same edge-function arithmetic,
/// just four `x` values at once.
#[allow(clippy::too_many_arguments)]
pub fn rasterize_triangle_simd(
    target: &mut dyn ColorTarget,
    depth: &mut DepthTarget,
    v0: &VertexOutput,
    v1: &VertexOutput,
    v2: &VertexOutput,
    cull: CullMode,
    clip: Option<(usize, usize, usize, usize)>,
    pixel_shader: &PixelShader,
    constants: ConstantBuffer,
) {
    let p0 = v0.position.truncate().truncate();
    let p1 = v1.position.truncate().truncate();
    let p2 = v2.position.truncate().truncate();
    let area = signed_area(p0, p1, p2);
    if is_culled(area, cull) {
        return;
    }
    let width = target.width();
    let height = target.height();
    let Some((min_x, min_y, max_x, max_y)) = bounding_box(p0, p1, p2, width, height, clip) else {
        return;
    };

    let e0 = Edge::new(p1, p2);
    let e1 = Edge::new(p2, p0);
    let e2 = Edge::new(p0, p1);
    let inv_area = 1.0 / area;
    let area_v = f32x4::splat(area);
    let lane_offsets = f32x4::new([0.0, 1.0, 2.0, 3.0]);

    for y in min_y..max_y {
        let py = y as f32 + 0.5;
        let row_width = max_x - min_x;
        let quad_count = row_width / 4;
        let mut x = min_x;

        for _ in 0..quad_count {
            let px0 = f32x4::splat(x as f32 + 0.5) + lane_offsets;
            let py_v = f32x4::splat(py);
            let f0 = f32x4::splat(e0.dx) * px0 + f32x4::splat(e0.dy) * py_v + f32x4::splat(e0.c);
            let f1 = f32x4::splat(e1.dx) * px0 + f32x4::splat(e1.dy) * py_v + f32x4::splat(e1.c);
            let f2 = f32x4::splat(e2.dx) * px0 + f32x4::splat(e2.dy) * py_v + f32x4::splat(e2.c);

            let f0_arr = (f0 * area_v).to_array();
            let f1_arr = (f1 * area_v).to_array();
            let f2_arr = (f2 * area_v).to_array();
            let f0_raw = f0.to_array();
            let f1_raw = f1.to_array();
            let f2_raw = f2.to_array();

            for lane in 0..4 {
                if f0_arr[lane] >= 0.0 && f1_arr[lane] >= 0.0 && f2_arr[lane] >= 0.0 {
                    let w0 = f0_raw[lane] * inv_area;
                    let w1 = f1_raw[lane] * inv_area;
                    let w2 = f2_raw[lane] * inv_area;
                    shade_pixel(target, depth, x + lane, y, width, w0, w1, w2, v0, v1, v2, pixel_shader, constants);
                }
            }
            x += 4;
        }

        // Scalar fringe: whatever doesn't fill a full quad at the row's end.
        while x < max_x {
            let px = x as f32 + 0.5;
            let f0 = e0.eval(px, py);
            let f1 = e1.eval(px, py);
            let f2 = e2.eval(px, py);
            if f0 * area >= 0.0 && f1 * area >= 0.0 && f2 * area >= 0.0 {
                let w0 = f0 * inv_area;
                let w1 = f1 * inv_area;
                let w2 = f2 * inv_area;
                shade_pixel(target, depth, x, y, width, w0, w1, w2, v0, v1, v2, pixel_shader, constants);
            }
            x += 1;
        }
    }
}
