//! Screen-space mapping, point/line primitives, and the edge-function
//! building blocks shared by the triangle rasterizer.
use crate::buffers::Viewport;
use crate::targets::{ColorTarget, DepthTarget};
use glam::{IVec2, Vec2, Vec4};

/// The 2D edge function of segment `a -> b` evaluated at `p`: twice the
/// signed area of triangle `(a, b, p)`. Positive when `p` is to the left of
/// `a -> b` in screen space (y-down).
#[inline]
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (p.x - a.x) * (b.y - a.y) - (p.y - a.y) * (b.x - a.x)
}

/// Maps a clip-space position to screen space via the projective divide and
/// the viewport transform. `w` is discarded after the divide; downstream
/// attribute interpolation is screen-space affine, not perspective-correct.
pub fn clip_to_screen(clip_pos: Vec4, viewport: &Viewport) -> Vec4 {
    let inv_w = 1.0 / clip_pos.w;
    let ndc = Vec2::new(clip_pos.x * inv_w, clip_pos.y * inv_w);
    let ndc_z = clip_pos.z * inv_w;

    let screen_x = viewport.origin.x + (ndc.x * 0.5 + 0.5) * viewport.size.x;
    let screen_y = viewport.origin.y + (1.0 - (ndc.y * 0.5 + 0.5)) * viewport.size.y;
    let screen_z = viewport.min_z + ndc_z * (viewport.max_z - viewport.min_z);

    Vec4::new(screen_x, screen_y, screen_z, 1.0)
}

/// Plots a single pixel if it is in bounds and passes the depth test
/// (`z < depth[y*W+x]`).
pub fn draw_point(
    target: &mut dyn ColorTarget,
    depth: &mut DepthTarget,
    x: i32,
    y: i32,
    z: f32,
    color: Vec4,
) {
    if x < 0 || x >= target.width() as i32 || y < 0 || y >= target.height() as i32 {
        return;
    }
    let idx = y as usize * target.width() + x as usize;
    if z < depth.at(idx) {
        depth.set(idx, z);
        target.set_pixel(IVec2::new(x, y), color);
    }
}

/// Integer Bresenham walk between two points, interpolating depth linearly
/// over `steps + 1` samples. The terminal step always plots `(x1, y1)`.
pub fn draw_line(
    target: &mut dyn ColorTarget,
    depth: &mut DepthTarget,
    x0: i32,
    y0: i32,
    x1: i32,
    y1: i32,
    z0: f32,
    z1: f32,
    color: Vec4,
) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let steps = dx.max(-dy);
    let z_step = if steps > 0 { (z1 - z0) / steps as f32 } else { 0.0 };

    let mut err = dx + dy;
    let mut x = x0;
    let mut y = y0;
    let mut z = z0;
    for _ in 0..=steps {
        draw_point(target, depth, x, y, z, color);
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
        z += z_step;
    }
}
