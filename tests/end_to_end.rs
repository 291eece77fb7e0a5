//! Black-box scenario tests against the public `Device` API, one per
//! end-to-end scenario in the specification's testable-properties section.
use glam::{Vec2, Vec3, Vec4};
use soft_rend::buffers::{VertexInput, VertexOutput, Viewport};
use soft_rend::device::{CullMode, Device, DeviceContext, FillMode};

fn passthrough_context(width: f32, height: f32) -> DeviceContext {
    let mut ctx = DeviceContext::new();
    ctx.set_vertex_shader(Box::new(|v: &VertexInput, _| VertexOutput::new(v.position.extend(1.0), v.color, v.uv)));
    ctx.set_pixel_shader(Box::new(|v: &VertexOutput, _| v.color));
    ctx.set_viewport(Viewport::full(width, height));
    ctx.set_tiled_rendering(false);
    ctx
}

fn present_rgba8(device: &Device, width: usize, height: usize) -> Vec<[u8; 4]> {
    let mut frame = vec![0u8; width * height * 4];
    device.present(&mut frame);
    frame.chunks_exact(4).map(|c| [c[0], c[1], c[2], c[3]]).collect()
}

/// Clip-space (pre-projective-divide, `w=1`) x/y that `clip_to_screen` maps
/// to exactly pixel `(px, py)` in a `width x height` viewport. Inverts the
/// mapping in spec.md §4.2 so tests can target specific pixels without
/// depending on the mapping's internals.
fn clip_xy_for_pixel(px: f32, py: f32, width: f32, height: f32) -> (f32, f32) {
    let ndc_x = 2.0 * px / width - 1.0;
    let ndc_y = 1.0 - 2.0 * py / height;
    (ndc_x, ndc_y)
}

/// Scenario 1: clear-only.
#[test]
fn clear_only() {
    let mut device = Device::new(4, 4);
    device.clear(Vec4::new(0.25, 0.5, 0.75, 1.0));
    device.clear_depth(1.0);

    let frame = present_rgba8(&device, 4, 4);
    assert!(frame.iter().all(|&px| px == [0x40, 0x80, 0xBF, 0xFF]));
    assert!(device.depth_target().data().iter().all(|&d| d == 1.0));
}

/// Scenario 2: single triangle covers the whole target.
#[test]
fn single_triangle_covers_whole_target() {
    let mut device = Device::new(4, 4);
    let mut ctx = passthrough_context(4.0, 4.0);
    ctx.set_vertex_buffer(vec![
        VertexInput::new(Vec3::new(-1.0, -1.0, 0.5), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(5.0, -1.0, 0.5), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(-1.0, 5.0, 0.5), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2]);
    ctx.set_cull_mode(CullMode::None);
    device.set_device_context(ctx);
    device.draw_indexed_all();

    let frame = present_rgba8(&device, 4, 4);
    assert!(frame.iter().all(|&px| px == [0xFF, 0x00, 0x00, 0xFF]));
    assert!(device.depth_target().data().iter().all(|&d| (d - 0.5).abs() < 1e-5));
}

/// Scenario 3: depth occlusion between two overlapping triangles.
#[test]
fn depth_occlusion() {
    let mut device = Device::new(2, 1);
    let mut ctx = passthrough_context(2.0, 1.0);
    ctx.set_vertex_buffer(vec![
        // Triangle 0: covers pixel (0,0) only, green, far (z=0.5).
        VertexInput::new(Vec3::new(-1.0, -3.0, 0.5), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(1.0, -3.0, 0.5), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(-1.0, 3.0, 0.5), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        // Triangle 1: covers both pixels, red, near (z=0.2).
        VertexInput::new(Vec3::new(-5.0, -5.0, 0.2), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(5.0, -5.0, 0.2), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(-5.0, 5.0, 0.2), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2, 3, 4, 5]);
    device.set_device_context(ctx);
    device.draw_indexed_all();

    let frame = present_rgba8(&device, 2, 1);
    assert_eq!(frame[0], [0xFF, 0x00, 0x00, 0xFF]);
    assert_eq!(frame[1], [0xFF, 0x00, 0x00, 0xFF]);
    assert!((device.depth_target().at(0) - 0.2).abs() < 1e-5);
    assert!((device.depth_target().at(1) - 0.2).abs() < 1e-5);
}

/// Scenario 4: back-face culling discards a clockwise-wound triangle.
#[test]
fn cull_back_face_writes_nothing() {
    let mut device = Device::new(4, 4);
    let mut ctx = passthrough_context(4.0, 4.0);
    ctx.set_vertex_buffer(vec![
        VertexInput::new(Vec3::new(0.0, 0.0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(1.0, 0.0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(0.0, 1.0, 0.5), Vec4::ONE, Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2]);
    ctx.set_cull_mode(CullMode::Back);
    device.set_device_context(ctx);
    device.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
    device.clear_depth(1.0);
    device.draw_indexed_all();

    let frame = present_rgba8(&device, 4, 4);
    assert!(frame.iter().all(|&px| px == [0, 0, 0, 0xFF]));
    assert!(device.depth_target().data().iter().all(|&d| d == 1.0));
}

/// Scenario 5: tiled vs. non-tiled dispatch produce identical output across
/// several tile sizes, for a scene of several overlapping triangles.
#[test]
fn tiled_and_untiled_are_pixel_identical_across_tile_sizes() {
    let vertex_buffer = vec![
        VertexInput::new(Vec3::new(-20.0, -12.0, 0.6), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(40.0, -8.0, 0.6), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(5.0, 50.0, 0.6), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(-30.0, 40.0, 0.3), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(60.0, -30.0, 0.3), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(-10.0, 70.0, 0.3), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
    ];
    let index_buffer = vec![0u32, 1, 2, 3, 4, 5];

    let mut untiled = Device::new(64, 64);
    let mut ctx_u = passthrough_context(64.0, 64.0);
    ctx_u.set_vertex_buffer(vertex_buffer.clone());
    ctx_u.set_index_buffer(index_buffer.clone());
    untiled.set_device_context(ctx_u);
    untiled.draw_indexed_all();
    let untiled_frame = present_rgba8(&untiled, 64, 64);
    let untiled_depth = untiled.depth_target().data().to_vec();

    for tile_size in [16usize, 64, 256] {
        let mut tiled = Device::new(64, 64);
        let mut ctx_t = passthrough_context(64.0, 64.0);
        ctx_t.set_vertex_buffer(vertex_buffer.clone());
        ctx_t.set_index_buffer(index_buffer.clone());
        ctx_t.set_tiled_rendering(true);
        ctx_t.set_tile_size(tile_size);
        tiled.set_device_context(ctx_t);
        tiled.draw_indexed_all();

        let tiled_frame = present_rgba8(&tiled, 64, 64);
        assert_eq!(tiled_frame, untiled_frame, "tile_size={tile_size}");
        assert_eq!(tiled.depth_target().data(), untiled_depth.as_slice(), "tile_size={tile_size}");
    }
}

/// Scenario 6: the vertex shader is invoked exactly once per unique index.
#[test]
fn vertex_shader_invocation_count() {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = Arc::clone(&calls);

    let mut device = Device::new(4, 4);
    let mut ctx = DeviceContext::new();
    ctx.set_vertex_shader(Box::new(move |v: &VertexInput, _| {
        calls_clone.fetch_add(1, Ordering::SeqCst);
        VertexOutput::new(v.position.extend(1.0), v.color, v.uv)
    }));
    ctx.set_pixel_shader(Box::new(|v: &VertexOutput, _| v.color));
    ctx.set_viewport(Viewport::full(4.0, 4.0));
    ctx.set_vertex_buffer(vec![VertexInput::default(); 4]);
    ctx.set_index_buffer(vec![0, 1, 2, 2, 1, 3, 0, 2, 3]);
    ctx.set_tiled_rendering(false);
    device.set_device_context(ctx);
    device.draw_indexed_all();

    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

/// Boundary behavior: a triangle with all vertices outside the viewport
/// writes no pixels.
#[test]
fn triangle_fully_outside_viewport_writes_nothing() {
    let mut device = Device::new(8, 8);
    let mut ctx = passthrough_context(8.0, 8.0);
    ctx.set_vertex_buffer(vec![
        VertexInput::new(Vec3::new(-40.0, -40.0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(-30.0, -40.0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(-40.0, -30.0, 0.5), Vec4::ONE, Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2]);
    device.set_device_context(ctx);
    device.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
    device.clear_depth(1.0);
    device.draw_indexed_all();

    assert!(device.depth_target().data().iter().all(|&d| d == 1.0));
}

/// Boundary behavior: corner pixels are writable.
#[test]
fn corner_pixels_are_writable() {
    let mut device = Device::new(4, 4);
    let mut ctx = passthrough_context(4.0, 4.0);
    ctx.set_vertex_buffer(vec![
        VertexInput::new(Vec3::new(-1.0, -1.0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(5.0, -1.0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(-1.0, 5.0, 0.5), Vec4::ONE, Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2]);
    device.set_device_context(ctx);
    device.draw_indexed_all();

    assert!((device.depth_target().at_coord(glam::IVec2::new(0, 0)) - 0.5).abs() < 1e-5);
    assert!((device.depth_target().at_coord(glam::IVec2::new(3, 3)) - 0.5).abs() < 1e-5);
}

/// Full-screen quad writes every pixel exactly once.
#[test]
fn full_screen_quad_writes_every_pixel() {
    let mut device = Device::new(5, 3);
    let mut ctx = DeviceContext::new();
    ctx.set_pixel_shader(Box::new(|v: &VertexOutput, _| Vec4::new(v.uv.x, v.uv.y, 0.0, 1.0)));
    ctx.set_tile_size(2);
    device.set_device_context(ctx);
    device.clear(Vec4::new(1.0, 1.0, 1.0, 1.0));
    device.draw_full_screen_quad();

    let frame = present_rgba8(&device, 5, 3);
    assert!(frame.iter().all(|&px| px != [0xFF, 0xFF, 0xFF, 0xFF]));
}

/// Wireframe fill mode draws edges but leaves the interior untouched.
#[test]
fn wireframe_mode_draws_edges_only() {
    let mut device = Device::new(16, 16);
    let mut ctx = passthrough_context(16.0, 16.0);
    let (x0, y0) = clip_xy_for_pixel(1.0, 14.0, 16.0, 16.0);
    let (x1, y1) = clip_xy_for_pixel(14.0, 14.0, 16.0, 16.0);
    let (x2, y2) = clip_xy_for_pixel(1.0, 1.0, 16.0, 16.0);
    ctx.set_vertex_buffer(vec![
        VertexInput::new(Vec3::new(x0, y0, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(x1, y1, 0.5), Vec4::ONE, Vec2::ZERO),
        VertexInput::new(Vec3::new(x2, y2, 0.5), Vec4::ONE, Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2]);
    ctx.set_fill_mode(FillMode::Wireframe);
    device.set_device_context(ctx);
    device.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
    device.draw_indexed_all();

    let frame = present_rgba8(&device, 16, 16);
    // The triangle's centroid sits well inside the right-angle at (1, 1),
    // away from all three edges, and is untouched in wireframe mode.
    let centroid_idx = 9usize * 16 + 4;
    assert_eq!(frame[centroid_idx], [0, 0, 0, 0xFF]);
    assert!(frame.iter().any(|&px| px == [0xFF, 0xFF, 0xFF, 0xFF]));
}

/// Point fill mode draws each distinct vertex once, deduplicated.
#[test]
fn point_mode_draws_each_distinct_vertex_once() {
    let mut device = Device::new(8, 8);
    let mut ctx = passthrough_context(8.0, 8.0);
    let (x0, y0) = clip_xy_for_pixel(1.0, 1.0, 8.0, 8.0);
    let (x1, y1) = clip_xy_for_pixel(5.0, 1.0, 8.0, 8.0);
    let (x2, y2) = clip_xy_for_pixel(1.0, 5.0, 8.0, 8.0);
    ctx.set_vertex_buffer(vec![
        VertexInput::new(Vec3::new(x0, y0, 0.5), Vec4::new(1.0, 0.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(x1, y1, 0.5), Vec4::new(0.0, 1.0, 0.0, 1.0), Vec2::ZERO),
        VertexInput::new(Vec3::new(x2, y2, 0.5), Vec4::new(0.0, 0.0, 1.0, 1.0), Vec2::ZERO),
    ]);
    ctx.set_index_buffer(vec![0, 1, 2]);
    ctx.set_fill_mode(FillMode::Point);
    device.set_device_context(ctx);
    device.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
    device.draw_indexed_all();

    let frame = present_rgba8(&device, 8, 8);
    assert_eq!(frame[1 * 8 + 1], [0xFF, 0x00, 0x00, 0xFF]);
    assert_eq!(frame[1 * 8 + 5], [0x00, 0xFF, 0x00, 0xFF]);
    assert_eq!(frame[5 * 8 + 1], [0x00, 0x00, 0xFF, 0xFF]);
}

/// Invalid context (missing shaders/buffers) skips the draw without panic.
#[test]
fn invalid_context_skips_the_draw() {
    let mut device = Device::new(2, 2);
    device.draw_indexed_all();
    let frame = present_rgba8(&device, 2, 2);
    assert!(frame.iter().all(|&px| px == [0, 0, 0, 0xFF]));
}
