//! Vertex/index/constant buffers and the viewport, as value types the
//! caller hands to a [`crate::device::DeviceContext`].
use glam::{Vec2, Vec3, Vec4};

/// Per-vertex attributes supplied by the caller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexInput {
    /// Local/object-space position.
    pub position: Vec3,
    /// Vertex color.
    pub color: Vec4,
    /// Texture coordinate.
    pub uv: Vec2,
}
impl VertexInput {
    /// Builds a vertex input from its three attributes.
    pub fn new(position: Vec3, color: Vec4, uv: Vec2) -> Self {
        VertexInput { position, color, uv }
    }
}
impl Default for VertexInput {
    fn default() -> Self {
        VertexInput {
            position: Vec3::ZERO,
            color: Vec4::ZERO,
            uv: Vec2::ZERO,
        }
    }
}

/// Output of the vertex shader. Clip-space on entry to the device's screen
/// mapping, screen-space (`w = 1`) afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput {
    /// Clip-space position before [`crate::device::Device::clip_to_screen`],
    /// screen-space pixel position after.
    pub position: Vec4,
    /// Interpolated color.
    pub color: Vec4,
    /// Interpolated texture coordinate.
    pub uv: Vec2,
}
impl VertexOutput {
    /// Builds a vertex output from its three attributes.
    pub fn new(position: Vec4, color: Vec4, uv: Vec2) -> Self {
        VertexOutput { position, color, uv }
    }
}
impl Default for VertexOutput {
    fn default() -> Self {
        VertexOutput {
            position: Vec4::ZERO,
            color: Vec4::ZERO,
            uv: Vec2::ZERO,
        }
    }
}

/// Ordered sequence of [`VertexInput`], indexed by the index buffer.
pub type VertexBuffer = Vec<VertexInput>;
/// Ordered sequence of 32-bit unsigned vertex indices, consumed as
/// consecutive triples starting at a draw's `start_index`.
pub type IndexBuffer = Vec<u32>;

/// Opaque per-draw uniform data, passed by reference to every shader
/// invocation. The device never interprets its contents.
///
/// # Safety
///
/// The caller must ensure the referenced bytes outlive the draw call they
/// are set for, and that vertex/pixel shaders agree on how to reinterpret
/// them.
#[derive(Clone, Copy)]
pub struct ConstantBuffer {
    data: *const u8,
    len: usize,
}
impl ConstantBuffer {
    /// Wraps a raw byte block. See the struct-level safety note.
    pub fn new(data: *const u8, len: usize) -> Self {
        ConstantBuffer { data, len }
    }
    /// An empty constant buffer, for draws that need none.
    pub fn empty() -> Self {
        ConstantBuffer {
            data: std::ptr::null(),
            len: 0,
        }
    }
    /// Builds a constant buffer viewing `value` for the duration of its
    /// borrow. The caller must not let the returned buffer outlive `value`.
    pub fn from_ref<T>(value: &T) -> Self {
        ConstantBuffer {
            data: (value as *const T).cast::<u8>(),
            len: std::mem::size_of::<T>(),
        }
    }
    /// Byte length of the referenced block.
    pub fn len(&self) -> usize {
        self.len
    }
    /// True if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
    /// Raw pointer to the referenced bytes.
    pub fn data(&self) -> *const u8 {
        self.data
    }
    /// Reinterprets the buffer as `&T`. The caller must ensure `T` matches
    /// what was passed to [`ConstantBuffer::from_ref`] and that the
    /// underlying value is still alive.
    ///
    /// # Safety
    ///
    /// Same obligations as [`std::ptr::read`]: the pointer must be valid,
    /// aligned, and the lifetime of the pointee must actually outlive this
    /// borrow.
    pub unsafe fn as_ref<T>(&self) -> &T {
        &*self.data.cast::<T>()
    }
}
impl Default for ConstantBuffer {
    fn default() -> Self {
        ConstantBuffer::empty()
    }
}
// Shaders are required to be pure and safe to invoke from any worker; the
// constant buffer they read is immutable for the duration of a draw, so
// sharing the raw pointer across threads is sound under that contract.
unsafe impl Send for ConstantBuffer {}
unsafe impl Sync for ConstantBuffer {}

/// Screen-space mapping parameters for a draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Top-left corner, in pixels.
    pub origin: Vec2,
    /// Width/height, in pixels.
    pub size: Vec2,
    /// Near depth-range bound, mapped from NDC `z = -1`.
    pub min_z: f32,
    /// Far depth-range bound, mapped from NDC `z = 1`.
    pub max_z: f32,
}
impl Viewport {
    /// Builds a viewport from its origin, size and depth range.
    pub fn new(origin: Vec2, size: Vec2, min_z: f32, max_z: f32) -> Self {
        Viewport {
            origin,
            size,
            min_z,
            max_z,
        }
    }
    /// A viewport covering `(0, 0, width, height)` with the default depth
    /// range `[0, 1]`.
    pub fn full(width: f32, height: f32) -> Self {
        Viewport {
            origin: Vec2::ZERO,
            size: Vec2::new(width, height),
            min_z: 0.0,
            max_z: 1.0,
        }
    }
}
impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            origin: Vec2::ZERO,
            size: Vec2::ZERO,
            min_z: 0.0,
            max_z: 1.0,
        }
    }
}
