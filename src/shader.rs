//! Shader callable contracts.
//!
//! Shaders are arbitrary caller-supplied pure functions, modeled as handles
//! to a boxed callable that captures its environment. Dispatch is dynamic:
//! the hot inner loop pays one indirect call per fragment, which is
//! expected and acceptable.
use crate::buffers::{ConstantBuffer, VertexInput, VertexOutput};
use glam::Vec4;

/// `(VertexInput, ConstantBuffer) -> VertexOutput`. Must produce a
/// clip-space position; colors and UVs flow through unchanged or
/// transformed. Must be pure with respect to its inputs and safe to invoke
/// from any worker thread.
pub type VertexShader = Box<dyn Fn(&VertexInput, ConstantBuffer) -> VertexOutput + Send + Sync>;

/// `(VertexOutput, ConstantBuffer) -> RGBA`. Same purity and thread-safety
/// contract as [`VertexShader`].
pub type PixelShader = Box<dyn Fn(&VertexOutput, ConstantBuffer) -> Vec4 + Send + Sync>;
