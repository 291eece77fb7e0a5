//! The device and its per-draw context snapshot.
pub mod context;
mod device;

pub use context::{CullMode, DeviceContext, FillMode, RenderTargetHandle};
pub use device::Device;
