//! A CPU software rasterizer core: programmable triangle rasterization,
//! tiled multi-threaded dispatch, and the device/context state machine that
//! ties them together.
//!
//! Callers supply vertex/index buffers and vertex/pixel shader callables to
//! [`device::Device`]; everything else — screen mapping, binning, worker
//! dispatch, depth testing — is handled internally.
#![warn(
    missing_docs,
    clippy::missing_errors_doc,
    clippy::missing_docs_in_private_items,
    clippy::missing_panics_doc
)]

pub mod buffers;
pub mod device;
pub mod error;
pub mod pool;
pub mod raster;
pub mod shader;
pub mod targets;
