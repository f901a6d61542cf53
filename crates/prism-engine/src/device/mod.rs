//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swap chain) from a [`SwapChainSpec`]
//! - acquiring and presenting frames

mod error;
mod frame;
mod gpu;
mod init;
mod surface;
mod viewport;

pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
pub use surface::{NOMINAL_REFRESH_HZ, SwapChainSpec, choose_alpha_mode, choose_surface_format};
pub use viewport::Viewport;

/// Stub device from wgpu's noop backend.
///
/// Validation runs as on a real adapter; nothing is executed.
#[cfg(test)]
pub(crate) fn noop_device() -> wgpu::Device {
    let (device, _queue) = wgpu::Device::noop(&wgpu::DeviceDescriptor::default());
    device
}
