use std::sync::Arc;

use wgpu::SurfaceError;
use winit::window::Window;

use crate::error::{RenderError, Result};

use super::surface::{SwapChainSpec, choose_alpha_mode, choose_surface_format};
use super::{GpuFrame, GpuInit, SurfaceErrorAction};

/// Owns wgpu core objects and the surface configuration.
///
/// This type is the low-level rendering context:
/// - creates the Instance and Adapter, and stores Device/Queue
/// - creates and configures the Surface (swap chain)
/// - acquires frames and presents them
pub struct Gpu<'w> {
    /// Surface bound to the window.
    ///
    /// Surface lifetime is tied to the window; architecture must ensure the window
    /// outlives the `Gpu` instance.
    surface: wgpu::Surface<'w>,

    /// Command queue.
    queue: wgpu::Queue,

    /// Logical device.
    device: wgpu::Device,

    /// Active surface configuration.
    config: wgpu::SurfaceConfiguration,

    spec: SwapChainSpec,
}

impl<'w> Gpu<'w> {
    /// Creates the device, queue and swap chain for a window.
    ///
    /// The swap chain is sized from `spec`, not from the window; the window
    /// is created at that size and never resized.
    pub async fn new(window: &'w Window, spec: &SwapChainSpec, init: &GpuInit) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: init.backends,
            ..Default::default()
        });

        // Surface lifetime is tied to `window` via `'w`.
        let surface = instance
            .create_surface(window)
            .map_err(|e| RenderError::DeviceCreation(format!("surface: {e}")))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: init.power_preference,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| RenderError::DeviceCreation(format!("adapter: {e}")))?;

        let info = adapter.get_info();
        log::info!("using adapter {} ({:?})", info.name, info.backend);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("prism device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .map_err(|e| RenderError::DeviceCreation(format!("device: {e}")))?;

        // Errors outside a validation scope are logged, never fatal.
        device.on_uncaptured_error(Arc::new(|e| {
            log::error!("uncaptured wgpu error: {e}");
        }));

        let max_dim = device.limits().max_texture_dimension_2d;
        if spec.width > max_dim || spec.height > max_dim {
            return Err(RenderError::InvalidDimensions {
                width: spec.width,
                height: spec.height,
            });
        }

        let caps = surface.get_capabilities(&adapter);
        if !caps.usages.contains(wgpu::TextureUsages::RENDER_ATTACHMENT) {
            return Err(RenderError::ViewCreation(
                "surface textures cannot be render attachments".to_string(),
            ));
        }
        let format = choose_surface_format(&caps).ok_or_else(|| {
            RenderError::ViewCreation(format!(
                "no 8-bit RGBA back-buffer format among {:?}",
                caps.formats
            ))
        })?;
        let alpha_mode = choose_alpha_mode(&caps, init.alpha_mode);

        let config = spec.surface_configuration(format, init.present_mode, alpha_mode);
        surface.configure(&device, &config);

        log::info!(
            "configured {}x{} {:?} swap chain ({:?})",
            spec.width,
            spec.height,
            format,
            init.present_mode
        );

        Ok(Gpu {
            surface,
            queue,
            device,
            config,
            spec: *spec,
        })
    }

    /// Returns the active surface format.
    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    /// The swap chain the surface was configured with.
    pub fn spec(&self) -> &SwapChainSpec {
        &self.spec
    }

    /// Returns a reference to the logical device.
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    /// Returns a reference to the command queue.
    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Acquires the next back buffer, derives its render-target view and
    /// creates an encoder.
    pub fn begin_frame(&self) -> std::result::Result<GpuFrame, SurfaceError> {
        let surface_texture = self.surface.get_current_texture()?;
        let view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor {
                label: Some("prism back buffer view"),
                ..Default::default()
            });

        let encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("prism frame encoder"),
            });

        Ok(GpuFrame {
            surface_texture,
            view,
            encoder,
        })
    }

    /// Submits the recorded commands and presents the back buffer.
    pub fn present(&self, frame: GpuFrame) {
        let GpuFrame {
            surface_texture,
            view,
            encoder,
        } = frame;

        self.queue.submit(std::iter::once(encoder.finish()));
        drop(view);
        surface_texture.present();
    }

    /// Converts a `SurfaceError` into a higher-level action, reconfiguring
    /// the surface when it was lost or outdated.
    pub fn handle_surface_error(&self, err: SurfaceError) -> SurfaceErrorAction {
        let action = SurfaceErrorAction::for_error(&err);
        if action == SurfaceErrorAction::Reconfigured {
            self.surface.configure(&self.device, &self.config);
        }
        log::warn!("surface error {err}: {action:?}");
        action
    }
}
