use crate::error::{RenderError, Result};

use super::viewport::Viewport;

/// Refresh rate the swap chain is described with. Presentation itself does
/// not wait for vertical blank.
pub const NOMINAL_REFRESH_HZ: u32 = 60;

/// Swap-chain parameters, fixed for the lifetime of the window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SwapChainSpec {
    pub width: u32,
    pub height: u32,
    /// Back buffers; maps to the surface's maximum frame latency.
    pub buffer_count: u32,
    pub refresh_hz: u32,
    pub sample_count: u32,
    pub windowed: bool,
}

impl SwapChainSpec {
    /// Single windowed back buffer of `width` x `height`, no multisampling.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            buffer_count: 1,
            refresh_hz: NOMINAL_REFRESH_HZ,
            sample_count: 1,
            windowed: true,
        })
    }

    /// Viewport covering the whole back buffer.
    pub fn viewport(&self) -> Viewport {
        Viewport::full(self.width, self.height)
    }

    pub fn surface_configuration(
        &self,
        format: wgpu::TextureFormat,
        present_mode: wgpu::PresentMode,
        alpha_mode: wgpu::CompositeAlphaMode,
    ) -> wgpu::SurfaceConfiguration {
        wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: self.width,
            height: self.height,
            present_mode,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: self.buffer_count,
        }
    }
}

/// Picks an 8-bit unsigned-normalized RGBA back-buffer format.
pub fn choose_surface_format(caps: &wgpu::SurfaceCapabilities) -> Option<wgpu::TextureFormat> {
    [wgpu::TextureFormat::Rgba8Unorm, wgpu::TextureFormat::Bgra8Unorm]
        .into_iter()
        .find(|f| caps.formats.contains(f))
}

pub fn choose_alpha_mode(
    caps: &wgpu::SurfaceCapabilities,
    requested: Option<wgpu::CompositeAlphaMode>,
) -> wgpu::CompositeAlphaMode {
    requested
        .filter(|m| caps.alpha_modes.contains(m))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caps(formats: Vec<wgpu::TextureFormat>) -> wgpu::SurfaceCapabilities {
        wgpu::SurfaceCapabilities {
            formats,
            alpha_modes: vec![wgpu::CompositeAlphaMode::Opaque],
            ..Default::default()
        }
    }

    // ── swap chain ────────────────────────────────────────────────────────

    #[test]
    fn default_window_swap_chain() {
        let spec = SwapChainSpec::new(640, 480).unwrap();
        assert_eq!((spec.width, spec.height), (640, 480));
        assert_eq!(spec.buffer_count, 1);
        assert_eq!(spec.refresh_hz, 60);
        assert_eq!(spec.sample_count, 1);
        assert!(spec.windowed);
    }

    #[test]
    fn viewport_matches_swap_chain() {
        let vp = SwapChainSpec::new(640, 480).unwrap().viewport();
        assert_eq!(vp, Viewport::full(640, 480));
    }

    #[test]
    fn zero_sized_swap_chain_is_rejected() {
        assert!(matches!(
            SwapChainSpec::new(0, 480),
            Err(RenderError::InvalidDimensions { .. })
        ));
        assert!(SwapChainSpec::new(640, 0).is_err());
    }

    #[test]
    fn configuration_uses_one_frame_of_latency() {
        let config = SwapChainSpec::new(640, 480).unwrap().surface_configuration(
            wgpu::TextureFormat::Rgba8Unorm,
            wgpu::PresentMode::AutoNoVsync,
            wgpu::CompositeAlphaMode::Opaque,
        );
        assert_eq!(config.desired_maximum_frame_latency, 1);
        assert_eq!(config.usage, wgpu::TextureUsages::RENDER_ATTACHMENT);
    }

    // ── format selection ──────────────────────────────────────────────────

    #[test]
    fn rgba_is_preferred() {
        let caps = caps(vec![
            wgpu::TextureFormat::Bgra8Unorm,
            wgpu::TextureFormat::Rgba8Unorm,
        ]);
        assert_eq!(choose_surface_format(&caps), Some(wgpu::TextureFormat::Rgba8Unorm));
    }

    #[test]
    fn bgra_is_accepted() {
        let caps = caps(vec![wgpu::TextureFormat::Bgra8UnormSrgb, wgpu::TextureFormat::Bgra8Unorm]);
        assert_eq!(choose_surface_format(&caps), Some(wgpu::TextureFormat::Bgra8Unorm));
    }

    #[test]
    fn srgb_only_surface_has_no_format() {
        let caps = caps(vec![wgpu::TextureFormat::Bgra8UnormSrgb]);
        assert_eq!(choose_surface_format(&caps), None);
    }

    #[test]
    fn unsupported_alpha_request_falls_back() {
        let caps = caps(vec![]);
        assert_eq!(
            choose_alpha_mode(&caps, Some(wgpu::CompositeAlphaMode::PreMultiplied)),
            wgpu::CompositeAlphaMode::Opaque
        );
    }
}
