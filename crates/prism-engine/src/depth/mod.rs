//! Depth-stencil target and the paired output binding.

use crate::error::{RenderError, Result};

/// Format of the depth-stencil texture: 24-bit depth, 8-bit stencil.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth24PlusStencil8;

/// Descriptor for a single-sample, single-mip depth-stencil texture.
pub fn depth_texture_descriptor(width: u32, height: u32) -> wgpu::TextureDescriptor<'static> {
    wgpu::TextureDescriptor {
        label: Some("prism depth-stencil"),
        size: wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    }
}

/// Depth-stencil texture sized to the surface.
///
/// Not resized: the window is fixed-size for the lifetime of the context.
pub struct DepthTarget {
    // Declared first so it drops before the texture it views.
    view: wgpu::TextureView,
    texture: wgpu::Texture,
}

impl DepthTarget {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Result<Self> {
        let max = device.limits().max_texture_dimension_2d;
        if width == 0 || height == 0 {
            return Err(RenderError::DepthResource(format!(
                "{width}x{height} has no area"
            )));
        }
        if width > max || height > max {
            return Err(RenderError::DepthResource(format!(
                "{width}x{height} exceeds the device maximum of {max}"
            )));
        }

        let texture = device.create_texture(&depth_texture_descriptor(width, height));
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("prism depth-stencil view"),
            format: Some(DEPTH_FORMAT),
            dimension: Some(wgpu::TextureViewDimension::D2),
            ..Default::default()
        });

        log::debug!("created {width}x{height} depth-stencil target");
        Ok(Self { view, texture })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn size(&self) -> (u32, u32) {
        (self.texture.width(), self.texture.height())
    }
}

/// Color and depth views bound together as the frame's output.
///
/// Both are attached in the single call that opens the render pass; there
/// is no state in which only one of them is bound.
#[derive(Copy, Clone)]
pub struct OutputTargets<'a> {
    pub color: &'a wgpu::TextureView,
    pub depth: &'a wgpu::TextureView,
}

/// Clear values applied when the output targets are bound.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OutputClear {
    pub color: wgpu::Color,
    pub depth: f32,
    pub stencil: u32,
}

impl<'a> OutputTargets<'a> {
    pub fn new(color: &'a wgpu::TextureView, depth: &'a DepthTarget) -> Self {
        Self {
            color,
            depth: depth.view(),
        }
    }

    /// Opens a render pass writing both targets, cleared to `clear`.
    pub fn begin_pass<'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        clear: &OutputClear,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("prism cube pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: self.color,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.color),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.depth,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.depth),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(clear.stencil),
                    store: wgpu::StoreOp::Store,
                }),
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }
}
