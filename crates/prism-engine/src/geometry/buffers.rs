use wgpu::util::DeviceExt;

use crate::error::{RenderError, Result};

use super::cube::{CUBE_INDEX_COUNT, CUBE_INDICES, CUBE_VERTICES};
use super::vertex::Vertex;

/// Vertex-buffer binding: slot, stride and starting offset in bytes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexBinding {
    pub slot: u32,
    pub stride: u64,
    pub offset: u64,
}

impl Default for VertexBinding {
    fn default() -> Self {
        Self {
            slot: 0,
            stride: Vertex::STRIDE,
            offset: 0,
        }
    }
}

/// Index-buffer binding: element format and index count.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IndexBinding {
    pub format: wgpu::IndexFormat,
    pub count: u32,
}

impl Default for IndexBinding {
    fn default() -> Self {
        Self {
            format: wgpu::IndexFormat::Uint16,
            count: CUBE_INDEX_COUNT,
        }
    }
}

/// Checks a buffer size against the device limits before allocation.
///
/// wgpu reports oversized or misaligned buffers through its error callback
/// rather than a return value, so sizes are vetted up front.
pub fn check_buffer_size(limits: &wgpu::Limits, label: &'static str, size: u64) -> Result<()> {
    let reason = if size == 0 {
        Some("zero-sized".to_string())
    } else if size > limits.max_buffer_size {
        Some(format!(
            "{size} bytes exceeds the device maximum of {}",
            limits.max_buffer_size
        ))
    } else if size % wgpu::COPY_BUFFER_ALIGNMENT != 0 {
        Some(format!(
            "{size} bytes is not a multiple of {}",
            wgpu::COPY_BUFFER_ALIGNMENT
        ))
    } else {
        None
    };

    match reason {
        Some(reason) => Err(RenderError::BufferCreation { label, reason }),
        None => Ok(()),
    }
}

/// Immutable cube vertex and index buffers.
///
/// Both are also bound as read-only storage so the geometry stage can walk
/// the same primitive stream the rasterizer sees.
pub struct CubeBuffers {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    vertex_binding: VertexBinding,
    index_binding: IndexBinding,
}

impl CubeBuffers {
    pub fn upload(device: &wgpu::Device) -> Result<Self> {
        let limits = device.limits();
        let vertex_bytes: &[u8] = bytemuck::cast_slice(&CUBE_VERTICES);
        let index_bytes: &[u8] = bytemuck::cast_slice(&CUBE_INDICES);

        check_buffer_size(&limits, "cube vertices", vertex_bytes.len() as u64)?;
        check_buffer_size(&limits, "cube indices", index_bytes.len() as u64)?;

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism cube vertices"),
            contents: vertex_bytes,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::STORAGE,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism cube indices"),
            contents: index_bytes,
            usage: wgpu::BufferUsages::INDEX | wgpu::BufferUsages::STORAGE,
        });

        log::debug!(
            "uploaded cube geometry: {} vertices, {} indices",
            CUBE_VERTICES.len(),
            CUBE_INDEX_COUNT
        );

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_binding: VertexBinding::default(),
            index_binding: IndexBinding::default(),
        })
    }

    pub fn vertex_buffer(&self) -> &wgpu::Buffer {
        &self.vertex_buffer
    }

    pub fn index_buffer(&self) -> &wgpu::Buffer {
        &self.index_buffer
    }

    pub fn vertex_binding(&self) -> VertexBinding {
        self.vertex_binding
    }

    pub fn index_binding(&self) -> IndexBinding {
        self.index_binding
    }

    /// Triangles in the index buffer.
    pub fn primitive_count(&self) -> u32 {
        self.index_binding.count / 3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_bindings_describe_the_cube() {
        let vb = VertexBinding::default();
        assert_eq!((vb.slot, vb.stride, vb.offset), (0, 28, 0));

        let ib = IndexBinding::default();
        assert_eq!(ib.format, wgpu::IndexFormat::Uint16);
        assert_eq!(ib.count, 36);
    }

    #[test]
    fn cube_data_fits_default_limits() {
        let limits = wgpu::Limits::default();
        let vertex_bytes = std::mem::size_of_val(&CUBE_VERTICES) as u64;
        let index_bytes = std::mem::size_of_val(&CUBE_INDICES) as u64;
        assert!(check_buffer_size(&limits, "v", vertex_bytes).is_ok());
        assert!(check_buffer_size(&limits, "i", index_bytes).is_ok());
    }

    #[test]
    fn oversized_buffer_is_rejected() {
        let limits = wgpu::Limits::default();
        let err = check_buffer_size(&limits, "huge", limits.max_buffer_size + 4).unwrap_err();
        assert!(matches!(err, RenderError::BufferCreation { label: "huge", .. }));
    }

    #[test]
    fn zero_and_misaligned_sizes_are_rejected() {
        let limits = wgpu::Limits::default();
        assert!(check_buffer_size(&limits, "empty", 0).is_err());
        assert!(check_buffer_size(&limits, "odd", 6).is_err());
    }
}
