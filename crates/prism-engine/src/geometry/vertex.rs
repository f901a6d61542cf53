use bytemuck::{Pod, Zeroable};

/// Vertex record: position followed by straight RGBA color.
///
/// Layout is fixed (`repr(C)`, no padding); the input layout addresses the
/// fields by byte offset.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    /// Bytes per vertex in the vertex buffer.
    pub const STRIDE: u64 = std::mem::size_of::<Vertex>() as u64;

    /// `f32` values per vertex, as read by the geometry stage.
    pub const STRIDE_FLOATS: u32 = (Self::STRIDE / 4) as u32;

    #[inline]
    pub const fn new(position: [f32; 3], color: [f32; 4]) -> Self {
        Self { position, color }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_is_tightly_packed() {
        assert_eq!(Vertex::STRIDE, 28);
        assert_eq!(Vertex::STRIDE_FLOATS, 7);
        assert_eq!(std::mem::offset_of!(Vertex, color), 12);
    }

    #[test]
    fn bytes_follow_field_order() {
        let v = Vertex::new([1.0, 2.0, 3.0], [0.25, 0.5, 0.75, 1.0]);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&v));
        assert_eq!(floats, &[1.0, 2.0, 3.0, 0.25, 0.5, 0.75, 1.0]);
    }
}
