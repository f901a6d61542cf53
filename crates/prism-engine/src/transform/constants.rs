use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use wgpu::util::DeviceExt;

use crate::error::Result;
use crate::geometry::check_buffer_size;

use super::state::TransformState;

/// GPU record of the frame constants.
///
/// Matrices are stored transposed: the programs multiply row vectors
/// (`v * M`), so each stored column is a row of the column-vector matrix.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct FrameConstants {
    pub world: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
}

impl FrameConstants {
    pub const SIZE: u64 = std::mem::size_of::<FrameConstants>() as u64;

    pub fn from_state(state: &TransformState) -> Self {
        Self {
            world: state.world.transpose().to_cols_array_2d(),
            view: state.view.transpose().to_cols_array_2d(),
            projection: state.projection.transpose().to_cols_array_2d(),
        }
    }

    /// Undoes the upload transpose.
    pub fn to_state(&self) -> TransformState {
        TransformState {
            world: Mat4::from_cols_array_2d(&self.world).transpose(),
            view: Mat4::from_cols_array_2d(&self.view).transpose(),
            projection: Mat4::from_cols_array_2d(&self.projection).transpose(),
        }
    }
}

/// Uniform buffer holding one [`FrameConstants`] record.
pub struct ConstantBuffer {
    buffer: wgpu::Buffer,
}

impl ConstantBuffer {
    /// Slot the buffer is bound to in every stage.
    pub const SLOT: u32 = 0;

    pub fn allocate(device: &wgpu::Device) -> Result<Self> {
        check_buffer_size(&device.limits(), "frame constants", FrameConstants::SIZE)?;

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism frame constants"),
            contents: bytemuck::bytes_of(&FrameConstants::zeroed()),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self { buffer })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Replaces the whole record.
    pub fn write(&self, queue: &wgpu::Queue, constants: &FrameConstants) {
        queue.write_buffer(&self.buffer, 0, bytemuck::bytes_of(constants));
    }

    pub fn upload(&self, queue: &wgpu::Queue, state: &TransformState) {
        self.write(queue, &FrameConstants::from_state(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{Camera, ProjectionParams};

    fn default_state() -> TransformState {
        TransformState::new(640, 480, &Camera::default(), &ProjectionParams::default()).unwrap()
    }

    #[test]
    fn record_is_three_packed_matrices() {
        assert_eq!(FrameConstants::SIZE, 192);
    }

    #[test]
    fn upload_record_is_transposed() {
        let state = default_state();
        let record = FrameConstants::from_state(&state);
        assert_eq!(record.projection, state.projection.transpose().to_cols_array_2d());
        // Row 3 of a perspective matrix carries the w = z term.
        assert_eq!(record.projection[3], state.projection.row(3).to_array());
    }

    #[test]
    fn transpose_round_trips() {
        let state = default_state();
        assert_eq!(FrameConstants::from_state(&state).to_state(), state);
    }

    #[test]
    fn row_vector_product_matches_column_vector_product() {
        let state = default_state();
        let record = FrameConstants::from_state(&state);
        let p = glam::Vec4::new(1.0, -1.0, 1.0, 1.0);

        // v * M with M stored column-major, as the programs evaluate it.
        let stored = Mat4::from_cols_array_2d(&record.view);
        let row_style = glam::Vec4::new(
            p.dot(stored.x_axis),
            p.dot(stored.y_axis),
            p.dot(stored.z_axis),
            p.dot(stored.w_axis),
        );
        let column_style = state.view * p;
        assert!((row_style - column_style).abs().max_element() < 1e-5);
    }
}
