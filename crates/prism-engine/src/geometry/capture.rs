use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use crate::error::{RenderError, Result};

use super::buffers::check_buffer_size;

/// Byte capacity of the capture buffer unless configured otherwise.
pub const DEFAULT_CAPTURE_CAPACITY: u64 = 1_000_000;

/// What to do when one frame can emit more than the capture buffer holds.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// Fail startup with `StreamOutputOverflow`.
    #[default]
    Reject,
    /// Start anyway; excess vertices are dropped and counted each frame.
    Truncate,
}

/// Capacity plan for the capture buffer, settled once at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CaptureBudget {
    pub capacity_bytes: u64,
    pub record_stride: u64,
    pub primitive_count: u32,
    pub vertices_per_primitive: u32,
}

impl CaptureBudget {
    /// Plans a buffer of `capacity_bytes` for `primitive_count` primitives.
    ///
    /// The worst case assumes every primitive emits all of its vertices. With
    /// [`OverflowPolicy::Reject`] a shortfall fails here; with
    /// [`OverflowPolicy::Truncate`] it is logged and the geometry stage drops
    /// what does not fit.
    pub fn plan(
        capacity_bytes: u64,
        record_stride: u64,
        primitive_count: u32,
        vertices_per_primitive: u32,
        policy: OverflowPolicy,
    ) -> Result<Self> {
        if record_stride == 0 || capacity_bytes < record_stride {
            return Err(RenderError::BufferCreation {
                label: "stream output",
                reason: format!(
                    "{capacity_bytes} bytes cannot hold a single {record_stride}-byte record"
                ),
            });
        }

        let budget = Self {
            capacity_bytes,
            record_stride,
            primitive_count,
            vertices_per_primitive,
        };

        let required = budget.worst_case_bytes();
        if required > capacity_bytes {
            match policy {
                OverflowPolicy::Reject => {
                    return Err(RenderError::StreamOutputOverflow {
                        capacity: capacity_bytes,
                        required,
                    });
                }
                OverflowPolicy::Truncate => log::warn!(
                    "stream output holds {capacity_bytes} of {required} bytes, {} vertices per frame will be dropped",
                    budget.dropped_vertices()
                ),
            }
        }

        Ok(budget)
    }

    /// Bytes emitted when every primitive writes all of its vertices.
    pub fn worst_case_bytes(&self) -> u64 {
        u64::from(self.primitive_count)
            * u64::from(self.vertices_per_primitive)
            * self.record_stride
    }

    /// Whole records that fit in the buffer.
    pub fn capacity_vertices(&self) -> u64 {
        self.capacity_bytes / self.record_stride
    }

    /// Vertices lost per frame in the worst case.
    ///
    /// Primitives are written whole or not at all, so the loss is rounded up
    /// to full primitives.
    pub fn dropped_vertices(&self) -> u64 {
        let per = u64::from(self.vertices_per_primitive.max(1));
        let fitting_primitives = self.capacity_vertices() / per;
        let lost = u64::from(self.primitive_count).saturating_sub(fitting_primitives);
        lost * per
    }

    pub fn truncates(&self) -> bool {
        self.dropped_vertices() > 0
    }
}

/// Uniform read by the geometry stage.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Pod, Zeroable)]
pub struct CaptureParams {
    pub capacity_vertices: u32,
    pub primitive_count: u32,
    pub vertex_stride_floats: u32,
    _pad: u32,
}

impl CaptureParams {
    pub fn new(capacity_vertices: u32, primitive_count: u32, vertex_stride_floats: u32) -> Self {
        Self {
            capacity_vertices,
            primitive_count,
            vertex_stride_floats,
            _pad: 0,
        }
    }
}

/// Atomic counters written by the geometry stage, reset every frame.
///
/// `emitted` counts reserved vertex slots, including the ones that were
/// dropped; `dropped` counts the part that did not fit.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct CaptureCounters {
    pub emitted: u32,
    pub dropped: u32,
}

impl CaptureCounters {
    pub const SIZE: u64 = std::mem::size_of::<CaptureCounters>() as u64;

    pub fn written(&self) -> u32 {
        self.emitted.saturating_sub(self.dropped)
    }
}

/// Stream-output binding: slot and starting offset in bytes.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct StreamOutputBinding {
    pub slot: u32,
    pub offset: u64,
}

/// The buffer the geometry stage appends captured vertices to.
///
/// Never read by the CPU in steady state. Captured vertices are usable as a
/// vertex source by later passes.
pub struct StreamOutputTarget {
    buffer: wgpu::Buffer,
    counters: wgpu::Buffer,
    params: wgpu::Buffer,
    binding: StreamOutputBinding,
    budget: CaptureBudget,
}

impl StreamOutputTarget {
    pub fn allocate(
        device: &wgpu::Device,
        budget: CaptureBudget,
        vertex_stride_floats: u32,
    ) -> Result<Self> {
        let limits = device.limits();
        check_buffer_size(&limits, "stream output", budget.capacity_bytes)?;
        if budget.capacity_bytes > u64::from(limits.max_storage_buffer_binding_size) {
            return Err(RenderError::BufferCreation {
                label: "stream output",
                reason: format!(
                    "{} bytes exceeds the storage binding maximum of {}",
                    budget.capacity_bytes, limits.max_storage_buffer_binding_size
                ),
            });
        }

        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("prism stream output"),
            size: budget.capacity_bytes,
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });

        let counters = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism capture counters"),
            contents: bytemuck::bytes_of(&CaptureCounters::default()),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        });

        let capacity_vertices = u32::try_from(budget.capacity_vertices()).unwrap_or(u32::MAX);
        let params =
            CaptureParams::new(capacity_vertices, budget.primitive_count, vertex_stride_floats);
        let params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("prism capture params"),
            contents: bytemuck::bytes_of(&params),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        log::debug!(
            "allocated stream output: {} bytes, {} records",
            budget.capacity_bytes,
            capacity_vertices
        );

        Ok(Self {
            buffer,
            counters,
            params,
            binding: StreamOutputBinding::default(),
            budget,
        })
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    /// Counter buffer holding a [`CaptureCounters`] record.
    pub fn counters(&self) -> &wgpu::Buffer {
        &self.counters
    }

    pub fn params(&self) -> &wgpu::Buffer {
        &self.params
    }

    /// The capture buffer from the bound offset to its end.
    pub fn binding_resource(&self) -> wgpu::BindingResource<'_> {
        wgpu::BindingResource::Buffer(wgpu::BufferBinding {
            buffer: &self.buffer,
            offset: self.binding.offset,
            size: None,
        })
    }

    pub fn budget(&self) -> &CaptureBudget {
        &self.budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STRIDE: u64 = 32;

    // ── worst case ────────────────────────────────────────────────────────

    #[test]
    fn default_capacity_covers_the_cube() {
        let budget =
            CaptureBudget::plan(DEFAULT_CAPTURE_CAPACITY, STRIDE, 12, 3, OverflowPolicy::Reject)
                .unwrap();
        assert_eq!(budget.worst_case_bytes(), 1152);
        assert_eq!(budget.capacity_vertices(), 31_250);
        assert!(!budget.truncates());
    }

    #[test]
    fn exact_fit_is_not_an_overflow() {
        let budget = CaptureBudget::plan(1152, STRIDE, 12, 3, OverflowPolicy::Reject).unwrap();
        assert_eq!(budget.dropped_vertices(), 0);
    }

    // ── overflow policy ───────────────────────────────────────────────────

    #[test]
    fn reject_fails_when_emission_exceeds_capacity() {
        let err = CaptureBudget::plan(1024, STRIDE, 12, 3, OverflowPolicy::Reject).unwrap_err();
        match err {
            RenderError::StreamOutputOverflow { capacity, required } => {
                assert_eq!(capacity, 1024);
                assert_eq!(required, 1152);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn truncate_drops_whole_primitives() {
        // 1024 bytes hold 32 records: 10 whole triangles, 2 dropped.
        let budget = CaptureBudget::plan(1024, STRIDE, 12, 3, OverflowPolicy::Truncate).unwrap();
        assert!(budget.truncates());
        assert_eq!(budget.capacity_vertices(), 32);
        assert_eq!(budget.dropped_vertices(), 6);
    }

    #[test]
    fn capacity_below_one_record_is_rejected() {
        let err = CaptureBudget::plan(16, STRIDE, 12, 3, OverflowPolicy::Truncate).unwrap_err();
        assert!(matches!(err, RenderError::BufferCreation { .. }));
    }

    // ── records ───────────────────────────────────────────────────────────

    #[test]
    fn gpu_records_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<CaptureParams>(), 16);
        assert_eq!(CaptureCounters::SIZE, 8);
    }

    #[test]
    fn written_excludes_dropped() {
        let counters = CaptureCounters {
            emitted: 36,
            dropped: 6,
        };
        assert_eq!(counters.written(), 30);
    }
}
