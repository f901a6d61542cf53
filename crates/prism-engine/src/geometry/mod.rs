//! Static cube geometry and the stream-output capture target.
//!
//! Vertex and index data are uploaded once and never written again. The
//! capture buffer is written only by the geometry stage.

mod buffers;
mod capture;
mod cube;
mod vertex;

pub use buffers::{CubeBuffers, IndexBinding, VertexBinding, check_buffer_size};
pub use capture::{
    CaptureBudget, CaptureCounters, CaptureParams, DEFAULT_CAPTURE_CAPACITY, OverflowPolicy,
    StreamOutputBinding, StreamOutputTarget,
};
pub use cube::{
    CUBE_INDEX_COUNT, CUBE_INDICES, CUBE_PRIMITIVE_COUNT, CUBE_VERTICES, CUBE_VERTEX_COUNT,
    cube_faces, cube_triangles,
};
pub use vertex::Vertex;
