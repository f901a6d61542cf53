use super::vertex::Vertex;

pub const CUBE_VERTEX_COUNT: usize = 8;
pub const CUBE_INDEX_COUNT: u32 = 36;
pub const CUBE_PRIMITIVE_COUNT: u32 = CUBE_INDEX_COUNT / 3;

/// Corners of the cube spanning [-1, 1] on every axis.
pub const CUBE_VERTICES: [Vertex; CUBE_VERTEX_COUNT] = [
    Vertex::new([-1.0, 1.0, -1.0], [0.0, 0.0, 1.0, 1.0]),
    Vertex::new([1.0, 1.0, -1.0], [0.0, 1.0, 0.0, 1.0]),
    Vertex::new([1.0, 1.0, 1.0], [0.0, 1.0, 1.0, 1.0]),
    Vertex::new([-1.0, 1.0, 1.0], [1.0, 0.0, 0.0, 1.0]),
    Vertex::new([-1.0, -1.0, -1.0], [1.0, 0.0, 1.0, 1.0]),
    Vertex::new([1.0, -1.0, -1.0], [1.0, 1.0, 0.0, 1.0]),
    Vertex::new([1.0, -1.0, 1.0], [1.0, 1.0, 1.0, 1.0]),
    Vertex::new([-1.0, -1.0, 1.0], [0.0, 0.0, 0.0, 1.0]),
];

/// Triangle list, two triangles per face.
///
/// Winding is clockwise when a face is viewed from outside the cube, which is
/// the front-face convention the pipeline culls with.
pub const CUBE_INDICES: [u16; CUBE_INDEX_COUNT as usize] = [
    3, 1, 0, 2, 1, 3, // top
    0, 5, 4, 1, 5, 0, // front
    3, 4, 7, 0, 4, 3, // left
    1, 6, 5, 2, 6, 1, // right
    2, 7, 6, 3, 7, 2, // back
    6, 4, 5, 7, 4, 6, // bottom
];

/// Index data grouped per face.
pub fn cube_faces() -> std::slice::ChunksExact<'static, u16> {
    CUBE_INDICES.chunks_exact(6)
}

/// Index data grouped per triangle.
pub fn cube_triangles() -> impl Iterator<Item = [u16; 3]> {
    CUBE_INDICES.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
}
