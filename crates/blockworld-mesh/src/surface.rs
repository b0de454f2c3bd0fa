//! Renderable surface buffers produced by the mesher.
//!
//! A [`SurfaceBuffers`] holds interleaved [`SurfaceVertex`] data plus a `u32`
//! triangle index list, both castable to bytes for GPU upload.

use blockworld_voxel::BlockId;

use crate::face_direction::FaceDirection;

/// A single surface vertex (36 bytes).
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SurfaceVertex {
    /// Position relative to the chunk origin.
    pub position: [f32; 3],
    /// Face normal.
    pub normal: [f32; 3],
    /// Base block color multiplied by the face shade.
    pub color: [f32; 3],
}

static_assertions::assert_eq_size!(SurfaceVertex, [u8; 36]);

/// Vertex and index buffers for one material class of a chunk.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SurfaceBuffers {
    /// Vertex buffer, 4 vertices per face.
    pub vertices: Vec<SurfaceVertex>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
}

impl SurfaceBuffers {
    /// Creates empty buffers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one block face at local position `(lx, ly, lz)`.
    ///
    /// Emits 4 vertices and the two triangles `(0, 1, 2)`, `(0, 2, 3)`.
    pub fn push_face(&mut self, block: BlockId, (lx, ly, lz): (i32, i32, i32), dir: FaceDirection) {
        let base = self.vertices.len() as u32;
        let shade = dir.shade();
        let [r, g, b] = block.meta().color;
        let color = [r * shade, g * shade, b * shade];
        let normal = dir.normal();

        for corner in dir.corners() {
            self.vertices.push(SurfaceVertex {
                position: [
                    (lx + corner[0] as i32) as f32,
                    (ly + corner[1] as i32) as f32,
                    (lz + corner[2] as i32) as f32,
                ],
                normal,
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Returns `true` if no face has been emitted.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Number of quads (block faces).
    pub fn face_count(&self) -> usize {
        self.vertices.len() / 4
    }

    /// Returns the vertex data as a byte slice for GPU upload (zero-copy).
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Returns the index data as a byte slice for GPU upload (zero-copy).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// `Some(self)` unless empty.
    pub(crate) fn non_empty(self) -> Option<Self> {
        (!self.is_empty()).then_some(self)
    }
}
