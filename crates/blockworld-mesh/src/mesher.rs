//! Per-chunk geometry builder: culls hidden faces and splits the surviving
//! faces into opaque and transparent surfaces.

use blockworld_voxel::{BlockId, CHUNK_HEIGHT, CHUNK_SIZE, Chunk};

use crate::surface::SurfaceBuffers;
use crate::visibility::compute_visible_faces;

/// Renderable output for one chunk. Either surface is `None` when it would
/// contain no faces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkGeometry {
    /// Faces of opaque blocks.
    pub opaque: Option<SurfaceBuffers>,
    /// Faces of transparent blocks (leaves, glass).
    pub transparent: Option<SurfaceBuffers>,
}

impl ChunkGeometry {
    /// Returns `true` if neither surface has any faces.
    pub fn is_empty(&self) -> bool {
        self.opaque.is_none() && self.transparent.is_none()
    }

    /// Total faces across both surfaces.
    pub fn face_count(&self) -> usize {
        self.opaque.as_ref().map_or(0, SurfaceBuffers::face_count)
            + self.transparent.as_ref().map_or(0, SurfaceBuffers::face_count)
    }
}

/// Builds the geometry of `chunk`.
///
/// `lookup` answers block queries in world coordinates and is only consulted
/// for neighbors outside the chunk's footprint; it should return Air for
/// chunks that are not resident.
pub fn build_chunk_geometry(
    chunk: &Chunk,
    lookup: impl Fn(i32, i32, i32) -> BlockId,
) -> ChunkGeometry {
    let [ox, _, oz] = chunk.coord().world_origin();
    let neighbor = |x: i32, y: i32, z: i32| {
        if (0..CHUNK_SIZE).contains(&x) && (0..CHUNK_SIZE).contains(&z) {
            chunk.get_local(x, y, z)
        } else {
            lookup(ox + x, y, oz + z)
        }
    };

    let mut opaque = SurfaceBuffers::new();
    let mut transparent = SurfaceBuffers::new();

    for ly in 0..CHUNK_HEIGHT {
        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let block = chunk.get_local(lx, ly, lz);
                if block.is_air() {
                    continue;
                }
                let faces = compute_visible_faces(block, (lx, ly, lz), &neighbor);
                let target = if block.is_transparent() {
                    &mut transparent
                } else {
                    &mut opaque
                };
                for dir in faces.iter() {
                    target.push_face(block, (lx, ly, lz), dir);
                }
            }
        }
    }

    ChunkGeometry {
        opaque: opaque.non_empty(),
        transparent: transparent.non_empty(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
