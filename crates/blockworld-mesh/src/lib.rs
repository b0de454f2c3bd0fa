//! Chunk meshing: hidden-face culling and per-chunk surface buffers.
//!
//! [`build_chunk_geometry`] walks a chunk, keeps only the faces that border a
//! block they can be seen through, and emits one quad per face into an opaque
//! or transparent [`SurfaceBuffers`]. No face merging is performed.

mod face_direction;
mod mesher;
mod surface;
mod visibility;
mod visible_faces;

pub use face_direction::FaceDirection;
pub use mesher::{ChunkGeometry, build_chunk_geometry};
pub use surface::{SurfaceBuffers, SurfaceVertex};
pub use visibility::{compute_visible_faces, should_render_face};
pub use visible_faces::VisibleFaces;
