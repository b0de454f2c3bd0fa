//! Resident chunk storage keyed by [`ChunkCoord`].

use blockworld_mesh::ChunkGeometry;
use blockworld_voxel::{
    BlockId, CHUNK_HEIGHT, Chunk, ChunkCoord, MESH_DIRTY, block_to_chunk, block_to_local,
};
use rustc_hash::FxHashMap;

/// A loaded chunk together with the geometry last built from it.
#[derive(Debug)]
pub struct ResidentChunk {
    pub chunk: Chunk,
    /// Surfaces from the last rebuild, `None` until the first one.
    pub geometry: Option<ChunkGeometry>,
    /// Mesh version of `chunk` when `geometry` was built.
    pub geometry_version: u64,
}

impl ResidentChunk {
    pub fn new(chunk: Chunk) -> Self {
        Self {
            chunk,
            geometry: None,
            geometry_version: 0,
        }
    }

    /// `true` when the geometry does not reflect the current blocks.
    pub fn needs_mesh(&self) -> bool {
        self.geometry.is_none()
            || self.chunk.is_dirty(MESH_DIRTY)
            || self.geometry_version != self.chunk.mesh_version()
    }
}

/// Owns every resident chunk. Only the chunk manager mutates it.
#[derive(Debug, Default)]
pub struct ChunkRegistry {
    chunks: FxHashMap<ChunkCoord, ResidentChunk>,
}

impl ChunkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a chunk, replacing (and returning) any previous entry.
    pub fn insert(&mut self, chunk: Chunk) -> Option<ResidentChunk> {
        self.chunks.insert(chunk.coord(), ResidentChunk::new(chunk))
    }

    pub fn remove(&mut self, coord: ChunkCoord) -> Option<ResidentChunk> {
        self.chunks.remove(&coord)
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&ResidentChunk> {
        self.chunks.get(&coord)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut ResidentChunk> {
        self.chunks.get_mut(&coord)
    }

    pub fn contains(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChunkCoord, &ResidentChunk)> {
        self.chunks.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&ChunkCoord, &mut ResidentChunk)> {
        self.chunks.iter_mut()
    }

    /// Snapshot of the resident coordinates.
    pub fn coords(&self) -> Vec<ChunkCoord> {
        self.chunks.keys().copied().collect()
    }

    /// Block at a world coordinate; Air outside `[0, CHUNK_HEIGHT)` or in a
    /// chunk that is not resident.
    pub fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return BlockId::AIR;
        }
        let coord = ChunkCoord::new(block_to_chunk(x), block_to_chunk(z));
        self.chunks.get(&coord).map_or(BlockId::AIR, |entry| {
            entry
                .chunk
                .get_local(block_to_local(x), y, block_to_local(z))
        })
    }

    /// Sets `MESH_DIRTY` on the chunk at `coord` if it is resident.
    /// Returns whether it was.
    pub fn mark_dirty_if_resident(&mut self, coord: ChunkCoord) -> bool {
        match self.chunks.get_mut(&coord) {
            Some(entry) => {
                entry.chunk.mark_dirty(MESH_DIRTY);
                true
            }
            None => false,
        }
    }

    /// Drops every chunk and its geometry.
    pub fn clear(&mut self) {
        self.chunks.clear();
    }
}
