//! Dense chunk storage with bounds-checked access, dirty flags, and a mesh version.
//!
//! [`Chunk`] owns one [`BlockId`] per voxel laid out by
//! [`local_index`](crate::coords::local_index). Height out-of-range access is
//! defined behavior: reads return Air and writes are declined.

use crate::block::BlockId;
use crate::coords::{CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, local_index};

/// Dirty-flag bit: chunk mesh needs rebuilding.
pub const MESH_DIRTY: u8 = 0b0000_0001;
/// Dirty-flag bit: chunk needs a persistence write.
pub const SAVE_DIRTY: u8 = 0b0000_0010;

/// Errors raised when building a chunk from external data.
#[derive(Debug, thiserror::Error)]
pub enum ChunkError {
    /// The block array does not cover exactly one chunk.
    #[error("chunk block array has {actual} entries, expected {expected}")]
    LengthMismatch {
        /// Required number of entries.
        expected: usize,
        /// Number of entries supplied.
        actual: usize,
    },
}

/// A full-height chunk column.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    blocks: Box<[BlockId]>,
    /// Bitfield of [`MESH_DIRTY`] / [`SAVE_DIRTY`].
    dirty: u8,
    /// Incremented on each successful block change.
    mesh_version: u64,
}

impl Chunk {
    /// Creates an all-air chunk. New chunks start mesh-dirty and unmodified.
    pub fn new(coord: ChunkCoord) -> Self {
        Self {
            coord,
            blocks: vec![BlockId::AIR; CHUNK_VOLUME].into_boxed_slice(),
            dirty: MESH_DIRTY,
            mesh_version: 0,
        }
    }

    /// Wraps an existing block array (generated or deserialized).
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::LengthMismatch`] if `blocks.len() != CHUNK_VOLUME`.
    pub fn from_blocks(coord: ChunkCoord, blocks: Vec<BlockId>) -> Result<Self, ChunkError> {
        if blocks.len() != CHUNK_VOLUME {
            return Err(ChunkError::LengthMismatch {
                expected: CHUNK_VOLUME,
                actual: blocks.len(),
            });
        }
        Ok(Self {
            coord,
            blocks: blocks.into_boxed_slice(),
            dirty: MESH_DIRTY,
            mesh_version: 0,
        })
    }

    /// Grid position of this chunk.
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    /// Returns the block at a local coordinate, or Air when out of range.
    pub fn get_local(&self, lx: i32, ly: i32, lz: i32) -> BlockId {
        if !(0..CHUNK_HEIGHT).contains(&ly) {
            return BlockId::AIR;
        }
        if !Self::in_footprint(lx, lz) {
            tracing::warn!("Chunk::get_local out of footprint: ({}, {}, {})", lx, ly, lz);
            return BlockId::AIR;
        }
        self.blocks[local_index(lx as usize, ly as usize, lz as usize)]
    }

    /// Writes a block at a local coordinate.
    ///
    /// Returns `false` when the write was declined (out of range) or the block
    /// already holds `block`. Otherwise marks the chunk mesh- and save-dirty,
    /// bumps the mesh version, and returns `true`.
    pub fn set_local(&mut self, lx: i32, ly: i32, lz: i32, block: BlockId) -> bool {
        if !(0..CHUNK_HEIGHT).contains(&ly) {
            return false;
        }
        if !Self::in_footprint(lx, lz) {
            tracing::warn!("Chunk::set_local out of footprint: ({}, {}, {})", lx, ly, lz);
            return false;
        }
        let index = local_index(lx as usize, ly as usize, lz as usize);
        if self.blocks[index] == block {
            return false;
        }
        self.blocks[index] = block;
        self.dirty |= MESH_DIRTY | SAVE_DIRTY;
        self.mesh_version += 1;
        true
    }

    /// The dense block array.
    pub fn blocks(&self) -> &[BlockId] {
        &self.blocks
    }

    /// Returns the current dirty flags.
    pub fn dirty_flags(&self) -> u8 {
        self.dirty
    }

    /// Returns `true` if the specified dirty flag (or combination) is set.
    pub fn is_dirty(&self, flag: u8) -> bool {
        self.dirty & flag == flag
    }

    /// Mark specific dirty flags.
    pub fn mark_dirty(&mut self, flags: u8) {
        self.dirty |= flags;
    }

    /// Clears the specified dirty flag bits.
    pub fn clear_dirty(&mut self, flags: u8) {
        self.dirty &= !flags;
    }

    /// Returns the mesh version counter.
    pub fn mesh_version(&self) -> u64 {
        self.mesh_version
    }

    /// Number of non-air voxels.
    pub fn solid_count(&self) -> usize {
        self.blocks.iter().filter(|b| !b.is_air()).count()
    }

    fn in_footprint(lx: i32, lz: i32) -> bool {
        (0..CHUNK_SIZE).contains(&lx) && (0..CHUNK_SIZE).contains(&lz)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn origin() -> ChunkCoord {
        ChunkCoord::new(0, 0)
    }

    #[test]
    fn test_new_chunk_is_air_and_mesh_dirty() {
        let chunk = Chunk::new(origin());
        assert_eq!(chunk.blocks().len(), CHUNK_VOLUME);
        assert_eq!(chunk.get_local(0, 0, 0), BlockId::AIR);
        assert_eq!(chunk.get_local(15, 95, 15), BlockId::AIR);
        assert!(chunk.is_dirty(MESH_DIRTY));
        assert!(!chunk.is_dirty(SAVE_DIRTY));
        assert_eq!(chunk.mesh_version(), 0);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let mut chunk = Chunk::new(origin());
        assert!(chunk.set_local(5, 40, 9, BlockId::STONE));
        assert_eq!(chunk.get_local(5, 40, 9), BlockId::STONE);
        assert_eq!(chunk.get_local(4, 40, 9), BlockId::AIR);
        assert_eq!(chunk.get_local(5, 41, 9), BlockId::AIR);
        assert_eq!(chunk.blocks()[local_index(5, 40, 9)], BlockId::STONE);
    }

    #[test]
    fn test_set_marks_flags_and_bumps_version() {
        let mut chunk = Chunk::new(origin());
        chunk.clear_dirty(MESH_DIRTY);
        chunk.set_local(1, 1, 1, BlockId::DIRT);
        assert!(chunk.is_dirty(MESH_DIRTY | SAVE_DIRTY));
        assert_eq!(chunk.mesh_version(), 1);

        chunk.set_local(1, 1, 1, BlockId::SAND);
        assert_eq!(chunk.mesh_version(), 2);
    }

    #[test]
    fn test_same_value_write_is_unchanged() {
        let mut chunk = Chunk::new(origin());
        chunk.set_local(2, 2, 2, BlockId::GLASS);
        chunk.clear_dirty(MESH_DIRTY | SAVE_DIRTY);
        let version = chunk.mesh_version();

        assert!(!chunk.set_local(2, 2, 2, BlockId::GLASS));
        assert_eq!(chunk.dirty_flags(), 0);
        assert_eq!(chunk.mesh_version(), version);
    }

    #[test]
    fn test_out_of_height_is_air_and_declined() {
        let mut chunk = Chunk::new(origin());
        assert!(!chunk.set_local(0, -1, 0, BlockId::STONE));
        assert!(!chunk.set_local(0, CHUNK_HEIGHT, 0, BlockId::STONE));
        assert_eq!(chunk.get_local(0, -1, 0), BlockId::AIR);
        assert_eq!(chunk.get_local(0, CHUNK_HEIGHT, 0), BlockId::AIR);
        assert_eq!(chunk.mesh_version(), 0);
    }

    #[test]
    fn test_out_of_footprint_no_panic() {
        let mut chunk = Chunk::new(origin());
        assert!(!chunk.set_local(16, 0, 0, BlockId::STONE));
        assert!(!chunk.set_local(0, 0, -1, BlockId::STONE));
        assert_eq!(chunk.get_local(16, 0, 0), BlockId::AIR);
        assert_eq!(chunk.solid_count(), 0);
    }

    #[test]
    fn test_from_blocks_validates_length() {
        let err = Chunk::from_blocks(origin(), vec![BlockId::AIR; 10]).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::LengthMismatch {
                expected: CHUNK_VOLUME,
                actual: 10
            }
        ));

        let mut blocks = vec![BlockId::AIR; CHUNK_VOLUME];
        blocks[local_index(3, 4, 5)] = BlockId::WOOD;
        let chunk = Chunk::from_blocks(ChunkCoord::new(2, -1), blocks).unwrap();
        assert_eq!(chunk.get_local(3, 4, 5), BlockId::WOOD);
        assert_eq!(chunk.coord(), ChunkCoord::new(2, -1));
        assert!(chunk.is_dirty(MESH_DIRTY));
        assert!(!chunk.is_dirty(SAVE_DIRTY));
    }

    #[test]
    fn test_clear_one_flag_preserves_other() {
        let mut chunk = Chunk::new(origin());
        chunk.set_local(0, 0, 0, BlockId::STONE);
        chunk.clear_dirty(MESH_DIRTY);
        assert!(!chunk.is_dirty(MESH_DIRTY));
        assert!(chunk.is_dirty(SAVE_DIRTY));
        chunk.mark_dirty(MESH_DIRTY);
        assert!(chunk.is_dirty(MESH_DIRTY));
    }
}
