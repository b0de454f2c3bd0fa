//! Typed chunk and world-metadata persistence over a [`KeyValueStore`].

use std::sync::Arc;

use blockworld_voxel::{BlockId, CHUNK_VOLUME, Chunk, ChunkCoord, decode_blocks, encode_blocks};

use crate::error::StorageError;
use crate::records::{META_KEY, META_VERSION, WorldMeta};
use crate::store::KeyValueStore;

/// Encodes chunks and world metadata into records and moves them through a
/// shared backend. Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct ChunkStore {
    backend: Arc<dyn KeyValueStore>,
}

impl std::fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStore").finish_non_exhaustive()
    }
}

impl ChunkStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// The underlying key-value backend.
    pub fn backend(&self) -> &Arc<dyn KeyValueStore> {
        &self.backend
    }

    /// Loads the persisted chunk at `coord`.
    ///
    /// Returns `Ok(None)` when nothing has been saved there. A record that does
    /// not decode to exactly one chunk of blocks is an error.
    pub fn load_chunk(&self, coord: ChunkCoord) -> Result<Option<Chunk>, StorageError> {
        let Some(bytes) = self.backend.get(&coord.key())? else {
            return Ok(None);
        };
        let pairs: Vec<u16> = serde_json::from_slice(&bytes)?;
        let blocks = decode_blocks(&pairs, CHUNK_VOLUME)?;
        Ok(Some(Chunk::from_blocks(coord, blocks)?))
    }

    /// Writes the block array of the chunk at `coord`.
    pub fn save_chunk(&self, coord: ChunkCoord, blocks: &[BlockId]) -> Result<(), StorageError> {
        let pairs = encode_blocks(blocks);
        let bytes = serde_json::to_vec(&pairs)?;
        self.backend.put(&coord.key(), &bytes)?;
        tracing::trace!("saved chunk {} ({} runs)", coord, pairs.len() / 2);
        Ok(())
    }

    /// Loads the world metadata record, if any.
    ///
    /// # Errors
    ///
    /// [`StorageError::UnsupportedVersion`] when the record was written by
    /// another schema version.
    pub fn load_world_meta(&self) -> Result<Option<WorldMeta>, StorageError> {
        let Some(bytes) = self.backend.get(META_KEY)? else {
            return Ok(None);
        };
        let meta: WorldMeta = serde_json::from_slice(&bytes)?;
        if meta.version != META_VERSION {
            return Err(StorageError::UnsupportedVersion(meta.version));
        }
        Ok(Some(meta))
    }

    /// Overwrites the world metadata record.
    pub fn save_world_meta(&self, meta: &WorldMeta) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(meta)?;
        self.backend.put(META_KEY, &bytes)
    }
}
