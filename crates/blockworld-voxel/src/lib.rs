//! Block field data model: block codes, chunk columns, coordinate mapping, and RLE.

pub mod block;
pub mod chunk;
pub mod coords;
pub mod rle;

pub use block::{BLOCK_LIST, BlockId, BlockMeta, Opacity};
pub use chunk::{Chunk, ChunkError, MESH_DIRTY, SAVE_DIRTY};
pub use coords::{
    CHUNK_HEIGHT, CHUNK_SIZE, CHUNK_VOLUME, ChunkCoord, MAX_CHUNK_INDEX, MIN_CHUNK_INDEX,
    block_to_chunk, block_to_local, in_local_bounds, local_index, world_to_chunk, world_to_local,
};
pub use rle::{RleError, RleRun, decode_blocks, encode_blocks, rle_decode, rle_encode};
