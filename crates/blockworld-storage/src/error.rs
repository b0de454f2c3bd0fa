//! Persistence error types.

use blockworld_voxel::{ChunkError, RleError};

/// Errors raised by the key-value backends and the record codecs.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The backend failed to read or write.
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A record could not be encoded or decoded as JSON.
    #[error("record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A chunk record's run-length data is corrupt.
    #[error("malformed chunk record: {0}")]
    Malformed(#[from] RleError),

    /// A decoded block array could not form a chunk.
    #[error("invalid chunk data: {0}")]
    InvalidChunk(#[from] ChunkError),

    /// The world metadata was written by an unknown schema.
    #[error("unsupported world metadata version {0}")]
    UnsupportedVersion(u32),
}
