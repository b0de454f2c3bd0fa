//! Durable storage for chunks and world metadata.
//!
//! [`KeyValueStore`] is the byte-level seam ([`MemoryStore`], [`FileStore`]);
//! [`ChunkStore`] layers the record formats from [`records`] on top of it.

mod chunk_store;
mod error;
mod file_store;
pub mod records;
mod store;

pub use chunk_store::ChunkStore;
pub use error::StorageError;
pub use file_store::FileStore;
pub use records::{META_KEY, META_VERSION, PlayerPose, WorldMeta, finite_or};
pub use store::{KeyValueStore, MemoryStore};
