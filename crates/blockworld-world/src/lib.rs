//! World runtime: chunk residency around an observer, background loading and
//! persistence, mesh rebuild scheduling, and the playable session on top.

mod debounce;
mod error;
mod hotbar;
mod registry;
mod residency;

pub mod chunk_manager;
pub mod session;
pub mod streaming;

pub use chunk_manager::{ChunkManager, ChunkManagerConfig, StreamStats};
pub use debounce::Debounce;
pub use error::WorldError;
pub use hotbar::{HOTBAR_SLOTS, Hotbar};
pub use registry::{ChunkRegistry, ResidentChunk};
pub use residency::{chunks_in_radius, should_unload};
pub use session::{FrameInput, FrameReport, MAX_FRAME_DT, WorldSession};
pub use streaming::{ChunkStreamer, LoadSource, PersistEvent, PersistTask};
