//! Error types for the world runtime.

use blockworld_storage::StorageError;

/// Errors raised while setting up or driving the world.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A persistence worker thread could not be started.
    #[error("failed to spawn persistence worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// A storage operation failed where no fallback applies.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// The persistence pool has already been shut down.
    #[error("persistence pool is shut down")]
    ShutDown,
}
