//! Runtime configuration for the block world.
//!
//! Settings persist to disk as `config.ron`. Every section is
//! `#[serde(default)]`, so older or partial files keep loading, and CLI flags
//! parsed by [`CliArgs`] override whatever the file says.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE_NAME, Config, DebugConfig, PlayerConfig, StorageConfig, StreamingConfig,
    WorldConfig,
};
pub use error::ConfigError;
