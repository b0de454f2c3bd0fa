//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Block world command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "blockworld", about = "Chunked voxel world")]
pub struct CliArgs {
    /// World seed for newly created worlds.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<i32>,

    /// Render distance in chunks.
    #[arg(long)]
    pub render_distance: Option<u32>,

    /// Directory to save the world in.
    #[arg(long)]
    pub save_dir: Option<PathBuf>,

    /// Keep the world in memory only.
    #[arg(long)]
    pub in_memory: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(seed) = args.seed {
            self.world.seed = seed;
        }
        if let Some(rd) = args.render_distance {
            self.streaming.render_distance = rd;
        }
        if let Some(ref dir) = args.save_dir {
            self.storage.save_dir = Some(dir.clone());
        }
        if args.in_memory {
            self.storage.in_memory = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
