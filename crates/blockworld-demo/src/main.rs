//! Headless block world driver: opens (or creates) a world, walks a scripted
//! path through it, saves, and prints statistics.

mod platform;
mod walk;

use std::process::ExitCode;
use std::sync::Arc;

use blockworld_config::{CliArgs, Config, ConfigError};
use blockworld_storage::{ChunkStore, FileStore, KeyValueStore, MemoryStore, StorageError};
use blockworld_world::{WorldError, WorldSession};
use clap::Parser;

use crate::platform::{PlatformDirs, PlatformError};

/// Headless block world driver.
#[derive(Parser, Debug)]
#[command(name = "blockworld-demo", about = "Walk through a block world without a window")]
struct DemoArgs {
    #[command(flatten)]
    cli: CliArgs,

    /// Number of fixed 1/60 s steps to simulate.
    #[arg(long, default_value_t = 1800)]
    ticks: u64,
}

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    World(#[from] WorldError),
}

fn main() -> ExitCode {
    let args = DemoArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            eprintln!("blockworld-demo: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &DemoArgs) -> Result<(), DemoError> {
    let mut dirs = PlatformDirs::resolve()?;
    if let Some(config_dir) = &args.cli.config {
        dirs.config_dir = config_dir.clone();
        dirs.log_dir = config_dir.join("logs");
    }

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&dirs.config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.cli);
    config.validate()?;

    if let Err(err) = blockworld_log::init_logging(Some(&dirs.log_dir), Some(&config)) {
        eprintln!("Logging unavailable: {err}");
    }

    let backend: Arc<dyn KeyValueStore> = if config.storage.in_memory {
        tracing::info!("Using an in-memory world; nothing will be saved");
        Arc::new(MemoryStore::new())
    } else {
        let world_dir = config
            .storage
            .save_dir
            .clone()
            .unwrap_or_else(|| dirs.world_dir());
        tracing::info!("World directory: {}", world_dir.display());
        Arc::new(FileStore::open(world_dir)?)
    };

    let mut session = WorldSession::open(&config, ChunkStore::new(backend))?;
    let summary = walk::run_walk(&mut session, args.ticks);

    let geometry_faces: usize = session
        .manager()
        .resident_coords()
        .into_iter()
        .filter_map(|coord| session.manager().geometry(coord))
        .map(|geometry| geometry.face_count())
        .sum();
    let resident = session.manager().loaded_chunk_count();
    let position = session.body().position;
    let seed = session.seed();

    let stats = session.shutdown()?;

    println!("Block world (seed {seed})");
    println!(
        "  simulated:      {} ticks ({} waiting for chunks)",
        summary.ticks, summary.stalled_ticks
    );
    println!(
        "  walked:         {:.1} blocks, {} jumps, {} respawns",
        summary.distance, summary.jumps, summary.respawns
    );
    println!(
        "  edits:          {} broken, {} placed",
        summary.blocks_broken, summary.blocks_placed
    );
    println!(
        "  final position: ({:.2}, {:.2}, {:.2})",
        position.x, position.y, position.z
    );
    println!(
        "  chunks:         {resident} resident, {} generated, {} from disk, {} unloaded",
        stats.generated, stats.loaded_from_store, stats.unloaded
    );
    println!(
        "  meshes:         {} rebuilds, {geometry_faces} faces resident",
        stats.meshes_built
    );
    println!(
        "  saves:          {} chunks written, {} failures",
        stats.chunks_saved, stats.save_failures
    );
    Ok(())
}
