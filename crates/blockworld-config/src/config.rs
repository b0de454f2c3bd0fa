//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted configuration inside the config directory.
pub const CONFIG_FILE_NAME: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Terrain generation settings.
    pub world: WorldConfig,
    /// Chunk residency and persistence cadence.
    pub streaming: StreamingConfig,
    /// Player movement and interaction.
    pub player: PlayerConfig,
    /// Where the world is saved.
    pub storage: StorageConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Terrain generation settings. Only used for worlds without saved metadata;
/// a saved world keeps the seed it was created with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for new worlds.
    pub seed: i32,
    /// Water line; low columns at or below `sea_level + 1` become beaches.
    pub sea_level: i32,
    /// Probability threshold for a tree on an eligible column.
    pub tree_chance: f64,
}

/// Chunk streaming configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamingConfig {
    /// Residency radius in chunks.
    pub render_distance: u32,
    /// Mesh rebuilds allowed per frame.
    pub mesh_rebuilds_per_frame: u32,
    /// Quiet period after the last block edit before modified chunks are written.
    pub save_flush_debounce_ms: u64,
    /// Quiet period before world metadata is written.
    pub meta_save_debounce_ms: u64,
    /// Persistence worker threads (0 = derive from CPU count).
    pub loader_threads: usize,
}

/// Player movement and interaction tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlayerConfig {
    pub width: f64,
    pub height: f64,
    pub eye_height: f64,
    pub walk_speed: f64,
    pub run_speed: f64,
    pub jump_velocity: f64,
    pub gravity: f64,
    pub max_fall_speed: f64,
    pub ground_drag: f64,
    pub ground_acceleration: f64,
    pub air_acceleration: f64,
    /// Reach for breaking and placing blocks.
    pub interact_distance: f64,
    /// Falling below this height respawns the player.
    pub respawn_floor_y: f64,
}

/// Save location.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for world records. `None` uses the platform data directory.
    pub save_dir: Option<PathBuf>,
    /// Keep the world in memory only; nothing is written to disk.
    pub in_memory: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Also write JSON logs to a file in the log directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 23_021_990,
            sea_level: 36,
            tree_chance: 0.016,
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            render_distance: 6,
            mesh_rebuilds_per_frame: 2,
            save_flush_debounce_ms: 1200,
            meta_save_debounce_ms: 900,
            loader_threads: 0,
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            width: 0.6,
            height: 1.8,
            eye_height: 1.62,
            walk_speed: 4.4,
            run_speed: 7.1,
            jump_velocity: 5.9,
            gravity: 18.0,
            max_fall_speed: 32.0,
            ground_drag: 12.0,
            ground_acceleration: 32.0,
            air_acceleration: 14.0,
            interact_distance: 6.0,
            respawn_floor_y: -20.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Rejects values the world cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field, reason: &str| {
            Err(ConfigError::Invalid {
                field,
                reason: reason.to_string(),
            })
        };
        if self.streaming.render_distance == 0 {
            return invalid("streaming.render_distance", "must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.world.tree_chance) {
            return invalid("world.tree_chance", "must be within 0.0..=1.0");
        }
        let p = &self.player;
        if !(p.width > 0.0 && p.height > 0.0 && p.eye_height <= p.height) {
            return invalid("player", "body must have positive size and eyes inside it");
        }
        if !(p.interact_distance.is_finite() && p.interact_distance > 0.0) {
            return invalid("player.interact_distance", "must be positive");
        }
        Ok(())
    }
}
