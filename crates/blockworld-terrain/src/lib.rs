//! Procedural terrain generation: seeded noise fields, height field, caves, and trees.

mod cave;
mod heightmap;
mod vegetation;

pub mod generator;
pub mod noise;

pub use cave::{CaveCarver, CaveConfig};
pub use generator::{DEFAULT_SEED, TerrainGenerator, TerrainParams, generate_chunk_blocks};
pub use heightmap::{HeightBand, HeightmapParams, HeightmapSampler};
pub use noise::{FbmField, FbmParams, ValueField};
pub use vegetation::{TreeConfig, TreePlacer};
