//! Deterministic chunk generation: height field, layering, caves, then trees.

use blockworld_voxel::{BlockId, CHUNK_SIZE, CHUNK_VOLUME, Chunk, ChunkCoord, local_index};

use crate::cave::{CaveCarver, CaveConfig};
use crate::heightmap::{HeightmapParams, HeightmapSampler};
use crate::vegetation::{TreeConfig, TreePlacer};

/// Seed used when no world seed has been chosen or saved.
pub const DEFAULT_SEED: i32 = 23_021_990;

/// Tunable parameters for the whole generation pipeline.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainParams {
    /// Height around which terrain is centered; columns at or below
    /// `sea_level + 1` become beaches.
    pub sea_level: i32,
    /// Number of dirt layers under the grass cap.
    pub soil_depth: i32,
    /// Number of sand layers on beach columns, below the top voxel.
    pub sand_depth: i32,
    pub heightmap: HeightmapParams,
    pub caves: CaveConfig,
    pub trees: TreeConfig,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self {
            sea_level: 36,
            soil_depth: 3,
            sand_depth: 2,
            heightmap: HeightmapParams::default(),
            caves: CaveConfig::default(),
            trees: TreeConfig::default(),
        }
    }
}

/// Pure function of `(seed, chunk coordinate)` producing a chunk's blocks.
///
/// Owns its noise fields; share one instance across worker threads.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    seed: i32,
    sea_level: i32,
    soil_depth: i32,
    sand_depth: i32,
    heightmap: HeightmapSampler,
    caves: CaveCarver,
    trees: TreePlacer,
}

impl TerrainGenerator {
    pub fn new(seed: i32, params: TerrainParams) -> Self {
        Self {
            seed,
            sea_level: params.sea_level,
            soil_depth: params.soil_depth,
            sand_depth: params.sand_depth,
            heightmap: HeightmapSampler::new(seed, params.sea_level, params.heightmap),
            caves: CaveCarver::new(seed, params.caves),
            trees: TreePlacer::new(seed, params.trees),
        }
    }

    /// Generator with default parameters.
    pub fn with_seed(seed: i32) -> Self {
        Self::new(seed, TerrainParams::default())
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn sea_level(&self) -> i32 {
        self.sea_level
    }

    /// Surface height of the world column `(wx, wz)`.
    pub fn terrain_height(&self, wx: i32, wz: i32) -> i32 {
        self.heightmap.height(wx, wz)
    }

    /// Material for terrain voxel `y` in a column whose surface is `height`.
    pub fn block_for_layer(&self, y: i32, height: i32) -> BlockId {
        if height <= self.sea_level + 1 {
            return if y >= height - self.sand_depth {
                BlockId::SAND
            } else {
                BlockId::STONE
            };
        }
        if y == height {
            BlockId::GRASS
        } else if y >= height - self.soil_depth {
            BlockId::DIRT
        } else {
            BlockId::STONE
        }
    }

    /// Generates the dense block array for one chunk.
    pub fn generate_blocks(&self, coord: ChunkCoord) -> Vec<BlockId> {
        let mut blocks = vec![BlockId::AIR; CHUNK_VOLUME];
        let [origin_x, _, origin_z] = coord.world_origin();
        let mut trees = 0usize;

        for lz in 0..CHUNK_SIZE {
            for lx in 0..CHUNK_SIZE {
                let wx = origin_x + lx;
                let wz = origin_z + lz;
                let height = self.terrain_height(wx, wz);

                for y in 0..=height {
                    if self.caves.is_cave(wx, y, wz, height) {
                        continue;
                    }
                    blocks[local_index(lx as usize, y as usize, lz as usize)] =
                        self.block_for_layer(y, height);
                }

                if self
                    .trees
                    .place(&mut blocks, (lx, lz), (wx, wz), height, self.sea_level)
                {
                    trees += 1;
                }
            }
        }

        tracing::trace!("generated chunk {} with {} trees", coord, trees);
        blocks
    }

    /// Generates a fresh [`Chunk`] (mesh-dirty, unmodified).
    pub fn generate_chunk(&self, coord: ChunkCoord) -> Chunk {
        // Length always matches; the fallback keeps this infallible.
        Chunk::from_blocks(coord, self.generate_blocks(coord)).unwrap_or_else(|_| Chunk::new(coord))
    }
}

/// Convenience wrapper: default parameters with the given seed.
pub fn generate_chunk_blocks(seed: i32, coord: ChunkCoord) -> Vec<BlockId> {
    TerrainGenerator::with_seed(seed).generate_blocks(coord)
}
