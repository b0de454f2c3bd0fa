//! Noise-driven tree placement.
//!
//! Trees are placed per column from a low-threshold value-noise test, so
//! placement is a pure function of the seed and world column. Trunks overwrite
//! whatever they pass through; foliage only fills air.

use blockworld_voxel::{BlockId, CHUNK_HEIGHT, CHUNK_SIZE, local_index};

use crate::noise::ValueField;

/// Configuration for tree placement and shape.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeConfig {
    /// Seed salt for the placement field. Default: `0xa6f`.
    pub placement_salt: i32,
    /// World-to-noise scale for placement. Default: 0.18.
    pub placement_frequency: f64,
    /// A tree is placed where the placement noise is below this. Default: 0.016.
    pub chance: f64,
    /// Seed salt for the trunk-height field. Default: `0x90f1`.
    pub height_salt: i32,
    /// World-to-noise scale for trunk height. Default: 0.4.
    pub height_frequency: f64,
    /// Shortest trunk. Default: 4.
    pub min_trunk: i32,
    /// Number of distinct trunk heights above `min_trunk`. Default: 3.
    pub trunk_variation: i32,
    /// Columns closer than this to the chunk edge get no tree, keeping canopies
    /// inside one chunk. Default: 2.
    pub edge_margin: i32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            placement_salt: 0xa6f,
            placement_frequency: 0.18,
            chance: 0.016,
            height_salt: 0x90f1,
            height_frequency: 0.4,
            min_trunk: 4,
            trunk_variation: 3,
            edge_margin: 2,
        }
    }
}

/// Places trees into a chunk's block array.
#[derive(Clone, Debug)]
pub struct TreePlacer {
    placement: ValueField,
    height: ValueField,
    config: TreeConfig,
}

impl TreePlacer {
    pub fn new(seed: i32, config: TreeConfig) -> Self {
        Self {
            placement: ValueField::new(seed ^ config.placement_salt),
            height: ValueField::new(seed ^ config.height_salt),
            config,
        }
    }

    /// Trunk height for the column, or `None` if no tree grows there.
    ///
    /// Edge and underwater filtering is the caller's concern; see [`Self::place`].
    pub fn trunk_height(&self, wx: i32, wz: i32) -> Option<i32> {
        let cfg = &self.config;
        let placement = self.placement.sample2(
            wx as f64 * cfg.placement_frequency,
            wz as f64 * cfg.placement_frequency,
        );
        if placement >= cfg.chance {
            return None;
        }

        let roll = self.height.sample2(
            wx as f64 * cfg.height_frequency,
            wz as f64 * cfg.height_frequency,
        );
        let variation = cfg.trunk_variation.max(1);
        Some(cfg.min_trunk + ((roll * variation as f64).floor() as i32).rem_euclid(variation))
    }

    /// Tries to grow a tree on column `(lx, lz)` whose surface is at `surface`.
    ///
    /// Returns `true` if a tree was placed.
    pub fn place(
        &self,
        blocks: &mut [BlockId],
        (lx, lz): (i32, i32),
        (wx, wz): (i32, i32),
        surface: i32,
        sea_level: i32,
    ) -> bool {
        if surface <= sea_level + 1 {
            return false;
        }
        let margin = self.config.edge_margin;
        let inner = margin..=CHUNK_SIZE - 1 - margin;
        if !inner.contains(&lx) || !inner.contains(&lz) {
            return false;
        }
        let Some(trunk) = self.trunk_height(wx, wz) else {
            return false;
        };

        let trunk_top = (surface + trunk).clamp(0, CHUNK_HEIGHT - 2);
        for y in surface + 1..=trunk_top {
            set_if_inside(blocks, lx, y, lz, BlockId::WOOD);
        }

        for oy in -2..=1 {
            let radius: i32 = if oy >= 1 { 1 } else { 2 };
            for oz in -radius..=radius {
                for ox in -radius..=radius {
                    if ox.abs() + oz.abs() > radius + 1 {
                        continue;
                    }
                    set_if_inside(blocks, lx + ox, trunk_top + oy, lz + oz, BlockId::LEAVES);
                }
            }
        }
        set_if_inside(blocks, lx, trunk_top + 2, lz, BlockId::LEAVES);
        true
    }
}

/// Writes `block` if the position is inside the chunk and the target is air,
/// or unconditionally for wood.
fn set_if_inside(blocks: &mut [BlockId], lx: i32, y: i32, lz: i32, block: BlockId) {
    if !(0..CHUNK_SIZE).contains(&lx) || !(0..CHUNK_SIZE).contains(&lz) {
        return;
    }
    if !(0..CHUNK_HEIGHT).contains(&y) {
        return;
    }
    let index = local_index(lx as usize, y as usize, lz as usize);
    if blocks[index].is_air() || block == BlockId::WOOD {
        blocks[index] = block;
    }
}
