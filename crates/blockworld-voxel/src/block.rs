//! Block-type codes and their static metadata table.
//!
//! The table is immutable process-wide state. Air is always code 0 so that
//! zero-initialized chunk memory represents empty space. Codes outside the
//! table resolve to Air metadata.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Compact identifier stored inside every voxel cell (2 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct BlockId(pub u16);

/// Opacity class of a block type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opacity {
    /// Hides whatever is behind it.
    Opaque,
    /// See-through (air, leaves, glass).
    Transparent,
}

/// Static descriptor for a block type.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockMeta {
    /// Human-readable name.
    pub name: &'static str,
    /// Opacity class used by face culling.
    pub opacity: Opacity,
    /// Linear RGB base color in `[0, 1]`.
    pub color: [f32; 3],
}

impl BlockId {
    pub const AIR: BlockId = BlockId(0);
    pub const GRASS: BlockId = BlockId(1);
    pub const DIRT: BlockId = BlockId(2);
    pub const STONE: BlockId = BlockId(3);
    pub const SAND: BlockId = BlockId(4);
    pub const WOOD: BlockId = BlockId(5);
    pub const LEAVES: BlockId = BlockId(6);
    pub const PLANKS: BlockId = BlockId(7);
    pub const COBBLESTONE: BlockId = BlockId(8);
    pub const GLASS: BlockId = BlockId(9);

    /// Returns the metadata for this code, falling back to Air for unknown codes.
    pub fn meta(self) -> &'static BlockMeta {
        BLOCK_META
            .get(self.0 as usize)
            .unwrap_or(&BLOCK_META[Self::AIR.0 as usize])
    }

    /// Returns `true` for the empty block.
    pub fn is_air(self) -> bool {
        self == Self::AIR
    }

    /// Returns `true` if the block's opacity class is transparent.
    ///
    /// Air counts as transparent.
    pub fn is_transparent(self) -> bool {
        self.meta().opacity == Opacity::Transparent
    }

    /// Returns `true` if this code has an entry in the metadata table.
    pub fn is_known(self) -> bool {
        (self.0 as usize) < BLOCK_META.len()
    }
}

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.meta().name, self.0)
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

const fn opaque(name: &'static str, color: [f32; 3]) -> BlockMeta {
    BlockMeta {
        name,
        opacity: Opacity::Opaque,
        color,
    }
}

const fn transparent(name: &'static str, color: [f32; 3]) -> BlockMeta {
    BlockMeta {
        name,
        opacity: Opacity::Transparent,
        color,
    }
}

/// Metadata indexed by block code.
static BLOCK_META: [BlockMeta; 10] = [
    transparent("Air", [0.0, 0.0, 0.0]),
    opaque("Grass", [0.31, 0.62, 0.28]),
    opaque("Dirt", [0.45, 0.30, 0.18]),
    opaque("Stone", [0.53, 0.55, 0.58]),
    opaque("Sand", [0.78, 0.72, 0.46]),
    opaque("Wood", [0.49, 0.35, 0.20]),
    transparent("Leaves", [0.24, 0.50, 0.22]),
    opaque("Planks", [0.66, 0.50, 0.29]),
    opaque("Cobblestone", [0.42, 0.44, 0.45]),
    transparent("Glass", [0.69, 0.85, 0.92]),
];

/// Placeable blocks in hotbar order.
pub const BLOCK_LIST: [BlockId; 9] = [
    BlockId::GRASS,
    BlockId::DIRT,
    BlockId::STONE,
    BlockId::SAND,
    BlockId::WOOD,
    BlockId::LEAVES,
    BlockId::PLANKS,
    BlockId::COBBLESTONE,
    BlockId::GLASS,
];

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_is_code_zero_and_default() {
        assert_eq!(BlockId::default(), BlockId::AIR);
        assert!(BlockId::AIR.is_air());
        assert!(BlockId::AIR.is_transparent());
    }

    #[test]
    fn test_opacity_classes() {
        for id in [BlockId::LEAVES, BlockId::GLASS] {
            assert!(id.is_transparent(), "{id} should be transparent");
        }
        for id in [
            BlockId::GRASS,
            BlockId::DIRT,
            BlockId::STONE,
            BlockId::SAND,
            BlockId::WOOD,
            BlockId::PLANKS,
            BlockId::COBBLESTONE,
        ] {
            assert!(!id.is_transparent(), "{id} should be opaque");
        }
    }

    #[test]
    fn test_unknown_code_falls_back_to_air_meta() {
        let unknown = BlockId(4000);
        assert!(!unknown.is_known());
        assert_eq!(unknown.meta().name, "Air");
        assert!(unknown.is_transparent());
        // Still not air: the raw code is preserved.
        assert!(!unknown.is_air());
    }

    #[test]
    fn test_block_list_excludes_air() {
        assert_eq!(BLOCK_LIST.len(), 9);
        assert!(BLOCK_LIST.iter().all(|b| !b.is_air() && b.is_known()));
        assert_eq!(BLOCK_LIST[0], BlockId::GRASS);
        assert_eq!(BLOCK_LIST[8], BlockId::GLASS);
    }

    #[test]
    fn test_colors_are_normalized() {
        for code in 0..10u16 {
            let meta = BlockId(code).meta();
            assert!(meta.color.iter().all(|c| (0.0..=1.0).contains(c)));
        }
    }

    #[test]
    fn test_display_includes_name_and_code() {
        assert_eq!(BlockId::COBBLESTONE.to_string(), "Cobblestone(8)");
    }
}
