//! Selected placeable block.

use blockworld_voxel::{BLOCK_LIST, BlockId};

/// Number of hotbar slots.
pub const HOTBAR_SLOTS: usize = BLOCK_LIST.len();

/// Which entry of [`BLOCK_LIST`] the player places.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hotbar {
    selected: usize,
}

impl Hotbar {
    /// Starts on `selected`, clamped into range.
    pub fn new(selected: usize) -> Self {
        Self {
            selected: selected.min(HOTBAR_SLOTS - 1),
        }
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_block(&self) -> BlockId {
        BLOCK_LIST[self.selected]
    }

    /// Selects slot `index` (clamped). Returns `true` if the selection changed.
    pub fn select(&mut self, index: usize) -> bool {
        let index = index.min(HOTBAR_SLOTS - 1);
        let changed = index != self.selected;
        self.selected = index;
        changed
    }

    /// Selects by number key: `1` is the first slot, `9` the last. Any other
    /// digit is ignored. Returns `true` if the selection changed.
    pub fn select_digit(&mut self, digit: u8) -> bool {
        match digit {
            1..=9 => self.select(usize::from(digit - 1)),
            _ => false,
        }
    }

    pub fn slots(&self) -> &'static [BlockId] {
        &BLOCK_LIST
    }
}
