//! Chunk dimensions and the mapping between world, chunk, and local coordinates.
//!
//! Chunks are full-height columns: the grid is unbounded in X/Z and fixed in Y.

use std::fmt;

/// Edge length of a chunk along X and Z.
pub const CHUNK_SIZE: i32 = 16;

/// Height of every chunk in blocks.
pub const CHUNK_HEIGHT: i32 = 96;

/// Number of voxels in one chunk (`16 * 16 * 96`).
pub const CHUNK_VOLUME: usize = (CHUNK_SIZE * CHUNK_SIZE * CHUNK_HEIGHT) as usize;

/// Largest chunk index an observer position maps to. Half of the `i32`
/// block range, so block arithmetic in and around any chunk within the
/// residency radius cannot overflow.
pub const MAX_CHUNK_INDEX: i32 = i32::MAX / CHUNK_SIZE / 2;

/// Smallest chunk index an observer position maps to.
pub const MIN_CHUNK_INDEX: i32 = -MAX_CHUNK_INDEX;

/// Identifies a chunk column by its grid position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    /// Chunk-grid X coordinate.
    pub cx: i32,
    /// Chunk-grid Z coordinate.
    pub cz: i32,
}

impl ChunkCoord {
    /// Creates a new chunk coordinate.
    pub fn new(cx: i32, cz: i32) -> Self {
        Self { cx, cz }
    }

    /// Returns the chunk containing the world position `(x, z)`.
    pub fn containing(x: f64, z: f64) -> Self {
        Self::new(world_to_chunk(x), world_to_chunk(z))
    }

    /// `true` if both indices lie in [`MIN_CHUNK_INDEX`]..=[`MAX_CHUNK_INDEX`].
    pub fn is_within_limits(self) -> bool {
        let range = MIN_CHUNK_INDEX..=MAX_CHUNK_INDEX;
        range.contains(&self.cx) && range.contains(&self.cz)
    }

    /// Returns the coordinate offset by `(dx, dz)` chunks, saturating at the
    /// ends of the `i32` range.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.cx.saturating_add(dx), self.cz.saturating_add(dz))
    }

    /// The four lateral neighbors in `-X, +X, -Z, +Z` order.
    pub fn lateral_neighbors(self) -> [ChunkCoord; 4] {
        [
            self.offset(-1, 0),
            self.offset(1, 0),
            self.offset(0, -1),
            self.offset(0, 1),
        ]
    }

    /// Squared distance in chunk units between two coordinates.
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx) - i64::from(other.cx);
        let dz = i64::from(self.cz) - i64::from(other.cz);
        dx * dx + dz * dz
    }

    /// World-space block position of this chunk's `(0, 0, 0)` corner.
    pub fn world_origin(self) -> [i32; 3] {
        [
            self.cx.saturating_mul(CHUNK_SIZE),
            0,
            self.cz.saturating_mul(CHUNK_SIZE),
        ]
    }

    /// Storage key in `"cx,cz"` form.
    pub fn key(self) -> String {
        format!("{},{}", self.cx, self.cz)
    }

    /// Parses a `"cx,cz"` key. Returns `None` for anything else.
    pub fn parse_key(key: &str) -> Option<Self> {
        let (cx, cz) = key.split_once(',')?;
        Some(Self::new(cx.trim().parse().ok()?, cz.trim().parse().ok()?))
    }
}

impl fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.cx, self.cz)
    }
}

/// Chunk index along one horizontal axis for a world coordinate: `floor(v / 16)`,
/// clamped to [`MIN_CHUNK_INDEX`]..=[`MAX_CHUNK_INDEX`]. NaN maps to chunk 0.
pub fn world_to_chunk(v: f64) -> i32 {
    ((v / CHUNK_SIZE as f64).floor() as i32).clamp(MIN_CHUNK_INDEX, MAX_CHUNK_INDEX)
}

/// Local offset along one horizontal axis: `floor(v) mod 16`, always non-negative.
pub fn world_to_local(v: f64) -> i32 {
    (v.floor() as i32).rem_euclid(CHUNK_SIZE)
}

/// Integer form of [`world_to_chunk`] for block coordinates.
pub fn block_to_chunk(v: i32) -> i32 {
    v.div_euclid(CHUNK_SIZE)
}

/// Integer form of [`world_to_local`] for block coordinates.
pub fn block_to_local(v: i32) -> i32 {
    v.rem_euclid(CHUNK_SIZE)
}

/// Flat array index of a local coordinate: X fastest, then Z, then Y.
#[inline]
pub fn local_index(lx: usize, ly: usize, lz: usize) -> usize {
    let size = CHUNK_SIZE as usize;
    debug_assert!(lx < size && lz < size && ly < CHUNK_HEIGHT as usize);
    lx + lz * size + ly * size * size
}

/// Returns `true` if `(lx, ly, lz)` lies inside a chunk.
pub fn in_local_bounds(lx: i32, ly: i32, lz: i32) -> bool {
    (0..CHUNK_SIZE).contains(&lx)
        && (0..CHUNK_HEIGHT).contains(&ly)
        && (0..CHUNK_SIZE).contains(&lz)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_volume() {
        assert_eq!(CHUNK_VOLUME, 24_576);
    }

    #[test]
    fn test_world_to_local_negative() {
        assert_eq!(world_to_local(-1.0), CHUNK_SIZE - 1);
        assert_eq!(world_to_local(-16.0), 0);
        assert_eq!(world_to_local(-17.0), CHUNK_SIZE - 1);
        assert_eq!(world_to_local(-0.5), CHUNK_SIZE - 1);
        assert_eq!(world_to_chunk(-1.0), -1);
        assert_eq!(world_to_chunk(-0.5), -1);
    }

    #[test]
    fn test_chunk_and_local_recompose_floor() {
        for v in -100..=100 {
            let vf = v as f64 + 0.25;
            let chunk = world_to_chunk(vf);
            let local = world_to_local(vf);
            assert!((0..CHUNK_SIZE).contains(&local), "v={vf} local={local}");
            assert_eq!(chunk * CHUNK_SIZE + local, vf.floor() as i32, "v={vf}");

            assert_eq!(block_to_chunk(v) * CHUNK_SIZE + block_to_local(v), v);
            assert_eq!(block_to_chunk(v), world_to_chunk(v as f64));
            assert_eq!(block_to_local(v), world_to_local(v as f64));
        }
    }

    #[test]
    fn test_local_index_layout() {
        assert_eq!(local_index(0, 0, 0), 0);
        assert_eq!(local_index(1, 0, 0), 1);
        assert_eq!(local_index(0, 0, 1), 16);
        assert_eq!(local_index(0, 1, 0), 256);
        assert_eq!(local_index(15, 95, 15), CHUNK_VOLUME - 1);
    }

    #[test]
    fn test_key_roundtrip_and_rejects_garbage() {
        let coord = ChunkCoord::new(-3, 12);
        assert_eq!(coord.key(), "-3,12");
        assert_eq!(ChunkCoord::parse_key("-3,12"), Some(coord));
        assert_eq!(ChunkCoord::parse_key("world"), None);
        assert_eq!(ChunkCoord::parse_key("1,x"), None);
    }

    #[test]
    fn test_containing_and_origin() {
        let coord = ChunkCoord::containing(-0.1, 31.9);
        assert_eq!(coord, ChunkCoord::new(-1, 1));
        assert_eq!(coord.world_origin(), [-16, 0, 16]);
    }

    #[test]
    fn test_distance_and_neighbors() {
        let a = ChunkCoord::new(0, 0);
        assert_eq!(a.distance_sq(ChunkCoord::new(3, -4)), 25);
        let n = a.lateral_neighbors();
        assert!(n.iter().all(|c| c.distance_sq(a) == 1));
    }

    #[test]
    fn test_extreme_positions_stay_in_range() {
        let far = ChunkCoord::containing(1e300, -1e300);
        assert_eq!(far, ChunkCoord::new(MAX_CHUNK_INDEX, MIN_CHUNK_INDEX));
        assert_eq!(ChunkCoord::containing(f64::NAN, 0.0), ChunkCoord::new(0, 0));
        assert!(far.is_within_limits());
        assert!(!ChunkCoord::new(block_to_chunk(i32::MAX), 0).is_within_limits());

        let edge = far.offset(6, -6);
        assert_eq!(edge, ChunkCoord::new(MAX_CHUNK_INDEX + 6, MIN_CHUNK_INDEX - 6));
        let [ex, _, ez] = edge.world_origin();
        assert!(ex.checked_add(CHUNK_SIZE).is_some());
        assert!(ez.checked_sub(1).is_some());
        assert_eq!(ChunkCoord::new(i32::MAX, 0).offset(1, 0).cx, i32::MAX);
        assert_eq!(ChunkCoord::new(i32::MIN, 0).world_origin()[0], i32::MIN);
        assert!(far.distance_sq(ChunkCoord::new(MIN_CHUNK_INDEX, 0)) > 0);
    }

    #[test]
    fn test_in_local_bounds() {
        assert!(in_local_bounds(0, 0, 0));
        assert!(in_local_bounds(15, 95, 15));
        assert!(!in_local_bounds(16, 0, 0));
        assert!(!in_local_bounds(0, 96, 0));
        assert!(!in_local_bounds(0, -1, 0));
    }
}
