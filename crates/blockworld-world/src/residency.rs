//! Which chunk columns should be resident around an observer.

use blockworld_voxel::ChunkCoord;

/// All coordinates with `dx² + dz² <= radius²` around `center`, nearest first.
///
/// Equal distances keep scan order (`dz` outer, `dx` inner).
pub fn chunks_in_radius(center: ChunkCoord, radius: u32) -> Vec<ChunkCoord> {
    let r = radius as i32;
    let r_sq = i64::from(r) * i64::from(r);
    let mut coords = Vec::new();
    for dz in -r..=r {
        for dx in -r..=r {
            let coord = center.offset(dx, dz);
            if coord.distance_sq(center) <= r_sq {
                coords.push(coord);
            }
        }
    }
    coords.sort_by_key(|c| c.distance_sq(center));
    coords
}

/// `true` once a chunk is farther than `radius + 1` from `center`.
pub fn should_unload(coord: ChunkCoord, center: ChunkCoord, radius: u32) -> bool {
    let keep = i64::from(radius) + 1;
    coord.distance_sq(center) > keep * keep
}
