//! Voxel raycasting using the DDA (Amanatides & Woo) algorithm.
//!
//! Walks the integer block grid cell by cell from a continuous origin and
//! reports the first non-air block along with its entry face normal.

use blockworld_voxel::BlockId;
use glam::{DVec3, IVec3};

/// Default reach for block interaction, in blocks.
pub const DEFAULT_MAX_DISTANCE: f64 = 6.0;

/// Directions shorter than this are treated as "no direction".
const MIN_DIRECTION_LENGTH: f64 = 1e-8;

/// Read access to the block field by integer world coordinate.
///
/// Implementors return [`BlockId::AIR`] for anything that is not loaded or
/// lies outside the world's vertical range.
pub trait BlockAccess {
    /// Returns the block at the given world coordinate.
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId;
}

impl<F> BlockAccess for F
where
    F: Fn(i32, i32, i32) -> BlockId,
{
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        self(x, y, z)
    }
}

/// Result of a successful block raycast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// World coordinate of the hit block.
    pub block: IVec3,
    /// Normal of the entry face. Zero when the origin itself is inside a block.
    pub normal: IVec3,
    /// Distance traveled along the ray when the block was entered.
    pub distance: f64,
    /// The block that was hit.
    pub block_id: BlockId,
}

impl RaycastHit {
    /// The cell in front of the entry face, where a new block would be placed.
    pub fn adjacent(&self) -> IVec3 {
        self.block + self.normal
    }
}

/// Casts a ray through the block grid.
///
/// `direction` does not need to be normalized. Returns the first non-air
/// block whose entry distance is within `max_distance`, or `None`.
pub fn raycast_block<W>(
    origin: DVec3,
    direction: DVec3,
    world: &W,
    max_distance: f64,
) -> Option<RaycastHit>
where
    W: BlockAccess + ?Sized,
{
    let len = direction.length();
    if !len.is_finite() || len <= MIN_DIRECTION_LENGTH {
        return None;
    }
    let dir = direction / len;

    let mut cell = origin.floor().as_ivec3();
    let step = IVec3::new(sign(dir.x), sign(dir.y), sign(dir.z));

    let t_delta = DVec3::new(inv_abs(dir.x), inv_abs(dir.y), inv_abs(dir.z));
    let mut t_max = DVec3::new(
        int_bound(origin.x, dir.x),
        int_bound(origin.y, dir.y),
        int_bound(origin.z, dir.z),
    );

    let mut normal = IVec3::ZERO;
    let mut distance = 0.0_f64;

    while distance <= max_distance {
        let block_id = world.block_at(cell.x, cell.y, cell.z);
        if !block_id.is_air() {
            return Some(RaycastHit {
                block: cell,
                normal,
                distance,
                block_id,
            });
        }

        // Advance along the axis with the smallest t_max.
        if t_max.x < t_max.y && t_max.x < t_max.z {
            cell.x += step.x;
            distance = t_max.x;
            t_max.x += t_delta.x;
            normal = IVec3::new(-step.x, 0, 0);
        } else if t_max.y < t_max.z {
            cell.y += step.y;
            distance = t_max.y;
            t_max.y += t_delta.y;
            normal = IVec3::new(0, -step.y, 0);
        } else {
            cell.z += step.z;
            distance = t_max.z;
            t_max.z += t_delta.z;
            normal = IVec3::new(0, 0, -step.z);
        }
    }

    None
}

fn sign(v: f64) -> i32 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

fn inv_abs(v: f64) -> f64 {
    if v == 0.0 { f64::INFINITY } else { (1.0 / v).abs() }
}

/// Parametric distance from `s` to the next integer boundary along `ds`.
///
/// A coordinate already sitting on a boundary and moving negative crosses it
/// immediately.
fn int_bound(s: f64, ds: f64) -> f64 {
    if ds == 0.0 {
        return f64::INFINITY;
    }
    let step = if ds > 0.0 { 1.0 } else { 0.0 };
    let next = if s.floor() == s { s + step } else { s.floor() + step };
    (next - s) / ds
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Simple test world backed by a hash map.
    #[derive(Default)]
    struct TestWorld {
        blocks: HashMap<(i32, i32, i32), BlockId>,
    }

    impl TestWorld {
        fn with(cells: &[(i32, i32, i32)]) -> Self {
            let mut world = Self::default();
            for &cell in cells {
                world.blocks.insert(cell, BlockId::STONE);
            }
            world
        }
    }

    impl BlockAccess for TestWorld {
        fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
            self.blocks.get(&(x, y, z)).copied().unwrap_or(BlockId::AIR)
        }
    }

    const CENTER: DVec3 = DVec3::new(0.5, 0.5, 0.5);

    #[test]
    fn test_ray_hits_solid_block() {
        let world = TestWorld::with(&[(5, 0, 0)]);
        let hit = raycast_block(CENTER, DVec3::X, &world, 10.0).expect("should hit");
        assert_eq!(hit.block, IVec3::new(5, 0, 0));
        assert_eq!(hit.normal, IVec3::new(-1, 0, 0));
        assert!((hit.distance - 4.5).abs() < 1e-9);
        assert_eq!(hit.block_id, BlockId::STONE);
    }

    #[test]
    fn test_all_air_is_no_hit() {
        let air = |_: i32, _: i32, _: i32| BlockId::AIR;
        assert!(raycast_block(CENTER, DVec3::new(1.0, -0.3, 0.2), &air, 50.0).is_none());
    }

    #[test]
    fn test_entry_normals_per_axis() {
        let cases = [
            (DVec3::X, (3, 0, 0), IVec3::NEG_X),
            (DVec3::NEG_X, (-3, 0, 0), IVec3::X),
            (DVec3::Y, (0, 3, 0), IVec3::NEG_Y),
            (DVec3::NEG_Y, (0, -3, 0), IVec3::Y),
            (DVec3::Z, (0, 0, 3), IVec3::NEG_Z),
            (DVec3::NEG_Z, (0, 0, -3), IVec3::Z),
        ];
        for (dir, cell, normal) in cases {
            let world = TestWorld::with(&[cell]);
            let hit = raycast_block(CENTER, dir, &world, 10.0).unwrap();
            assert_eq!(hit.block, IVec3::new(cell.0, cell.1, cell.2), "{dir:?}");
            assert_eq!(hit.normal, normal, "{dir:?}");
            assert_eq!(hit.adjacent(), hit.block + normal);
        }
    }

    #[test]
    fn test_max_distance_limits_search() {
        let world = TestWorld::with(&[(20, 0, 0)]);
        assert!(raycast_block(CENTER, DVec3::X, &world, DEFAULT_MAX_DISTANCE).is_none());
        assert!(raycast_block(CENTER, DVec3::X, &world, 25.0).is_some());
    }

    #[test]
    fn test_degenerate_direction_is_no_hit() {
        let world = TestWorld::with(&[(0, 0, 0)]);
        assert!(raycast_block(CENTER, DVec3::ZERO, &world, 10.0).is_none());
        assert!(raycast_block(CENTER, DVec3::splat(1e-9), &world, 10.0).is_none());
    }

    #[test]
    fn test_origin_inside_block_hits_immediately() {
        let world = TestWorld::with(&[(0, 0, 0)]);
        let hit = raycast_block(CENTER, DVec3::Y, &world, 10.0).unwrap();
        assert_eq!(hit.distance, 0.0);
        assert_eq!(hit.normal, IVec3::ZERO);
    }

    #[test]
    fn test_origin_on_boundary_moving_negative() {
        let world = TestWorld::with(&[(0, 0, 0)]);
        let hit = raycast_block(DVec3::new(3.0, 0.5, 0.5), DVec3::NEG_X, &world, 10.0).unwrap();
        assert_eq!(hit.block, IVec3::ZERO);
        assert!((hit.distance - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_looking_down_at_floor() {
        let floor = |_: i32, y: i32, _: i32| if y < 10 { BlockId::GRASS } else { BlockId::AIR };
        let eye = DVec3::new(0.3, 11.62, 0.7);
        let hit = raycast_block(eye, DVec3::new(0.2, -1.0, 0.1), &floor, 6.0).unwrap();
        assert_eq!(hit.block.y, 9);
        assert_eq!(hit.normal, IVec3::Y);
    }
}
