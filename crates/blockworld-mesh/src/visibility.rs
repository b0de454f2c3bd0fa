//! Face visibility: decides which voxel faces are exposed and need geometry.

use blockworld_voxel::BlockId;

use crate::face_direction::FaceDirection;
use crate::visible_faces::VisibleFaces;

/// Returns `true` if the face of `block` that touches `neighbor` must be drawn.
///
/// - Air neighbors always expose the face.
/// - Opaque blocks also show faces against any transparent neighbor.
/// - Transparent blocks show faces against a *different* transparent type,
///   never against an identical one (no doubled internal glass faces) and
///   never against an opaque block.
pub fn should_render_face(block: BlockId, neighbor: BlockId) -> bool {
    if neighbor.is_air() {
        return true;
    }
    let neighbor_transparent = neighbor.is_transparent();
    if !block.is_transparent() {
        return neighbor_transparent;
    }
    neighbor_transparent && neighbor != block
}

/// Visible-face mask for `block` given a neighbor lookup relative to the
/// voxel's own position `(x, y, z)`.
pub fn compute_visible_faces(
    block: BlockId,
    (x, y, z): (i32, i32, i32),
    neighbor: impl Fn(i32, i32, i32) -> BlockId,
) -> VisibleFaces {
    let mut faces = VisibleFaces::NONE;
    if block.is_air() {
        return faces;
    }
    for dir in FaceDirection::ALL {
        let (nx, ny, nz) = dir.offset(x, y, z);
        if should_render_face(block, neighbor(nx, ny, nz)) {
            faces.set_visible(dir);
        }
    }
    faces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_neighbor_always_renders() {
        for code in 1..10 {
            assert!(should_render_face(BlockId(code), BlockId::AIR));
        }
    }

    #[test]
    fn test_opaque_pairs() {
        assert!(!should_render_face(BlockId::STONE, BlockId::STONE));
        assert!(!should_render_face(BlockId::STONE, BlockId::DIRT));
        assert!(should_render_face(BlockId::STONE, BlockId::GLASS));
        assert!(should_render_face(BlockId::STONE, BlockId::LEAVES));
    }

    #[test]
    fn test_transparent_pairs() {
        assert!(!should_render_face(BlockId::GLASS, BlockId::GLASS));
        assert!(!should_render_face(BlockId::LEAVES, BlockId::LEAVES));
        assert!(should_render_face(BlockId::GLASS, BlockId::LEAVES));
        assert!(should_render_face(BlockId::LEAVES, BlockId::GLASS));
        assert!(!should_render_face(BlockId::GLASS, BlockId::STONE));
    }

    #[test]
    fn test_isolated_block_shows_all_faces() {
        let faces = compute_visible_faces(BlockId::STONE, (0, 0, 0), |_, _, _| BlockId::AIR);
        assert_eq!(faces, VisibleFaces::ALL);
    }

    #[test]
    fn test_air_has_no_faces() {
        let faces = compute_visible_faces(BlockId::AIR, (0, 0, 0), |_, _, _| BlockId::AIR);
        assert_eq!(faces, VisibleFaces::NONE);
    }

    #[test]
    fn test_buried_block_hides_faces_except_open_top() {
        let faces = compute_visible_faces(BlockId::DIRT, (0, 5, 0), |_, y, _| {
            if y > 5 { BlockId::AIR } else { BlockId::STONE }
        });
        assert_eq!(faces.count(), 1);
        assert!(faces.is_visible(FaceDirection::PosY));
    }
}
