//! The six cardinal directions a block face can point, with their per-face
//! geometry: neighbor offset, normal, corner table, and ambient shade.

/// One of the six cardinal directions a voxel face can point.
///
/// The `repr(u8)` discriminant doubles as the bit index inside [`super::VisibleFaces`]
/// and fixes the order faces are emitted in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FaceDirection {
    /// +X direction.
    PosX = 0,
    /// −X direction.
    NegX = 1,
    /// +Y direction.
    PosY = 2,
    /// −Y direction.
    NegY = 3,
    /// +Z direction.
    PosZ = 4,
    /// −Z direction.
    NegZ = 5,
}

impl FaceDirection {
    /// All six directions in emission order.
    pub const ALL: [FaceDirection; 6] = [
        Self::PosX,
        Self::NegX,
        Self::PosY,
        Self::NegY,
        Self::PosZ,
        Self::NegZ,
    ];

    /// Returns the unit normal as `[f32; 3]` for this face direction.
    pub fn normal(self) -> [f32; 3] {
        match self {
            Self::PosX => [1.0, 0.0, 0.0],
            Self::NegX => [-1.0, 0.0, 0.0],
            Self::PosY => [0.0, 1.0, 0.0],
            Self::NegY => [0.0, -1.0, 0.0],
            Self::PosZ => [0.0, 0.0, 1.0],
            Self::NegZ => [0.0, 0.0, -1.0],
        }
    }

    /// Returns the neighbor coordinate offset for this direction.
    pub fn offset(self, x: i32, y: i32, z: i32) -> (i32, i32, i32) {
        match self {
            Self::PosX => (x + 1, y, z),
            Self::NegX => (x - 1, y, z),
            Self::PosY => (x, y + 1, z),
            Self::NegY => (x, y - 1, z),
            Self::PosZ => (x, y, z + 1),
            Self::NegZ => (x, y, z - 1),
        }
    }

    /// Returns the opposite face direction.
    pub fn opposite(self) -> Self {
        match self {
            Self::PosX => Self::NegX,
            Self::NegX => Self::PosX,
            Self::PosY => Self::NegY,
            Self::NegY => Self::PosY,
            Self::PosZ => Self::NegZ,
            Self::NegZ => Self::PosZ,
        }
    }

    /// Brightness multiplier baked into vertex colors. Top faces are brightest,
    /// bottoms darkest.
    pub fn shade(self) -> f32 {
        match self {
            Self::PosX => 0.86,
            Self::NegX => 0.74,
            Self::PosY => 1.0,
            Self::NegY => 0.56,
            Self::PosZ => 0.92,
            Self::NegZ => 0.67,
        }
    }

    /// Unit-cube corners of this face, wound so that `(0, 1, 2)` and `(0, 2, 3)`
    /// face outward.
    pub fn corners(self) -> [[u8; 3]; 4] {
        match self {
            Self::PosX => [[1, 0, 0], [1, 1, 0], [1, 1, 1], [1, 0, 1]],
            Self::NegX => [[0, 0, 1], [0, 1, 1], [0, 1, 0], [0, 0, 0]],
            Self::PosY => [[0, 1, 1], [1, 1, 1], [1, 1, 0], [0, 1, 0]],
            Self::NegY => [[0, 0, 0], [1, 0, 0], [1, 0, 1], [0, 0, 1]],
            Self::PosZ => [[1, 0, 1], [1, 1, 1], [0, 1, 1], [0, 0, 1]],
            Self::NegZ => [[0, 0, 0], [0, 1, 0], [1, 1, 0], [1, 0, 0]],
        }
    }

    /// Returns the direction index (0–5).
    pub fn index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_roundtrip() {
        for dir in FaceDirection::ALL {
            assert_eq!(dir.opposite().opposite(), dir);
            assert_ne!(dir.opposite(), dir);
        }
    }

    #[test]
    fn test_offset_matches_normal() {
        for dir in FaceDirection::ALL {
            let (x, y, z) = dir.offset(0, 0, 0);
            let n = dir.normal();
            assert_eq!([x as f32, y as f32, z as f32], n);
        }
    }

    #[test]
    fn test_corners_lie_on_face_plane() {
        for dir in FaceDirection::ALL {
            let n = dir.normal();
            let axis = n.iter().position(|c| *c != 0.0).unwrap();
            let plane = if n[axis] > 0.0 { 1 } else { 0 };
            for corner in dir.corners() {
                assert_eq!(corner[axis], plane, "{dir:?} corner {corner:?}");
            }
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        for dir in FaceDirection::ALL {
            let c = dir.corners().map(|v| v.map(|x| x as f32));
            let e1 = [c[1][0] - c[0][0], c[1][1] - c[0][1], c[1][2] - c[0][2]];
            let e2 = [c[2][0] - c[0][0], c[2][1] - c[0][1], c[2][2] - c[0][2]];
            let cross = [
                e1[1] * e2[2] - e1[2] * e2[1],
                e1[2] * e2[0] - e1[0] * e2[2],
                e1[0] * e2[1] - e1[1] * e2[0],
            ];
            let n = dir.normal();
            let dot = cross[0] * n[0] + cross[1] * n[1] + cross[2] * n[2];
            assert!(dot > 0.0, "{dir:?} is wound inward");
        }
    }

    #[test]
    fn test_top_is_brightest() {
        let top = FaceDirection::PosY.shade();
        assert!(FaceDirection::ALL.iter().all(|d| d.shade() <= top));
        assert_eq!(FaceDirection::NegY.shade(), 0.56);
    }

    #[test]
    fn test_index_matches_all_order() {
        for (i, dir) in FaceDirection::ALL.iter().enumerate() {
            assert_eq!(dir.index(), i);
        }
    }
}
