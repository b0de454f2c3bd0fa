//! Swept axis-aligned box collision against the block field.
//!
//! Motion is resolved one axis at a time (X, then Z, then Y) in small
//! sub-steps. A sub-step that would leave the box overlapping a non-air block
//! is undone and that axis stops for the frame. The block field is only read.

use glam::DVec3;

use crate::raycast::BlockAccess;

/// Sub-step length used when sweeping an axis, in blocks.
pub const SWEEP_STEP: f64 = 0.25;

/// Shrinks the upper bound so a box resting exactly on a boundary does not
/// touch the next cell.
const UPPER_EPSILON: f64 = 1e-6;

/// An axis-aligned bounding box in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Aabb {
    /// Creates a box from two corners.
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// The box of a body of `shape` standing with its feet centered at `feet`.
    pub fn from_feet(feet: DVec3, shape: BodyShape) -> Self {
        let half = shape.width * 0.5;
        Self {
            min: DVec3::new(feet.x - half, feet.y, feet.z - half),
            max: DVec3::new(feet.x + half, feet.y + shape.height, feet.z + half),
        }
    }

    /// The unit box occupied by the block at integer coordinate `(x, y, z)`.
    pub fn block(x: i32, y: i32, z: i32) -> Self {
        let min = DVec3::new(x as f64, y as f64, z as f64);
        Self {
            min,
            max: min + DVec3::ONE,
        }
    }

    /// Strict overlap test; boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
            && self.min.z < other.max.z
            && self.max.z > other.min.z
    }
}

/// Returns `true` if any block overlapping `aabb` is not air.
///
/// Covers cells `floor(min) ..= floor(max - 1e-6)` on every axis.
pub fn has_solid_block_in_aabb<W>(world: &W, aabb: &Aabb) -> bool
where
    W: BlockAccess + ?Sized,
{
    let from = aabb.min.floor().as_ivec3();
    let to = (aabb.max - DVec3::splat(UPPER_EPSILON)).floor().as_ivec3();

    for y in from.y..=to.y {
        for z in from.z..=to.z {
            for x in from.x..=to.x {
                if !world.block_at(x, y, z).is_air() {
                    return true;
                }
            }
        }
    }
    false
}

/// Dimensions of a collidable body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyShape {
    /// Footprint edge length on X and Z.
    pub width: f64,
    /// Height above the feet.
    pub height: f64,
}

/// A moving body: feet position, velocity, and grounded state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    /// Center of the feet.
    pub position: DVec3,
    /// Velocity in blocks per second.
    pub velocity: DVec3,
    /// Set when the last downward sweep was stopped by a block.
    pub on_ground: bool,
}

impl Body {
    /// A body at rest at `position`.
    pub fn at(position: DVec3) -> Self {
        Self {
            position,
            velocity: DVec3::ZERO,
            on_ground: false,
        }
    }

    /// Current bounding box for `shape`.
    pub fn aabb(&self, shape: BodyShape) -> Aabb {
        Aabb::from_feet(self.position, shape)
    }
}

/// World axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// Moves `body` by `delta` along one axis.
///
/// Returns `true` if the motion was blocked. A blocked axis has its velocity
/// component zeroed; a blocked downward Y move also sets `on_ground`.
pub fn move_axis<W>(body: &mut Body, shape: BodyShape, world: &W, axis: Axis, delta: f64) -> bool
where
    W: BlockAccess + ?Sized,
{
    if delta == 0.0 || !delta.is_finite() {
        return false;
    }

    let steps = ((delta.abs() / SWEEP_STEP).ceil() as u32).max(1);
    let step = delta / steps as f64;
    let i = axis.index();

    for _ in 0..steps {
        let prev = body.position[i];
        body.position[i] += step;

        if !has_solid_block_in_aabb(world, &body.aabb(shape)) {
            continue;
        }

        body.position[i] = prev;
        body.velocity[i] = 0.0;
        if axis == Axis::Y && step < 0.0 {
            body.on_ground = true;
        }
        return true;
    }
    false
}

/// Applies a frame's displacement: X, then Z, then Y with the grounded flag
/// cleared before the vertical sweep.
pub fn resolve_motion<W>(body: &mut Body, shape: BodyShape, world: &W, delta: DVec3)
where
    W: BlockAccess + ?Sized,
{
    move_axis(body, shape, world, Axis::X, delta.x);
    move_axis(body, shape, world, Axis::Z, delta.z);
    body.on_ground = false;
    move_axis(body, shape, world, Axis::Y, delta.y);
}
