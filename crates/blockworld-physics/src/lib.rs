//! Block-field queries for gameplay: voxel raycasts, swept-box collision, and
//! the walking player controller.

pub mod collision;
pub mod player;
pub mod raycast;

pub use collision::{
    Aabb, Axis, Body, BodyShape, has_solid_block_in_aabb, move_axis, resolve_motion,
};
pub use player::{
    MoveEvents, PlayerControls, PlayerTuning, approach, eye_position, look_direction,
    update_player_physics,
};
pub use raycast::{BlockAccess, DEFAULT_MAX_DISTANCE, RaycastHit, raycast_block};
