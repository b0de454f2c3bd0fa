//! First-person walking controller built on the swept-box resolver.

use glam::DVec3;

use crate::collision::{Body, BodyShape, resolve_motion};
use crate::raycast::BlockAccess;

/// Input below this magnitude counts as "no movement input".
const IDLE_INPUT: f64 = 0.001;

/// Movement constants for the player body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerTuning {
    pub width: f64,
    pub height: f64,
    pub eye_height: f64,
    pub walk_speed: f64,
    pub run_speed: f64,
    pub jump_velocity: f64,
    pub gravity: f64,
    pub max_fall_speed: f64,
    /// Deceleration applied on the ground when there is no input.
    pub ground_drag: f64,
    pub ground_acceleration: f64,
    pub air_acceleration: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 0.6,
            height: 1.8,
            eye_height: 1.62,
            walk_speed: 4.4,
            run_speed: 7.1,
            jump_velocity: 5.9,
            gravity: 18.0,
            max_fall_speed: 32.0,
            ground_drag: 12.0,
            ground_acceleration: 32.0,
            air_acceleration: 14.0,
        }
    }
}

impl PlayerTuning {
    /// Collision shape of the player.
    pub fn shape(&self) -> BodyShape {
        BodyShape {
            width: self.width,
            height: self.height,
        }
    }
}

/// Per-frame movement intent.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerControls {
    /// Strafe input, right positive.
    pub move_x: f64,
    /// Longitudinal input, backward positive (forward is -Z at zero yaw).
    pub move_z: f64,
    /// Camera yaw in radians.
    pub yaw: f64,
    pub sprint: bool,
    pub jump_pressed: bool,
}

/// What happened during one physics step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MoveEvents {
    pub jumped: bool,
    /// Horizontal distance actually traveled.
    pub moved_distance: f64,
}

/// Advances the player by `dt` seconds.
pub fn update_player_physics<W>(
    body: &mut Body,
    controls: &PlayerControls,
    tuning: &PlayerTuning,
    world: &W,
    dt: f64,
) -> MoveEvents
where
    W: BlockAccess + ?Sized,
{
    let mut events = MoveEvents::default();

    let input_len = controls.move_x.hypot(controls.move_z);
    let (mut move_x, mut move_z) = (controls.move_x, controls.move_z);
    if input_len > 1e-6 {
        move_x /= input_len;
        move_z /= input_len;
    }

    // Input is relative to the camera yaw.
    let (sin, cos) = controls.yaw.sin_cos();
    let world_x = move_x * cos + move_z * sin;
    let world_z = -move_x * sin + move_z * cos;

    let speed = if controls.sprint {
        tuning.run_speed
    } else {
        tuning.walk_speed
    };
    let accel = if body.on_ground {
        tuning.ground_acceleration
    } else {
        tuning.air_acceleration
    };
    body.velocity.x = approach(body.velocity.x, world_x * speed, accel * dt);
    body.velocity.z = approach(body.velocity.z, world_z * speed, accel * dt);

    if input_len < IDLE_INPUT && body.on_ground {
        body.velocity.x = approach(body.velocity.x, 0.0, tuning.ground_drag * dt);
        body.velocity.z = approach(body.velocity.z, 0.0, tuning.ground_drag * dt);
    }

    if controls.jump_pressed && body.on_ground {
        body.velocity.y = tuning.jump_velocity;
        body.on_ground = false;
        events.jumped = true;
    }

    body.velocity.y = (body.velocity.y - tuning.gravity * dt).max(-tuning.max_fall_speed);

    let start = body.position;
    resolve_motion(body, tuning.shape(), world, body.velocity * dt);
    events.moved_distance = (body.position.x - start.x).hypot(body.position.z - start.z);

    events
}

/// Moves `current` toward `target` by at most `delta` without overshooting.
pub fn approach(current: f64, target: f64, delta: f64) -> f64 {
    if current < target {
        (current + delta).min(target)
    } else if current > target {
        (current - delta).max(target)
    } else {
        current
    }
}

/// Camera position for a body with the given tuning.
pub fn eye_position(body: &Body, tuning: &PlayerTuning) -> DVec3 {
    body.position + DVec3::new(0.0, tuning.eye_height, 0.0)
}

/// Unit view direction for a camera yaw and pitch, in radians.
///
/// Zero yaw and pitch look down -Z; positive pitch looks up.
pub fn look_direction(yaw: f64, pitch: f64) -> DVec3 {
    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let (sin_pitch, cos_pitch) = pitch.sin_cos();
    DVec3::new(-sin_yaw * cos_pitch, sin_pitch, -cos_yaw * cos_pitch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockworld_voxel::BlockId;

    const DT: f64 = 1.0 / 60.0;

    fn flat(_: i32, y: i32, _: i32) -> BlockId {
        if y < 10 { BlockId::GRASS } else { BlockId::AIR }
    }

    fn grounded_body() -> Body {
        let mut body = Body::at(DVec3::new(0.5, 10.0, 0.5));
        body.on_ground = true;
        body
    }

    #[test]
    fn test_approach_does_not_overshoot() {
        assert_eq!(approach(0.0, 1.0, 0.3), 0.3);
        assert_eq!(approach(0.9, 1.0, 0.3), 1.0);
        assert_eq!(approach(-0.1, -1.0, 2.0), -1.0);
        assert_eq!(approach(0.5, 0.5, 1.0), 0.5);
    }

    #[test]
    fn test_idle_on_ground_stays_put() {
        let tuning = PlayerTuning::default();
        let mut body = grounded_body();
        for _ in 0..120 {
            update_player_physics(&mut body, &PlayerControls::default(), &tuning, &flat, DT);
        }
        assert!(body.on_ground);
        assert!((body.position.y - 10.0).abs() < 1e-9);
        assert_eq!(body.velocity, DVec3::ZERO);
    }

    #[test]
    fn test_falls_and_lands() {
        let tuning = PlayerTuning::default();
        let mut body = Body::at(DVec3::new(0.5, 20.0, 0.5));
        for _ in 0..180 {
            update_player_physics(&mut body, &PlayerControls::default(), &tuning, &flat, DT);
        }
        assert!(body.on_ground);
        // A reverted sub-step can leave the feet up to one sub-step above the floor.
        let gap = body.position.y - 10.0;
        assert!((0.0..0.25).contains(&gap), "gap {gap}");
    }

    #[test]
    fn test_fall_speed_is_clamped() {
        let tuning = PlayerTuning::default();
        let air = |_: i32, _: i32, _: i32| BlockId::AIR;
        let mut body = Body::at(DVec3::new(0.0, 10_000.0, 0.0));
        for _ in 0..600 {
            update_player_physics(&mut body, &PlayerControls::default(), &tuning, &air, DT);
        }
        assert_eq!(body.velocity.y, -tuning.max_fall_speed);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let tuning = PlayerTuning::default();
        let controls = PlayerControls {
            jump_pressed: true,
            ..Default::default()
        };
        let mut body = grounded_body();
        let events = update_player_physics(&mut body, &controls, &tuning, &flat, DT);
        assert!(events.jumped);
        assert!(body.position.y > 10.0);
        assert!(!body.on_ground);

        let events = update_player_physics(&mut body, &controls, &tuning, &flat, DT);
        assert!(!events.jumped);
    }

    #[test]
    fn test_walk_reaches_walk_speed_along_yaw() {
        let tuning = PlayerTuning::default();
        let controls = PlayerControls {
            move_z: 1.0,
            yaw: std::f64::consts::FRAC_PI_2,
            ..Default::default()
        };
        let mut body = grounded_body();
        let mut traveled = 0.0;
        for _ in 0..60 {
            let events = update_player_physics(&mut body, &controls, &tuning, &flat, DT);
            traveled += events.moved_distance;
        }
        assert!((body.velocity.x - tuning.walk_speed).abs() < 1e-9);
        assert!(body.velocity.z.abs() < 1e-9);
        assert!(traveled > 3.0);
        assert!(body.position.x > 3.5);
    }

    #[test]
    fn test_sprint_uses_run_speed_and_diagonal_is_normalized() {
        let tuning = PlayerTuning::default();
        let controls = PlayerControls {
            move_x: 1.0,
            move_z: 1.0,
            sprint: true,
            ..Default::default()
        };
        let mut body = grounded_body();
        for _ in 0..60 {
            update_player_physics(&mut body, &controls, &tuning, &flat, DT);
        }
        let horizontal = body.velocity.x.hypot(body.velocity.z);
        assert!((horizontal - tuning.run_speed).abs() < 1e-6);
    }

    #[test]
    fn test_eye_position() {
        let tuning = PlayerTuning::default();
        let body = Body::at(DVec3::new(1.0, 2.0, 3.0));
        let eye = eye_position(&body, &tuning);
        assert!((eye - DVec3::new(1.0, 3.62, 3.0)).length() < 1e-12);
    }

    #[test]
    fn test_look_direction() {
        let ahead = look_direction(0.0, 0.0);
        assert!((ahead - DVec3::new(0.0, 0.0, -1.0)).length() < 1e-12);

        let left = look_direction(std::f64::consts::FRAC_PI_2, 0.0);
        assert!((left - DVec3::new(-1.0, 0.0, 0.0)).length() < 1e-12);

        let up = look_direction(0.3, std::f64::consts::FRAC_PI_2);
        assert!((up.y - 1.0).abs() < 1e-12);
        assert!((look_direction(1.0, -0.4).length() - 1.0).abs() < 1e-12);
    }
}
