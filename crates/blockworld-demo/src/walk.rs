//! Scripted fixed-step walk that exercises movement, streaming, and block
//! editing without a window.

use std::f64::consts::FRAC_PI_2;
use std::time::{Duration, Instant};

use blockworld_physics::PlayerControls;
use blockworld_world::{FrameInput, WorldSession};

/// Simulation step, in seconds.
pub const STEP: f64 = 1.0 / 60.0;

const LOAD_WAIT: Duration = Duration::from_secs(10);

/// Totals gathered over a walk.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct WalkSummary {
    pub ticks: u64,
    /// Ticks spent waiting for chunks around the player.
    pub stalled_ticks: u64,
    pub distance: f64,
    pub jumps: u32,
    pub respawns: u32,
    pub blocks_broken: u32,
    pub blocks_placed: u32,
    pub meshes_built: u64,
}

/// Input for tick `tick` of the script.
///
/// Walks forward while slowly turning, sprints in bursts, jumps now and
/// then, digs in front of its feet every two seconds and builds a second
/// later, and cycles the hotbar.
pub fn scripted_input(tick: u64) -> FrameInput {
    let seconds = tick as f64 * STEP;
    let mut input = FrameInput {
        controls: PlayerControls {
            move_x: 0.0,
            move_z: -1.0,
            yaw: seconds * 0.15,
            sprint: (tick / 180) % 2 == 1,
            jump_pressed: tick % 90 == 45,
        },
        ..FrameInput::default()
    };
    match tick % 120 {
        0 => {
            input.pitch = -FRAC_PI_2 * 0.6;
            input.break_block = true;
        }
        60 => {
            input.pitch = -FRAC_PI_2 * 0.6;
            input.place_block = true;
        }
        _ => {}
    }
    if tick % 240 == 30 {
        input.digit = Some(((tick / 240) % 9 + 1) as u8);
    }
    input
}

/// Runs `ticks` steps of the script on `session` with a simulated clock.
pub fn run_walk(session: &mut WorldSession, ticks: u64) -> WalkSummary {
    let start = Instant::now();
    let mut summary = WalkSummary::default();

    for tick in 0..ticks {
        let now = start + Duration::from_secs_f64(tick as f64 * STEP);
        let report = session.tick(&scripted_input(tick), STEP, now);

        summary.ticks += 1;
        summary.distance += report.moved_distance;
        summary.jumps += u32::from(report.jumped);
        summary.respawns += u32::from(report.respawned);
        summary.blocks_broken += u32::from(report.broken.is_some());
        summary.blocks_placed += u32::from(report.placed.is_some());
        summary.meshes_built += report.meshes_built as u64;

        if !report.physics_ran {
            summary.stalled_ticks += 1;
            if !session.manager_mut().wait_for_loads(LOAD_WAIT) {
                tracing::warn!("Chunks around the player are still loading");
            }
        }
        if tick % 600 == 0 {
            let position = session.body().position;
            tracing::info!(
                "tick {}: at ({:.1}, {:.1}, {:.1}), {} chunks resident",
                tick,
                position.x,
                position.y,
                position.z,
                session.manager().loaded_chunk_count()
            );
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use blockworld_config::Config;
    use blockworld_storage::{ChunkStore, MemoryStore};

    #[test]
    fn test_script_shape() {
        assert!(scripted_input(0).break_block);
        assert!(scripted_input(60).place_block);
        assert!(scripted_input(45).controls.jump_pressed);
        assert_eq!(scripted_input(30).digit, Some(1));
        assert_eq!(scripted_input(270).digit, Some(2));
        assert!(!scripted_input(1).controls.sprint);
        assert!(scripted_input(200).controls.sprint);
    }

    #[test]
    fn test_walk_moves_and_edits() {
        let mut config = Config::default();
        config.streaming.render_distance = 2;
        config.streaming.loader_threads = 2;
        let store = ChunkStore::new(Arc::new(MemoryStore::new()));
        let mut session = WorldSession::open(&config, store).unwrap();

        let summary = run_walk(&mut session, 600);
        assert_eq!(summary.ticks, 600);
        assert!(summary.distance > 1.0);
        assert!(summary.meshes_built > 0);
        session.shutdown().unwrap();
    }
}
