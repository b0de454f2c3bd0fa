//! A playable world: the chunk manager plus the player, hotbar, block
//! interaction, respawn, and world metadata persistence.

use std::sync::Arc;
use std::time::{Duration, Instant};

use blockworld_config::{Config, PlayerConfig, WorldConfig};
use blockworld_physics::{
    Aabb, Body, PlayerControls, PlayerTuning, eye_position, look_direction, raycast_block,
    update_player_physics,
};
use blockworld_storage::records::DEFAULT_VOLUME;
use blockworld_storage::{ChunkStore, META_VERSION, PlayerPose, WorldMeta};
use blockworld_terrain::{TerrainGenerator, TerrainParams, TreeConfig};
use blockworld_voxel::BlockId;
use glam::{DVec3, IVec3};

use crate::chunk_manager::{ChunkManager, ChunkManagerConfig, StreamStats};
use crate::debounce::Debounce;
use crate::error::WorldError;
use crate::hotbar::Hotbar;

/// Longest step the simulation takes in one frame, in seconds.
pub const MAX_FRAME_DT: f64 = 0.05;

/// Player intent for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameInput {
    /// Movement and yaw.
    pub controls: PlayerControls,
    /// Camera pitch in radians, positive up.
    pub pitch: f64,
    pub break_block: bool,
    pub place_block: bool,
    /// Number key pressed this frame.
    pub digit: Option<u8>,
}

/// What happened during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameReport {
    /// `false` while the chunks around the player are still loading.
    pub physics_ran: bool,
    pub jumped: bool,
    pub moved_distance: f64,
    pub respawned: bool,
    pub broken: Option<IVec3>,
    pub placed: Option<IVec3>,
    pub meshes_built: usize,
}

/// Owns everything needed to run a world.
pub struct WorldSession {
    manager: ChunkManager,
    tuning: PlayerTuning,
    body: Body,
    yaw: f64,
    pitch: f64,
    hotbar: Hotbar,
    seed: i32,
    spawn: DVec3,
    volume: f64,
    interact_distance: f64,
    respawn_floor_y: f64,
    mesh_rebuilds_per_frame: usize,
    meta_debounce: Debounce,
}

impl WorldSession {
    /// Opens the world saved in `store`, or creates a new one from `config`.
    ///
    /// Unreadable metadata is treated as absent. A saved world keeps its seed.
    pub fn open(config: &Config, store: ChunkStore) -> Result<Self, WorldError> {
        let meta = match store.load_world_meta() {
            Ok(meta) => meta,
            Err(err) => {
                tracing::warn!("Ignoring unreadable world metadata: {}", err);
                None
            }
        };

        let seed = meta.as_ref().map_or(config.world.seed, |meta| meta.seed);
        let generator = Arc::new(TerrainGenerator::new(seed, terrain_params(&config.world)));
        let spawn = DVec3::new(0.0, f64::from(generator.terrain_height(0, 0) + 2), 0.0);
        let pose = match &meta {
            Some(meta) => meta.resume_pose(spawn.to_array()),
            None => PlayerPose::at(spawn.to_array()),
        };

        let manager = ChunkManager::new(
            ChunkManagerConfig::from_streaming(&config.streaming),
            store,
            generator,
        )?;

        let mut session = Self {
            manager,
            tuning: player_tuning(&config.player),
            body: Body::at(DVec3::from_array(pose.position())),
            yaw: pose.yaw,
            pitch: pose.pitch,
            hotbar: Hotbar::new(meta.as_ref().map_or(0, |meta| meta.selected_slot)),
            seed,
            spawn,
            volume: meta.as_ref().map_or(DEFAULT_VOLUME, |meta| meta.volume),
            interact_distance: config.player.interact_distance,
            respawn_floor_y: config.player.respawn_floor_y,
            mesh_rebuilds_per_frame: config.streaming.mesh_rebuilds_per_frame as usize,
            meta_debounce: Debounce::new(Duration::from_millis(
                config.streaming.meta_save_debounce_ms,
            )),
        };
        session.manager.ensure_around(session.body.position);

        if meta.is_none() {
            session.manager.save_world_meta(session.build_meta())?;
        }
        tracing::info!(
            "World opened (seed {}, {}) at {:?}",
            seed,
            if meta.is_some() { "resumed" } else { "new" },
            session.body.position
        );
        Ok(session)
    }

    /// Advances one frame of `dt` seconds (clamped to [`MAX_FRAME_DT`]).
    pub fn tick(&mut self, input: &FrameInput, dt: f64, now: Instant) -> FrameReport {
        let dt = dt.clamp(0.0, MAX_FRAME_DT);
        let mut report = FrameReport::default();

        self.yaw = input.controls.yaw;
        self.pitch = input.pitch;
        self.manager.ensure_around(self.body.position);
        self.manager.tick(now);

        if let Some(digit) = input.digit
            && self.hotbar.select_digit(digit)
        {
            self.meta_debounce.schedule(now);
        }

        let position = self.body.position;
        if self.manager.is_neighborhood_ready(position.x, position.z) {
            let events = update_player_physics(
                &mut self.body,
                &input.controls,
                &self.tuning,
                &self.manager,
                dt,
            );
            report.physics_ran = true;
            report.jumped = events.jumped;
            report.moved_distance = events.moved_distance;

            if self.body.position.y < self.respawn_floor_y {
                self.respawn(now);
                report.respawned = true;
            }
        }

        if input.break_block {
            report.broken = self.break_block(now);
        }
        if input.place_block {
            report.placed = self.place_block(now);
        }

        report.meshes_built = self.manager.rebuild_dirty_meshes(self.mesh_rebuilds_per_frame);

        if self.meta_debounce.fire_if_due(now) {
            self.submit_meta();
        }
        report
    }

    /// Removes the block under the crosshair. Returns its position.
    pub fn break_block(&mut self, now: Instant) -> Option<IVec3> {
        let hit = raycast_block(
            self.eye_position(),
            self.look_direction(),
            &self.manager,
            self.interact_distance,
        )?;
        let target = hit.block;
        if !self.manager.set_block(target.x, target.y, target.z, BlockId::AIR) {
            return None;
        }
        self.meta_debounce.schedule(now);
        tracing::trace!("Broke {} at {}", hit.block_id, target);
        Some(target)
    }

    /// Places the selected block against the face under the crosshair.
    /// Returns the position of the new block.
    pub fn place_block(&mut self, now: Instant) -> Option<IVec3> {
        let block = self.hotbar.selected_block();
        if block.is_air() {
            return None;
        }
        let hit = raycast_block(
            self.eye_position(),
            self.look_direction(),
            &self.manager,
            self.interact_distance,
        )?;
        let target = hit.adjacent();
        if !self.can_place_block(target) {
            return None;
        }
        if !self.manager.set_block(target.x, target.y, target.z, block) {
            return None;
        }
        self.meta_debounce.schedule(now);
        tracing::trace!("Placed {} at {}", block, target);
        Some(target)
    }

    /// `true` if `target` is air and a block there would not overlap the player.
    pub fn can_place_block(&self, target: IVec3) -> bool {
        self.manager.get_block(target.x, target.y, target.z).is_air()
            && !Aabb::block(target.x, target.y, target.z)
                .intersects(&self.body.aabb(self.tuning.shape()))
    }

    /// Selects hotbar slot `index` (clamped).
    pub fn select_slot(&mut self, index: usize, now: Instant) {
        if self.hotbar.select(index) {
            self.meta_debounce.schedule(now);
        }
    }

    fn respawn(&mut self, now: Instant) {
        tracing::debug!("Player fell out of the world at {:?}; respawning", self.body.position);
        self.body = Body::at(self.spawn);
        self.meta_debounce.schedule(now);
    }

    /// Writes all modified chunks and the world metadata now.
    pub fn save_now(&mut self) -> Result<(), WorldError> {
        self.meta_debounce.cancel();
        self.manager.flush_dirty_chunks();
        self.manager.save_world_meta(self.build_meta())
    }

    /// Saves, then tears the world down, waiting for every queued write.
    pub fn shutdown(mut self) -> Result<StreamStats, WorldError> {
        let saved = self.save_now();
        self.manager.destroy();
        saved?;
        Ok(self.manager.stats())
    }

    fn submit_meta(&mut self) {
        if let Err(err) = self.manager.save_world_meta(self.build_meta()) {
            tracing::warn!("Could not save world metadata: {}", err);
        }
    }

    /// Metadata record describing the current state.
    pub fn build_meta(&self) -> WorldMeta {
        let position = self.body.position;
        WorldMeta {
            version: META_VERSION,
            seed: self.seed,
            player: PlayerPose {
                x: position.x,
                y: position.y,
                z: position.z,
                yaw: self.yaw,
                pitch: self.pitch,
            },
            selected_slot: self.hotbar.selected_index(),
            volume: self.volume,
        }
    }

    // --- Accessors ---

    pub fn manager(&self) -> &ChunkManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut ChunkManager {
        &mut self.manager
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Moves the player's feet to `position` and stops it.
    pub fn teleport(&mut self, position: DVec3) {
        self.body = Body::at(position);
    }

    pub fn hotbar(&self) -> &Hotbar {
        &self.hotbar
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn spawn_point(&self) -> DVec3 {
        self.spawn
    }

    pub fn yaw(&self) -> f64 {
        self.yaw
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn eye_position(&self) -> DVec3 {
        eye_position(&self.body, &self.tuning)
    }

    pub fn look_direction(&self) -> DVec3 {
        look_direction(self.yaw, self.pitch)
    }

    pub fn is_meta_save_pending(&self) -> bool {
        self.meta_debounce.is_pending()
    }
}

fn terrain_params(world: &WorldConfig) -> TerrainParams {
    TerrainParams {
        sea_level: world.sea_level,
        trees: TreeConfig {
            chance: world.tree_chance,
            ..TreeConfig::default()
        },
        ..TerrainParams::default()
    }
}

fn player_tuning(player: &PlayerConfig) -> PlayerTuning {
    PlayerTuning {
        width: player.width,
        height: player.height,
        eye_height: player.eye_height,
        walk_speed: player.walk_speed,
        run_speed: player.run_speed,
        jump_velocity: player.jump_velocity,
        gravity: player.gravity,
        max_fall_speed: player.max_fall_speed,
        ground_drag: player.ground_drag,
        ground_acceleration: player.ground_acceleration,
        air_acceleration: player.air_acceleration,
    }
}
