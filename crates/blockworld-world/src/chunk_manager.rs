//! Residency, block access, mesh rebuild scheduling, and persistence for the
//! chunks around an observer.
//!
//! The [`ChunkManager`] is owned by the simulation thread. Loads and writes
//! are delegated to a [`ChunkStreamer`]; their results are applied when the
//! manager drains completions in [`ensure_around`](ChunkManager::ensure_around)
//! and [`tick`](ChunkManager::tick).

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use blockworld_config::StreamingConfig;
use blockworld_mesh::{ChunkGeometry, build_chunk_geometry};
use blockworld_physics::{Aabb, BlockAccess};
use blockworld_storage::{ChunkStore, StorageError, WorldMeta};
use blockworld_terrain::TerrainGenerator;
use blockworld_voxel::{
    BlockId, CHUNK_HEIGHT, CHUNK_SIZE, Chunk, ChunkCoord, MESH_DIRTY, SAVE_DIRTY, block_to_chunk,
    block_to_local,
};
use glam::DVec3;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::debounce::Debounce;
use crate::error::WorldError;
use crate::registry::ChunkRegistry;
use crate::residency::{chunks_in_radius, should_unload};
use crate::streaming::{ChunkStreamer, LoadSource, PersistEvent, PersistTask};

/// Runtime settings for a [`ChunkManager`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkManagerConfig {
    /// Residency radius in chunks.
    pub render_distance: u32,
    /// Quiet period after the last edit before modified chunks are written.
    pub save_flush_delay: Duration,
    /// Persistence worker threads.
    pub loader_threads: usize,
}

impl ChunkManagerConfig {
    pub fn from_streaming(config: &StreamingConfig) -> Self {
        let loader_threads = if config.loader_threads == 0 {
            (num_cpus::get().max(2) - 2).max(1)
        } else {
            config.loader_threads
        };
        Self {
            render_distance: config.render_distance,
            save_flush_delay: Duration::from_millis(config.save_flush_debounce_ms),
            loader_threads,
        }
    }
}

impl Default for ChunkManagerConfig {
    fn default() -> Self {
        Self::from_streaming(&StreamingConfig::default())
    }
}

/// Counters for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub loaded_from_store: u64,
    pub generated: u64,
    /// Load results thrown away because the chunk was resident or out of range.
    pub discarded_loads: u64,
    pub unloaded: u64,
    pub chunks_saved: u64,
    pub save_failures: u64,
    pub meshes_built: u64,
}

/// Latest block snapshot handed to the pool for a chunk whose write has not
/// completed yet.
struct PendingSave {
    blocks: Arc<[BlockId]>,
    outstanding: u32,
}

/// Keeps a radius of chunks resident around the observer.
pub struct ChunkManager {
    config: ChunkManagerConfig,
    registry: ChunkRegistry,
    store: ChunkStore,
    generator: Arc<TerrainGenerator>,
    streamer: ChunkStreamer,
    /// Coordinates with a load in flight.
    pending_loads: FxHashSet<ChunkCoord>,
    /// Coordinates with a save in flight, newest snapshot kept.
    pending_saves: FxHashMap<ChunkCoord, PendingSave>,
    /// Chunks waiting for a mesh rebuild, oldest first.
    dirty_queue: VecDeque<ChunkCoord>,
    queued: FxHashSet<ChunkCoord>,
    center: Option<ChunkCoord>,
    flush_debounce: Debounce,
    stats: StreamStats,
}

impl ChunkManager {
    pub fn new(
        config: ChunkManagerConfig,
        store: ChunkStore,
        generator: Arc<TerrainGenerator>,
    ) -> Result<Self, WorldError> {
        let streamer = ChunkStreamer::new(
            store.clone(),
            Arc::clone(&generator),
            config.loader_threads,
        )?;
        Ok(Self {
            flush_debounce: Debounce::new(config.save_flush_delay),
            config,
            registry: ChunkRegistry::new(),
            store,
            generator,
            streamer,
            pending_loads: FxHashSet::default(),
            pending_saves: FxHashMap::default(),
            dirty_queue: VecDeque::new(),
            queued: FxHashSet::default(),
            center: None,
            stats: StreamStats::default(),
        })
    }

    pub fn config(&self) -> &ChunkManagerConfig {
        &self.config
    }

    pub fn generator(&self) -> &TerrainGenerator {
        &self.generator
    }

    /// Chunk the observer was last seen in.
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    // --- Residency ---

    /// Applies finished loads, then updates residency for an observer at
    /// `position`. Does nothing more when the observer's chunk is unchanged.
    ///
    /// Returns the number of loads requested.
    pub fn ensure_around(&mut self, position: DVec3) -> usize {
        self.drain_completions(Instant::now());

        let center = ChunkCoord::containing(position.x, position.z);
        if self.center == Some(center) {
            return 0;
        }
        self.center = Some(center);

        let mut requested = 0;
        for coord in chunks_in_radius(center, self.config.render_distance) {
            if self.registry.contains(coord) || self.pending_loads.contains(&coord) {
                continue;
            }
            if self.request_load(coord) {
                requested += 1;
            }
        }

        let radius = self.config.render_distance;
        let leaving: Vec<ChunkCoord> = self
            .registry
            .coords()
            .into_iter()
            .filter(|coord| should_unload(*coord, center, radius))
            .collect();
        for coord in &leaving {
            self.unload(*coord);
        }

        tracing::debug!(
            "Observer entered chunk {}: {} loads requested, {} unloaded, {} resident",
            center,
            requested,
            leaving.len(),
            self.registry.len()
        );
        requested
    }

    /// Drains completions and writes modified chunks once the edit debounce
    /// has elapsed.
    pub fn tick(&mut self, now: Instant) {
        self.drain_completions(now);
        if self.flush_debounce.fire_if_due(now) {
            self.flush_dirty_chunks();
        }
    }

    fn request_load(&mut self, coord: ChunkCoord) -> bool {
        match self.streamer.submit(PersistTask::Load(coord)) {
            Ok(()) => {
                self.pending_loads.insert(coord);
                true
            }
            Err(err) => {
                tracing::warn!("Could not request chunk {}: {}", coord, err);
                false
            }
        }
    }

    fn unload(&mut self, coord: ChunkCoord) {
        let Some(entry) = self.registry.remove(coord) else {
            return;
        };
        if self.queued.remove(&coord) {
            self.dirty_queue.retain(|queued| *queued != coord);
        }
        self.stats.unloaded += 1;
        if entry.chunk.is_dirty(SAVE_DIRTY) {
            self.submit_save(coord, Arc::from(entry.chunk.blocks()));
        }
    }

    fn drain_completions(&mut self, now: Instant) {
        for event in self.streamer.drain() {
            self.handle_event(event, now);
        }
    }

    fn handle_event(&mut self, event: PersistEvent, now: Instant) {
        match event {
            PersistEvent::Loaded {
                coord,
                chunk,
                source,
                elapsed_us,
            } => {
                self.pending_loads.remove(&coord);
                let radius = self.config.render_distance;
                let unwanted = self
                    .center
                    .is_some_and(|center| should_unload(coord, center, radius));
                if unwanted || self.registry.contains(coord) {
                    self.stats.discarded_loads += 1;
                    tracing::trace!("Discarding load result for {}", coord);
                    return;
                }
                match source {
                    LoadSource::Persisted => self.stats.loaded_from_store += 1,
                    LoadSource::Generated => self.stats.generated += 1,
                }
                tracing::trace!("Chunk {} ready ({:?}, {}us)", coord, source, elapsed_us);
                self.insert_chunk(chunk);
            }
            PersistEvent::ChunkSaved { coord, result } => {
                self.release_save(coord);
                self.apply_save_result(coord, result, now);
            }
            PersistEvent::MetaSaved(result) => {
                if let Err(err) = result {
                    tracing::warn!("Failed to save world metadata: {}", err);
                }
            }
        }
    }

    fn apply_save_result(
        &mut self,
        coord: ChunkCoord,
        result: Result<(), StorageError>,
        now: Instant,
    ) {
        match result {
            Ok(()) => self.stats.chunks_saved += 1,
            Err(err) => {
                self.stats.save_failures += 1;
                tracing::warn!("Failed to save chunk {}: {}", coord, err);
                if let Some(entry) = self.registry.get_mut(coord) {
                    entry.chunk.mark_dirty(SAVE_DIRTY);
                    self.flush_debounce.schedule(now);
                }
            }
        }
    }

    /// Forgets one outstanding save of `coord`.
    fn release_save(&mut self, coord: ChunkCoord) {
        if let Some(pending) = self.pending_saves.get_mut(&coord) {
            pending.outstanding = pending.outstanding.saturating_sub(1);
            if pending.outstanding == 0 {
                self.pending_saves.remove(&coord);
            }
        }
    }

    /// Makes `chunk` resident and queues it and its resident lateral
    /// neighbors for remeshing.
    fn insert_chunk(&mut self, chunk: Chunk) {
        let coord = chunk.coord();
        self.registry.insert(chunk);
        self.queue_remesh(coord);
        for neighbor in coord.lateral_neighbors() {
            self.queue_remesh(neighbor);
        }
    }

    /// Loads or generates `coord` on the calling thread.
    ///
    /// A chunk with a write still in flight is rebuilt from the newest
    /// snapshot handed to the pool instead of the store.
    fn load_now(&mut self, coord: ChunkCoord) {
        if let Some(pending) = self.pending_saves.get(&coord) {
            match Chunk::from_blocks(coord, pending.blocks.to_vec()) {
                Ok(chunk) => {
                    self.stats.loaded_from_store += 1;
                    tracing::trace!("Chunk {} restored from an unfinished save", coord);
                    self.insert_chunk(chunk);
                    return;
                }
                Err(err) => tracing::warn!("Discarding save snapshot of {}: {}", coord, err),
            }
        }
        let chunk = match self.store.load_chunk(coord) {
            Ok(Some(chunk)) => {
                self.stats.loaded_from_store += 1;
                chunk
            }
            Ok(None) => {
                self.stats.generated += 1;
                self.generator.generate_chunk(coord)
            }
            Err(err) => {
                tracing::warn!("Failed to load chunk {}, regenerating: {}", coord, err);
                self.stats.generated += 1;
                self.generator.generate_chunk(coord)
            }
        };
        self.insert_chunk(chunk);
    }

    fn queue_remesh(&mut self, coord: ChunkCoord) {
        if self.registry.mark_dirty_if_resident(coord) && self.queued.insert(coord) {
            self.dirty_queue.push_back(coord);
        }
    }

    // --- Block access ---

    /// Block at a world coordinate. Air above or below the world and in
    /// chunks that are not resident.
    pub fn get_block(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.registry.block_at(x, y, z)
    }

    /// Writes a block at a world coordinate.
    ///
    /// An absent chunk is loaded (or generated) synchronously first. Returns
    /// `false` when the position is outside the world or the block already
    /// holds `block`.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, block: BlockId) -> bool {
        if !(0..CHUNK_HEIGHT).contains(&y) {
            return false;
        }
        let coord = ChunkCoord::new(block_to_chunk(x), block_to_chunk(z));
        if !coord.is_within_limits() {
            return false;
        }
        if !self.registry.contains(coord) {
            self.load_now(coord);
        }
        let (lx, lz) = (block_to_local(x), block_to_local(z));
        let changed = self
            .registry
            .get_mut(coord)
            .is_some_and(|entry| entry.chunk.set_local(lx, y, lz, block));
        if !changed {
            return false;
        }

        self.queue_remesh(coord);
        if lx == 0 {
            self.queue_remesh(coord.offset(-1, 0));
        } else if lx == CHUNK_SIZE - 1 {
            self.queue_remesh(coord.offset(1, 0));
        }
        if lz == 0 {
            self.queue_remesh(coord.offset(0, -1));
        } else if lz == CHUNK_SIZE - 1 {
            self.queue_remesh(coord.offset(0, 1));
        }
        self.flush_debounce.schedule(Instant::now());
        true
    }

    /// `true` if any block overlapping `aabb` is not air.
    pub fn has_solid_block_in_aabb(&self, aabb: &Aabb) -> bool {
        blockworld_physics::has_solid_block_in_aabb(self, aabb)
    }

    // --- Meshing ---

    /// Rebuilds geometry for up to `limit` queued chunks, oldest first.
    ///
    /// Queue entries for chunks that are gone or already clean are dropped
    /// without counting. Returns the number of chunks rebuilt.
    pub fn rebuild_dirty_meshes(&mut self, limit: usize) -> usize {
        let mut built = 0;
        while built < limit {
            let Some(coord) = self.dirty_queue.pop_front() else {
                break;
            };
            self.queued.remove(&coord);

            let Some(entry) = self.registry.get(coord) else {
                continue;
            };
            if !entry.chunk.is_dirty(MESH_DIRTY) {
                continue;
            }
            let registry = &self.registry;
            let geometry =
                build_chunk_geometry(&entry.chunk, |x, y, z| registry.block_at(x, y, z));

            if let Some(entry) = self.registry.get_mut(coord) {
                entry.geometry_version = entry.chunk.mesh_version();
                entry.geometry = Some(geometry);
                entry.chunk.clear_dirty(MESH_DIRTY);
            }
            built += 1;
        }
        self.stats.meshes_built += built as u64;
        built
    }

    /// Chunks waiting for a rebuild.
    pub fn dirty_mesh_count(&self) -> usize {
        self.dirty_queue.len()
    }

    // --- Persistence ---

    /// Submits a save for every modified resident chunk and clears their
    /// modified flags. Cancels the pending debounced flush.
    ///
    /// Returns the number of saves submitted.
    pub fn flush_dirty_chunks(&mut self) -> usize {
        self.flush_debounce.cancel();
        let mut snapshots = Vec::new();
        for (coord, entry) in self.registry.iter_mut() {
            if entry.chunk.is_dirty(SAVE_DIRTY) {
                entry.chunk.clear_dirty(SAVE_DIRTY);
                snapshots.push((*coord, Arc::from(entry.chunk.blocks())));
            }
        }
        let mut submitted = 0;
        for (coord, blocks) in snapshots {
            if self.submit_save(coord, blocks) {
                submitted += 1;
            } else if let Some(entry) = self.registry.get_mut(coord) {
                entry.chunk.mark_dirty(SAVE_DIRTY);
            }
        }
        if submitted > 0 {
            tracing::debug!("Flushing {} modified chunks", submitted);
        }
        submitted
    }

    fn submit_save(&mut self, coord: ChunkCoord, blocks: Arc<[BlockId]>) -> bool {
        let task = PersistTask::SaveChunk {
            coord,
            blocks: Arc::clone(&blocks),
        };
        match self.streamer.submit(task) {
            Ok(()) => {
                let pending = self.pending_saves.entry(coord).or_insert(PendingSave {
                    blocks: Arc::clone(&blocks),
                    outstanding: 0,
                });
                pending.blocks = blocks;
                pending.outstanding += 1;
                true
            }
            Err(err) => {
                self.stats.save_failures += 1;
                tracing::warn!("Could not save chunk {}: {}", coord, err);
                false
            }
        }
    }

    /// Queues a write of the world metadata record.
    pub fn save_world_meta(&self, meta: WorldMeta) -> Result<(), WorldError> {
        self.streamer.submit(PersistTask::SaveMeta(meta))
    }

    /// `true` while a debounced flush is waiting.
    pub fn is_flush_pending(&self) -> bool {
        self.flush_debounce.is_pending()
    }

    // --- Queries ---

    pub fn loaded_chunk_count(&self) -> usize {
        self.registry.len()
    }

    pub fn pending_load_count(&self) -> usize {
        self.pending_loads.len()
    }

    /// Chunks with a write that has not completed.
    pub fn pending_save_count(&self) -> usize {
        self.pending_saves.len()
    }

    /// Persistence tasks queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.streamer.in_flight_count()
    }

    /// Chunk containing the world position `(x, z)`.
    pub fn chunk_coord_at(&self, x: f64, z: f64) -> ChunkCoord {
        ChunkCoord::containing(x, z)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.registry.get(coord).map(|entry| &entry.chunk)
    }

    /// Geometry from the chunk's last rebuild.
    pub fn geometry(&self, coord: ChunkCoord) -> Option<&ChunkGeometry> {
        self.registry.get(coord).and_then(|entry| entry.geometry.as_ref())
    }

    pub fn resident_coords(&self) -> Vec<ChunkCoord> {
        self.registry.coords()
    }

    /// `true` when the chunk containing `(x, z)` and all eight around it are
    /// resident.
    pub fn is_neighborhood_ready(&self, x: f64, z: f64) -> bool {
        let center = ChunkCoord::containing(x, z);
        (-1..=1).all(|dz| (-1..=1).all(|dx| self.registry.contains(center.offset(dx, dz))))
    }

    /// Blocks until every requested load has been applied or `timeout`
    /// elapses. Returns `true` if nothing is left pending.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            self.drain_completions(Instant::now());
            if self.pending_loads.is_empty() {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if let Some(event) = self.streamer.recv_timeout(deadline - now) {
                self.handle_event(event, Instant::now());
            }
        }
    }

    /// Blocks until the worker pool has no queued or running tasks and their
    /// results are applied, or `timeout` elapses.
    pub fn wait_for_idle(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let idle = self.streamer.in_flight_count() == 0;
            self.drain_completions(Instant::now());
            if idle {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            if let Some(event) = self.streamer.recv_timeout((deadline - now).min(POLL_INTERVAL)) {
                self.handle_event(event, Instant::now());
            }
        }
    }

    /// Cancels the flush timer, drops every chunk and its geometry, and
    /// joins the worker pool after it finishes the queued writes.
    ///
    /// Modified chunks that were never flushed are not written.
    pub fn destroy(&mut self) {
        self.flush_debounce.cancel();
        self.registry.clear();
        self.dirty_queue.clear();
        self.queued.clear();
        self.pending_loads.clear();
        self.center = None;

        let undrained = self.streamer.shutdown();
        self.pending_saves.clear();
        for event in undrained {
            match event {
                PersistEvent::ChunkSaved { result: Ok(()), .. } => self.stats.chunks_saved += 1,
                PersistEvent::ChunkSaved {
                    coord,
                    result: Err(err),
                } => {
                    self.stats.save_failures += 1;
                    tracing::warn!("Failed to save chunk {} during shutdown: {}", coord, err);
                }
                PersistEvent::MetaSaved(Err(err)) => {
                    tracing::warn!("Failed to save world metadata during shutdown: {}", err);
                }
                PersistEvent::MetaSaved(Ok(())) | PersistEvent::Loaded { .. } => {}
            }
        }
        tracing::debug!("Chunk manager destroyed: {:?}", self.stats);
    }
}

const POLL_INTERVAL: Duration = Duration::from_millis(20);

impl BlockAccess for ChunkManager {
    fn block_at(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.get_block(x, y, z)
    }
}
