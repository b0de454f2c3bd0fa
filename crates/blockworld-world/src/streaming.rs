//! Background chunk loading and persistence writes on a worker pool.
//!
//! The simulation thread submits [`PersistTask`]s and drains
//! [`PersistEvent`]s once per frame. Workers never touch resident chunks:
//! loads hand back a fresh [`Chunk`] and saves receive a shared snapshot of
//! the blocks.
//!
//! Every worker has its own FIFO lane, and all tasks for one chunk coordinate
//! go to the same lane. Saves of a chunk therefore land in submission order,
//! and a load submitted after a save reads what that save wrote. Metadata
//! writes share lane 0.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use blockworld_storage::{ChunkStore, StorageError, WorldMeta};
use blockworld_terrain::TerrainGenerator;
use blockworld_voxel::{BlockId, Chunk, ChunkCoord};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

use crate::error::WorldError;

/// Work for the persistence pool.
#[derive(Debug)]
pub enum PersistTask {
    /// Read the chunk from the store, generating it when nothing is saved.
    Load(ChunkCoord),
    /// Write a snapshot of a chunk's blocks.
    SaveChunk {
        coord: ChunkCoord,
        blocks: Arc<[BlockId]>,
    },
    /// Overwrite the world metadata record.
    SaveMeta(WorldMeta),
}

impl PersistTask {
    /// Chunk the task reads or writes, if any.
    pub fn coord(&self) -> Option<ChunkCoord> {
        match self {
            PersistTask::Load(coord) | PersistTask::SaveChunk { coord, .. } => Some(*coord),
            PersistTask::SaveMeta(_) => None,
        }
    }
}

/// Where a loaded chunk came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadSource {
    Persisted,
    Generated,
}

/// A finished task.
#[derive(Debug)]
pub enum PersistEvent {
    Loaded {
        coord: ChunkCoord,
        chunk: Chunk,
        source: LoadSource,
        /// Time spent in the worker, in microseconds.
        elapsed_us: u64,
    },
    ChunkSaved {
        coord: ChunkCoord,
        result: Result<(), StorageError>,
    },
    MetaSaved(Result<(), StorageError>),
}

/// Worker pool that runs [`PersistTask`]s against a [`ChunkStore`].
pub struct ChunkStreamer {
    /// One sender per worker. Empty once the pool has been shut down.
    lanes: Vec<Sender<PersistTask>>,
    result_receiver: Receiver<PersistEvent>,
    /// Tasks submitted whose event has not been sent yet.
    in_flight: Arc<AtomicU64>,
    workers: Vec<JoinHandle<()>>,
}

impl ChunkStreamer {
    /// Starts `thread_count` workers (at least one).
    pub fn new(
        store: ChunkStore,
        generator: Arc<TerrainGenerator>,
        thread_count: usize,
    ) -> Result<Self, WorldError> {
        let (result_sender, result_receiver) = unbounded::<PersistEvent>();
        let in_flight = Arc::new(AtomicU64::new(0));

        let thread_count = thread_count.max(1);
        let mut lanes = Vec::with_capacity(thread_count);
        let mut workers = Vec::with_capacity(thread_count);
        for index in 0..thread_count {
            let (task_sender, receiver) = unbounded::<PersistTask>();
            let sender = result_sender.clone();
            let in_flight = Arc::clone(&in_flight);
            let store = store.clone();
            let generator = Arc::clone(&generator);

            let handle = std::thread::Builder::new()
                .name(format!("chunk-io-{index}"))
                .spawn(move || {
                    while let Ok(task) = receiver.recv() {
                        let event = run_task(&store, &generator, task);
                        let _ = sender.send(event);
                        in_flight.fetch_sub(1, Ordering::AcqRel);
                    }
                    tracing::trace!("persistence worker exiting");
                })
                .map_err(WorldError::Spawn)?;
            lanes.push(task_sender);
            workers.push(handle);
        }

        tracing::debug!("Chunk streamer started with {} workers", thread_count);
        Ok(Self {
            lanes,
            result_receiver,
            in_flight,
            workers,
        })
    }

    /// Queues a task on the lane that owns its chunk coordinate.
    ///
    /// # Errors
    ///
    /// [`WorldError::ShutDown`] after [`shutdown`](Self::shutdown).
    pub fn submit(&self, task: PersistTask) -> Result<(), WorldError> {
        let lane = match task.coord() {
            Some(coord) => lane_for(coord, self.lanes.len()),
            None => 0,
        };
        let sender = self.lanes.get(lane).ok_or(WorldError::ShutDown)?;
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        sender.send(task).map_err(|_| {
            self.in_flight.fetch_sub(1, Ordering::AcqRel);
            WorldError::ShutDown
        })
    }

    /// Takes every finished event without blocking.
    ///
    /// Call this once per frame on the simulation thread.
    pub fn drain(&self) -> Vec<PersistEvent> {
        self.result_receiver.try_iter().collect()
    }

    /// Waits up to `timeout` for the next finished event.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PersistEvent> {
        match self.result_receiver.recv_timeout(timeout) {
            Ok(event) => Some(event),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Tasks queued or executing.
    pub fn in_flight_count(&self) -> u64 {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn is_running(&self) -> bool {
        !self.lanes.is_empty()
    }

    /// Stops accepting tasks, lets the workers finish everything already
    /// queued, joins them, and returns the events nobody drained.
    pub fn shutdown(&mut self) -> Vec<PersistEvent> {
        if self.lanes.is_empty() {
            return Vec::new();
        }
        self.lanes.clear();
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::warn!("persistence worker panicked");
            }
        }
        let events = self.drain();
        tracing::debug!("Chunk streamer stopped ({} undrained events)", events.len());
        events
    }
}

impl Drop for ChunkStreamer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Lane index for `coord` among `lanes` workers.
fn lane_for(coord: ChunkCoord, lanes: usize) -> usize {
    let mixed = (coord.cx as u32).wrapping_mul(0x9E37_79B1)
        ^ (coord.cz as u32).wrapping_mul(0x85EB_CA77);
    (mixed as usize) % lanes.max(1)
}

fn run_task(store: &ChunkStore, generator: &TerrainGenerator, task: PersistTask) -> PersistEvent {
    match task {
        PersistTask::Load(coord) => {
            let start = Instant::now();
            let (chunk, source) = match store.load_chunk(coord) {
                Ok(Some(chunk)) => (chunk, LoadSource::Persisted),
                Ok(None) => (generator.generate_chunk(coord), LoadSource::Generated),
                Err(err) => {
                    tracing::warn!("Failed to load chunk {}, regenerating: {}", coord, err);
                    (generator.generate_chunk(coord), LoadSource::Generated)
                }
            };
            PersistEvent::Loaded {
                coord,
                chunk,
                source,
                elapsed_us: start.elapsed().as_micros() as u64,
            }
        }
        PersistTask::SaveChunk { coord, blocks } => PersistEvent::ChunkSaved {
            coord,
            result: store.save_chunk(coord, &blocks),
        },
        PersistTask::SaveMeta(meta) => PersistEvent::MetaSaved(store.save_world_meta(&meta)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;

    use rustc_hash::FxHashSet;

    use blockworld_storage::{KeyValueStore, MemoryStore};
    use blockworld_voxel::CHUNK_VOLUME;

    /// Memory backend whose next write stalls once `stall_next_put` is set.
    #[derive(Default)]
    struct StallingStore {
        inner: MemoryStore,
        stall_next_put: AtomicBool,
    }

    impl KeyValueStore for StallingStore {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
            if self.stall_next_put.swap(false, Ordering::AcqRel) {
                std::thread::sleep(Duration::from_millis(300));
            }
            self.inner.put(key, value)
        }
    }

    fn streamer(threads: usize) -> (Arc<MemoryStore>, ChunkStreamer) {
        let backend = Arc::new(MemoryStore::new());
        let store = ChunkStore::new(backend.clone());
        let generator = Arc::new(TerrainGenerator::with_seed(5));
        (backend, ChunkStreamer::new(store, generator, threads).unwrap())
    }

    fn collect(streamer: &ChunkStreamer, count: usize) -> Vec<PersistEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while events.len() < count && Instant::now() < deadline {
            events.extend(streamer.recv_timeout(Duration::from_millis(50)));
        }
        events
    }

    #[test]
    fn test_load_generates_missing_chunk() {
        let (_, streamer) = streamer(2);
        let coord = ChunkCoord::new(1, -1);
        streamer.submit(PersistTask::Load(coord)).unwrap();

        let events = collect(&streamer, 1);
        match &events[..] {
            [PersistEvent::Loaded { coord: c, chunk, source, .. }] => {
                assert_eq!(*c, coord);
                assert_eq!(*source, LoadSource::Generated);
                let expected = TerrainGenerator::with_seed(5).generate_chunk(coord);
                assert_eq!(chunk.blocks(), expected.blocks());
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_save_then_load_reads_persisted() {
        let (backend, streamer) = streamer(1);
        let coord = ChunkCoord::new(0, 0);
        let blocks: Arc<[BlockId]> = vec![BlockId::COBBLESTONE; CHUNK_VOLUME].into();
        streamer
            .submit(PersistTask::SaveChunk { coord, blocks })
            .unwrap();
        // A single worker runs tasks in submission order.
        streamer.submit(PersistTask::Load(coord)).unwrap();

        let events = collect(&streamer, 2);
        assert!(matches!(
            events[0],
            PersistEvent::ChunkSaved { result: Ok(()), .. }
        ));
        match &events[1] {
            PersistEvent::Loaded { chunk, source, .. } => {
                assert_eq!(*source, LoadSource::Persisted);
                assert!(chunk.blocks().iter().all(|b| *b == BlockId::COBBLESTONE));
            }
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(backend.contains("0,0"));
    }

    #[test]
    fn test_same_chunk_tasks_run_in_submission_order() {
        let backend = Arc::new(StallingStore::default());
        let store = ChunkStore::new(backend.clone());
        let generator = Arc::new(TerrainGenerator::with_seed(5));
        let streamer = ChunkStreamer::new(store.clone(), generator, 4).unwrap();
        let coord = ChunkCoord::new(3, 3);

        backend.stall_next_put.store(true, Ordering::Release);
        let older: Arc<[BlockId]> = vec![BlockId::COBBLESTONE; CHUNK_VOLUME].into();
        let newer: Arc<[BlockId]> = vec![BlockId::GLASS; CHUNK_VOLUME].into();
        streamer
            .submit(PersistTask::SaveChunk { coord, blocks: older })
            .unwrap();
        streamer
            .submit(PersistTask::SaveChunk { coord, blocks: newer })
            .unwrap();
        streamer.submit(PersistTask::Load(coord)).unwrap();

        let events = collect(&streamer, 3);
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], PersistEvent::ChunkSaved { result: Ok(()), .. }));
        assert!(matches!(events[1], PersistEvent::ChunkSaved { result: Ok(()), .. }));
        match &events[2] {
            PersistEvent::Loaded { chunk, source, .. } => {
                assert_eq!(*source, LoadSource::Persisted);
                assert!(chunk.blocks().iter().all(|b| *b == BlockId::GLASS));
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let stored = store.load_chunk(coord).unwrap().unwrap();
        assert!(stored.blocks().iter().all(|b| *b == BlockId::GLASS));
    }

    #[test]
    fn test_lane_is_stable_per_chunk() {
        for cx in -20..20 {
            let coord = ChunkCoord::new(cx, cx * 7 - 3);
            let lane = lane_for(coord, 5);
            assert!(lane < 5);
            assert_eq!(lane, lane_for(coord, 5));
            assert_eq!(lane_for(coord, 1), 0);
        }
        let lanes: FxHashSet<usize> = (0..64).map(|i| lane_for(ChunkCoord::new(i, 0), 4)).collect();
        assert_eq!(lanes.len(), 4);
    }

    #[test]
    fn test_malformed_record_falls_back_to_generation() {
        let (backend, streamer) = streamer(1);
        backend.put("2,2", b"[1,5]").unwrap();
        streamer.submit(PersistTask::Load(ChunkCoord::new(2, 2))).unwrap();
        let events = collect(&streamer, 1);
        assert!(matches!(
            events[0],
            PersistEvent::Loaded {
                source: LoadSource::Generated,
                ..
            }
        ));
    }

    #[test]
    fn test_shutdown_completes_queued_writes() {
        let (backend, mut streamer) = streamer(1);
        for cx in 0..8 {
            streamer
                .submit(PersistTask::SaveChunk {
                    coord: ChunkCoord::new(cx, 0),
                    blocks: vec![BlockId::AIR; CHUNK_VOLUME].into(),
                })
                .unwrap();
        }
        streamer
            .submit(PersistTask::SaveMeta(WorldMeta::new(5)))
            .unwrap();

        let events = streamer.shutdown();
        assert_eq!(events.len(), 9);
        assert_eq!(backend.len(), 9);
        assert_eq!(streamer.in_flight_count(), 0);
        assert!(!streamer.is_running());
        assert!(matches!(
            streamer.submit(PersistTask::Load(ChunkCoord::new(0, 0))),
            Err(WorldError::ShutDown)
        ));
    }
}
