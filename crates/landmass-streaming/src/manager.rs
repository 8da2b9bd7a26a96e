//! Chunk streaming around a moving viewer.
//!
//! [`ChunkManager`] owns every tracked chunk, keyed by [`ChunkCoord`]. Each
//! [`tick`](ChunkManager::tick) it applies finished jobs, scans a square window
//! of chunks around the viewer, requests whatever is missing and toggles
//! visibility through the [`RenderSink`]. Chunk state is only touched on the
//! thread that calls `tick`.

use std::sync::Arc;

use glam::DVec2;
use landmass_config::Config;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::chunk::{HeightState, MeshState, TerrainChunk};
use crate::coords::ChunkCoord;
use crate::settings::{GeneratorSettings, SettingsError};
use crate::sink::{RenderSink, TextureSource};
use crate::worker::{GenerationWorkers, Job, JobOutput, JobRequest, JobResult};

/// Errors starting or reconfiguring streaming.
#[derive(Debug, thiserror::Error)]
pub enum StreamingError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error("failed to spawn generation worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Snapshot of the streaming state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    /// Chunks currently tracked.
    pub tracked: usize,
    /// Chunks currently shown.
    pub visible: usize,
    pub pending_heights: usize,
    pub pending_meshes: usize,
    /// Height jobs submitted since the manager started.
    pub heights_requested: u64,
    /// Mesh jobs submitted since the manager started.
    pub meshes_requested: u64,
    /// Height results applied.
    pub heights_generated: u64,
    /// Mesh results applied.
    pub meshes_generated: u64,
    /// Results dropped because the configuration changed after they were requested.
    pub stale_discarded: u64,
    /// Chunks dropped by the unload radius.
    pub evicted: u64,
    /// Configuration generation.
    pub epoch: u64,
}

/// Streams terrain chunks in and out of a [`RenderSink`].
pub struct ChunkManager<S: RenderSink> {
    settings: Arc<GeneratorSettings>,
    sink: S,
    workers: GenerationWorkers,
    chunks: FxHashMap<ChunkCoord, TerrainChunk>,
    textures: FxHashMap<ChunkCoord, S::Handle>,
    /// Chunks shown during the previous tick.
    visible: FxHashSet<ChunkCoord>,
    viewer: DVec2,
    epoch: u64,
    stats: StreamingStats,
}

impl<S: RenderSink> ChunkManager<S> {
    /// Validate `config`, start the workers and take ownership of `sink`.
    pub fn initialize(config: &Config, sink: S) -> Result<Self, StreamingError> {
        let settings = GeneratorSettings::from_config(config)?;
        let workers = GenerationWorkers::new(settings.worker_threads)?;
        tracing::info!(
            resolution = settings.resolution(),
            view_distance = settings.max_view_distance,
            workers = settings.worker_threads,
            "terrain streaming initialized"
        );

        Ok(Self {
            settings,
            sink,
            workers,
            chunks: FxHashMap::default(),
            textures: FxHashMap::default(),
            visible: FxHashSet::default(),
            viewer: DVec2::ZERO,
            epoch: 0,
            stats: StreamingStats::default(),
        })
    }

    /// Swap in a new configuration.
    ///
    /// Every chunk is hidden and dropped, and results still in flight for the
    /// old configuration are discarded when they arrive. On error the current
    /// configuration stays in effect.
    pub fn on_config_changed(&mut self, config: &Config) -> Result<(), StreamingError> {
        let settings = GeneratorSettings::from_config(config)?;
        if settings.worker_threads != self.settings.worker_threads {
            self.workers = GenerationWorkers::new(settings.worker_threads)?;
        }

        for coord in self.visible.drain() {
            self.sink.set_active(coord, false);
        }
        for coord in self.chunks.keys() {
            self.sink.release(*coord);
        }
        self.chunks.clear();
        self.textures.clear();

        self.settings = settings;
        self.epoch += 1;
        tracing::info!(epoch = self.epoch, "terrain configuration changed");
        Ok(())
    }

    /// Advance streaming for a viewer at `viewer` (world XZ plane).
    pub fn tick(&mut self, viewer: DVec2) {
        self.viewer = viewer;

        for result in self.workers.drain_results() {
            self.apply_result(result);
        }

        let chunk_size = self.settings.chunk_size();
        let center = ChunkCoord::containing(viewer, chunk_size);
        let radius = self.settings.view_radius();
        let mut visible_now = FxHashSet::default();

        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let coord = center.offset(dx, dy);
                if !self.chunks.contains_key(&coord) {
                    self.create_chunk(coord);
                }
                if self.update_chunk(coord) {
                    visible_now.insert(coord);
                }
            }
        }

        for coord in self.visible.difference(&visible_now) {
            if let Some(chunk) = self.chunks.get_mut(coord)
                && chunk.visible
            {
                chunk.visible = false;
                self.sink.set_active(*coord, false);
            }
        }
        self.visible = visible_now;

        if let Some(unload_radius) = self.settings.unload_radius {
            self.evict_beyond(center, unload_radius);
        }
    }

    fn create_chunk(&mut self, coord: ChunkCoord) {
        let chunk_size = self.settings.chunk_size();
        self.chunks
            .insert(coord, TerrainChunk::new(coord, chunk_size));
        self.workers.submit(JobRequest {
            epoch: self.epoch,
            settings: Arc::clone(&self.settings),
            job: Job::Height {
                coord,
                origin: coord.origin(chunk_size),
            },
        });
        self.stats.heights_requested += 1;
        tracing::debug!(?coord, "chunk created");
    }

    /// Re-evaluate one chunk against the viewer. Returns whether it is shown.
    fn update_chunk(&mut self, coord: ChunkCoord) -> bool {
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            return false;
        };

        let distance = chunk.bounds().distance_to(self.viewer);
        let in_view = distance <= self.settings.max_view_distance;

        if in_view && let HeightState::Ready { map, .. } = &chunk.height {
            let lod = self.settings.lod.select_lod(distance);
            match chunk.meshes.get(&lod) {
                Some(MeshState::Ready(mesh)) => {
                    if chunk.applied_lod != Some(lod)
                        && let Some(texture) = self.textures.get(&coord)
                    {
                        self.sink.apply_mesh(coord, mesh, texture);
                        chunk.applied_lod = Some(lod);
                        tracing::trace!(?coord, lod, "mesh applied");
                    }
                }
                Some(MeshState::Pending) => {}
                None => {
                    self.workers.submit(JobRequest {
                        epoch: self.epoch,
                        settings: Arc::clone(&self.settings),
                        job: Job::Mesh {
                            coord,
                            lod,
                            map: Arc::clone(map),
                        },
                    });
                    chunk.meshes.insert(lod, MeshState::Pending);
                    self.stats.meshes_requested += 1;
                }
            }
        }

        let show = in_view && chunk.applied_lod.is_some();
        if show != chunk.visible {
            chunk.visible = show;
            self.sink.set_active(coord, show);
        }
        show
    }

    fn apply_result(&mut self, result: JobResult) {
        if result.epoch != self.epoch {
            self.stats.stale_discarded += 1;
            tracing::trace!(
                coord = ?result.output.coord(),
                epoch = result.epoch,
                "stale result discarded"
            );
            return;
        }

        let coord = result.output.coord();
        let Some(chunk) = self.chunks.get_mut(&coord) else {
            tracing::warn!(?coord, "result for untracked chunk dropped");
            return;
        };

        match result.output {
            JobOutput::Height { map, colors, .. } => {
                let texture = self.sink.materialize(TextureSource::Colors(&colors));
                self.textures.insert(coord, texture);
                chunk.height = HeightState::Ready { map, colors };
                self.stats.heights_generated += 1;
                tracing::debug!(?coord, elapsed_us = result.elapsed_us, "height map ready");
            }
            JobOutput::Mesh { lod, mesh, .. } => match mesh {
                Ok(mesh) => {
                    chunk.meshes.insert(lod, MeshState::Ready(mesh));
                    self.stats.meshes_generated += 1;
                    tracing::debug!(?coord, lod, elapsed_us = result.elapsed_us, "mesh ready");
                }
                Err(err) => {
                    // LODs are validated up front; clear the slot so the state
                    // stays consistent.
                    chunk.meshes.remove(&lod);
                    tracing::error!(?coord, lod, %err, "mesh generation failed");
                }
            },
        }
    }

    /// Drop idle chunks more than `unload_radius` chunks from `center`.
    fn evict_beyond(&mut self, center: ChunkCoord, unload_radius: u32) {
        let limit = u64::from(unload_radius);
        let doomed: Vec<ChunkCoord> = self
            .chunks
            .values()
            .filter(|chunk| {
                chunk.coord().chebyshev_distance(center) > limit
                    && chunk.pending_jobs() == 0
                    && !chunk.visible
            })
            .map(TerrainChunk::coord)
            .collect();

        for coord in doomed {
            self.chunks.remove(&coord);
            self.textures.remove(&coord);
            self.sink.release(coord);
            self.stats.evicted += 1;
            tracing::debug!(?coord, "chunk evicted");
        }
    }

    /// Current statistics.
    pub fn stats(&self) -> StreamingStats {
        let mut stats = self.stats;
        stats.tracked = self.chunks.len();
        stats.visible = self.visible.len();
        stats.pending_heights = self
            .chunks
            .values()
            .filter(|chunk| matches!(chunk.height, HeightState::Pending))
            .count();
        stats.pending_meshes = self
            .chunks
            .values()
            .flat_map(|chunk| chunk.meshes.values())
            .filter(|state| matches!(state, MeshState::Pending))
            .count();
        stats.epoch = self.epoch;
        stats
    }

    /// Returns `true` when no tracked chunk is waiting on a job.
    pub fn is_idle(&self) -> bool {
        self.chunks.values().all(|chunk| chunk.pending_jobs() == 0)
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// Iterate over all tracked chunks.
    pub fn chunks(&self) -> impl Iterator<Item = &TerrainChunk> {
        self.chunks.values()
    }

    /// Chunk the viewer stood in at the last tick.
    pub fn viewer_chunk(&self) -> ChunkCoord {
        ChunkCoord::containing(self.viewer, self.settings.chunk_size())
    }

    pub fn settings(&self) -> &Arc<GeneratorSettings> {
        &self.settings
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Stop the workers and hand back the sink.
    pub fn into_sink(mut self) -> S {
        self.workers.shutdown();
        self.sink
    }
}
