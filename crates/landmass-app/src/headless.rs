//! Headless streaming: a scripted viewer drives a [`ChunkManager`] at a fixed
//! tick rate while a CPU-only sink records what would have been drawn.

use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec2;
use landmass_mesh::MeshData;
use landmass_streaming::{
    ChunkCoord, ChunkManager, CpuTextures, RenderSink, StreamingStats, TextureMaterializer,
    TextureSource,
};
use landmass_terrain::TextureData;
use rustc_hash::{FxHashMap, FxHashSet};

/// Simulated seconds per tick: 60 Hz.
pub const FIXED_DT: f64 = 1.0 / 60.0;

/// How long [`run`] waits for in-flight jobs once the path is finished.
const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Viewer motion over time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum PathKind {
    /// Stay at the origin.
    Still,
    /// Fly along +X.
    Line,
    /// Circle the origin.
    Orbit,
}

/// A viewer path moving at `speed` world units per second.
#[derive(Clone, Copy, Debug)]
pub struct ViewerPath {
    pub kind: PathKind,
    pub speed: f64,
    /// Orbit radius.
    pub radius: f64,
}

impl ViewerPath {
    pub fn new(kind: PathKind, speed: f64, radius: f64) -> Self {
        Self {
            kind,
            speed,
            radius,
        }
    }

    /// Viewer position (world XZ) at `t` seconds.
    pub fn position(&self, t: f64) -> DVec2 {
        match self.kind {
            PathKind::Still => DVec2::ZERO,
            PathKind::Line => DVec2::new(self.speed * t, 0.0),
            PathKind::Orbit => {
                if self.radius <= 0.0 {
                    return DVec2::ZERO;
                }
                let angle = self.speed * t / self.radius;
                DVec2::new(angle.cos(), angle.sin()) * self.radius
            }
        }
    }
}

/// Records sink calls and keeps CPU textures for every materialized chunk.
#[derive(Debug, Default)]
pub struct HeadlessSink {
    materializer: CpuTextures,
    textures_built: u64,
    meshes_applied: u64,
    /// LOD currently applied per chunk.
    applied: FxHashMap<ChunkCoord, u32>,
    shown: FxHashSet<ChunkCoord>,
    released: u64,
}

impl HeadlessSink {
    pub fn textures_built(&self) -> u64 {
        self.textures_built
    }

    pub fn meshes_applied(&self) -> u64 {
        self.meshes_applied
    }

    /// Chunks currently shown.
    pub fn shown(&self) -> usize {
        self.shown.len()
    }

    pub fn applied_lod(&self, coord: ChunkCoord) -> Option<u32> {
        self.applied.get(&coord).copied()
    }

    pub fn released(&self) -> u64 {
        self.released
    }
}

impl TextureMaterializer for HeadlessSink {
    type Handle = Arc<TextureData>;

    fn materialize(&mut self, source: TextureSource<'_>) -> Self::Handle {
        self.textures_built += 1;
        self.materializer.materialize(source)
    }
}

impl RenderSink for HeadlessSink {
    fn apply_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>, _texture: &Self::Handle) {
        self.meshes_applied += 1;
        self.applied.insert(coord, mesh.lod);
    }

    fn set_active(&mut self, coord: ChunkCoord, active: bool) {
        if active {
            self.shown.insert(coord);
        } else {
            self.shown.remove(&coord);
        }
    }

    fn release(&mut self, coord: ChunkCoord) {
        self.applied.remove(&coord);
        self.shown.remove(&coord);
        self.released += 1;
    }
}

/// Options for [`run`].
#[derive(Clone, Copy, Debug)]
pub struct RunOptions {
    pub ticks: u64,
    pub path: ViewerPath,
    /// Log [`StreamingStats`] every this many ticks; `0` disables.
    pub log_every: u64,
    /// Keep ticking at the final position until no job is pending.
    pub settle: bool,
}

/// Drive `manager` along the path for `options.ticks` ticks.
///
/// `on_tick` runs after every tick with the tick index, e.g. to poll for
/// configuration changes.
pub fn run<F>(
    manager: &mut ChunkManager<HeadlessSink>,
    options: RunOptions,
    mut on_tick: F,
) -> StreamingStats
where
    F: FnMut(&mut ChunkManager<HeadlessSink>, u64),
{
    let started = Instant::now();
    let mut position = options.path.position(0.0);

    for tick in 0..options.ticks {
        position = options.path.position(tick as f64 * FIXED_DT);
        manager.tick(position);
        on_tick(manager, tick);

        if options.log_every > 0 && tick % options.log_every == 0 {
            log_stats(manager.stats(), tick);
        }
    }

    if options.settle {
        let deadline = Instant::now() + SETTLE_TIMEOUT;
        while !manager.is_idle() && Instant::now() < deadline {
            manager.tick(position);
            std::thread::sleep(Duration::from_millis(1));
        }
        // One more tick shows meshes that arrived with the last results.
        manager.tick(position);
        if !manager.is_idle() {
            tracing::warn!("streaming still busy after {:?}", SETTLE_TIMEOUT);
        }
    }

    let stats = manager.stats();
    tracing::info!(
        ticks = options.ticks,
        elapsed_ms = started.elapsed().as_millis() as u64,
        tracked = stats.tracked,
        visible = stats.visible,
        heights = stats.heights_generated,
        meshes = stats.meshes_generated,
        stale = stats.stale_discarded,
        evicted = stats.evicted,
        "headless run finished"
    );
    stats
}

fn log_stats(stats: StreamingStats, tick: u64) {
    tracing::info!(
        tick,
        tracked = stats.tracked,
        visible = stats.visible,
        pending_heights = stats.pending_heights,
        pending_meshes = stats.pending_meshes,
        epoch = stats.epoch,
        "streaming"
    );
}
