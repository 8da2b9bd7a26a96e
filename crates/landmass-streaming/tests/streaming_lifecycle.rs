use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use glam::DVec2;
use landmass_config::Config;
use landmass_mesh::MeshData;
use landmass_streaming::{
    ChunkCoord, ChunkManager, ChunkPhase, RenderSink, SettingsError, StreamingError,
    TextureMaterializer, TextureSource,
};

/// Chunk width for the test config (resolution 25).
const CHUNK: f64 = 24.0;

#[derive(Default)]
struct RecordingSink {
    textures: u32,
    applied: Vec<(ChunkCoord, u32)>,
    active: HashMap<ChunkCoord, bool>,
    released: Vec<ChunkCoord>,
}

impl RecordingSink {
    fn shown(&self) -> usize {
        self.active.values().filter(|active| **active).count()
    }

    fn is_shown(&self, coord: ChunkCoord) -> bool {
        self.active.get(&coord).copied().unwrap_or(false)
    }
}

impl TextureMaterializer for RecordingSink {
    type Handle = u32;

    fn materialize(&mut self, source: TextureSource<'_>) -> u32 {
        assert!(matches!(source, TextureSource::Colors(_)));
        self.textures += 1;
        self.textures
    }
}

impl RenderSink for RecordingSink {
    fn apply_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>, texture: &u32) {
        assert!(*texture > 0, "texture materialized before mesh");
        assert!(!mesh.is_empty());
        self.applied.push((coord, mesh.lod));
    }

    fn set_active(&mut self, coord: ChunkCoord, active: bool) {
        self.active.insert(coord, active);
    }

    fn release(&mut self, coord: ChunkCoord) {
        self.released.push(coord);
    }
}

/// 25-sample chunks, view distance 40, LOD 0 up to 20 and LOD 1 up to 40.
fn small_config(worker_threads: usize) -> Config {
    let mut config = Config::default();
    config.mesh.chunk_resolution = 25;
    config.streaming.max_view_distance = 40.0;
    config.streaming.lod_levels.truncate(2);
    config.streaming.lod_levels[0].max_distance = 20.0;
    config.streaming.lod_levels[1].max_distance = 40.0;
    config.streaming.worker_threads = Some(worker_threads);
    config
}

fn inline_manager() -> ChunkManager<RecordingSink> {
    ChunkManager::initialize(&small_config(0), RecordingSink::default()).unwrap()
}

/// Three ticks at `viewer`: request heights, apply heights and request meshes,
/// apply meshes.
fn settle(manager: &mut ChunkManager<RecordingSink>, viewer: DVec2) {
    for _ in 0..3 {
        manager.tick(viewer);
    }
}

#[test]
fn test_chunks_become_visible_after_results_arrive() {
    let mut manager = inline_manager();

    manager.tick(DVec2::ZERO);
    let stats = manager.stats();
    assert_eq!(stats.tracked, 25, "5x5 window around the viewer");
    assert_eq!(stats.pending_heights, 25);
    assert_eq!(stats.heights_requested, 25);
    assert_eq!(stats.visible, 0);
    assert!(manager.sink().active.is_empty(), "nothing shown without a mesh");

    manager.tick(DVec2::ZERO);
    let stats = manager.stats();
    assert_eq!(stats.heights_generated, 25);
    assert_eq!(manager.sink().textures, 25);
    // All but the four window corners are within 40 units.
    assert_eq!(stats.meshes_requested, 21);
    assert_eq!(stats.pending_meshes, 21);
    assert_eq!(stats.visible, 0);

    manager.tick(DVec2::ZERO);
    let stats = manager.stats();
    assert_eq!(stats.meshes_generated, 21);
    assert_eq!(stats.visible, 21);
    assert_eq!(manager.sink().shown(), 21);
    assert_eq!(manager.sink().applied.len(), 21);
    assert!(manager.is_idle());

    let lod_of = |x, y| manager.chunk(ChunkCoord::new(x, y)).unwrap().applied_lod();
    assert_eq!(lod_of(0, 0), Some(0));
    assert_eq!(lod_of(1, 0), Some(0));
    assert_eq!(lod_of(1, 1), Some(0));
    assert_eq!(lod_of(2, 0), Some(1));
    assert_eq!(lod_of(-2, 1), Some(1));

    let corner = manager.chunk(ChunkCoord::new(2, 2)).unwrap();
    assert_eq!(corner.phase(), ChunkPhase::HeightReady);
    assert!(!corner.is_visible());
}

#[test]
fn test_reentering_window_issues_no_new_requests() {
    let mut manager = inline_manager();
    settle(&mut manager, DVec2::ZERO);

    let away = DVec2::new(20.0 * CHUNK, 0.0);
    settle(&mut manager, away);
    assert!(!manager.sink().is_shown(ChunkCoord::new(0, 0)), "left chunks are hidden");
    assert_eq!(manager.viewer_chunk(), ChunkCoord::new(20, 0));
    assert!(
        manager.chunk(ChunkCoord::new(0, 0)).unwrap().applied_lod().is_some(),
        "hidden chunks keep their cache"
    );

    let before = manager.stats();
    let applied_before = manager.sink().applied.len();
    manager.tick(DVec2::ZERO);
    let after = manager.stats();

    assert_eq!(after.heights_requested, before.heights_requested);
    assert_eq!(after.meshes_requested, before.meshes_requested);
    assert_eq!(after.visible, 21, "cached chunks reappear immediately");
    assert_eq!(manager.sink().applied.len(), applied_before, "no mesh re-upload");
    assert!(manager.sink().is_shown(ChunkCoord::new(0, 0)));
    assert!(!manager.sink().is_shown(ChunkCoord::new(20, 0)));
}

#[test]
fn test_lod_change_keeps_previous_mesh_shown() {
    let mut manager = inline_manager();
    settle(&mut manager, DVec2::ZERO);
    let west = ChunkCoord::new(-1, 0);
    assert_eq!(manager.chunk(west).unwrap().applied_lod(), Some(0));

    // West chunk now 32 units away: LOD 1.
    let viewer = DVec2::new(20.0, 0.0);
    manager.tick(viewer);
    let chunk = manager.chunk(west).unwrap();
    assert!(chunk.is_mesh_pending(1));
    assert_eq!(chunk.applied_lod(), Some(0), "old LOD stays while new one builds");
    assert!(chunk.is_visible());

    manager.tick(viewer);
    let chunk = manager.chunk(west).unwrap();
    assert_eq!(chunk.applied_lod(), Some(1));
    assert!(chunk.mesh(0).is_some(), "coarser switch keeps the finer mesh cached");
    assert!(manager.sink().applied.contains(&(west, 1)));
}

#[test]
fn test_results_for_departed_chunks_fill_cache() {
    let mut manager = inline_manager();
    manager.tick(DVec2::ZERO);

    manager.tick(DVec2::new(50.0 * CHUNK, 0.0));
    let origin = manager.chunk(ChunkCoord::new(0, 0)).unwrap();
    assert!(origin.height_map().is_some(), "no cancellation: result is kept");
    assert!(!origin.is_visible());
    assert_eq!(manager.stats().heights_generated, 25);
}

#[test]
fn test_config_change_hides_and_drops_everything() {
    let mut manager = inline_manager();
    settle(&mut manager, DVec2::ZERO);
    assert_eq!(manager.sink().shown(), 21);

    let mut config = small_config(0);
    config.noise.seed = 99;
    manager.on_config_changed(&config).unwrap();

    let stats = manager.stats();
    assert_eq!(manager.sink().shown(), 0);
    assert_eq!(stats.tracked, 0);
    assert_eq!(stats.visible, 0);
    assert_eq!(stats.epoch, 1);

    settle(&mut manager, DVec2::ZERO);
    assert_eq!(manager.stats().visible, 21);
    assert_eq!(manager.stats().heights_requested, 50);
}

#[test]
fn test_stale_results_discarded_after_config_change() {
    let mut manager = inline_manager();
    manager.tick(DVec2::ZERO);

    let mut config = small_config(0);
    config.noise.octaves = 2;
    manager.on_config_changed(&config).unwrap();

    manager.tick(DVec2::ZERO);
    let stats = manager.stats();
    assert_eq!(stats.stale_discarded, 25);
    assert_eq!(stats.heights_generated, 0);
    assert_eq!(stats.pending_heights, 25, "fresh requests for the new epoch");

    manager.tick(DVec2::ZERO);
    assert_eq!(manager.stats().heights_generated, 25);
}

#[test]
fn test_invalid_config_change_keeps_current_settings() {
    let mut manager = inline_manager();
    settle(&mut manager, DVec2::ZERO);

    let mut config = small_config(0);
    config.regions.clear();
    let err = manager.on_config_changed(&config).unwrap_err();
    assert!(matches!(err, StreamingError::Settings(SettingsError::Config(_))));
    assert_eq!(manager.stats().epoch, 0);
    assert_eq!(manager.stats().visible, 21);
}

#[test]
fn test_initialize_rejects_invalid_config() {
    let mut config = small_config(0);
    config.noise.octaves = -3;
    let result = ChunkManager::initialize(&config, RecordingSink::default());
    assert!(matches!(
        result,
        Err(StreamingError::Settings(SettingsError::Config(_)))
    ));
}

#[test]
fn test_unload_radius_evicts_idle_chunks() {
    let mut config = small_config(0);
    config.streaming.unload_radius = Some(3);
    let mut manager = ChunkManager::initialize(&config, RecordingSink::default()).unwrap();
    settle(&mut manager, DVec2::ZERO);
    let requested = manager.stats().heights_requested;

    let away = DVec2::new(10.0 * CHUNK, 0.0);
    settle(&mut manager, away);
    assert!(manager.chunk(ChunkCoord::new(0, 0)).is_none());
    assert_eq!(manager.stats().evicted, 25);
    assert!(manager.sink().released.contains(&ChunkCoord::new(0, 0)));
    assert_eq!(manager.stats().tracked, 25);

    manager.tick(DVec2::ZERO);
    assert_eq!(
        manager.stats().heights_requested,
        requested + 25 + 25,
        "evicted chunks regenerate on re-entry"
    );
}

#[test]
fn test_threaded_streaming_reaches_steady_state() {
    let mut manager =
        ChunkManager::initialize(&small_config(3), RecordingSink::default()).unwrap();

    let start = Instant::now();
    loop {
        manager.tick(DVec2::ZERO);
        let stats = manager.stats();
        if stats.visible == 21 && manager.is_idle() {
            break;
        }
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "streaming did not settle: {stats:?}"
        );
        std::thread::sleep(Duration::from_millis(2));
    }

    let stats = manager.stats();
    assert_eq!(stats.heights_requested, 25, "one height job per chunk");
    assert_eq!(stats.meshes_requested, 21, "one mesh job per chunk and LOD");
    assert_eq!(manager.sink().shown(), 21);

    let sink = manager.into_sink();
    assert_eq!(sink.applied.len(), 21);
}

#[test]
fn test_worker_count_change_does_not_wait_for_backlog() {
    let mut config = Config::default();
    config.streaming.max_view_distance = 2000.0;
    config.streaming.worker_threads = Some(1);
    let mut manager = ChunkManager::initialize(&config, RecordingSink::default()).unwrap();

    manager.tick(DVec2::ZERO);
    assert_eq!(manager.stats().heights_requested, 361);
    assert!(!manager.is_idle(), "a single worker cannot finish 361 chunks at once");

    config.streaming.worker_threads = Some(2);
    let start = Instant::now();
    manager.on_config_changed(&config).unwrap();
    let elapsed = start.elapsed();
    assert!(
        elapsed < Duration::from_secs(5),
        "reconfiguring blocked for {elapsed:?}"
    );
    assert_eq!(manager.stats().epoch, 1);
    assert_eq!(manager.stats().tracked, 0);
}
