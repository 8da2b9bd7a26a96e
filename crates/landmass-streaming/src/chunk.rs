//! Per-chunk streaming state.

use std::sync::Arc;

use landmass_mesh::MeshData;
use landmass_terrain::{ColorMap, HeightMap};
use rustc_hash::FxHashMap;

use crate::coords::{ChunkBounds, ChunkCoord};

/// Height data of a chunk.
#[derive(Clone, Debug)]
pub enum HeightState {
    /// A height job is in flight.
    Pending,
    Ready {
        map: Arc<HeightMap>,
        colors: Arc<ColorMap>,
    },
}

/// Mesh data of a chunk at one LOD.
#[derive(Clone, Debug)]
pub enum MeshState {
    /// A mesh job is in flight.
    Pending,
    Ready(Arc<MeshData>),
}

/// Coarse lifecycle phase, derived from the chunk's state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkPhase {
    HeightPending,
    HeightReady,
    MeshPending,
    MeshReady,
}

/// A terrain chunk tracked by the [`ChunkManager`](crate::ChunkManager).
#[derive(Debug)]
pub struct TerrainChunk {
    coord: ChunkCoord,
    bounds: ChunkBounds,
    pub(crate) height: HeightState,
    pub(crate) meshes: FxHashMap<u32, MeshState>,
    /// LOD of the mesh currently handed to the sink.
    pub(crate) applied_lod: Option<u32>,
    pub(crate) visible: bool,
}

impl TerrainChunk {
    pub(crate) fn new(coord: ChunkCoord, chunk_size: f64) -> Self {
        Self {
            coord,
            bounds: ChunkBounds::new(coord, chunk_size),
            height: HeightState::Pending,
            meshes: FxHashMap::default(),
            applied_lod: None,
            visible: false,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> &ChunkBounds {
        &self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// LOD of the mesh being displayed, if any.
    pub fn applied_lod(&self) -> Option<u32> {
        self.applied_lod
    }

    /// The height map, once generated.
    pub fn height_map(&self) -> Option<&Arc<HeightMap>> {
        match &self.height {
            HeightState::Ready { map, .. } => Some(map),
            HeightState::Pending => None,
        }
    }

    pub fn color_map(&self) -> Option<&Arc<ColorMap>> {
        match &self.height {
            HeightState::Ready { colors, .. } => Some(colors),
            HeightState::Pending => None,
        }
    }

    /// Cached mesh for `lod`, if built.
    pub fn mesh(&self, lod: u32) -> Option<&Arc<MeshData>> {
        match self.meshes.get(&lod) {
            Some(MeshState::Ready(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn is_mesh_pending(&self, lod: u32) -> bool {
        matches!(self.meshes.get(&lod), Some(MeshState::Pending))
    }

    /// Number of in-flight jobs for this chunk.
    pub fn pending_jobs(&self) -> usize {
        let height = usize::from(matches!(self.height, HeightState::Pending));
        height
            + self
                .meshes
                .values()
                .filter(|state| matches!(state, MeshState::Pending))
                .count()
    }

    pub fn phase(&self) -> ChunkPhase {
        if matches!(self.height, HeightState::Pending) {
            ChunkPhase::HeightPending
        } else if self.applied_lod.is_some() {
            ChunkPhase::MeshReady
        } else if self.pending_jobs() > 0 {
            ChunkPhase::MeshPending
        } else {
            ChunkPhase::HeightReady
        }
    }
}
