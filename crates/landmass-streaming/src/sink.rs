//! Narrow interfaces to the host that displays chunks.

use std::sync::Arc;

use landmass_mesh::MeshData;
use landmass_terrain::{ColorMap, HeightMap, TextureData};

use crate::coords::ChunkCoord;

/// What a chunk texture is made from.
#[derive(Clone, Copy, Debug)]
pub enum TextureSource<'a> {
    /// Region colours, one texel per real cell.
    Colors(&'a ColorMap),
    /// Grayscale heights, one texel per real cell.
    Heights(&'a HeightMap),
}

/// Turns CPU-side texture sources into host texture handles.
pub trait TextureMaterializer {
    type Handle;

    fn materialize(&mut self, source: TextureSource<'_>) -> Self::Handle;
}

/// Receives meshes and visibility changes from the [`ChunkManager`].
///
/// All calls happen on the thread that drives [`ChunkManager::tick`].
///
/// [`ChunkManager`]: crate::ChunkManager
/// [`ChunkManager::tick`]: crate::ChunkManager::tick
pub trait RenderSink: TextureMaterializer {
    /// Display `mesh` for `coord`, replacing any mesh shown before.
    fn apply_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>, texture: &Self::Handle);

    /// Show or hide the chunk at `coord`.
    fn set_active(&mut self, coord: ChunkCoord, active: bool);

    /// The chunk at `coord` was evicted; drop anything held for it.
    fn release(&mut self, _coord: ChunkCoord) {}
}

/// Materializes textures as shared RGBA buffers.
#[derive(Clone, Copy, Debug, Default)]
pub struct CpuTextures;

impl TextureMaterializer for CpuTextures {
    type Handle = Arc<TextureData>;

    fn materialize(&mut self, source: TextureSource<'_>) -> Self::Handle {
        Arc::new(match source {
            TextureSource::Colors(colors) => TextureData::from_color_map(colors),
            TextureSource::Heights(heights) => TextureData::from_height_map(heights),
        })
    }
}
