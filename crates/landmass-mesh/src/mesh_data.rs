//! Terrain mesh output and its GPU-ready packed form.

use glam::{Vec2, Vec3};

/// An interleaved terrain vertex for GPU upload.
///
/// Layout (32 bytes total):
///   - `[0..12]`  position `[f32; 3]`, chunk-local
///   - `[12..24]` normal `[f32; 3]`, unit length
///   - `[24..32]` uv `[f32; 2]`, `[0, 1]` across the chunk
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 32]);

/// A renderable terrain mesh for one chunk at one LOD.
///
/// Immutable once built. Positions are chunk-local with the chunk center at
/// the origin; `+Y` is up.
#[derive(Clone, Debug, PartialEq)]
pub struct MeshData {
    /// LOD the mesh was built at.
    pub lod: u32,
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Per-vertex unit normals.
    pub normals: Vec<Vec3>,
    /// Per-vertex texture coordinates.
    pub uvs: Vec<Vec2>,
    /// Index buffer (triangles, 3 indices per triangle).
    pub indices: Vec<u32>,
    /// `true` when every triangle owns its three vertices and carries its face
    /// normal.
    pub flat_shaded: bool,
}

impl MeshData {
    /// Returns `true` if the mesh contains no vertices.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Triangle corner positions, in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            ]
        })
    }

    /// Pack positions, normals and uvs into one interleaved buffer.
    pub fn interleaved(&self) -> Vec<TerrainVertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.uvs)
            .map(|((p, n), uv)| TerrainVertex {
                position: p.to_array(),
                normal: n.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    /// Returns the index data as a byte slice for GPU upload (zero-copy).
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Axis-aligned bounds `(min, max)` of the vertex positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), &p| (lo.min(p), hi.max(p))),
        )
    }
}
