//! Terrain meshing: height response curves, LOD-aware mesh building with
//! seam-free chunk edges, and packed vertex output.

mod builder;
mod height_curve;
mod mesh_data;

pub use builder::{MeshError, TerrainMeshBuilder, check_lod, expected_vertex_count, lod_skip};
pub use height_curve::{CurveError, HeightCurve};
pub use mesh_data::{MeshData, TerrainVertex};
