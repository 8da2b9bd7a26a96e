//! Height map to triangle mesh conversion with LOD and seam-free chunk edges.
//!
//! The height map carries a one-cell border ring around the chunk. Border
//! samples are never emitted as vertices; they only feed the normals of the
//! real edge vertices so lighting is continuous across chunks.
//!
//! At LOD `n > 0` interior vertices are taken every `2n` samples, but the
//! outermost row and column of the chunk are always emitted at full
//! resolution. Two neighbouring chunks therefore share the exact same edge
//! polyline whatever LOD each is built at. Coarse cells that touch the chunk
//! edge are closed by fanning from a corner that is not on a full-resolution
//! side.

use glam::{Vec2, Vec3};
use landmass_terrain::HeightMap;

use crate::height_curve::HeightCurve;
use crate::mesh_data::MeshData;

/// Errors building a mesh.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum MeshError {
    #[error("height map resolution {0} is too small to mesh")]
    ResolutionTooSmall(usize),
    #[error("lod {lod} (skip {skip}) does not divide chunk resolution {resolution} - 1")]
    IndivisibleLod {
        lod: u32,
        skip: usize,
        resolution: usize,
    },
    #[error("lod {lod} leaves fewer than two cells per side at chunk resolution {resolution}")]
    LodTooCoarse { lod: u32, resolution: usize },
}

const UNUSED: u32 = u32::MAX;

/// Sample step between interior vertices at `lod`.
pub fn lod_skip(lod: u32) -> usize {
    if lod == 0 { 1 } else { lod as usize * 2 }
}

/// Check that a chunk of `resolution` samples per side can be meshed at `lod`
/// and return the skip.
pub fn check_lod(resolution: usize, lod: u32) -> Result<usize, MeshError> {
    if resolution < 2 {
        return Err(MeshError::ResolutionTooSmall(resolution));
    }
    let skip = lod_skip(lod);
    if (resolution - 1) % skip != 0 {
        return Err(MeshError::IndivisibleLod {
            lod,
            skip,
            resolution,
        });
    }
    if skip > 1 && (resolution - 1) / skip < 2 {
        return Err(MeshError::LodTooCoarse { lod, resolution });
    }
    Ok(skip)
}

/// Number of vertices a smooth-shaded mesh has at `lod`.
pub fn expected_vertex_count(resolution: usize, lod: u32) -> Result<usize, MeshError> {
    let skip = check_lod(resolution, lod)?;
    if skip == 1 {
        return Ok(resolution * resolution);
    }
    let interior = (resolution - 1) / skip - 1;
    Ok(4 * (resolution - 1) + interior * interior)
}

/// Builds [`MeshData`] from height maps.
#[derive(Clone, Debug)]
pub struct TerrainMeshBuilder {
    height_multiplier: f32,
    curve: HeightCurve,
    flat_shaded: bool,
}

impl TerrainMeshBuilder {
    pub fn new(height_multiplier: f32, curve: HeightCurve, flat_shaded: bool) -> Self {
        Self {
            height_multiplier,
            curve,
            flat_shaded,
        }
    }

    pub fn height_multiplier(&self) -> f32 {
        self.height_multiplier
    }

    pub fn curve(&self) -> &HeightCurve {
        &self.curve
    }

    pub fn flat_shaded(&self) -> bool {
        self.flat_shaded
    }

    /// Build the mesh for `map` at `lod`.
    pub fn build(&self, map: &HeightMap, lod: u32) -> Result<MeshData, MeshError> {
        let resolution = map.resolution();
        let skip = check_lod(resolution, lod)?;
        let grid = map.size();
        let last = resolution;
        let half = (resolution - 1) as f32 / 2.0;
        let span = (resolution - 1) as f32;

        let mut points = Vec::with_capacity(grid * grid);
        for j in 0..grid {
            for i in 0..grid {
                let y = self.curve.evaluate(map.get(i, j)) * self.height_multiplier;
                points.push(Vec3::new((i as f32 - 1.0) - half, y, half - (j as f32 - 1.0)));
            }
        }

        let emitted = |i: usize, j: usize| {
            let on_edge = i == 1 || j == 1 || i == last || j == last;
            on_edge || ((i - 1) % skip == 0 && (j - 1) % skip == 0)
        };

        let mut slots = vec![UNUSED; grid * grid];
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        for j in 1..=last {
            for i in 1..=last {
                if emitted(i, j) {
                    slots[j * grid + i] = positions.len() as u32;
                    positions.push(points[j * grid + i]);
                    uvs.push(Vec2::new((i - 1) as f32 / span, (j - 1) as f32 / span));
                }
            }
        }

        let cells = (resolution - 1) / skip;
        let fine = skip > 1;
        let mut indices = Vec::with_capacity(cells * cells * 6);
        let mut polygon: Vec<(usize, usize)> = Vec::with_capacity(4 * skip);
        for cj in 0..cells {
            for ci in 0..cells {
                let (i0, j0) = (1 + ci * skip, 1 + cj * skip);
                let (i1, j1) = (i0 + skip, j0 + skip);
                let top = fine && j0 == 1;
                let right = fine && i1 == last;
                let bottom = fine && j1 == last;
                let left = fine && i0 == 1;

                polygon.clear();
                polygon.push((i0, j0));
                if top {
                    polygon.extend((i0 + 1..i1).map(|i| (i, j0)));
                }
                let b = polygon.len();
                polygon.push((i1, j0));
                if right {
                    polygon.extend((j0 + 1..j1).map(|j| (i1, j)));
                }
                let c = polygon.len();
                polygon.push((i1, j1));
                if bottom {
                    polygon.extend((i0 + 1..i1).rev().map(|i| (i, j1)));
                }
                let d = polygon.len();
                polygon.push((i0, j1));
                if left {
                    polygon.extend((j0 + 1..j1).rev().map(|j| (i0, j)));
                }

                // `check_lod` guarantees at least two cells per side, so some
                // corner always sits off the full-resolution sides.
                let apex = if !bottom && !left {
                    d
                } else if !right && !bottom {
                    c
                } else if !top && !right {
                    b
                } else {
                    0
                };

                let n = polygon.len();
                for t in 1..n - 1 {
                    for (i, j) in [
                        polygon[apex],
                        polygon[(apex + t) % n],
                        polygon[(apex + t + 1) % n],
                    ] {
                        indices.push(slots[j * grid + i]);
                    }
                }
            }
        }

        let mut draft = MeshDraft {
            lod,
            positions,
            uvs,
            indices,
            normal_sums: Vec::new(),
        };
        draft.accumulate_normals(&points, &slots, grid);

        let mesh = if self.flat_shaded {
            draft.finish_flat()
        } else {
            draft.finish_smooth()
        };
        tracing::trace!(
            lod,
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            "terrain mesh built"
        );
        Ok(mesh)
    }
}

/// Shared intermediate before the shading-specific finalization.
struct MeshDraft {
    lod: u32,
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    normal_sums: Vec<Vec3>,
}

impl MeshDraft {
    /// Area-weighted normal sums over mesh triangles and border-ring cells.
    fn accumulate_normals(&mut self, points: &[Vec3], slots: &[u32], grid: usize) {
        let mut sums = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            let face = face_normal(self.positions[a], self.positions[b], self.positions[c]);
            sums[a] += face;
            sums[b] += face;
            sums[c] += face;
        }

        let ring = grid - 2;
        for j in 0..grid - 1 {
            for i in 0..grid - 1 {
                if i != 0 && j != 0 && i != ring && j != ring {
                    continue;
                }
                let a = j * grid + i;
                let b = a + 1;
                let c = b + grid;
                let d = a + grid;
                for [p, q, r] in [[d, a, b], [d, b, c]] {
                    let face = face_normal(points[p], points[q], points[r]);
                    for corner in [p, q, r] {
                        if slots[corner] != UNUSED {
                            sums[slots[corner] as usize] += face;
                        }
                    }
                }
            }
        }

        self.normal_sums = sums;
    }

    fn finish_smooth(self) -> MeshData {
        MeshData {
            lod: self.lod,
            normals: self.normal_sums.into_iter().map(unit_or_up).collect(),
            positions: self.positions,
            uvs: self.uvs,
            indices: self.indices,
            flat_shaded: false,
        }
    }

    fn finish_flat(self) -> MeshData {
        let count = self.indices.len();
        let mut positions = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for tri in self.indices.chunks_exact(3) {
            let corners = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            let [a, b, c] = corners.map(|i| self.positions[i]);
            let normal = unit_or_up(face_normal(a, b, c));
            for i in corners {
                positions.push(self.positions[i]);
                uvs.push(self.uvs[i]);
                normals.push(normal);
            }
        }

        MeshData {
            lod: self.lod,
            positions,
            normals,
            uvs,
            indices: (0..count as u32).collect(),
            flat_shaded: true,
        }
    }
}

/// Unnormalized face normal; its length is twice the triangle area.
#[inline]
fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

#[inline]
fn unit_or_up(v: Vec3) -> Vec3 {
    let n = v.normalize_or_zero();
    if n == Vec3::ZERO { Vec3::Y } else { n }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use landmass_terrain::{HeightMapBuilder, NoiseParams, Normalization};
    use std::collections::HashSet;

    fn noisy_builder(resolution: usize) -> HeightMapBuilder {
        HeightMapBuilder::new(
            NoiseParams {
                seed: 17,
                scale: 12.0,
                ..Default::default()
            },
            resolution,
            Normalization::Global,
            None,
        )
        .unwrap()
    }

    fn mesher(flat: bool) -> TerrainMeshBuilder {
        TerrainMeshBuilder::new(20.0, HeightCurve::linear(), flat)
    }

    /// Sum of the signed triangle areas projected onto the XZ plane.
    fn footprint(mesh: &MeshData) -> f64 {
        mesh.triangles()
            .map(|[a, b, c]| {
                let area = face_normal(a, b, c).y as f64 * 0.5;
                assert!(area > 0.0, "degenerate or flipped triangle {a} {b} {c}");
                area
            })
            .sum()
    }

    /// Triangle edges lying on the line `x == edge_x`, keyed by exact bits.
    fn edge_segments(mesh: &MeshData, edge_x: f32) -> Vec<[(u32, u32); 2]> {
        let mut segments = HashSet::new();
        for tri in mesh.triangles() {
            for (p, q) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if p.x == edge_x && q.x == edge_x {
                    let mut pair = [(p.z.to_bits(), p.y.to_bits()), (q.z.to_bits(), q.y.to_bits())];
                    if f32::from_bits(pair[0].0) > f32::from_bits(pair[1].0) {
                        pair.swap(0, 1);
                    }
                    segments.insert(pair);
                }
            }
        }
        let mut segments: Vec<_> = segments.into_iter().collect();
        segments.sort_unstable();
        segments
    }

    #[test]
    fn test_lod0_counts() {
        let map = noisy_builder(9).build(DVec2::ZERO);
        let mesh = mesher(false).build(&map, 0).unwrap();
        assert_eq!(mesh.vertex_count(), 81);
        assert_eq!(mesh.triangle_count(), 2 * 8 * 8);
        assert_eq!(mesh.normals.len(), 81);
        assert_eq!(mesh.uvs.len(), 81);
        assert!(!mesh.flat_shaded);
    }

    #[test]
    fn test_vertex_count_strictly_decreases_with_lod() {
        let map = noisy_builder(25).build(DVec2::ZERO);
        let mut previous = usize::MAX;
        for lod in [0, 1, 2, 3, 4, 6] {
            let mesh = mesher(false).build(&map, lod).unwrap();
            assert_eq!(
                mesh.vertex_count(),
                expected_vertex_count(25, lod).unwrap(),
                "lod {lod}"
            );
            assert!(
                mesh.vertex_count() < previous,
                "lod {lod} has {} vertices, previous had {previous}",
                mesh.vertex_count()
            );
            previous = mesh.vertex_count();
        }
    }

    #[test]
    fn test_every_lod_covers_chunk_footprint() {
        let map = noisy_builder(25).build(DVec2::new(48.0, -24.0));
        for lod in [0, 1, 2, 3, 4, 6] {
            let mesh = mesher(false).build(&map, lod).unwrap();
            let area = footprint(&mesh);
            assert!(
                (area - 24.0 * 24.0).abs() < 1e-2,
                "lod {lod} covers {area} instead of 576"
            );
        }
    }

    #[test]
    fn test_seams_close_between_different_lods() {
        let builder = noisy_builder(25);
        let west = builder.build(DVec2::ZERO);
        let east = builder.build(DVec2::new(builder.chunk_size(), 0.0));

        for (west_lod, east_lod) in [(0, 0), (0, 2), (3, 1), (6, 0), (4, 6)] {
            let west_mesh = mesher(false).build(&west, west_lod).unwrap();
            let east_mesh = mesher(false).build(&east, east_lod).unwrap();
            let west_edge = edge_segments(&west_mesh, 12.0);
            let east_edge = edge_segments(&east_mesh, -12.0);
            assert_eq!(west_edge.len(), 24, "lod {west_lod} edge segments");
            assert_eq!(
                west_edge, east_edge,
                "shared edge differs between lod {west_lod} and lod {east_lod}"
            );
        }
    }

    #[test]
    fn test_indivisible_lod_rejected() {
        let map = noisy_builder(25).build(DVec2::ZERO);
        assert_eq!(
            mesher(false).build(&map, 5),
            Err(MeshError::IndivisibleLod {
                lod: 5,
                skip: 10,
                resolution: 25
            })
        );
    }

    #[test]
    fn test_too_coarse_lod_rejected() {
        let map = noisy_builder(9).build(DVec2::ZERO);
        assert_eq!(
            mesher(false).build(&map, 4),
            Err(MeshError::LodTooCoarse {
                lod: 4,
                resolution: 9
            })
        );
        assert!(mesher(false).build(&map, 2).is_ok());
    }

    #[test]
    fn test_flat_map_normals_point_up() {
        let map = HeightMap::from_values(11, vec![0.5; 121]);
        for flat in [false, true] {
            let mesh = mesher(flat).build(&map, 0).unwrap();
            for n in &mesh.normals {
                assert!((*n - Vec3::Y).length() < 1e-6, "normal {n} (flat={flat})");
            }
        }
    }

    #[test]
    fn test_border_ring_shapes_edge_normals() {
        // 7x7 core at height 0 surrounded by a ring at height 1.
        let size = 9;
        let mut values = vec![0.0_f32; size * size];
        for j in 0..size {
            for i in 0..size {
                if i == 0 || j == 0 || i == size - 1 || j == size - 1 {
                    values[j * size + i] = 1.0;
                }
            }
        }
        let map = HeightMap::from_values(size, values);
        let mesh = mesher(false).build(&map, 0).unwrap();

        // Row-major over the 7x7 core.
        let west_edge = mesh.normals[3 * 7];
        let center = mesh.normals[3 * 7 + 3];
        assert!(west_edge.x > 0.1, "edge normal {west_edge} ignores border");
        assert!((center - Vec3::Y).length() < 1e-6);
        assert!(mesh.positions.iter().all(|p| p.y == 0.0), "border is not emitted");
    }

    #[test]
    fn test_flat_shading_duplicates_vertices() {
        let map = noisy_builder(13).build(DVec2::ZERO);
        let smooth = mesher(false).build(&map, 2).unwrap();
        let flat = mesher(true).build(&map, 2).unwrap();

        assert!(flat.flat_shaded);
        assert_eq!(flat.triangle_count(), smooth.triangle_count());
        assert_eq!(flat.vertex_count(), 3 * flat.triangle_count());
        assert!(flat.indices.iter().enumerate().all(|(i, &idx)| idx as usize == i));
        for tri in flat.normals.chunks_exact(3) {
            assert_eq!(tri[0], tri[1]);
            assert_eq!(tri[1], tri[2]);
        }
        for (f, s) in flat.triangles().zip(smooth.triangles()) {
            assert_eq!(f, s, "flat shading must not move geometry");
        }
    }

    #[test]
    fn test_smooth_normals_are_unit_length() {
        let map = noisy_builder(17).build(DVec2::new(-16.0, 32.0));
        let mesh = mesher(false).build(&map, 1).unwrap();
        for n in &mesh.normals {
            assert!((n.length() - 1.0).abs() < 1e-5, "normal {n} not unit length");
            assert!(n.y > 0.0, "height field normal {n} points down");
        }
    }

    #[test]
    fn test_uvs_span_unit_square() {
        let map = noisy_builder(9).build(DVec2::ZERO);
        let mesh = mesher(false).build(&map, 1).unwrap();
        let min = mesh.uvs.iter().fold(Vec2::splat(f32::MAX), |a, &b| a.min(b));
        let max = mesh.uvs.iter().fold(Vec2::splat(f32::MIN), |a, &b| a.max(b));
        assert_eq!(min, Vec2::ZERO);
        assert_eq!(max, Vec2::ONE);
    }

    #[test]
    fn test_build_is_deterministic() {
        let map = noisy_builder(17).build(DVec2::ZERO);
        let a = mesher(false).build(&map, 2).unwrap();
        let b = mesher(false).build(&map, 2).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_height_curve_and_multiplier_applied() {
        let map = HeightMap::from_values(5, vec![0.5; 25]);
        let curve = HeightCurve::new(vec![(0.0, 0.0), (0.5, 0.2), (1.0, 1.0)]).unwrap();
        let mesh = TerrainMeshBuilder::new(10.0, curve, false)
            .build(&map, 0)
            .unwrap();
        assert!(mesh.positions.iter().all(|p| (p.y - 2.0).abs() < 1e-6));
    }
}
