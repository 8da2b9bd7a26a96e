//! Per-chunk height grids.
//!
//! A [`HeightMap`] covers a chunk's `resolution × resolution` sample lattice
//! plus a one-cell border ring, so meshing can compute normals at the real
//! chunk edges without looking at neighbouring chunks.

use std::sync::Arc;

use glam::DVec2;

use crate::falloff::FalloffMask;
use crate::noise_field::{NoiseField, NoiseParams, Normalization};

/// Errors building a [`HeightMapBuilder`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum HeightMapError {
    /// The chunk needs at least two samples per side to span any area.
    #[error("chunk resolution must be >= 2, got {0}")]
    InvalidResolution(usize),
    /// The falloff mask does not cover the bordered grid.
    #[error("falloff mask is {mask}x{mask} but the bordered height grid is {grid}x{grid}")]
    FalloffSizeMismatch {
        /// Mask side length.
        mask: usize,
        /// Bordered grid side length.
        grid: usize,
    },
}

/// An immutable square grid of heights in `[0, 1]`, row-major, including the
/// border ring.
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    size: usize,
    values: Vec<f32>,
}

impl HeightMap {
    /// Wrap row-major values. `values.len()` must equal `size * size`.
    ///
    /// # Panics
    ///
    /// Panics if the length does not match.
    pub fn from_values(size: usize, values: Vec<f32>) -> Self {
        assert_eq!(values.len(), size * size, "height map must be square");
        Self { size, values }
    }

    /// Side length including the border ring.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Side length of the real chunk lattice (without the border ring).
    pub fn resolution(&self) -> usize {
        self.size.saturating_sub(2)
    }

    /// Height at bordered-grid position `(x, y)`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.size + x]
    }

    /// Height at real-lattice position `(x, y)`, skipping the border ring.
    #[inline]
    pub fn core(&self, x: usize, y: usize) -> f32 {
        self.get(x + 1, y + 1)
    }

    /// All values, row-major, border included.
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    /// Smallest and largest value.
    pub fn min_max(&self) -> (f32, f32) {
        self.values
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

/// Builds height maps for chunk origins from a fixed noise field.
///
/// Cell `(i, j)` of the bordered grid samples the world point
/// `(origin.x + (i - 1) - half, origin.y + half - (j - 1))` with
/// `half = (resolution - 1) / 2`. Chunks whose origins differ by
/// `resolution - 1` therefore sample identical points along their shared edge.
#[derive(Clone, Debug)]
pub struct HeightMapBuilder {
    field: NoiseField,
    resolution: usize,
    normalization: Normalization,
    falloff: Option<Arc<FalloffMask>>,
}

impl HeightMapBuilder {
    /// Create a builder. Fails only on invalid configuration.
    pub fn new(
        params: NoiseParams,
        resolution: usize,
        normalization: Normalization,
        falloff: Option<Arc<FalloffMask>>,
    ) -> Result<Self, HeightMapError> {
        if resolution < 2 {
            return Err(HeightMapError::InvalidResolution(resolution));
        }
        let grid = resolution + 2;
        if let Some(mask) = &falloff
            && mask.size() != grid
        {
            return Err(HeightMapError::FalloffSizeMismatch {
                mask: mask.size(),
                grid,
            });
        }

        Ok(Self {
            field: NoiseField::new(params),
            resolution,
            normalization,
            falloff,
        })
    }

    /// Samples per chunk side, excluding the border ring.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Side length of the grids this builder produces.
    pub fn grid_size(&self) -> usize {
        self.resolution + 2
    }

    /// World-space width of one chunk.
    pub fn chunk_size(&self) -> f64 {
        (self.resolution - 1) as f64
    }

    /// The underlying noise field.
    pub fn field(&self) -> &NoiseField {
        &self.field
    }

    /// World-space point sampled by bordered-grid cell `(i, j)`.
    pub fn sample_point(&self, origin: DVec2, i: usize, j: usize) -> DVec2 {
        let half = self.chunk_size() / 2.0;
        DVec2::new(
            origin.x + ((i as f64 - 1.0) - half),
            origin.y + (half - (j as f64 - 1.0)),
        )
    }

    /// Build the height map for the chunk centered on `origin`.
    pub fn build(&self, origin: DVec2) -> HeightMap {
        let size = self.grid_size();
        let mut raw = Vec::with_capacity(size * size);
        for j in 0..size {
            for i in 0..size {
                raw.push(self.field.sample(self.sample_point(origin, i, j)));
            }
        }

        let mut values: Vec<f32> = match self.normalization {
            Normalization::Global => raw
                .iter()
                .map(|&h| self.field.normalize_global(h) as f32)
                .collect(),
            Normalization::Local => {
                let (lo, hi) = raw
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                        (lo.min(v), hi.max(v))
                    });
                let span = hi - lo;
                raw.iter()
                    .map(|&h| {
                        if span > f64::EPSILON {
                            ((h - lo) / span).clamp(0.0, 1.0) as f32
                        } else {
                            0.0
                        }
                    })
                    .collect()
            }
        };

        if let Some(mask) = &self.falloff {
            mask.apply(&mut values);
        }

        HeightMap { size, values }
    }
}
