//! Height-band classification into terrain types and colours.

use crate::heightmap::HeightMap;

/// An 8-bit RGBA colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);

    /// An opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Linear interpolation between two colours, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Self {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: mix(self.a, other.a),
        }
    }
}

/// One entry of the classification table.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainType {
    /// Human-readable name, e.g. `"sand"`.
    pub name: String,
    /// Inclusive upper bound of the band.
    pub threshold: f32,
    pub color: Color,
}

impl TerrainType {
    pub fn new(name: impl Into<String>, threshold: f32, color: Color) -> Self {
        Self {
            name: name.into(),
            threshold,
            color,
        }
    }
}

/// Errors building a [`TerrainClassifier`].
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ClassifierError {
    #[error("terrain type table is empty")]
    Empty,
    #[error("terrain type '{name}' has non-finite threshold {threshold}")]
    NonFiniteThreshold { name: String, threshold: f32 },
    #[error(
        "terrain type '{name}' threshold {threshold} is below the previous threshold {previous}"
    )]
    Unordered {
        name: String,
        threshold: f32,
        previous: f32,
    },
}

/// Maps heights to terrain types through an ascending threshold table.
///
/// The first type with `height <= threshold` wins. Heights above the last
/// threshold map to the last type, so every height is covered.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainClassifier {
    types: Vec<TerrainType>,
}

impl TerrainClassifier {
    pub fn new(types: Vec<TerrainType>) -> Result<Self, ClassifierError> {
        if types.is_empty() {
            return Err(ClassifierError::Empty);
        }
        for (idx, ty) in types.iter().enumerate() {
            if !ty.threshold.is_finite() {
                return Err(ClassifierError::NonFiniteThreshold {
                    name: ty.name.clone(),
                    threshold: ty.threshold,
                });
            }
            if idx > 0 && ty.threshold < types[idx - 1].threshold {
                return Err(ClassifierError::Unordered {
                    name: ty.name.clone(),
                    threshold: ty.threshold,
                    previous: types[idx - 1].threshold,
                });
            }
        }
        Ok(Self { types })
    }

    /// The table, in ascending threshold order.
    pub fn types(&self) -> &[TerrainType] {
        &self.types
    }

    /// Index of the type a height falls into.
    pub fn index_of(&self, height: f32) -> usize {
        let idx = self.types.partition_point(|ty| ty.threshold < height);
        idx.min(self.types.len() - 1)
    }

    pub fn classify(&self, height: f32) -> &TerrainType {
        &self.types[self.index_of(height)]
    }

    /// Colour every real cell of `map`, skipping the border ring.
    pub fn color_map(&self, map: &HeightMap) -> ColorMap {
        let resolution = map.resolution();
        let mut colors = Vec::with_capacity(resolution * resolution);
        for y in 0..resolution {
            for x in 0..resolution {
                colors.push(self.classify(map.core(x, y)).color);
            }
        }
        ColorMap { resolution, colors }
    }
}

/// Per-cell colours for a chunk's real lattice, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMap {
    resolution: usize,
    colors: Vec<Color>,
}

impl ColorMap {
    /// Side length in cells.
    pub fn resolution(&self) -> usize {
        self.resolution
    }

    pub fn get(&self, x: usize, y: usize) -> Color {
        self.colors[y * self.resolution + x]
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}
