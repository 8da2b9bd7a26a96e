//! Procedural terrain generation: fractal noise, island falloff, per-chunk
//! height maps, and height-band classification.

mod classifier;
mod falloff;
mod heightmap;
mod noise_field;
mod texture;

pub mod seed;

pub use classifier::{ClassifierError, Color, ColorMap, TerrainClassifier, TerrainType};
pub use falloff::{FalloffError, FalloffMask, FalloffShape};
pub use heightmap::{HeightMap, HeightMapBuilder, HeightMapError};
pub use noise_field::{NoiseField, NoiseParams, Normalization};
pub use texture::TextureData;
